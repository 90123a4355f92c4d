use iac_analyzer::runway::{RunwayDatabase, RunwayError};

const RUNWAYS: &str = "\
id,airport_ref,airport_ident,length_ft,width_ft,surface,lighted,closed,le_ident,le_latitude_deg,le_longitude_deg,le_elevation_ft,le_heading_degT,le_displaced_threshold_ft,he_ident,he_latitude_deg,he_longitude_deg,he_elevation_ft,he_heading_degT,he_displaced_threshold_ft
1,3878,KSFO,11870,200,ASP,1,0,10L,37.6287,-122.393,10,117.9,,28R,37.6132,-122.357,10,297.9,
2,3878,KSFO,10602,200,ASP,1,0,10R,37.6262,-122.391,10,117.9,,28L,37.6117,-122.358,10,297.9,
3,9999,XTST,5000,100,ASP,1,0,09,10.0,20.0,5,,,27,,,5,270.0,
";

fn db() -> RunwayDatabase {
    RunwayDatabase::from_reader(RUNWAYS.as_bytes()).expect("runways")
}

#[test]
fn exact_match_on_either_end() {
    let db = db();
    assert_eq!(db.len(), 3);
    let rwy = db.find_runway("ksfo", "28r").expect("lookup").expect("found");
    assert_eq!(rwy.runway_end, "28R");
    assert_eq!(rwy.threshold_lat, 37.6132);
    assert_eq!(rwy.threshold_lon, -122.357);
    assert_eq!(rwy.approach_bearing_deg, 297.9);

    let low = db.find_runway(" KSFO ", "10R").expect("lookup").expect("found");
    assert_eq!(low.runway_end, "10R");
    assert_eq!(low.threshold_lat, 37.6262);
}

#[test]
fn digit_prefix_fallback() {
    let db = db();
    // no "28C" at KSFO: first runway whose end starts with 28 wins
    let rwy = db.find_runway("KSFO", "28C").expect("lookup").expect("found");
    assert_eq!(rwy.runway_end, "28R");
}

#[test]
fn unknown_airport_or_runway() {
    let db = db();
    assert!(db.find_runway("KLAX", "25L").expect("lookup").is_none());
    assert!(db.find_runway("KSFO", "01").expect("lookup").is_none());
    assert!(db.find_runway("KSFO", "XX").expect("lookup").is_none());
}

#[test]
fn missing_heading_and_coordinates() {
    let db = db();
    let low = db.find_runway("XTST", "09").expect("lookup").expect("found");
    assert_eq!(low.approach_bearing_deg, 0.0);
    assert!(low.heading_assumed);
    let known = db.find_runway("KSFO", "28R").expect("lookup").expect("found");
    assert!(!known.heading_assumed);
    assert!(matches!(
        db.find_runway("XTST", "27"),
        Err(RunwayError::IncompleteRecord { .. })
    ));
}
