use std::fs;

use iac_analyzer::approach::elevation::{ElevationChain, ElevationError, ElevationProvider};
use iac_analyzer::approach::{AnalysisRequest, ConstraintPoint, Threshold, run_analysis};
use iac_analyzer::config::DescentConfig;
use iac_analyzer::core_units::Coordinate;
use iac_analyzer::export::{self, samples};

struct Patchy;

impl ElevationProvider for Patchy {
    fn name(&self) -> &str {
        "patchy"
    }

    fn resolve(&self, coords: &[Coordinate]) -> Result<Vec<Option<f64>>, ElevationError> {
        Ok((0..coords.len())
            .map(|i| if i % 2 == 0 { Some(250.0) } else { None })
            .collect())
    }
}

fn report() -> iac_analyzer::approach::AnalysisReport {
    let request = AnalysisRequest {
        threshold: Threshold {
            latitude_deg: 37.618805,
            longitude_deg: -122.375416,
            approach_bearing_deg: 281.0,
            runway_end: Some("28R".into()),
        },
        descent: DescentConfig::default(),
        samples: 7,
        profile_points_per_nm: 10,
        dme_nm: Some(5.0),
        step_down_fixes: vec![ConstraintPoint::new(3.0, 1200.0, "SDF, north")],
        obstacles: vec![ConstraintPoint::new(1.0, 600.0, "OBS")],
        warnings: Vec::new(),
    };
    let chain = ElevationChain::new(vec![Box::new(Patchy)]);
    run_analysis(&request, &chain).expect("analysis")
}

#[test]
fn writes_all_artifacts() {
    let dir = tempfile::tempdir().expect("tempdir");
    let report = report();
    let paths = export::write_report(&dir.path().join("out"), &report).expect("export");

    let samples_csv = fs::read_to_string(&paths.samples_csv).expect("samples");
    let mut lines = samples_csv.lines();
    assert_eq!(lines.next(), Some(samples::HEADER));
    let rows: Vec<&str> = lines.collect();
    assert_eq!(rows.len(), 7);
    assert!(rows[0].starts_with("6.000000,"));
    // odd samples have no terrain: elevation and terrain columns stay empty
    let cols: Vec<&str> = rows[1].split(',').collect();
    assert_eq!(cols.len(), 8);
    assert_eq!(cols[3], "");
    assert_eq!(cols[4], "");
    assert!(rows[6].starts_with("0.000000,"));

    let profile_csv = fs::read_to_string(&paths.profile_csv).expect("profile");
    assert_eq!(profile_csv.lines().next(), Some("distance_nm,altitude_ft"));
    assert_eq!(profile_csv.lines().count(), 1 + report.profile.len());

    let overlays_csv = fs::read_to_string(&paths.overlays_csv).expect("overlays");
    assert!(overlays_csv.contains("sdf,3.000000,1200.00,SDF; north"));
    assert!(overlays_csv.contains("obstacle,1.000000,600.00,OBS"));

    let summary: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&paths.summary_json).expect("summary")).expect("json");
    assert_eq!(summary["sample_count"], 7);
    assert_eq!(summary["elevation_source"], "patchy");
    assert_eq!(summary["descent"]["mda_ft"], 720.0);
    assert_eq!(summary["threshold"]["runway_end"], "28R");
    assert_eq!(summary["warnings"][0]["kind"], "elevation_missing");
    assert_eq!(summary["warnings"][0]["missing"], 3);
    assert!(summary["generated_utc"].as_str().is_some());
}

#[test]
fn sample_rows_render_booleans() {
    let report = report();
    let mut buf: Vec<u8> = Vec::new();
    samples::write_all(&mut buf, &report.rows()).expect("write");
    let text = String::from_utf8(buf).expect("utf8");
    // 250 m of terrain (820 ft) + 100 ft buffer catches the threshold sample at 720 ft
    let last = text.lines().last().expect("row");
    assert!(last.ends_with(",true,false"), "{last}");
}
