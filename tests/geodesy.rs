use iac_analyzer::core_units::bearing;
use iac_analyzer::geodesy::{GeodesyError, destination_point, sample_approach_track, with_elevations};

#[test]
fn forward_then_back_returns_to_origin() {
    let cases = [(37.618805, -122.375416, 281.0, 11.112), (48.35, 11.78, 80.0, 25.0), (-33.94, 151.17, 160.0, 5.0)];
    for (lat, lon, brg, km) in cases {
        let (lat2, lon2) = destination_point(lat, lon, brg, km);
        // bearing back from the far point differs slightly on a sphere, so use the initial one
        let (lat3, lon3) = destination_point(lat2, lon2, bearing::reciprocal(brg), km);
        assert!((lat3 - lat).abs() < 0.01, "lat {lat3} vs {lat}");
        assert!((lon3 - lon).abs() < 0.01, "lon {lon3} vs {lon}");
    }
}

#[test]
fn destination_point_one_degree_north() {
    let (lat, lon) = destination_point(0.0, 0.0, 0.0, 111.194_926_6);
    assert!((lat - 1.0).abs() < 1e-6);
    assert!(lon.abs() < 1e-9);
}

#[test]
fn track_runs_from_faf_to_threshold() {
    let track = sample_approach_track(37.618805, -122.375416, 281.0, 6.0, 240).expect("track");
    assert_eq!(track.len(), 240);
    assert_eq!(track[0].distance_from_threshold_nm, 6.0);
    assert_eq!(track[239].distance_from_threshold_nm, 0.0);
    assert!(
        track
            .windows(2)
            .all(|w| w[0].distance_from_threshold_nm >= w[1].distance_from_threshold_nm)
    );
    // last point is the threshold itself
    assert!((track[239].latitude_deg - 37.618805).abs() < 1e-12);
    assert!((track[239].longitude_deg + 122.375416).abs() < 1e-12);
    // on a 281° inbound course the FAF lies east of the threshold
    assert!(track[0].longitude_deg > -122.375416);
    assert!(track.iter().all(|p| p.elevation_m.is_none()));
}

#[test]
fn track_distances_are_rounded_to_six_places() {
    let track = sample_approach_track(10.0, 20.0, 90.0, 1.0, 4).expect("track");
    let distances: Vec<f64> = track.iter().map(|p| p.distance_from_threshold_nm).collect();
    assert_eq!(distances, vec![1.0, 0.666667, 0.333333, 0.0]);
}

#[test]
fn track_rejects_bad_arguments() {
    assert!(matches!(
        sample_approach_track(10.0, 20.0, 90.0, 6.0, 1),
        Err(GeodesyError::InvalidArgument(_))
    ));
    assert!(matches!(
        sample_approach_track(f64::NAN, 20.0, 90.0, 6.0, 10),
        Err(GeodesyError::InvalidArgument(_))
    ));
    assert!(matches!(
        sample_approach_track(10.0, 20.0, 90.0, -1.0, 10),
        Err(GeodesyError::InvalidArgument(_))
    ));
}

#[test]
fn elevations_attach_by_index() {
    let track = sample_approach_track(10.0, 20.0, 90.0, 2.0, 3).expect("track");
    let filled = with_elevations(track.clone(), &[Some(10.0), None]);
    assert_eq!(filled[0].elevation_m, Some(10.0));
    assert_eq!(filled[1].elevation_m, None);
    assert_eq!(filled[2].elevation_m, None);
    assert_eq!(filled[1].latitude_deg, track[1].latitude_deg);
}
