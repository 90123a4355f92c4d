use iac_analyzer::importer::{DataParseError, OverlayKind, load_overlay, parse_overlay};

#[test]
fn step_down_table_with_comments_and_default_labels() {
    let csv = "\
distance_nm,altitude_ft,label
# fixes from the chart
4.0, 1400, DUYET
2.5,1100
";
    let fixes = parse_overlay(csv.as_bytes(), OverlayKind::StepDownFixes).expect("parse");
    assert_eq!(fixes.len(), 2);
    assert_eq!(fixes[0].distance_nm, 4.0);
    assert_eq!(fixes[0].altitude_ft, 1400.0);
    assert_eq!(fixes[0].label, "DUYET");
    assert_eq!(fixes[1].label, "SDF");
}

#[test]
fn obstacle_table_defaults_to_obs() {
    let csv = "distance_nm,height_ft\n1.2,310\n";
    let obstacles = parse_overlay(csv.as_bytes(), OverlayKind::Obstacles).expect("parse");
    assert_eq!(obstacles[0].label, "OBS");
    assert_eq!(obstacles[0].altitude_ft, 310.0);
}

#[test]
fn malformed_rows_reject_the_table() {
    let bad_number = "distance_nm,altitude_ft\n4.0,abc\n";
    assert!(matches!(
        parse_overlay(bad_number.as_bytes(), OverlayKind::StepDownFixes),
        Err(DataParseError::InvalidRow { .. })
    ));
    let one_column = "distance_nm,altitude_ft\n4.0\n";
    assert!(matches!(
        parse_overlay(one_column.as_bytes(), OverlayKind::StepDownFixes),
        Err(DataParseError::MissingColumns { found: 1, .. })
    ));
    let negative = "distance_nm,altitude_ft\n-1.0,500\n";
    assert!(matches!(
        parse_overlay(negative.as_bytes(), OverlayKind::Obstacles),
        Err(DataParseError::InvalidRow { .. })
    ));
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    assert!(matches!(
        load_overlay(dir.path().join("none.csv"), OverlayKind::Obstacles),
        Err(DataParseError::Io(_))
    ));
}
