use std::fs;

use iac_analyzer::config::{AnalyzerConfig, ConfigError, ElevationSource, load_config};

#[test]
fn defaults_match_reference_approach() {
    let cfg = AnalyzerConfig::default();
    assert_eq!(cfg.approach.threshold_lat, 37.618805);
    assert_eq!(cfg.approach.threshold_lon, -122.375416);
    assert_eq!(cfg.approach.approach_bearing_deg, 281.0);
    assert_eq!(cfg.descent.faf_to_threshold_nm, 6.0);
    assert_eq!(cfg.descent.faf_altitude_ft, 1800.0);
    assert_eq!(cfg.descent.mda_ft, 720.0);
    assert_eq!(cfg.descent.safety_buffer_ft, 100.0);
    assert_eq!(cfg.simulation.samples, 240);
    assert_eq!(cfg.simulation.dme_nm, Some(5.0));
    assert_eq!(cfg.simulation.frame_delay_s, 0.02);
    assert_eq!(cfg.elevation.sources, vec![ElevationSource::Srtm]);
    assert_eq!(cfg.elevation.open_elevation_batch_size, 80);
    assert_eq!(cfg.elevation.google_batch_size, 100);
    assert_eq!(cfg.elevation.request_timeout_s, 30);
    assert!(cfg.elevation.google_api_key.is_none());
    cfg.validate().expect("defaults are valid");
}

#[test]
fn toml_overrides_only_given_fields() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("approach.toml");
    fs::write(
        &path,
        r#"
[approach]
icao = "KSFO"
runway = "28R"

[descent]
mda_ft = 640.0

[elevation]
sources = ["open-elevation", "srtm"]
"#,
    )
    .expect("write");
    let cfg = load_config(&path).expect("load");
    assert_eq!(cfg.approach.icao.as_deref(), Some("KSFO"));
    assert_eq!(cfg.descent.mda_ft, 640.0);
    assert_eq!(cfg.descent.faf_altitude_ft, 1800.0);
    assert_eq!(
        cfg.elevation.sources,
        vec![ElevationSource::OpenElevation, ElevationSource::Srtm]
    );
}

#[test]
fn yaml_is_the_fallback_format() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("approach.yaml");
    fs::write(
        &path,
        "simulation:\n  samples: 120\n  dme_nm: 3.5\ndata:\n  step_down_csv: fixes.csv\n",
    )
    .expect("write");
    let cfg = load_config(&path).expect("load");
    assert_eq!(cfg.simulation.samples, 120);
    assert_eq!(cfg.simulation.dme_nm, Some(3.5));
    assert_eq!(
        cfg.data.step_down_csv.as_deref(),
        Some(std::path::Path::new("fixes.csv"))
    );
}

#[test]
fn api_key_is_never_read_from_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("approach.toml");
    fs::write(&path, "[elevation]\ngoogle_api_key = \"secret\"\n").expect("write");
    let cfg = load_config(&path).expect("load");
    assert!(cfg.elevation.google_api_key.is_none());
}

#[test]
fn validation_rejects_out_of_range_values() {
    let mut cfg = AnalyzerConfig::default();
    cfg.simulation.samples = 1;
    assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));

    let mut cfg = AnalyzerConfig::default();
    cfg.simulation.samples = 5001;
    assert!(cfg.validate().is_err());

    let mut cfg = AnalyzerConfig::default();
    cfg.descent.faf_to_threshold_nm = 0.0;
    assert!(cfg.validate().is_err());

    let mut cfg = AnalyzerConfig::default();
    cfg.descent.faf_to_threshold_nm = 50.0;
    assert!(cfg.validate().is_ok());
    cfg.descent.faf_to_threshold_nm = 50.5;
    assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(msg)) if msg.contains("50 NM")));

    let mut cfg = AnalyzerConfig::default();
    cfg.simulation.frame_delay_s = 1.5;
    assert!(cfg.validate().is_err());

    let mut cfg = AnalyzerConfig::default();
    cfg.elevation.google_batch_size = 0;
    assert!(cfg.validate().is_err());

    let mut cfg = AnalyzerConfig::default();
    cfg.elevation.sources.clear();
    assert!(cfg.validate().is_err());
}

#[test]
fn invalid_file_reports_parse_errors() {
    let dir = tempfile::tempdir().expect("tempdir");
    let toml_path = dir.path().join("bad.toml");
    fs::write(&toml_path, "[descent\nmda_ft = 1").expect("write");
    assert!(matches!(load_config(&toml_path), Err(ConfigError::Toml(_))));

    let range_path = dir.path().join("range.toml");
    fs::write(&range_path, "[simulation]\nsamples = 0\n").expect("write");
    assert!(matches!(load_config(&range_path), Err(ConfigError::Invalid(_))));

    assert!(matches!(
        load_config(dir.path().join("missing.yaml")),
        Err(ConfigError::Io(_))
    ));
}

#[test]
fn source_names_parse_leniently() {
    assert_eq!(ElevationSource::parse("Open_Elevation"), Some(ElevationSource::OpenElevation));
    assert_eq!(ElevationSource::parse(" google "), Some(ElevationSource::Google));
    assert_eq!(ElevationSource::parse("bing"), None);
}

#[test]
fn bundled_example_config_loads() {
    let cfg = load_config("data/approach.example.toml").expect("example config");
    assert_eq!(
        cfg.elevation.sources,
        vec![ElevationSource::Srtm, ElevationSource::OpenElevation]
    );
    let fixes = iac_analyzer::importer::load_overlay(
        cfg.data.step_down_csv.as_deref().expect("fixes path"),
        iac_analyzer::importer::OverlayKind::StepDownFixes,
    )
    .expect("fixes");
    assert_eq!(fixes.len(), 2);
}
