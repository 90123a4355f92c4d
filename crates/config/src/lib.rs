//! Configuration models and loaders for the IAC approach analyzer.
//!
//! Every field has a default, so a config file only needs the values it
//! changes. Credentials are never read from files or the environment here;
//! binaries inject them into [`ElevationConfig::google_api_key`].

use std::fs::File;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest accepted sample count for one run.
pub const MAX_SAMPLES: usize = 5_000;

/// Longest accepted FAF-to-threshold distance.
pub const MAX_FAF_DISTANCE_NM: f64 = 50.0;

/// Errors that can occur while loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub approach: ApproachConfig,
    pub descent: DescentConfig,
    pub simulation: SimulationConfig,
    pub elevation: ElevationConfig,
    pub data: DataConfig,
}

/// Runway threshold and inbound course. `icao`/`runway` enable database auto-fill.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApproachConfig {
    pub icao: Option<String>,
    pub runway: Option<String>,
    pub threshold_lat: f64,
    pub threshold_lon: f64,
    pub approach_bearing_deg: f64,
}

impl Default for ApproachConfig {
    fn default() -> Self {
        Self {
            icao: None,
            runway: None,
            threshold_lat: 37.618805,
            threshold_lon: -122.375416,
            approach_bearing_deg: 281.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DescentConfig {
    pub faf_to_threshold_nm: f64,
    pub faf_altitude_ft: f64,
    pub mda_ft: f64,
    /// Altitude the step-down profile ends at; the MDA when unset.
    pub threshold_altitude_ft: Option<f64>,
    pub safety_buffer_ft: f64,
}

impl Default for DescentConfig {
    fn default() -> Self {
        Self {
            faf_to_threshold_nm: 6.0,
            faf_altitude_ft: 1_800.0,
            mda_ft: 720.0,
            threshold_altitude_ft: None,
            safety_buffer_ft: 100.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub samples: usize,
    pub dme_nm: Option<f64>,
    pub profile_points_per_nm: u32,
    /// Animation pacing only; never affects computed results.
    pub frame_delay_s: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            samples: 240,
            dme_nm: Some(5.0),
            profile_points_per_nm: 10,
            frame_delay_s: 0.02,
        }
    }
}

/// Elevation provider identifiers accepted in `elevation.sources`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElevationSource {
    Srtm,
    OpenElevation,
    Google,
}

impl ElevationSource {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "srtm" | "offline" => Some(Self::Srtm),
            "open-elevation" | "open_elevation" | "openelevation" => Some(Self::OpenElevation),
            "google" => Some(Self::Google),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Srtm => "srtm",
            Self::OpenElevation => "open-elevation",
            Self::Google => "google",
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ElevationConfig {
    /// Providers in the order they are tried.
    pub sources: Vec<ElevationSource>,
    pub srtm_dir: PathBuf,
    /// Download URL for raw `.hgt` tiles with a `{tile}` placeholder.
    pub srtm_tile_url: Option<String>,
    pub open_elevation_url: String,
    pub open_elevation_batch_size: usize,
    pub google_url: String,
    pub google_batch_size: usize,
    pub request_timeout_s: u64,
    #[serde(skip)]
    pub google_api_key: Option<String>,
}

impl Default for ElevationConfig {
    fn default() -> Self {
        Self {
            sources: vec![ElevationSource::Srtm],
            srtm_dir: PathBuf::from("data/srtm"),
            srtm_tile_url: None,
            open_elevation_url: "https://api.open-elevation.com/api/v1/lookup".to_string(),
            open_elevation_batch_size: 80,
            google_url: "https://maps.googleapis.com/maps/api/elevation/json".to_string(),
            google_batch_size: 100,
            request_timeout_s: 30,
            google_api_key: None,
        }
    }
}

/// Optional input tables.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct DataConfig {
    pub runways_csv: Option<PathBuf>,
    pub step_down_csv: Option<PathBuf>,
    pub obstacles_csv: Option<PathBuf>,
}

impl AnalyzerConfig {
    /// Check ranges that would otherwise surface as confusing runtime failures.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let a = &self.approach;
        if !(-90.0..=90.0).contains(&a.threshold_lat) || !(-180.0..=180.0).contains(&a.threshold_lon) {
            return invalid(format!(
                "threshold ({}, {}) is not a valid position",
                a.threshold_lat, a.threshold_lon
            ));
        }
        if !(0.0..=360.0).contains(&a.approach_bearing_deg) {
            return invalid(format!(
                "approach bearing {} must be within 0-360°",
                a.approach_bearing_deg
            ));
        }

        let d = &self.descent;
        if !d.faf_to_threshold_nm.is_finite() || d.faf_to_threshold_nm <= 0.0 {
            return invalid(format!(
                "FAF to threshold distance must be positive, got {}",
                d.faf_to_threshold_nm
            ));
        }
        if d.faf_to_threshold_nm > MAX_FAF_DISTANCE_NM {
            return invalid(format!(
                "FAF to threshold distance must not exceed {MAX_FAF_DISTANCE_NM} NM, got {}",
                d.faf_to_threshold_nm
            ));
        }
        let altitudes = [Some(d.faf_altitude_ft), Some(d.mda_ft), d.threshold_altitude_ft];
        if altitudes.iter().flatten().any(|v| !v.is_finite()) {
            return invalid("descent altitudes must be finite".to_string());
        }
        if !d.safety_buffer_ft.is_finite() || d.safety_buffer_ft < 0.0 {
            return invalid(format!(
                "safety buffer must be non-negative, got {}",
                d.safety_buffer_ft
            ));
        }

        let s = &self.simulation;
        if !(2..=MAX_SAMPLES).contains(&s.samples) {
            return invalid(format!(
                "samples must be between 2 and {MAX_SAMPLES}, got {}",
                s.samples
            ));
        }
        if s.profile_points_per_nm == 0 {
            return invalid("profile_points_per_nm must be positive".to_string());
        }
        if !(0.0..=1.0).contains(&s.frame_delay_s) {
            return invalid(format!(
                "frame delay must be within 0-1 s, got {}",
                s.frame_delay_s
            ));
        }

        let e = &self.elevation;
        if e.sources.is_empty() {
            return invalid("at least one elevation source is required".to_string());
        }
        if e.open_elevation_batch_size == 0 || e.google_batch_size == 0 {
            return invalid("elevation batch sizes must be positive".to_string());
        }
        Ok(())
    }
}

fn invalid(msg: String) -> Result<(), ConfigError> {
    Err(ConfigError::Invalid(msg))
}

/// Load and validate an analyzer config from TOML (`.toml`) or YAML (anything else).
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AnalyzerConfig, ConfigError> {
    let path = path.as_ref();
    let config: AnalyzerConfig = if path.extension().map(|ext| ext == "toml").unwrap_or(false) {
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents)?
    } else {
        let reader = File::open(path)?;
        serde_yaml::from_reader(reader)?
    };
    config.validate()?;
    Ok(config)
}
