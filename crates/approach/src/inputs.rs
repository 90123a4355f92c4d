//! Assembly of an [`AnalysisRequest`] and elevation chain from configuration.
//!
//! Collaborator failures here (runway table, overlay tables, provider setup)
//! never abort: they become warnings and the run proceeds with what is left.

use std::path::Path;
use std::time::Duration;

use iac_config::{AnalyzerConfig, ApproachConfig, DataConfig, ElevationConfig, ElevationSource};
use iac_elevation::{
    ElevationChain, ElevationError, ElevationProvider, GoogleElevationProvider, OpenElevationProvider,
    SrtmProvider,
};
use iac_importer::{OverlayKind, load_overlay};
use iac_profile::ConstraintPoint;
use iac_runway::RunwayDatabase;

use crate::analysis::{AnalysisRequest, AnalysisWarning, Threshold};

const RUNWAY_DB: &str = "runway database";

/// Build the provider chain in the configured order.
pub fn build_chain(config: &ElevationConfig) -> (ElevationChain, Vec<AnalysisWarning>) {
    let timeout = Duration::from_secs(config.request_timeout_s.max(1));
    let mut chain = ElevationChain::default();
    let mut warnings = Vec::new();

    for source in &config.sources {
        let provider: Result<Box<dyn ElevationProvider>, ElevationError> = match source {
            ElevationSource::Srtm => Ok(Box::new(SrtmProvider::new(config.srtm_dir.clone()))),
            ElevationSource::OpenElevation => OpenElevationProvider::new(
                config.open_elevation_url.clone(),
                config.open_elevation_batch_size,
                timeout,
            )
            .map(|p| Box::new(p) as Box<dyn ElevationProvider>),
            ElevationSource::Google => GoogleElevationProvider::new(
                config.google_url.clone(),
                config.google_api_key.clone(),
                config.google_batch_size,
                timeout,
            )
            .map(|p| Box::new(p) as Box<dyn ElevationProvider>),
        };
        match provider {
            Ok(provider) => chain.push(provider),
            Err(err) => {
                tracing::warn!(source = source.label(), %err, "elevation provider setup failed");
                warnings.push(AnalysisWarning::ProviderUnavailable {
                    provider: source.label().to_string(),
                    reason: err.to_string(),
                });
            }
        }
    }
    (chain, warnings)
}

/// Threshold from the runway table when `icao`/`runway` are set, else the manual fields.
pub fn resolve_threshold(approach: &ApproachConfig, runways_csv: Option<&Path>) -> (Threshold, Vec<AnalysisWarning>) {
    let manual = Threshold {
        latitude_deg: approach.threshold_lat,
        longitude_deg: approach.threshold_lon,
        approach_bearing_deg: approach.approach_bearing_deg,
        runway_end: None,
    };
    let (Some(icao), Some(runway)) = (approach.icao.as_deref(), approach.runway.as_deref()) else {
        return (manual, Vec::new());
    };
    let unavailable = |reason: String| AnalysisWarning::ProviderUnavailable {
        provider: RUNWAY_DB.to_string(),
        reason,
    };
    let Some(path) = runways_csv else {
        return (
            manual,
            vec![unavailable("no runway table configured; using manual threshold".to_string())],
        );
    };

    let lookup = RunwayDatabase::load(path).and_then(|db| db.find_runway(icao, runway));
    match lookup {
        Ok(Some(found)) => {
            tracing::info!(%icao, end = %found.runway_end, "threshold filled from runway table");
            let mut warnings = Vec::new();
            if found.heading_assumed {
                warnings.push(AnalysisWarning::RunwayHeadingAssumed {
                    runway_end: found.runway_end.clone(),
                    bearing_deg: found.approach_bearing_deg,
                });
            }
            (
                Threshold {
                    latitude_deg: found.threshold_lat,
                    longitude_deg: found.threshold_lon,
                    approach_bearing_deg: found.approach_bearing_deg,
                    runway_end: Some(found.runway_end),
                },
                warnings,
            )
        }
        Ok(None) => (
            manual,
            vec![unavailable(format!(
                "runway {runway} at {icao} not found; using manual threshold"
            ))],
        ),
        Err(err) => {
            tracing::warn!(%err, "runway lookup failed");
            (manual, vec![unavailable(format!("{err}; using manual threshold"))])
        }
    }
}

/// Step-down fixes and obstacles read from the configured tables.
#[derive(Debug, Clone, Default)]
pub struct Overlays {
    pub step_down_fixes: Vec<ConstraintPoint>,
    pub obstacles: Vec<ConstraintPoint>,
    pub warnings: Vec<AnalysisWarning>,
}

pub fn load_overlays(data: &DataConfig) -> Overlays {
    let mut warnings = Vec::new();
    let step_down_fixes = read_overlay(data.step_down_csv.as_deref(), OverlayKind::StepDownFixes, &mut warnings);
    let obstacles = read_overlay(data.obstacles_csv.as_deref(), OverlayKind::Obstacles, &mut warnings);
    Overlays {
        step_down_fixes,
        obstacles,
        warnings,
    }
}

fn read_overlay(path: Option<&Path>, kind: OverlayKind, warnings: &mut Vec<AnalysisWarning>) -> Vec<ConstraintPoint> {
    let Some(path) = path else {
        return Vec::new();
    };
    match load_overlay(path, kind) {
        Ok(points) => points,
        Err(err) => {
            tracing::warn!(overlay = kind.label(), path = %path.display(), %err, "overlay table rejected");
            warnings.push(AnalysisWarning::OverlayRejected {
                overlay: kind.label().to_string(),
                reason: err.to_string(),
            });
            Vec::new()
        }
    }
}

/// Assemble a request from a validated config, resolving runway and overlay inputs.
pub fn request_from_config(config: &AnalyzerConfig) -> AnalysisRequest {
    let (threshold, mut warnings) = resolve_threshold(&config.approach, config.data.runways_csv.as_deref());
    let overlays = load_overlays(&config.data);
    warnings.extend(overlays.warnings);

    AnalysisRequest {
        threshold,
        descent: config.descent.clone(),
        samples: config.simulation.samples,
        profile_points_per_nm: config.simulation.profile_points_per_nm,
        dme_nm: config.simulation.dme_nm,
        step_down_fixes: overlays.step_down_fixes,
        obstacles: overlays.obstacles,
        warnings,
    }
}
