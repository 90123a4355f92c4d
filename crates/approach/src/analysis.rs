//! One end-to-end approach analysis: track sampling, terrain lookup, profile and safety checks.

use iac_config::DescentConfig;
use iac_core::Coordinate;
use iac_core::units::metres_to_feet;
use iac_elevation::ElevationChain;
use iac_geodesy::{GeodesyError, SamplePoint, sample_approach_track, with_elevations};
use iac_profile::{AltitudeProfile, ConstraintPoint, ProfileError, build_profile};
use iac_safety::{
    ObstacleViolation, SafetyError, ViolationSet, evaluate_clearance, evaluate_obstacles,
    is_below_minimum, is_terrain_conflict, target_altitude_at_range,
};
use serde::Serialize;
use thiserror::Error;

/// Errors that make a run meaningless.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("track geometry failed: {0}")]
    Geometry(#[from] GeodesyError),
    #[error("profile construction failed: {0}")]
    Profile(#[from] ProfileError),
    #[error("safety evaluation failed: {0}")]
    Safety(#[from] SafetyError),
}

/// Degraded-fidelity notices. The run still completes.
#[derive(Debug, Clone, PartialEq, Serialize, Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisWarning {
    #[error("{provider} unavailable: {reason}")]
    ProviderUnavailable { provider: String, reason: String },
    #[error("terrain unknown for {missing} of {total} samples; treated as 0 ft")]
    ElevationMissing { missing: usize, total: usize },
    #[error("{overlay} table omitted: {reason}")]
    OverlayRejected { overlay: String, reason: String },
    #[error("obstacle '{label}' at {distance_nm} NM lies outside the profile and was not checked")]
    ObstacleOutsideProfile { label: String, distance_nm: f64 },
    #[error("runway {runway_end} has no heading in the runway table; approach course assumed {bearing_deg}°")]
    RunwayHeadingAssumed { runway_end: String, bearing_deg: f64 },
}

/// Runway threshold and inbound course the track is laid out from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Threshold {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub approach_bearing_deg: f64,
    /// Runway end identifier when resolved from the runway table.
    pub runway_end: Option<String>,
}

/// Everything needed for one analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub threshold: Threshold,
    pub descent: DescentConfig,
    pub samples: usize,
    pub profile_points_per_nm: u32,
    pub dme_nm: Option<f64>,
    pub step_down_fixes: Vec<ConstraintPoint>,
    pub obstacles: Vec<ConstraintPoint>,
    /// Warnings raised while assembling the request, carried into the report.
    pub warnings: Vec<AnalysisWarning>,
}

/// Plain series and verdicts for presentation and export.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub threshold: Threshold,
    pub descent: DescentConfig,
    pub samples: Vec<SamplePoint>,
    /// Target altitude at each sample, same order as `samples`.
    pub track_profile: AltitudeProfile,
    /// Dense constraint profile for plotting.
    pub profile: AltitudeProfile,
    /// Terrain under each sample in feet; `None` where unknown.
    pub terrain_ft: Vec<Option<f64>>,
    pub violations: ViolationSet,
    pub obstacle_violations: Vec<ObstacleViolation>,
    pub step_down_fixes: Vec<ConstraintPoint>,
    pub obstacles: Vec<ConstraintPoint>,
    pub dme_nm: Option<f64>,
    pub target_altitude_at_dme_ft: Option<f64>,
    pub elevation_source: Option<String>,
    pub warnings: Vec<AnalysisWarning>,
}

/// One sample with its verdicts, flattened for tabular output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleRow {
    pub distance_nm: f64,
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub elevation_m: Option<f64>,
    pub terrain_ft: Option<f64>,
    pub altitude_ft: f64,
    pub terrain_conflict: bool,
    pub below_mda: bool,
}

impl AnalysisReport {
    pub fn rows(&self) -> Vec<SampleRow> {
        self.samples
            .iter()
            .zip(self.track_profile.points())
            .zip(&self.terrain_ft)
            .map(|((sample, point), &terrain_ft)| SampleRow {
                distance_nm: sample.distance_from_threshold_nm,
                latitude_deg: sample.latitude_deg,
                longitude_deg: sample.longitude_deg,
                elevation_m: sample.elevation_m,
                terrain_ft,
                altitude_ft: point.altitude_ft,
                terrain_conflict: is_terrain_conflict(point.altitude_ft, terrain_ft, self.descent.safety_buffer_ft),
                below_mda: is_below_minimum(point.altitude_ft, self.descent.mda_ft),
            })
            .collect()
    }

    pub fn is_clear(&self) -> bool {
        self.violations.is_clear() && self.obstacle_violations.is_empty()
    }

    pub fn distances_nm(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.distance_from_threshold_nm).collect()
    }

    /// Terrain series with unknown samples drawn at 0 ft.
    pub fn terrain_series_ft(&self) -> Vec<f64> {
        self.terrain_ft.iter().map(|t| t.unwrap_or(0.0)).collect()
    }
}

/// Run one analysis.
///
/// Without step-down fixes each sample follows the single-segment CDFA from the
/// FAF altitude down to the MDA. With fixes, samples are read off the
/// multi-segment profile, which ends at the threshold altitude (the MDA unless
/// configured).
pub fn run_analysis(request: &AnalysisRequest, chain: &ElevationChain) -> Result<AnalysisReport, AnalysisError> {
    let descent = &request.descent;
    let threshold_altitude_ft = descent.threshold_altitude_ft.unwrap_or(descent.mda_ft);
    tracing::info!(
        samples = request.samples,
        faf_nm = descent.faf_to_threshold_nm,
        providers = ?chain.provider_names(),
        "starting approach analysis"
    );

    let track = sample_approach_track(
        request.threshold.latitude_deg,
        request.threshold.longitude_deg,
        request.threshold.approach_bearing_deg,
        descent.faf_to_threshold_nm,
        request.samples,
    )?;

    // Built before terrain is fetched so a bad descent fails fast.
    let profile = build_profile(
        descent.faf_to_threshold_nm,
        descent.faf_altitude_ft,
        threshold_altitude_ft,
        &request.step_down_fixes,
        request.profile_points_per_nm,
    )?;

    let mut warnings = request.warnings.clone();

    let coords: Vec<Coordinate> = track.iter().map(SamplePoint::coordinate).collect();
    let outcome = chain.resolve(&coords);
    warnings.extend(outcome.failures.iter().map(|f| AnalysisWarning::ProviderUnavailable {
        provider: f.provider.clone(),
        reason: f.reason.clone(),
    }));
    let missing = outcome.missing();
    if missing > 0 {
        tracing::warn!(missing, total = coords.len(), "terrain unknown for some samples");
        warnings.push(AnalysisWarning::ElevationMissing {
            missing,
            total: coords.len(),
        });
    }
    let samples = with_elevations(track, &outcome.elevations_m);

    let distances: Vec<f64> = samples.iter().map(|s| s.distance_from_threshold_nm).collect();
    let track_profile = if request.step_down_fixes.is_empty() {
        AltitudeProfile::linear_cdfa(
            &distances,
            descent.faf_altitude_ft,
            descent.mda_ft,
            descent.faf_to_threshold_nm,
        )
    } else {
        profile.resample(&distances)
    };

    let terrain_ft: Vec<Option<f64>> = samples.iter().map(|s| s.elevation_m.map(metres_to_feet)).collect();
    let violations = evaluate_clearance(&track_profile, &terrain_ft, descent.safety_buffer_ft, descent.mda_ft)?;

    let obstacle_check = evaluate_obstacles(&profile, &request.obstacles, descent.safety_buffer_ft);
    warnings.extend(obstacle_check.outside_profile.iter().map(|o| {
        AnalysisWarning::ObstacleOutsideProfile {
            label: o.label.clone(),
            distance_nm: o.distance_nm,
        }
    }));

    let target_altitude_at_dme_ft = request.dme_nm.and_then(|dme| {
        target_altitude_at_range(
            dme,
            descent.faf_altitude_ft,
            descent.mda_ft,
            descent.faf_to_threshold_nm,
        )
    });

    tracing::info!(
        terrain_conflicts = violations.terrain_clearance.len(),
        below_mda = violations.below_minimum.len(),
        obstacle_conflicts = obstacle_check.violations.len(),
        source = outcome.source.as_deref().unwrap_or("none"),
        "approach analysis complete"
    );

    Ok(AnalysisReport {
        threshold: request.threshold.clone(),
        descent: descent.clone(),
        samples,
        track_profile,
        profile,
        terrain_ft,
        violations,
        obstacle_violations: obstacle_check.violations,
        step_down_fixes: request.step_down_fixes.clone(),
        obstacles: request.obstacles.clone(),
        dme_nm: request.dme_nm,
        target_altitude_at_dme_ft,
        elevation_source: outcome.source,
        warnings,
    })
}
