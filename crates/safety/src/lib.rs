//! Safety evaluation of an approach profile against terrain, obstacles and the MDA.

use iac_profile::{AltitudeProfile, ConstraintPoint, linear_cdfa_altitude};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SafetyError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Sample where the aircraft is at or below terrain plus the safety buffer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TerrainClearanceViolation {
    pub distance_nm: f64,
    pub aircraft_alt_ft: f64,
    pub terrain_alt_ft: f64,
}

/// Sample where the aircraft is strictly below the MDA/DA.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BelowMinimumAltitudeViolation {
    pub distance_nm: f64,
    pub aircraft_alt_ft: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ViolationSet {
    pub terrain_clearance: Vec<TerrainClearanceViolation>,
    pub below_minimum: Vec<BelowMinimumAltitudeViolation>,
}

impl ViolationSet {
    pub fn is_clear(&self) -> bool {
        self.terrain_clearance.is_empty() && self.below_minimum.is_empty()
    }
}

/// Obstacle whose top comes within the safety buffer of the profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObstacleViolation {
    pub distance_nm: f64,
    pub label: String,
    pub aircraft_alt_ft: f64,
    pub obstacle_alt_ft: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObstacleAssessment {
    pub violations: Vec<ObstacleViolation>,
    /// Obstacles the profile does not cover; they were not checked.
    pub outside_profile: Vec<ConstraintPoint>,
}

/// Compare each profile sample with the terrain beneath it and with the MDA.
///
/// `terrain_ft` must line up index-for-index with the profile. Unknown terrain
/// counts as 0 ft. The two checks are independent, so one sample may appear in
/// both lists.
pub fn evaluate_clearance(
    profile: &AltitudeProfile,
    terrain_ft: &[Option<f64>],
    safety_buffer_ft: f64,
    mda_ft: f64,
) -> Result<ViolationSet, SafetyError> {
    if profile.len() != terrain_ft.len() {
        return Err(SafetyError::InvalidArgument(format!(
            "profile has {} samples but terrain has {}",
            profile.len(),
            terrain_ft.len()
        )));
    }

    let mut violations = ViolationSet::default();
    for (point, terrain) in profile.points().iter().zip(terrain_ft) {
        let terrain_alt_ft = terrain.unwrap_or(0.0);
        if is_terrain_conflict(point.altitude_ft, *terrain, safety_buffer_ft) {
            violations.terrain_clearance.push(TerrainClearanceViolation {
                distance_nm: point.distance_nm,
                aircraft_alt_ft: point.altitude_ft,
                terrain_alt_ft,
            });
        }
        if is_below_minimum(point.altitude_ft, mda_ft) {
            violations.below_minimum.push(BelowMinimumAltitudeViolation {
                distance_nm: point.distance_nm,
                aircraft_alt_ft: point.altitude_ft,
            });
        }
    }
    Ok(violations)
}

/// Terrain predicate for one sample; unknown terrain counts as 0 ft.
pub fn is_terrain_conflict(aircraft_alt_ft: f64, terrain_ft: Option<f64>, safety_buffer_ft: f64) -> bool {
    aircraft_alt_ft <= terrain_ft.unwrap_or(0.0) + safety_buffer_ft
}

pub fn is_below_minimum(aircraft_alt_ft: f64, mda_ft: f64) -> bool {
    aircraft_alt_ft < mda_ft
}

/// Check obstacle tops against the profile altitude at each obstacle's distance.
pub fn evaluate_obstacles(
    profile: &AltitudeProfile,
    obstacles: &[ConstraintPoint],
    safety_buffer_ft: f64,
) -> ObstacleAssessment {
    let mut assessment = ObstacleAssessment::default();
    for obstacle in obstacles {
        match profile.altitude_at(obstacle.distance_nm) {
            Some(aircraft_alt_ft) => {
                if aircraft_alt_ft <= obstacle.altitude_ft + safety_buffer_ft {
                    assessment.violations.push(ObstacleViolation {
                        distance_nm: obstacle.distance_nm,
                        label: obstacle.label.clone(),
                        aircraft_alt_ft,
                        obstacle_alt_ft: obstacle.altitude_ft,
                    });
                }
            }
            None => assessment.outside_profile.push(obstacle.clone()),
        }
    }
    assessment
}

/// Target altitude on the single-segment CDFA at a DME range from the threshold.
///
/// Returns `None` when `range_nm` lies outside `[0, faf_to_threshold_nm]`.
pub fn target_altitude_at_range(
    range_nm: f64,
    faf_altitude_ft: f64,
    mda_ft: f64,
    faf_to_threshold_nm: f64,
) -> Option<f64> {
    if !(0.0..=faf_to_threshold_nm).contains(&range_nm) {
        return None;
    }
    Some(linear_cdfa_altitude(range_nm, faf_altitude_ft, mda_ft, faf_to_threshold_nm))
}
