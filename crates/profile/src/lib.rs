//! Target-altitude profiles for continuous descent final approaches (CDFA).
//!
//! Profiles are ordered by decreasing distance from the threshold: the first
//! point sits at the FAF, the last at the threshold. Altitudes never increase
//! along that ordering.

use serde::Serialize;
use thiserror::Error;

/// Default plotting density for [`build_profile`].
pub const DEFAULT_POINTS_PER_NM: u32 = 10;

/// Upper bound on the dense profile size produced by [`build_profile`].
pub const MAX_PROFILE_POINTS: usize = 1_000_000;

/// Denominator floor for the single-segment CDFA formula.
const MIN_FAF_DISTANCE_NM: f64 = 1e-6;

#[derive(Debug, Error, PartialEq)]
pub enum ProfileError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("invalid profile configuration: {0}")]
    InvalidConfiguration(String),
}

/// A labelled `(distance, altitude)` constraint measured from the threshold.
///
/// Used both for step-down fixes, which shape the profile, and for obstacles,
/// which are only checked against it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstraintPoint {
    pub distance_nm: f64,
    pub altitude_ft: f64,
    pub label: String,
}

impl ConstraintPoint {
    pub fn new(distance_nm: f64, altitude_ft: f64, label: impl Into<String>) -> Self {
        Self {
            distance_nm,
            altitude_ft,
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProfilePoint {
    pub distance_nm: f64,
    pub altitude_ft: f64,
}

/// Ordered target altitudes, farthest point first.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AltitudeProfile {
    points: Vec<ProfilePoint>,
}

impl AltitudeProfile {
    /// Wrap already-ordered points. Callers are responsible for the ordering.
    pub fn from_points(points: Vec<ProfilePoint>) -> Self {
        Self { points }
    }

    /// Per-sample single-segment CDFA from FAF altitude down to the MDA at the threshold.
    pub fn linear_cdfa(distances_nm: &[f64], faf_altitude_ft: f64, mda_ft: f64, faf_to_threshold_nm: f64) -> Self {
        let points = distances_nm
            .iter()
            .map(|&distance_nm| ProfilePoint {
                distance_nm,
                altitude_ft: linear_cdfa_altitude(distance_nm, faf_altitude_ft, mda_ft, faf_to_threshold_nm),
            })
            .collect();
        Self { points }
    }

    pub fn points(&self) -> &[ProfilePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn distances(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.distance_nm).collect()
    }

    pub fn altitudes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.altitude_ft).collect()
    }

    /// Linearly interpolated target altitude at `distance_nm`.
    ///
    /// Returns `None` outside the profile span. Repeated boundary points are
    /// harmless since both copies carry the same altitude.
    pub fn altitude_at(&self, distance_nm: f64) -> Option<f64> {
        if !distance_nm.is_finite() {
            return None;
        }
        let first = self.points.first()?;
        let last = self.points.last()?;
        if distance_nm > first.distance_nm || distance_nm < last.distance_nm {
            return None;
        }
        for pair in self.points.windows(2) {
            let (far, near) = (pair[0], pair[1]);
            if distance_nm == far.distance_nm {
                return Some(far.altitude_ft);
            }
            if distance_nm == near.distance_nm {
                return Some(near.altitude_ft);
            }
            if distance_nm < far.distance_nm && distance_nm > near.distance_nm {
                let t = (far.distance_nm - distance_nm) / (far.distance_nm - near.distance_nm);
                return Some(lerp(far.altitude_ft, near.altitude_ft, t));
            }
        }
        // single-point profile
        Some(first.altitude_ft)
    }

    /// Sample this profile at each of `distances_nm`, preserving their order.
    ///
    /// Distances are clamped into the profile span first, so rounding noise at
    /// either end cannot drop a sample. An empty profile yields an empty result.
    pub fn resample(&self, distances_nm: &[f64]) -> Self {
        let (Some(first), Some(last)) = (self.points.first(), self.points.last()) else {
            return Self::default();
        };
        let (near, far) = (last.distance_nm, first.distance_nm);
        if !(near <= far) {
            return Self::default();
        }
        let points = distances_nm
            .iter()
            .filter_map(|&distance_nm| {
                let lookup = distance_nm.clamp(near, far);
                self.altitude_at(lookup).map(|altitude_ft| ProfilePoint {
                    distance_nm,
                    altitude_ft,
                })
            })
            .collect();
        Self { points }
    }
}

/// Build a dense, multi-segment profile through the FAF, each step-down fix and the threshold.
///
/// Each segment gets `floor(length_nm * points_per_nm) + 1` points (at least two),
/// endpoints included. Segment boundaries appear twice in the output.
pub fn build_profile(
    faf_distance_nm: f64,
    faf_altitude_ft: f64,
    threshold_altitude_ft: f64,
    step_down_fixes: &[ConstraintPoint],
    points_per_nm: u32,
) -> Result<AltitudeProfile, ProfileError> {
    if points_per_nm == 0 {
        return Err(ProfileError::InvalidArgument(
            "points per nautical mile must be positive".to_string(),
        ));
    }
    let all_finite = [faf_distance_nm, faf_altitude_ft, threshold_altitude_ft]
        .iter()
        .chain(step_down_fixes.iter().flat_map(|f| [&f.distance_nm, &f.altitude_ft]))
        .all(|v| v.is_finite());
    if !all_finite {
        return Err(ProfileError::InvalidArgument(
            "profile constraints must be finite numbers".to_string(),
        ));
    }
    if faf_distance_nm == 0.0 {
        return Err(duplicate_distance(0.0));
    }
    if faf_distance_nm < 0.0 {
        return Err(ProfileError::InvalidArgument(format!(
            "FAF distance must be positive, got {faf_distance_nm}"
        )));
    }
    if faf_distance_nm * f64::from(points_per_nm) > MAX_PROFILE_POINTS as f64 {
        return Err(ProfileError::InvalidArgument(format!(
            "{faf_distance_nm} NM at {points_per_nm} points/NM exceeds {MAX_PROFILE_POINTS} profile points"
        )));
    }

    let mut constraints: Vec<(f64, f64)> = Vec::with_capacity(step_down_fixes.len() + 2);
    constraints.push((faf_distance_nm, faf_altitude_ft));
    for fix in step_down_fixes {
        if fix.distance_nm <= 0.0 || fix.distance_nm >= faf_distance_nm {
            if fix.distance_nm == faf_distance_nm || fix.distance_nm == 0.0 {
                return Err(duplicate_distance(fix.distance_nm));
            }
            return Err(ProfileError::InvalidConfiguration(format!(
                "step-down fix '{}' at {} NM lies outside the FAF-threshold span",
                fix.label, fix.distance_nm
            )));
        }
        constraints.push((fix.distance_nm, fix.altitude_ft));
    }
    constraints.push((0.0, threshold_altitude_ft));

    constraints.sort_by(|a, b| b.0.total_cmp(&a.0));

    for pair in constraints.windows(2) {
        let (far, near) = (pair[0], pair[1]);
        if far.0 == near.0 {
            return Err(duplicate_distance(far.0));
        }
        if near.1 > far.1 {
            return Err(ProfileError::InvalidConfiguration(format!(
                "altitude rises from {} ft at {} NM to {} ft at {} NM",
                far.1, far.0, near.1, near.0
            )));
        }
    }

    let mut points = Vec::new();
    for pair in constraints.windows(2) {
        let (far, near) = (pair[0], pair[1]);
        let count = segment_point_count(far.0 - near.0, points_per_nm);
        let last = (count - 1) as f64;
        for i in 0..count {
            let t = i as f64 / last;
            points.push(ProfilePoint {
                distance_nm: lerp(far.0, near.0, t),
                altitude_ft: lerp(far.1, near.1, t),
            });
        }
    }

    Ok(AltitudeProfile { points })
}

/// Single-segment CDFA target altitude at `distance_nm` from the threshold.
///
/// Descends linearly from `faf_altitude_ft` at the FAF to `mda_ft` at the
/// threshold. Distances beyond either end are clamped. A FAF distance below
/// `1e-6` NM is floored rather than rejected.
pub fn linear_cdfa_altitude(distance_nm: f64, faf_altitude_ft: f64, mda_ft: f64, faf_to_threshold_nm: f64) -> f64 {
    let dist_from_faf = (faf_to_threshold_nm - distance_nm).clamp(0.0, faf_to_threshold_nm.max(0.0));
    let t = dist_from_faf / faf_to_threshold_nm.max(MIN_FAF_DISTANCE_NM);
    lerp(faf_altitude_ft, mda_ft, t)
}

fn segment_point_count(length_nm: f64, points_per_nm: u32) -> usize {
    let dense = (length_nm * f64::from(points_per_nm)).floor() as usize + 1;
    dense.max(2)
}

fn duplicate_distance(distance_nm: f64) -> ProfileError {
    ProfileError::InvalidConfiguration(format!(
        "more than one constraint at {distance_nm} NM"
    ))
}

// Exact at both ends: t == 0 yields `a`, t == 1 yields `b`.
#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a * (1.0 - t) + b * t
}
