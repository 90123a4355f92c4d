//! Spherical-Earth geodesy for laying out an approach track behind a runway threshold.
//!
//! All projections use the mean Earth radius and the closed-form great-circle
//! destination formula; no ellipsoidal corrections are applied.

use iac_core::Coordinate;
use iac_core::bearing;
use iac_core::constants::EARTH_RADIUS_KM;
use iac_core::units::nm_to_km;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum GeodesyError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// One location along the approach track.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplePoint {
    pub distance_from_threshold_nm: f64,
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    /// `None` when no provider could resolve the elevation.
    pub elevation_m: Option<f64>,
}

impl SamplePoint {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude_deg, self.longitude_deg)
    }
}

/// Project a point `distance_km` from `(lat_deg, lon_deg)` along `bearing_deg`.
///
/// Returns `(lat, lon)` in degrees. Longitude is not wrapped into `[-180, 180]`.
pub fn destination_point(lat_deg: f64, lon_deg: f64, bearing_deg: f64, distance_km: f64) -> (f64, f64) {
    let lat1 = lat_deg.to_radians();
    let lon1 = lon_deg.to_radians();
    let theta = bearing_deg.to_radians();
    let delta = distance_km / EARTH_RADIUS_KM;

    let lat2 = (lat1.sin() * delta.cos() + lat1.cos() * delta.sin() * theta.cos()).asin();
    let lon2 = lon1
        + (theta.sin() * delta.sin() * lat1.cos()).atan2(delta.cos() - lat1.sin() * lat2.sin());

    (lat2.to_degrees(), lon2.to_degrees())
}

/// Lay out `sample_count` evenly spaced points from the FAF (index 0) to the threshold.
///
/// Points are projected along the reciprocal of the approach bearing, since the
/// FAF sits behind an aircraft flying the inbound course. Elevations are left
/// unresolved.
pub fn sample_approach_track(
    threshold_lat: f64,
    threshold_lon: f64,
    approach_bearing_deg: f64,
    faf_to_threshold_nm: f64,
    sample_count: usize,
) -> Result<Vec<SamplePoint>, GeodesyError> {
    if sample_count < 2 {
        return Err(GeodesyError::InvalidArgument(format!(
            "sample count must be at least 2, got {sample_count}"
        )));
    }
    if !Coordinate::new(threshold_lat, threshold_lon).is_finite() || !approach_bearing_deg.is_finite() {
        return Err(GeodesyError::InvalidArgument(
            "threshold coordinates and bearing must be finite".to_string(),
        ));
    }
    if !faf_to_threshold_nm.is_finite() || faf_to_threshold_nm < 0.0 {
        return Err(GeodesyError::InvalidArgument(format!(
            "FAF to threshold distance must be a non-negative number, got {faf_to_threshold_nm}"
        )));
    }

    let outbound = bearing::reciprocal(approach_bearing_deg);
    let last = (sample_count - 1) as f64;

    let points = (0..sample_count)
        .map(|i| {
            let distance_nm = round6(faf_to_threshold_nm * (1.0 - i as f64 / last));
            let (lat, lon) = destination_point(threshold_lat, threshold_lon, outbound, nm_to_km(distance_nm));
            SamplePoint {
                distance_from_threshold_nm: distance_nm,
                latitude_deg: lat,
                longitude_deg: lon,
                elevation_m: None,
            }
        })
        .collect();

    Ok(points)
}

/// Attach resolved elevations to freshly sampled points.
///
/// Missing entries (a shorter `elevations_m`) leave the sample at `None`.
pub fn with_elevations(points: Vec<SamplePoint>, elevations_m: &[Option<f64>]) -> Vec<SamplePoint> {
    points
        .into_iter()
        .enumerate()
        .map(|(idx, point)| SamplePoint {
            elevation_m: elevations_m.get(idx).copied().flatten(),
            ..point
        })
        .collect()
}

fn round6(v: f64) -> f64 {
    (v * 1e6).round() / 1e6
}
