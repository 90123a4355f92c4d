//! Core units, constants, and shared primitives for the IAC approach analyzer workspace.

/// Physical and navigational constants.
pub mod constants {
    /// Mean spherical Earth radius (km).
    pub const EARTH_RADIUS_KM: f64 = 6_371.0;
    /// Kilometres per international nautical mile.
    pub const KM_PER_NM: f64 = 1.852;
    /// Metres per international foot.
    pub const METRES_PER_FOOT: f64 = 0.3048;
}

/// Basic unit conversion helpers.
pub mod units {
    use super::constants::{KM_PER_NM, METRES_PER_FOOT};

    /// Convert nautical miles to kilometres.
    #[inline]
    pub fn nm_to_km(v: f64) -> f64 {
        v * KM_PER_NM
    }

    /// Convert kilometres to nautical miles.
    #[inline]
    pub fn km_to_nm(v: f64) -> f64 {
        v / KM_PER_NM
    }

    /// Convert metres to feet.
    #[inline]
    pub fn metres_to_feet(v: f64) -> f64 {
        v / METRES_PER_FOOT
    }

    /// Convert feet to metres.
    #[inline]
    pub fn feet_to_metres(v: f64) -> f64 {
        v * METRES_PER_FOOT
    }
}

/// Bearing arithmetic in degrees clockwise from true north.
pub mod bearing {
    /// Wrap a bearing into `[0, 360)`.
    #[inline]
    pub fn normalize(deg: f64) -> f64 {
        let wrapped = deg.rem_euclid(360.0);
        // rem_euclid can round up to exactly 360 for tiny negative inputs
        if wrapped >= 360.0 { 0.0 } else { wrapped }
    }

    /// Bearing pointing the opposite way.
    #[inline]
    pub fn reciprocal(deg: f64) -> f64 {
        normalize(deg + 180.0)
    }
}

/// A geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
}

impl Coordinate {
    pub fn new(latitude_deg: f64, longitude_deg: f64) -> Self {
        Self {
            latitude_deg,
            longitude_deg,
        }
    }

    /// True when both components are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.latitude_deg.is_finite() && self.longitude_deg.is_finite()
    }
}
