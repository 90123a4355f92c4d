//! IAC approach analyzer.
//!
//! Lays out an instrument approach track from a runway threshold, builds the
//! CDFA target-altitude profile, looks up terrain beneath the track and flags
//! samples that break terrain clearance or the MDA. The binaries in `src/bin`
//! share this façade.

pub use iac_approach as approach;
pub use iac_config as config;
pub use iac_core as core_units;
pub use iac_elevation as elevation;
pub use iac_export as export;
pub use iac_geodesy as geodesy;
pub use iac_importer as importer;
pub use iac_profile as profile;
pub use iac_runway as runway;
pub use iac_safety as safety;

pub mod logging;

/// Returns the version of the library for smoke tests.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
