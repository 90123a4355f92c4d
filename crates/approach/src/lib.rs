//! Approach analysis façade: wires geodesy, elevation, profile and safety crates into one run.

pub mod analysis;
pub mod inputs;

pub use facade::*;
pub use iac_elevation as elevation;
pub use iac_geodesy as geodesy;
pub use iac_profile as profile;
pub use iac_safety as safety;

mod facade;
