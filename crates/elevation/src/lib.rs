//! Elevation lookup for approach track samples.
//!
//! Providers answer batched coordinate queries with per-point optional
//! elevations in metres. An [`ElevationChain`] tries providers in configured
//! order and stops at the first usable answer.

pub mod google;
pub mod open_elevation;
pub mod srtm;

use std::time::Duration;

use iac_core::Coordinate;
use reqwest::blocking::Client;
use thiserror::Error;

pub use google::GoogleElevationProvider;
pub use open_elevation::OpenElevationProvider;
pub use srtm::{SrtmProvider, TileStatus, precache_box};

#[derive(Debug, Error)]
pub enum ElevationError {
    #[error("provider unavailable: {0}")]
    Unavailable(String),
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("filesystem error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed response: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unexpected provider response: {0}")]
    Protocol(String),
}

/// Blocking HTTP client shared by the web providers and tile pre-caching.
pub fn http_client(timeout: Duration) -> Result<Client, ElevationError> {
    Ok(Client::builder()
        .timeout(timeout)
        .user_agent(concat!("iac-analyzer/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

/// A source of terrain elevations.
pub trait ElevationProvider {
    /// Short identifier used in logs and warnings.
    fn name(&self) -> &str;

    /// Resolve elevations (metres) for `coords`, same length and order.
    ///
    /// Per-point gaps are `None`; a failure for the whole batch is an `Err`.
    fn resolve(&self, coords: &[Coordinate]) -> Result<Vec<Option<f64>>, ElevationError>;
}

/// Provider that failed during a chain run and why.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderFailure {
    pub provider: String,
    pub reason: String,
}

/// Result of running a chain over one batch of coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainOutcome {
    pub elevations_m: Vec<Option<f64>>,
    /// Name of the provider whose answer was used, if any.
    pub source: Option<String>,
    pub failures: Vec<ProviderFailure>,
}

impl ChainOutcome {
    pub fn missing(&self) -> usize {
        self.elevations_m.iter().filter(|e| e.is_none()).count()
    }
}

/// Ordered list of providers tried until one succeeds.
#[derive(Default)]
pub struct ElevationChain {
    providers: Vec<Box<dyn ElevationProvider>>,
}

impl ElevationChain {
    pub fn new(providers: Vec<Box<dyn ElevationProvider>>) -> Self {
        Self { providers }
    }

    pub fn push(&mut self, provider: Box<dyn ElevationProvider>) {
        self.providers.push(provider);
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Try each provider in order.
    ///
    /// A provider counts as failed when it errors, returns the wrong number of
    /// values, or resolves no point at all. When every provider fails the
    /// outcome holds `None` for each coordinate.
    pub fn resolve(&self, coords: &[Coordinate]) -> ChainOutcome {
        let mut failures = Vec::new();
        for provider in &self.providers {
            let reason = match provider.resolve(coords) {
                Ok(values) if values.len() != coords.len() => format!(
                    "returned {} elevations for {} coordinates",
                    values.len(),
                    coords.len()
                ),
                Ok(values) if !coords.is_empty() && values.iter().all(Option::is_none) => {
                    "no elevation resolved for any coordinate".to_string()
                }
                Ok(values) => {
                    tracing::debug!(provider = provider.name(), count = values.len(), "elevations resolved");
                    return ChainOutcome {
                        elevations_m: values,
                        source: Some(provider.name().to_string()),
                        failures,
                    };
                }
                Err(err) => err.to_string(),
            };
            tracing::warn!(provider = provider.name(), %reason, "elevation provider failed, falling back");
            failures.push(ProviderFailure {
                provider: provider.name().to_string(),
                reason,
            });
        }

        ChainOutcome {
            elevations_m: vec![None; coords.len()],
            source: None,
            failures,
        }
    }
}
