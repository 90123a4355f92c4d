//! Open-Elevation batch lookup (`POST /api/v1/lookup`).

use std::time::Duration;

use iac_core::Coordinate;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::{ElevationError, ElevationProvider};

pub const DEFAULT_URL: &str = "https://api.open-elevation.com/api/v1/lookup";
pub const DEFAULT_BATCH_SIZE: usize = 80;

#[derive(Serialize)]
struct LookupRequest {
    locations: Vec<LookupLocation>,
}

#[derive(Serialize)]
struct LookupLocation {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct LookupResponse {
    #[serde(default)]
    results: Vec<LookupResult>,
}

#[derive(Deserialize)]
struct LookupResult {
    #[serde(default)]
    elevation: Option<f64>,
}

pub struct OpenElevationProvider {
    client: Client,
    url: String,
    batch_size: usize,
}

impl OpenElevationProvider {
    pub fn new(url: impl Into<String>, batch_size: usize, timeout: Duration) -> Result<Self, ElevationError> {
        let client = crate::http_client(timeout)?;
        Ok(Self {
            client,
            url: url.into(),
            batch_size: batch_size.max(1),
        })
    }

    fn lookup_batch(&self, batch: &[Coordinate]) -> Result<Vec<Option<f64>>, ElevationError> {
        let payload = LookupRequest {
            locations: batch
                .iter()
                .map(|c| LookupLocation {
                    latitude: c.latitude_deg,
                    longitude: c.longitude_deg,
                })
                .collect(),
        };
        let response = self.client.post(&self.url).json(&payload).send()?;
        if !response.status().is_success() {
            return Err(ElevationError::Protocol(format!(
                "open-elevation HTTP {}",
                response.status()
            )));
        }
        parse_lookup_response(&response.text()?, batch.len())
    }
}

fn parse_lookup_response(body: &str, expected: usize) -> Result<Vec<Option<f64>>, ElevationError> {
    let payload: LookupResponse = serde_json::from_str(body)?;
    if payload.results.len() != expected {
        return Err(ElevationError::Protocol(format!(
            "open-elevation returned {} results for {} locations",
            payload.results.len(),
            expected
        )));
    }
    Ok(payload.results.into_iter().map(|r| r.elevation).collect())
}

impl ElevationProvider for OpenElevationProvider {
    fn name(&self) -> &str {
        "open-elevation"
    }

    fn resolve(&self, coords: &[Coordinate]) -> Result<Vec<Option<f64>>, ElevationError> {
        let mut elevations = Vec::with_capacity(coords.len());
        for batch in coords.chunks(self.batch_size) {
            tracing::debug!(points = batch.len(), "open-elevation batch");
            elevations.extend(self.lookup_batch(batch)?);
        }
        Ok(elevations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_results_in_order() {
        let body = r#"{"results":[{"latitude":1.0,"longitude":2.0,"elevation":12.5},{"latitude":1.0,"longitude":2.1,"elevation":null}]}"#;
        let values = parse_lookup_response(body, 2).unwrap();
        assert_eq!(values, vec![Some(12.5), None]);
    }

    #[test]
    fn short_result_list_is_an_error() {
        let body = r#"{"results":[{"elevation":3.0}]}"#;
        assert!(matches!(
            parse_lookup_response(body, 2),
            Err(ElevationError::Protocol(_))
        ));
        assert!(matches!(
            parse_lookup_response("not json", 1),
            Err(ElevationError::Json(_))
        ));
    }
}
