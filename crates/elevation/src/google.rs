//! Google Maps Elevation API lookup. Requires an API key.

use std::time::Duration;

use iac_core::Coordinate;
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::{ElevationError, ElevationProvider};

pub const DEFAULT_URL: &str = "https://maps.googleapis.com/maps/api/elevation/json";
pub const DEFAULT_BATCH_SIZE: usize = 100;

#[derive(Deserialize)]
struct ElevationResponse {
    status: String,
    #[serde(default)]
    results: Vec<ElevationResult>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Deserialize)]
struct ElevationResult {
    #[serde(default)]
    elevation: Option<f64>,
}

/// Without an API key the provider is constructed but always fails.
pub struct GoogleElevationProvider {
    client: Client,
    url: String,
    api_key: Option<String>,
    batch_size: usize,
}

impl GoogleElevationProvider {
    pub fn new(
        url: impl Into<String>,
        api_key: Option<String>,
        batch_size: usize,
        timeout: Duration,
    ) -> Result<Self, ElevationError> {
        let client = crate::http_client(timeout)?;
        Ok(Self {
            client,
            url: url.into(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            batch_size: batch_size.max(1),
        })
    }

    fn lookup_batch(&self, key: &str, batch: &[Coordinate]) -> Result<Vec<Option<f64>>, ElevationError> {
        let locations = locations_param(batch);
        let response = self
            .client
            .get(&self.url)
            .query(&[("locations", locations.as_str()), ("key", key)])
            .send()?;
        parse_elevation_response(&response.text()?, batch.len())
    }
}

fn locations_param(batch: &[Coordinate]) -> String {
    let mut buf = String::new();
    for (idx, c) in batch.iter().enumerate() {
        if idx > 0 {
            buf.push('|');
        }
        buf.push_str(&format!("{:.6},{:.6}", c.latitude_deg, c.longitude_deg));
    }
    buf
}

fn parse_elevation_response(body: &str, expected: usize) -> Result<Vec<Option<f64>>, ElevationError> {
    let payload: ElevationResponse = serde_json::from_str(body)?;
    if payload.status != "OK" {
        let detail = payload.error_message.unwrap_or_default();
        return Err(ElevationError::Protocol(format!(
            "google status {} {}",
            payload.status, detail
        ).trim_end().to_string()));
    }
    if payload.results.len() != expected {
        return Err(ElevationError::Protocol(format!(
            "google returned {} results for {} locations",
            payload.results.len(),
            expected
        )));
    }
    Ok(payload.results.into_iter().map(|r| r.elevation).collect())
}

impl ElevationProvider for GoogleElevationProvider {
    fn name(&self) -> &str {
        "google"
    }

    fn resolve(&self, coords: &[Coordinate]) -> Result<Vec<Option<f64>>, ElevationError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ElevationError::Unavailable("missing API key".to_string()))?;
        let mut elevations = Vec::with_capacity(coords.len());
        for batch in coords.chunks(self.batch_size) {
            tracing::debug!(points = batch.len(), "google elevation batch");
            elevations.extend(self.lookup_batch(key, batch)?);
        }
        Ok(elevations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locations_are_pipe_separated() {
        let batch = [Coordinate::new(37.5, -122.25), Coordinate::new(37.25, -122.0)];
        assert_eq!(
            locations_param(&batch),
            "37.500000,-122.250000|37.250000,-122.000000"
        );
    }

    #[test]
    fn non_ok_status_fails_the_batch() {
        let body = r#"{"status":"REQUEST_DENIED","error_message":"bad key","results":[]}"#;
        match parse_elevation_response(body, 1) {
            Err(ElevationError::Protocol(msg)) => assert!(msg.contains("REQUEST_DENIED")),
            other => panic!("unexpected {other:?}"),
        }
        let ok = r#"{"status":"OK","results":[{"elevation":4.25,"resolution":9.5}]}"#;
        assert_eq!(parse_elevation_response(ok, 1).unwrap(), vec![Some(4.25)]);
    }
}
