//! Runway threshold lookup from an OurAirports-style `runways.csv`.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunwayError {
    #[error("failed to read runway table: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse runway table: {0}")]
    Csv(#[from] csv::Error),
    #[error("runway {airport} {end} has no threshold coordinates")]
    IncompleteRecord { airport: String, end: String },
}

/// One row of the runway table. Unknown columns are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct RunwayRecord {
    pub airport_ident: String,
    #[serde(default)]
    pub le_ident: String,
    #[serde(default)]
    pub he_ident: String,
    #[serde(default)]
    pub le_latitude_deg: Option<f64>,
    #[serde(default)]
    pub le_longitude_deg: Option<f64>,
    #[serde(default)]
    pub le_elevation_ft: Option<f64>,
    #[serde(default, rename = "le_heading_degT", alias = "le_heading_deg")]
    pub le_heading_deg: Option<f64>,
    #[serde(default)]
    pub he_latitude_deg: Option<f64>,
    #[serde(default)]
    pub he_longitude_deg: Option<f64>,
    #[serde(default)]
    pub he_elevation_ft: Option<f64>,
    #[serde(default, rename = "he_heading_degT", alias = "he_heading_deg")]
    pub he_heading_deg: Option<f64>,
}

/// Threshold position and inbound course for one runway end.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunwayThreshold {
    pub threshold_lat: f64,
    pub threshold_lon: f64,
    pub approach_bearing_deg: f64,
    pub runway_end: String,
    pub elevation_ft: Option<f64>,
    /// The table had no heading for this end; `approach_bearing_deg` is 0°.
    pub heading_assumed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunwayEnd {
    Low,
    High,
}

#[derive(Debug, Clone, Default)]
pub struct RunwayDatabase {
    runways: Vec<RunwayRecord>,
}

impl RunwayDatabase {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, RunwayError> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, RunwayError> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .comment(Some(b'#'))
            .from_reader(reader);
        let runways = rdr.deserialize().collect::<Result<Vec<RunwayRecord>, _>>()?;
        Ok(Self { runways })
    }

    pub fn len(&self) -> usize {
        self.runways.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runways.is_empty()
    }

    /// Find the threshold for `runway_ident` at airport `icao`.
    ///
    /// Both identifiers match case-insensitively. When no runway end matches
    /// exactly, the digits of the identifier are matched as a prefix of either
    /// end, so `28R` can still find `28L/10R` at an airport listing only that.
    pub fn find_runway(&self, icao: &str, runway_ident: &str) -> Result<Option<RunwayThreshold>, RunwayError> {
        let icao = icao.trim().to_uppercase();
        let ident = runway_ident.trim().to_uppercase();
        let at_airport: Vec<&RunwayRecord> = self
            .runways
            .iter()
            .filter(|r| r.airport_ident.trim().to_uppercase() == icao)
            .collect();

        let exact = at_airport.iter().find_map(|r| {
            if r.le_ident.trim().to_uppercase() == ident {
                Some((*r, RunwayEnd::Low))
            } else if r.he_ident.trim().to_uppercase() == ident {
                Some((*r, RunwayEnd::High))
            } else {
                None
            }
        });

        let matched = match exact {
            Some(m) => Some(m),
            None => {
                let digits: String = ident.chars().filter(|c| c.is_ascii_digit()).collect();
                if digits.is_empty() {
                    None
                } else {
                    at_airport.iter().find_map(|r| {
                        if r.le_ident.trim().starts_with(&digits) {
                            Some((*r, RunwayEnd::Low))
                        } else if r.he_ident.trim().starts_with(&digits) {
                            Some((*r, RunwayEnd::High))
                        } else {
                            None
                        }
                    })
                }
            }
        };

        let Some((record, end)) = matched else {
            tracing::debug!(%icao, %ident, "runway not found");
            return Ok(None);
        };
        threshold_for(record, end).map(Some)
    }
}

fn threshold_for(record: &RunwayRecord, end: RunwayEnd) -> Result<RunwayThreshold, RunwayError> {
    let (ident, lat, lon, heading, elevation) = match end {
        RunwayEnd::Low => (
            &record.le_ident,
            record.le_latitude_deg,
            record.le_longitude_deg,
            record.le_heading_deg,
            record.le_elevation_ft,
        ),
        RunwayEnd::High => (
            &record.he_ident,
            record.he_latitude_deg,
            record.he_longitude_deg,
            record.he_heading_deg,
            record.he_elevation_ft,
        ),
    };
    let (Some(threshold_lat), Some(threshold_lon)) = (lat, lon) else {
        return Err(RunwayError::IncompleteRecord {
            airport: record.airport_ident.clone(),
            end: ident.clone(),
        });
    };
    let heading_assumed = heading.is_none();
    if heading_assumed {
        tracing::warn!(airport = %record.airport_ident, end = %ident, "runway heading missing, assuming 0°");
    }

    Ok(RunwayThreshold {
        threshold_lat,
        threshold_lon,
        approach_bearing_deg: heading.unwrap_or(0.0),
        runway_end: ident.trim().to_string(),
        elevation_ft: elevation,
        heading_assumed,
    })
}
