//! Step-down fix and obstacle table import.
//!
//! Tables are CSV with a header row and `#` comment lines. The first two
//! columns are distance from the threshold (NM) and altitude or obstacle top
//! (ft); an optional third column carries a label.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use iac_profile::ConstraintPoint;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataParseError {
    #[error("filesystem error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("line {line}: expected at least 2 columns, found {found}")]
    MissingColumns { line: u64, found: usize },
    #[error("line {line}: {reason}")]
    InvalidRow { line: u64, reason: String },
}

/// Which table is being read; decides the default label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayKind {
    StepDownFixes,
    Obstacles,
}

impl OverlayKind {
    pub fn default_label(self) -> &'static str {
        match self {
            Self::StepDownFixes => "SDF",
            Self::Obstacles => "OBS",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::StepDownFixes => "step-down fixes",
            Self::Obstacles => "obstacles",
        }
    }
}

/// Read an overlay table from disk.
pub fn load_overlay<P: AsRef<Path>>(path: P, kind: OverlayKind) -> Result<Vec<ConstraintPoint>, DataParseError> {
    let file = File::open(path)?;
    parse_overlay(file, kind)
}

/// Parse an overlay table. A single bad row rejects the whole table.
pub fn parse_overlay<R: Read>(reader: R, kind: OverlayKind) -> Result<Vec<ConstraintPoint>, DataParseError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .comment(Some(b'#'))
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut points = Vec::new();
    for rec in rdr.records() {
        let record = rec?;
        points.push(parse_row(&record, kind)?);
    }
    Ok(points)
}

fn parse_row(record: &StringRecord, kind: OverlayKind) -> Result<ConstraintPoint, DataParseError> {
    let line = record.position().map(|p| p.line()).unwrap_or(0);
    if record.len() < 2 {
        return Err(DataParseError::MissingColumns {
            line,
            found: record.len(),
        });
    }
    let distance_nm = parse_number(record.get(0), "distance", line)?;
    let altitude_ft = parse_number(record.get(1), "altitude", line)?;
    if distance_nm < 0.0 {
        return Err(DataParseError::InvalidRow {
            line,
            reason: format!("negative distance {distance_nm}"),
        });
    }
    let label = record
        .get(2)
        .filter(|s| !s.is_empty())
        .unwrap_or(kind.default_label());

    Ok(ConstraintPoint::new(distance_nm, altitude_ft, label))
}

fn parse_number(field: Option<&str>, what: &str, line: u64) -> Result<f64, DataParseError> {
    let raw = field.unwrap_or("");
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(DataParseError::InvalidRow {
            line,
            reason: format!("{what} '{raw}' is not a number"),
        }),
    }
}
