//! Offline SRTM `.hgt` tile provider and tile pre-caching.
//!
//! Tiles are one degree square, named after their south-west corner
//! (`N37W123.hgt`) and stored as big-endian `i16` metres, row 0 at the north
//! edge. Both 1 arc-second (3601²) and 3 arc-second (1201²) grids are read.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, copy};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use iac_core::Coordinate;
use reqwest::StatusCode;
use reqwest::blocking::Client;

use crate::{ElevationError, ElevationProvider};

const VOID: i16 = -32768;
const KM_PER_DEGREE: f64 = 111.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct TileKey {
    lat: i32,
    lon: i32,
}

impl TileKey {
    fn containing(coord: &Coordinate) -> Self {
        Self {
            lat: coord.latitude_deg.floor() as i32,
            lon: coord.longitude_deg.floor() as i32,
        }
    }

    fn name(self) -> String {
        let ns = if self.lat >= 0 { 'N' } else { 'S' };
        let ew = if self.lon >= 0 { 'E' } else { 'W' };
        format!("{ns}{:02}{ew}{:03}", self.lat.abs(), self.lon.abs())
    }

    fn file_name(self) -> String {
        format!("{}.hgt", self.name())
    }
}

#[derive(Debug)]
struct HgtTile {
    size: usize,
    samples: Vec<i16>,
}

impl HgtTile {
    fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let count = bytes.len() / 2;
        let size = (count as f64).sqrt().round() as usize;
        if bytes.len() % 2 != 0 || size < 2 || size * size != count {
            return None;
        }
        let samples = bytes
            .chunks_exact(2)
            .map(|pair| i16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        Some(Self { size, samples })
    }

    /// Bilinear elevation inside the tile; `None` if any neighbour is void.
    fn sample(&self, key: TileKey, coord: &Coordinate) -> Option<f64> {
        let span = (self.size - 1) as f64;
        let row = ((f64::from(key.lat) + 1.0 - coord.latitude_deg) * span).clamp(0.0, span);
        let col = ((coord.longitude_deg - f64::from(key.lon)) * span).clamp(0.0, span);

        let r0 = row.floor() as usize;
        let c0 = col.floor() as usize;
        let r1 = (r0 + 1).min(self.size - 1);
        let c1 = (c0 + 1).min(self.size - 1);
        let dr = row - r0 as f64;
        let dc = col - c0 as f64;

        let v00 = self.value_at(r0, c0)?;
        let v01 = self.value_at(r0, c1)?;
        let v10 = self.value_at(r1, c0)?;
        let v11 = self.value_at(r1, c1)?;

        let top = v00 + (v01 - v00) * dc;
        let bottom = v10 + (v11 - v10) * dc;
        Some(top + (bottom - top) * dr)
    }

    fn value_at(&self, row: usize, col: usize) -> Option<f64> {
        match self.samples.get(row * self.size + col) {
            Some(&v) if v != VOID => Some(f64::from(v)),
            _ => None,
        }
    }
}

/// Reads elevations from a local directory of SRTM tiles.
///
/// Loaded tiles (and known-missing ones) are cached for the provider's lifetime.
pub struct SrtmProvider {
    tile_dir: PathBuf,
    tiles: Mutex<HashMap<TileKey, Option<Arc<HgtTile>>>>,
}

impl SrtmProvider {
    pub fn new(tile_dir: impl Into<PathBuf>) -> Self {
        Self {
            tile_dir: tile_dir.into(),
            tiles: Mutex::new(HashMap::new()),
        }
    }

    pub fn tile_dir(&self) -> &Path {
        &self.tile_dir
    }

    fn tile(&self, key: TileKey) -> Option<Arc<HgtTile>> {
        let mut cache = self.tiles.lock().unwrap_or_else(|e| e.into_inner());
        cache
            .entry(key)
            .or_insert_with(|| load_tile(&self.tile_dir, key))
            .clone()
    }
}

fn load_tile(dir: &Path, key: TileKey) -> Option<Arc<HgtTile>> {
    let path = dir.join(key.file_name());
    match fs::read(&path) {
        Ok(bytes) => match HgtTile::from_bytes(&bytes) {
            Some(tile) => {
                tracing::debug!(tile = %key.name(), size = tile.size, "loaded SRTM tile");
                Some(Arc::new(tile))
            }
            None => {
                tracing::warn!(path = %path.display(), "ignoring SRTM tile with unexpected size");
                None
            }
        },
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(tile = %key.name(), "SRTM tile not cached");
            None
        }
        Err(err) => {
            tracing::warn!(path = %path.display(), %err, "unable to read SRTM tile");
            None
        }
    }
}

impl ElevationProvider for SrtmProvider {
    fn name(&self) -> &str {
        "srtm"
    }

    fn resolve(&self, coords: &[Coordinate]) -> Result<Vec<Option<f64>>, ElevationError> {
        if !self.tile_dir.is_dir() {
            return Err(ElevationError::Unavailable(format!(
                "SRTM tile directory {} does not exist",
                self.tile_dir.display()
            )));
        }
        Ok(coords
            .iter()
            .map(|coord| {
                if !coord.is_finite() {
                    return None;
                }
                let coord = Coordinate::new(
                    coord.latitude_deg,
                    (coord.longitude_deg + 180.0).rem_euclid(360.0) - 180.0,
                );
                let key = TileKey::containing(&coord);
                self.tile(key)?.sample(key, &coord)
            })
            .collect())
    }
}

/// Outcome of pre-caching one tile.
#[derive(Debug, Clone, PartialEq)]
pub enum TileStatus {
    Downloaded(PathBuf),
    AlreadyPresent(PathBuf),
    /// The server has no such tile (typically open ocean).
    Unavailable(String),
}

/// Make sure every tile touching a box of `radius_km` around `center` is on disk.
///
/// `tile_url_template` must contain `{tile}`, replaced by names like `N37W123`.
/// The box uses a flat 111 km per degree in both axes.
pub fn precache_box(
    tile_dir: &Path,
    center: Coordinate,
    radius_km: f64,
    tile_url_template: &str,
    client: &Client,
) -> Result<Vec<TileStatus>, ElevationError> {
    if !center.is_finite() || !radius_km.is_finite() || radius_km < 0.0 {
        return Err(ElevationError::Protocol(
            "pre-cache centre and radius must be finite and non-negative".to_string(),
        ));
    }
    if !tile_url_template.contains("{tile}") {
        return Err(ElevationError::Protocol(format!(
            "tile URL template '{tile_url_template}' lacks a {{tile}} placeholder"
        )));
    }
    fs::create_dir_all(tile_dir)?;

    let span_deg = radius_km / KM_PER_DEGREE;
    let lat_range = (center.latitude_deg - span_deg).max(-90.0).floor() as i32
        ..=((center.latitude_deg + span_deg).min(89.999_999).floor() as i32);
    let lon_min = (center.longitude_deg - span_deg).floor() as i32;
    let lon_max = (center.longitude_deg + span_deg).floor() as i32;

    let mut statuses = Vec::new();
    for lat in lat_range {
        for lon in lon_min..=lon_max {
            let key = TileKey {
                lat,
                lon: wrap_lon(lon),
            };
            statuses.push(precache_tile(tile_dir, key, tile_url_template, client)?);
        }
    }
    Ok(statuses)
}

fn precache_tile(
    tile_dir: &Path,
    key: TileKey,
    tile_url_template: &str,
    client: &Client,
) -> Result<TileStatus, ElevationError> {
    let dest = tile_dir.join(key.file_name());
    if dest.exists() {
        return Ok(TileStatus::AlreadyPresent(dest));
    }

    let url = tile_url_template.replace("{tile}", &key.name());
    tracing::debug!(%url, "downloading SRTM tile");
    let response = client.get(&url).send()?;
    if response.status() == StatusCode::NOT_FOUND {
        return Ok(TileStatus::Unavailable(key.name()));
    }
    let mut response = response.error_for_status()?;

    let partial = dest.with_extension("hgt.part");
    let mut file = File::create(&partial)?;
    copy(&mut response, &mut file)?;
    fs::rename(&partial, &dest)?;
    Ok(TileStatus::Downloaded(dest))
}

fn wrap_lon(lon: i32) -> i32 {
    (lon + 180).rem_euclid(360) - 180
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tile_names_follow_srtm_convention() {
        let key = TileKey::containing(&Coordinate::new(37.618805, -122.375416));
        assert_eq!(key.name(), "N37W123");
        let key = TileKey::containing(&Coordinate::new(-33.9, 151.2));
        assert_eq!(key.name(), "S34E151");
        assert_eq!(wrap_lon(180), -180);
        assert_eq!(wrap_lon(-181), 179);
    }

    #[test]
    fn bilinear_sample_between_posts() {
        let size = 3usize;
        let values: [i16; 9] = [0, 100, 200, 0, 100, 200, 0, 100, VOID];
        let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_be_bytes()).collect();
        let tile = HgtTile::from_bytes(&bytes).expect("tile");
        let key = TileKey { lat: 10, lon: 20 };

        // north-west corner
        let v = tile.sample(key, &Coordinate::new(11.0, 20.0)).unwrap();
        assert_eq!(v, 0.0);
        // a quarter of the way east along the top row
        let v = tile.sample(key, &Coordinate::new(11.0, 20.25)).unwrap();
        assert!((v - 50.0).abs() < 1e-9);
        // the south-east cell touches the void post
        assert!(tile.sample(key, &Coordinate::new(10.1, 20.9)).is_none());
        assert_eq!(tile.size, size);
    }

    #[test]
    fn odd_sized_files_are_rejected() {
        assert!(HgtTile::from_bytes(&[0u8; 7]).is_none());
        assert!(HgtTile::from_bytes(&[0u8; 10]).is_none());
    }
}
