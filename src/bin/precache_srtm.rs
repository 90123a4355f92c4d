use clap::Parser;
use iac_analyzer::config::load_config;
use iac_analyzer::core_units::Coordinate;
use iac_analyzer::elevation::{TileStatus, http_client, precache_box};
use iac_analyzer::logging;
use std::path::PathBuf;
use std::time::Duration;

/// Download the SRTM tiles covering a box around a point so analyses can run offline.
#[derive(Parser, Debug)]
#[command(author, version, about = "SRTM tile pre-cacher")]
struct Cli {
    /// Centre latitude in degrees
    #[arg(long, allow_negative_numbers = true)]
    lat: f64,

    /// Centre longitude in degrees
    #[arg(long, allow_negative_numbers = true)]
    lon: f64,

    #[arg(long, default_value_t = 20.0)]
    radius_km: f64,

    /// Tile directory (defaults to the config's elevation.srtm_dir)
    #[arg(long)]
    tile_dir: Option<PathBuf>,

    /// Tile URL template containing `{tile}`, e.g. https://host/srtm/{tile}.hgt
    #[arg(long)]
    tile_url: Option<String>,

    /// Config file supplying tile directory and URL defaults
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    logging::init();
    let cli = Cli::parse();

    let elevation = match &cli.config {
        Some(path) => load_config(path)?.elevation,
        None => Default::default(),
    };
    let tile_dir = cli.tile_dir.clone().unwrap_or(elevation.srtm_dir.clone());
    let tile_url = cli
        .tile_url
        .clone()
        .or(elevation.srtm_tile_url.clone())
        .ok_or_else(|| anyhow::anyhow!("no tile URL given; pass --tile-url or set elevation.srtm_tile_url"))?;

    let client = http_client(Duration::from_secs(elevation.request_timeout_s.max(1)))?;
    let statuses = precache_box(
        &tile_dir,
        Coordinate::new(cli.lat, cli.lon),
        cli.radius_km,
        &tile_url,
        &client,
    )?;

    let mut downloaded = 0usize;
    for status in &statuses {
        match status {
            TileStatus::Downloaded(path) => {
                downloaded += 1;
                println!("downloaded  {}", path.display());
            }
            TileStatus::AlreadyPresent(path) => println!("present     {}", path.display()),
            TileStatus::Unavailable(tile) => println!("unavailable {tile}"),
        }
    }
    println!(
        "{} tiles checked, {} downloaded into {}",
        statuses.len(),
        downloaded,
        tile_dir.display()
    );
    Ok(())
}
