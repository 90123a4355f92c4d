use clap::Parser;
use iac_analyzer::approach::{AnalysisReport, analyze_config};
use iac_analyzer::config::{AnalyzerConfig, ElevationSource, load_config};
use iac_analyzer::{export, logging};
use std::path::PathBuf;
use std::process::ExitCode;

/// Analyze an instrument approach: CDFA profile, terrain clearance and MDA checks.
#[derive(Parser, Debug)]
#[command(author, version, about = "IAC approach profile and terrain clearance analyzer")]
struct Cli {
    /// Config file (TOML or YAML); defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Airport ICAO code for runway lookup
    #[arg(long)]
    icao: Option<String>,

    /// Runway identifier for runway lookup (e.g. 28R)
    #[arg(long)]
    runway: Option<String>,

    /// OurAirports runways.csv used for lookup
    #[arg(long)]
    runways_csv: Option<PathBuf>,

    #[arg(long, allow_negative_numbers = true)]
    threshold_lat: Option<f64>,

    #[arg(long, allow_negative_numbers = true)]
    threshold_lon: Option<f64>,

    /// Inbound approach course in degrees true
    #[arg(long)]
    bearing: Option<f64>,

    #[arg(long)]
    faf_nm: Option<f64>,

    #[arg(long)]
    faf_alt_ft: Option<f64>,

    #[arg(long)]
    mda_ft: Option<f64>,

    #[arg(long)]
    buffer_ft: Option<f64>,

    #[arg(long)]
    samples: Option<usize>,

    /// DME range for the target-altitude readout
    #[arg(long)]
    dme_nm: Option<f64>,

    /// Step-down fix table (distance_nm, altitude_ft[, label])
    #[arg(long)]
    sdf: Option<PathBuf>,

    /// Obstacle table (distance_nm, height_ft[, label])
    #[arg(long)]
    obstacles: Option<PathBuf>,

    /// Elevation sources in priority order (srtm, open-elevation, google)
    #[arg(long, value_delimiter = ',')]
    sources: Option<Vec<String>>,

    #[arg(long)]
    srtm_dir: Option<PathBuf>,

    /// Directory for samples.csv, profile.csv, overlays.csv and summary.json
    #[arg(long, default_value = "artifacts/approach")]
    output_dir: PathBuf,

    /// Skip writing artifacts
    #[arg(long, default_value_t = false)]
    no_export: bool,

    /// Exit with status 2 when any violation is found
    #[arg(long, default_value_t = false)]
    fail_on_violation: bool,
}

fn main() -> anyhow::Result<ExitCode> {
    logging::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AnalyzerConfig::default(),
    };
    apply_overrides(&mut config, &cli)?;
    config.validate()?;
    config.elevation.google_api_key = std::env::var("GOOGLE_API_KEY").ok().filter(|k| !k.trim().is_empty());

    let report = analyze_config(&config)?;
    print_report(&report);

    if !cli.no_export {
        let paths = export::write_report(&cli.output_dir, &report)?;
        tracing::info!(dir = %cli.output_dir.display(), "artifacts written");
        println!();
        println!("Samples CSV : {}", paths.samples_csv.display());
        println!("Profile CSV : {}", paths.profile_csv.display());
        println!("Overlays CSV: {}", paths.overlays_csv.display());
        println!("Summary JSON: {}", paths.summary_json.display());
    }

    if cli.fail_on_violation && !report.is_clear() {
        return Ok(ExitCode::from(2));
    }
    Ok(ExitCode::SUCCESS)
}

fn apply_overrides(config: &mut AnalyzerConfig, cli: &Cli) -> anyhow::Result<()> {
    let approach = &mut config.approach;
    if cli.icao.is_some() {
        approach.icao = cli.icao.clone();
    }
    if cli.runway.is_some() {
        approach.runway = cli.runway.clone();
    }
    if let Some(v) = cli.threshold_lat {
        approach.threshold_lat = v;
    }
    if let Some(v) = cli.threshold_lon {
        approach.threshold_lon = v;
    }
    if let Some(v) = cli.bearing {
        approach.approach_bearing_deg = v;
    }

    let descent = &mut config.descent;
    if let Some(v) = cli.faf_nm {
        descent.faf_to_threshold_nm = v;
    }
    if let Some(v) = cli.faf_alt_ft {
        descent.faf_altitude_ft = v;
    }
    if let Some(v) = cli.mda_ft {
        descent.mda_ft = v;
    }
    if let Some(v) = cli.buffer_ft {
        descent.safety_buffer_ft = v;
    }

    if let Some(v) = cli.samples {
        config.simulation.samples = v;
    }
    if cli.dme_nm.is_some() {
        config.simulation.dme_nm = cli.dme_nm;
    }

    if cli.runways_csv.is_some() {
        config.data.runways_csv = cli.runways_csv.clone();
    }
    if cli.sdf.is_some() {
        config.data.step_down_csv = cli.sdf.clone();
    }
    if cli.obstacles.is_some() {
        config.data.obstacles_csv = cli.obstacles.clone();
    }

    if let Some(names) = &cli.sources {
        config.elevation.sources = names
            .iter()
            .map(|name| {
                ElevationSource::parse(name)
                    .ok_or_else(|| anyhow::anyhow!("unknown elevation source '{name}'"))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
    }
    if let Some(dir) = &cli.srtm_dir {
        config.elevation.srtm_dir = dir.clone();
    }
    Ok(())
}

fn print_report(report: &AnalysisReport) {
    let t = &report.threshold;
    let d = &report.descent;
    println!("=== Approach Analysis ===");
    match &t.runway_end {
        Some(end) => println!("Runway end      : {end}"),
        None => println!("Runway end      : (manual threshold)"),
    }
    println!(
        "Threshold       : {:.6}, {:.6}  course {:.1}°",
        t.latitude_deg, t.longitude_deg, t.approach_bearing_deg
    );
    println!(
        "Descent         : FAF {:.2} NM @ {:.0} ft, MDA {:.0} ft, buffer {:.0} ft",
        d.faf_to_threshold_nm, d.faf_altitude_ft, d.mda_ft, d.safety_buffer_ft
    );
    println!("Samples         : {}", report.samples.len());
    println!(
        "Terrain source  : {}",
        report.elevation_source.as_deref().unwrap_or("none (0 ft assumed)")
    );
    if let Some(dme) = report.dme_nm {
        match report.target_altitude_at_dme_ft {
            Some(alt) => println!("Target @ {dme:.1} DME: {alt:.0} ft"),
            None => println!("Target @ {dme:.1} DME: outside FAF-threshold span"),
        }
    }

    println!();
    println!(
        "Terrain clearance violations: {}",
        report.violations.terrain_clearance.len()
    );
    for v in &report.violations.terrain_clearance {
        println!(
            "  {:>7.3} NM  aircraft {:>6.0} ft  terrain {:>6.0} ft",
            v.distance_nm, v.aircraft_alt_ft, v.terrain_alt_ft
        );
    }
    println!("Below-MDA samples           : {}", report.violations.below_minimum.len());
    println!("Obstacle violations         : {}", report.obstacle_violations.len());
    for v in &report.obstacle_violations {
        println!(
            "  {:<8} {:>7.3} NM  aircraft {:>6.0} ft  obstacle {:>6.0} ft",
            v.label, v.distance_nm, v.aircraft_alt_ft, v.obstacle_alt_ft
        );
    }

    if !report.warnings.is_empty() {
        println!();
        println!("Warnings:");
        for w in &report.warnings {
            println!("  - {w}");
        }
    }
    println!();
    println!(
        "Verdict: {}",
        if report.is_clear() { "CLEAR" } else { "CONFLICTS FOUND" }
    );
}
