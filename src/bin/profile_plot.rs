use clap::Parser;
use csv::ReaderBuilder;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

/// Render the approach profile chart (PNG) and optional descent animation (GIF)
/// from the CSV/JSON artifacts written by `analyze`.
#[derive(Parser, Debug)]
#[command(author, version, about = "Render an approach profile chart and animation")]
struct Cli {
    /// Per-sample CSV (samples.csv)
    #[arg(long)]
    samples: PathBuf,

    /// Dense constraint profile CSV (profile.csv)
    #[arg(long)]
    profile: Option<PathBuf>,

    /// Step-down fix / obstacle CSV (overlays.csv)
    #[arg(long)]
    overlays: Option<PathBuf>,

    /// Run summary (summary.json), used for the MDA and title
    #[arg(long)]
    summary: Option<PathBuf>,

    /// MDA line in feet; overrides the summary
    #[arg(long)]
    mda_ft: Option<f64>,

    #[arg(long, default_value = "artifacts/approach/profile.png")]
    output: PathBuf,

    /// Also write an animated GIF with one frame per sample
    #[arg(long)]
    gif: Option<PathBuf>,

    #[arg(long, default_value_t = 0.02)]
    frame_delay_s: f64,

    /// Draw every n-th sample as a frame
    #[arg(long, default_value_t = 1)]
    frame_stride: usize,

    #[arg(long, default_value_t = 1200)]
    width: u32,

    #[arg(long, default_value_t = 700)]
    height: u32,
}

#[derive(Debug, Clone)]
struct Sample {
    distance_nm: f64,
    terrain_ft: f64,
    altitude_ft: f64,
    terrain_conflict: bool,
    below_mda: bool,
}

#[derive(Debug, Clone)]
struct Overlay {
    obstacle: bool,
    distance_nm: f64,
    altitude_ft: f64,
    label: String,
}

struct ChartData {
    title: String,
    samples: Vec<Sample>,
    profile: Vec<(f64, f64)>,
    overlays: Vec<Overlay>,
    mda_ft: Option<f64>,
    max_distance_nm: f64,
    max_altitude_ft: f64,
}

const TERRAIN: RGBColor = RGBColor(139, 115, 85);
const PROFILE: RGBColor = RGBColor(20, 90, 200);
const MDA: RGBColor = RGBColor(200, 120, 0);
const CONFLICT: RGBColor = RGBColor(220, 30, 30);
const SDF: RGBColor = RGBColor(30, 150, 60);

fn main() -> anyhow::Result<()> {
    iac_analyzer::logging::init();
    let cli = Cli::parse();

    let samples = read_samples(&cli.samples)?;
    if samples.len() < 2 {
        return Err(anyhow::anyhow!("need at least two samples to draw a profile"));
    }
    let profile = match &cli.profile {
        Some(path) => read_profile(path)?,
        None => samples.iter().map(|s| (s.distance_nm, s.altitude_ft)).collect(),
    };
    let overlays = match &cli.overlays {
        Some(path) => read_overlays(path)?,
        None => Vec::new(),
    };
    let (summary_mda, title) = match &cli.summary {
        Some(path) => read_summary(path)?,
        None => (None, "Approach profile".to_string()),
    };

    let max_distance_nm = samples
        .iter()
        .map(|s| s.distance_nm)
        .chain(profile.iter().map(|p| p.0))
        .fold(0.0_f64, f64::max)
        .max(0.1);
    let max_altitude_ft = samples
        .iter()
        .flat_map(|s| [s.altitude_ft, s.terrain_ft])
        .chain(profile.iter().map(|p| p.1))
        .chain(overlays.iter().map(|o| o.altitude_ft))
        .fold(0.0_f64, f64::max);

    let data = ChartData {
        title,
        samples,
        profile,
        overlays,
        mda_ft: cli.mda_ft.or(summary_mda),
        max_distance_nm,
        max_altitude_ft: (max_altitude_ft * 1.15).max(100.0),
    };

    ensure_parent(&cli.output)?;
    {
        let root = BitMapBackend::new(&cli.output, (cli.width, cli.height)).into_drawing_area();
        draw_chart(&root, &data, None)?;
        root.present()?;
    }
    println!("Wrote {}", cli.output.display());

    if let Some(gif_path) = &cli.gif {
        ensure_parent(gif_path)?;
        let delay_ms = (cli.frame_delay_s.clamp(0.0, 1.0) * 1000.0).round() as u32;
        let root = BitMapBackend::gif(gif_path, (cli.width, cli.height), delay_ms)?.into_drawing_area();
        let stride = cli.frame_stride.max(1);
        let frames: Vec<usize> = (0..data.samples.len()).step_by(stride).collect();
        for (n, &index) in frames.iter().enumerate() {
            draw_chart(&root, &data, Some(Frame {
                index,
                number: n + 1,
                total: frames.len(),
            }))?;
            root.present()?;
        }
        println!("Wrote {} ({} frames)", gif_path.display(), frames.len());
    }
    Ok(())
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    index: usize,
    number: usize,
    total: usize,
}

fn ensure_parent(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

// x is plotted as -distance so the FAF sits on the left and the threshold on the right.
fn draw_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    data: &ChartData,
    frame: Option<Frame>,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&WHITE)?;

    let font_family = select_font_family();
    let caption_font = FontDesc::new(font_family, 24.0, FontStyle::Bold);
    let label_font = FontDesc::new(font_family, 16.0, FontStyle::Normal);

    let caption = match frame {
        Some(f) => {
            let s = &data.samples[f.index];
            format!(
                "Frame {}/{} • DME {:.2} NM • ALT {:.0} ft",
                f.number, f.total, s.distance_nm, s.altitude_ft
            )
        }
        None => data.title.clone(),
    };

    let x_min = -data.max_distance_nm * 1.02;
    let mut chart = ChartBuilder::on(root)
        .margin(20)
        .caption(caption, caption_font)
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d(x_min..0.0, 0.0..data.max_altitude_ft)?;

    chart
        .configure_mesh()
        .x_desc("Distance to threshold (NM)")
        .y_desc("Altitude (ft)")
        .label_style(label_font.clone())
        .x_labels(10)
        .y_labels(8)
        .x_label_formatter(&|x| format!("{:.1}", -x))
        .y_label_formatter(&|y| format!("{y:.0}"))
        .draw()?;

    chart
        .draw_series(
            AreaSeries::new(
                data.samples.iter().map(|s| (-s.distance_nm, s.terrain_ft)),
                0.0,
                &TERRAIN.mix(0.45),
            )
            .border_style(&TERRAIN),
        )?
        .label("Terrain")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 20, y + 5)], TERRAIN.mix(0.45).filled()));

    chart
        .draw_series(LineSeries::new(
            data.profile.iter().map(|&(d, a)| (-d, a)),
            ShapeStyle::from(&PROFILE).stroke_width(2),
        ))?
        .label("CDFA profile")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], ShapeStyle::from(&PROFILE).stroke_width(2)));

    if let Some(mda) = data.mda_ft {
        chart
            .draw_series(DashedLineSeries::new(
                vec![(x_min, mda), (0.0, mda)],
                10,
                8,
                ShapeStyle::from(&MDA).stroke_width(2),
            ))?
            .label("MDA")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], ShapeStyle::from(&MDA).stroke_width(2)));
        chart.draw_series(std::iter::once(Text::new(
            format!("MDA {mda:.0} ft"),
            (x_min * 0.98, mda + data.max_altitude_ft * 0.01),
            label_font.clone().color(&MDA),
        )))?;
    }

    for overlay in &data.overlays {
        let pos = (-overlay.distance_nm, overlay.altitude_ft);
        let color = if overlay.obstacle { CONFLICT } else { SDF };
        if overlay.obstacle {
            chart.draw_series(std::iter::once(TriangleMarker::new(pos, 8, color.filled())))?;
        } else {
            chart.draw_series(std::iter::once(Circle::new(pos, 5, color.filled())))?;
        }
        chart.draw_series(std::iter::once(Text::new(
            overlay.label.clone(),
            (pos.0, pos.1 + data.max_altitude_ft * 0.02),
            label_font.clone().color(&color),
        )))?;
    }

    chart
        .draw_series(
            data.samples
                .iter()
                .filter(|s| s.terrain_conflict || s.below_mda)
                .map(|s| Cross::new((-s.distance_nm, s.altitude_ft), 5, ShapeStyle::from(&CONFLICT).stroke_width(2))),
        )?
        .label("Conflict")
        .legend(|(x, y)| Cross::new((x + 10, y), 5, ShapeStyle::from(&CONFLICT).stroke_width(2)));

    if let Some(f) = frame {
        let s = &data.samples[f.index];
        chart.draw_series(std::iter::once(Circle::new(
            (-s.distance_nm, s.altitude_ft),
            8,
            BLACK.filled(),
        )))?;
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .label_font(label_font)
        .position(SeriesLabelPosition::UpperRight)
        .draw()?;
    Ok(())
}

fn select_font_family() -> FontFamily<'static> {
    if cfg!(target_os = "macos") {
        FontFamily::Name("Helvetica")
    } else if cfg!(target_os = "windows") {
        FontFamily::Name("Arial")
    } else {
        FontFamily::Name("DejaVu Sans")
    }
}

fn column(headers: &csv::StringRecord, name: &str) -> anyhow::Result<usize> {
    headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case(name))
        .ok_or_else(|| anyhow::anyhow!("CSV missing '{name}' column"))
}

fn parse_f64(record: &csv::StringRecord, idx: usize) -> f64 {
    record.get(idx).unwrap_or("").trim().parse().unwrap_or(f64::NAN)
}

/// Rows are numbered from 1 after the header.
fn skip_row(path: &Path, row: usize) {
    tracing::warn!(file = %path.display(), row = row + 1, "skipping row without numeric distance/altitude");
}

fn read_samples(path: &Path) -> anyhow::Result<Vec<Sample>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let headers = rdr.headers()?.clone();
    let distance_idx = column(&headers, "distance_nm")?;
    let terrain_idx = column(&headers, "terrain_ft")?;
    let altitude_idx = column(&headers, "altitude_ft")?;
    let conflict_idx = column(&headers, "terrain_conflict")?;
    let mda_idx = column(&headers, "below_mda")?;

    let mut samples = Vec::new();
    for (row, rec) in rdr.records().enumerate() {
        let r = rec?;
        let distance_nm = parse_f64(&r, distance_idx);
        let altitude_ft = parse_f64(&r, altitude_idx);
        if !distance_nm.is_finite() || !altitude_ft.is_finite() {
            skip_row(path, row);
            continue;
        }
        let terrain_ft = parse_f64(&r, terrain_idx);
        samples.push(Sample {
            distance_nm,
            // unknown terrain is drawn at 0 ft
            terrain_ft: if terrain_ft.is_finite() { terrain_ft } else { 0.0 },
            altitude_ft,
            terrain_conflict: r.get(conflict_idx).unwrap_or("false").eq_ignore_ascii_case("true"),
            below_mda: r.get(mda_idx).unwrap_or("false").eq_ignore_ascii_case("true"),
        });
    }
    Ok(samples)
}

fn read_profile(path: &Path) -> anyhow::Result<Vec<(f64, f64)>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let headers = rdr.headers()?.clone();
    let distance_idx = column(&headers, "distance_nm")?;
    let altitude_idx = column(&headers, "altitude_ft")?;
    let mut points = Vec::new();
    for (row, rec) in rdr.records().enumerate() {
        let r = rec?;
        let point = (parse_f64(&r, distance_idx), parse_f64(&r, altitude_idx));
        if point.0.is_finite() && point.1.is_finite() {
            points.push(point);
        } else {
            skip_row(path, row);
        }
    }
    Ok(points)
}

fn read_overlays(path: &Path) -> anyhow::Result<Vec<Overlay>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let headers = rdr.headers()?.clone();
    let kind_idx = column(&headers, "kind")?;
    let distance_idx = column(&headers, "distance_nm")?;
    let altitude_idx = column(&headers, "altitude_ft")?;
    let label_idx = column(&headers, "label")?;
    let mut overlays = Vec::new();
    for (row, rec) in rdr.records().enumerate() {
        let r = rec?;
        let distance_nm = parse_f64(&r, distance_idx);
        let altitude_ft = parse_f64(&r, altitude_idx);
        if !distance_nm.is_finite() || !altitude_ft.is_finite() {
            skip_row(path, row);
            continue;
        }
        overlays.push(Overlay {
            obstacle: r.get(kind_idx).unwrap_or("").eq_ignore_ascii_case("obstacle"),
            distance_nm,
            altitude_ft,
            label: r.get(label_idx).unwrap_or("").to_string(),
        });
    }
    Ok(overlays)
}

fn read_summary(path: &Path) -> anyhow::Result<(Option<f64>, String)> {
    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(path)?)?;
    let mda = value["descent"]["mda_ft"].as_f64();
    let title = match value["threshold"]["runway_end"].as_str() {
        Some(end) => format!("Approach profile: runway {end}"),
        None => "Approach profile".to_string(),
    };
    Ok((mda, title))
}
