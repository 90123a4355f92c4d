//! Export helpers for CSV and JSON artifacts.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Create a writer for the target path, handling stdout (`-`) by convention.
pub fn writer_for_path(path: &Path) -> io::Result<Box<dyn Write>> {
    if path == Path::new("-") {
        return Ok(Box::new(BufWriter::new(io::stdout())));
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(path)?;
    Ok(Box::new(BufWriter::new(file)))
}

fn opt(value: Option<f64>, precision: usize) -> String {
    value.map(|v| format!("{v:.precision$}")).unwrap_or_default()
}

/// Per-sample series along the approach track.
pub mod samples {
    use std::io::{self, Write};

    use iac_approach::SampleRow;

    pub const HEADER: &str = "distance_nm,latitude_deg,longitude_deg,elevation_m,terrain_ft,altitude_ft,terrain_conflict,below_mda";

    pub fn write_header(writer: &mut dyn Write) -> io::Result<()> {
        writeln!(writer, "{HEADER}")
    }

    /// Serialize one row; unknown elevations are left empty.
    pub fn write_row(writer: &mut dyn Write, row: &SampleRow) -> io::Result<()> {
        writeln!(
            writer,
            "{:.6},{:.7},{:.7},{},{},{:.2},{},{}",
            row.distance_nm,
            row.latitude_deg,
            row.longitude_deg,
            super::opt(row.elevation_m, 2),
            super::opt(row.terrain_ft, 2),
            row.altitude_ft,
            row.terrain_conflict,
            row.below_mda,
        )
    }

    pub fn write_all(writer: &mut dyn Write, rows: &[SampleRow]) -> io::Result<()> {
        write_header(writer)?;
        for row in rows {
            write_row(writer, row)?;
        }
        writer.flush()
    }
}

/// Dense constraint profile and overlay points.
pub mod profile {
    use std::io::{self, Write};

    use iac_approach::ConstraintPoint;
    use iac_approach::profile::AltitudeProfile;

    pub const HEADER: &str = "distance_nm,altitude_ft";
    pub const OVERLAY_HEADER: &str = "kind,distance_nm,altitude_ft,label";

    pub fn write_profile(writer: &mut dyn Write, profile: &AltitudeProfile) -> io::Result<()> {
        writeln!(writer, "{HEADER}")?;
        for point in profile.points() {
            writeln!(writer, "{:.6},{:.2}", point.distance_nm, point.altitude_ft)?;
        }
        writer.flush()
    }

    /// Overlay kinds written to the `kind` column.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum OverlayKind {
        StepDownFix,
        Obstacle,
    }

    impl OverlayKind {
        pub fn as_str(self) -> &'static str {
            match self {
                OverlayKind::StepDownFix => "sdf",
                OverlayKind::Obstacle => "obstacle",
            }
        }
    }

    pub fn write_overlays(
        writer: &mut dyn Write,
        step_down_fixes: &[ConstraintPoint],
        obstacles: &[ConstraintPoint],
    ) -> io::Result<()> {
        writeln!(writer, "{OVERLAY_HEADER}")?;
        let tagged = step_down_fixes
            .iter()
            .map(|p| (OverlayKind::StepDownFix, p))
            .chain(obstacles.iter().map(|p| (OverlayKind::Obstacle, p)));
        for (kind, point) in tagged {
            writeln!(
                writer,
                "{},{:.6},{:.2},{}",
                kind.as_str(),
                point.distance_nm,
                point.altitude_ft,
                point.label.replace(',', ";"),
            )?;
        }
        writer.flush()
    }
}

/// JSON summary of one analysis run.
pub mod summary {
    use std::fs::{self, File};
    use std::io;
    use std::path::Path;

    use iac_approach::safety::{BelowMinimumAltitudeViolation, ObstacleViolation, TerrainClearanceViolation};
    use iac_approach::{AnalysisReport, AnalysisWarning, ConstraintPoint, DescentConfig, Threshold};
    use serde::Serialize;
    use serde_json::to_writer_pretty;

    #[derive(Debug, Serialize)]
    pub struct Summary<'a> {
        pub generated_utc: String,
        pub threshold: &'a Threshold,
        pub descent: &'a DescentConfig,
        pub sample_count: usize,
        pub elevation_source: Option<&'a str>,
        pub dme_nm: Option<f64>,
        pub target_altitude_at_dme_ft: Option<f64>,
        pub clear: bool,
        pub terrain_clearance_violations: &'a [TerrainClearanceViolation],
        pub below_minimum_violations: &'a [BelowMinimumAltitudeViolation],
        pub obstacle_violations: &'a [ObstacleViolation],
        pub step_down_fixes: &'a [ConstraintPoint],
        pub obstacles: &'a [ConstraintPoint],
        pub warnings: &'a [AnalysisWarning],
    }

    impl<'a> Summary<'a> {
        pub fn from_report(report: &'a AnalysisReport) -> Self {
            Self {
                generated_utc: chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
                threshold: &report.threshold,
                descent: &report.descent,
                sample_count: report.samples.len(),
                elevation_source: report.elevation_source.as_deref(),
                dme_nm: report.dme_nm,
                target_altitude_at_dme_ft: report.target_altitude_at_dme_ft,
                clear: report.is_clear(),
                terrain_clearance_violations: &report.violations.terrain_clearance,
                below_minimum_violations: &report.violations.below_minimum,
                obstacle_violations: &report.obstacle_violations,
                step_down_fixes: &report.step_down_fixes,
                obstacles: &report.obstacles,
                warnings: &report.warnings,
            }
        }
    }

    pub fn write_summary(output: &Path, summary: &Summary<'_>) -> io::Result<()> {
        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        to_writer_pretty(File::create(output)?, summary)?;
        Ok(())
    }
}

/// Artifact paths written by [`write_report`].
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub samples_csv: std::path::PathBuf,
    pub profile_csv: std::path::PathBuf,
    pub overlays_csv: std::path::PathBuf,
    pub summary_json: std::path::PathBuf,
}

impl ArtifactPaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            samples_csv: dir.join("samples.csv"),
            profile_csv: dir.join("profile.csv"),
            overlays_csv: dir.join("overlays.csv"),
            summary_json: dir.join("summary.json"),
        }
    }
}

/// Write every artifact of a report into `dir`.
pub fn write_report(dir: &Path, report: &iac_approach::AnalysisReport) -> io::Result<ArtifactPaths> {
    let paths = ArtifactPaths::in_dir(dir);
    samples::write_all(&mut *writer_for_path(&paths.samples_csv)?, &report.rows())?;
    profile::write_profile(&mut *writer_for_path(&paths.profile_csv)?, &report.profile)?;
    profile::write_overlays(
        &mut *writer_for_path(&paths.overlays_csv)?,
        &report.step_down_fixes,
        &report.obstacles,
    )?;
    summary::write_summary(&paths.summary_json, &summary::Summary::from_report(report))?;
    Ok(paths)
}
