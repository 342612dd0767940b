use std::path::{Path, PathBuf};

use anyhow::{ensure, Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use roiscope_core::{arrow_placements, ImageSize, PointXY, Polygon, Pt2, Real};
use roiscope_linear::{calibrate, CalibrationRecord};
use roiscope_pipeline::{
    load_json, CaptureOutcome, CaptureState, ConsoleOptions, MetricVerifier, PolygonCapture,
    RoiRecord, VerificationLine,
};
use serde::{Deserialize, Serialize};

/// ROI geometry and ground-plane calibration tools.
#[derive(Debug, Parser)]
#[command(name = "roiscope", author, version, about)]
struct Cli {
    /// Optional JSON file with ConsoleOptions. Defaults are used if omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Solve a calibration from four corner clicks and the rectangle size.
    Calibrate {
        /// JSON `{ "points": [{x,y} x4], "width": m, "height": m }`.
        #[arg(long)]
        input: PathBuf,
    },
    /// Measure segments through a stored calibration and score them.
    Verify {
        /// JSON CalibrationRecord, as printed by `calibrate`.
        #[arg(long)]
        calibration: PathBuf,
        /// JSON `[{ "start": {x,y}, "end": {x,y}, "actual_length": m }]`.
        #[arg(long)]
        lines: PathBuf,
    },
    /// Arrow placements for both directions of every edge of a polygon.
    Arrows {
        /// JSON array of `[x, y]` vertices in pixels.
        #[arg(long)]
        polygon: PathBuf,
        #[arg(long)]
        width: u32,
        #[arg(long)]
        height: u32,
    },
    /// Replay clicks through polygon capture.
    Capture {
        /// JSON array of `[x, y]` clicks in pixels.
        #[arg(long)]
        points: PathBuf,
        /// Image width, to also print the normalized polygon.
        #[arg(long, requires = "height")]
        width: Option<u32>,
        #[arg(long, requires = "width")]
        height: Option<u32>,
    },
}

#[derive(Debug, Deserialize)]
struct CalibrateInput {
    points: [PointXY; 4],
    width: Real,
    height: Real,
}

#[derive(Debug, Deserialize)]
struct LineInput {
    start: PointXY,
    end: PointXY,
    actual_length: Real,
}

#[derive(Debug, Serialize, Deserialize)]
struct VerifyReport {
    lines: Vec<VerificationLine>,
    aggregate_accuracy: Option<Real>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CaptureReport {
    outcomes: Vec<CaptureOutcome>,
    state: CaptureState,
    polygon: Option<Polygon>,
    normalized: Option<RoiRecord>,
}

fn load_options(path: Option<&Path>) -> Result<ConsoleOptions> {
    match path {
        Some(path) => ConsoleOptions::from_json_file(path),
        None => Ok(ConsoleOptions::default()),
    }
}

fn run_calibrate(input_path: &Path) -> Result<String> {
    let input: CalibrateInput = load_json(input_path)?;
    let cal = calibrate(input.points.map(Pt2::from), input.width, input.height)
        .context("calibration failed")?;
    info!(
        "calibrated {} x {} m rectangle, {:.6} m/px",
        input.width, input.height, cal.meters_per_pixel
    );
    Ok(serde_json::to_string_pretty(&cal.to_record())?)
}

fn run_verify(
    calibration_path: &Path,
    lines_path: &Path,
    options: &ConsoleOptions,
) -> Result<String> {
    let record: CalibrationRecord = load_json(calibration_path)?;
    let lines: Vec<LineInput> = load_json(lines_path)?;
    ensure!(
        !lines.is_empty(),
        "no verification lines in {}",
        lines_path.display()
    );

    let mut verifier = MetricVerifier::for_record(&record, options.verifier.clone())?;
    for (i, line) in lines.iter().enumerate() {
        verifier
            .add_line(line.start.into(), line.end.into(), line.actual_length)
            .with_context(|| format!("verification line {}", i + 1))?;
    }
    let report = VerifyReport {
        lines: verifier.lines().to_vec(),
        aggregate_accuracy: verifier.aggregate_accuracy(),
    };
    if let Some(acc) = report.aggregate_accuracy {
        let n = report.lines.len();
        info!("aggregate accuracy {acc:.2}% over {n} lines");
    }
    Ok(serde_json::to_string_pretty(&report)?)
}

fn run_arrows(polygon_path: &Path, size: ImageSize, options: &ConsoleOptions) -> Result<String> {
    let polygon: Polygon = load_json(polygon_path)?;
    let arrows = arrow_placements(&polygon, size, &options.arrows)?;
    Ok(serde_json::to_string_pretty(&arrows)?)
}

fn run_capture(
    points_path: &Path,
    size: Option<ImageSize>,
    options: &ConsoleOptions,
) -> Result<String> {
    let clicks: Vec<Pt2> = load_json(points_path)?;
    let mut capture = PolygonCapture::new(options.capture.clone());
    let outcomes: Vec<CaptureOutcome> = clicks.into_iter().map(|p| capture.add_point(p)).collect();

    let polygon = capture.finish();
    let normalized = match (&polygon, size) {
        (Some(polygon), Some(size)) => Some(RoiRecord::from_polygon(polygon, size)),
        _ => None,
    };
    let report = CaptureReport {
        outcomes,
        state: capture.state(),
        polygon,
        normalized,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(err) = try_main() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<()> {
    let cli = Cli::parse();
    let options = load_options(cli.config.as_deref())?;

    let json = match cli.command {
        Command::Calibrate { input } => run_calibrate(&input)?,
        Command::Verify { calibration, lines } => run_verify(&calibration, &lines, &options)?,
        Command::Arrows {
            polygon,
            width,
            height,
        } => run_arrows(&polygon, ImageSize::new(width, height)?, &options)?,
        Command::Capture {
            points,
            width,
            height,
        } => {
            let size = match (width, height) {
                (Some(w), Some(h)) => Some(ImageSize::new(w, h)?),
                _ => None,
            };
            run_capture(&points, size, &options)?
        }
    };
    println!("{json}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use roiscope_core::Direction;
    use std::fs;
    use tempfile::NamedTempFile;

    fn write_json(value: &serde_json::Value) -> NamedTempFile {
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), serde_json::to_vec_pretty(value).unwrap()).unwrap();
        file
    }

    fn square_input() -> NamedTempFile {
        write_json(&serde_json::json!({
            "points": [
                {"x": 100.0, "y": 0.0},
                {"x": 0.0, "y": 0.0},
                {"x": 100.0, "y": 100.0},
                {"x": 0.0, "y": 100.0}
            ],
            "width": 2.0,
            "height": 2.0
        }))
    }

    #[test]
    fn calibrate_then_verify_from_files() {
        let record_json = run_calibrate(square_input().path()).unwrap();
        let record: CalibrationRecord = serde_json::from_str(&record_json).unwrap();
        assert!((record.meters_per_pixel - 0.02).abs() < 1e-9);
        assert_eq!(record.rectangle.points[0], PointXY { x: 0.0, y: 0.0 });

        let calibration_file = NamedTempFile::new().unwrap();
        fs::write(calibration_file.path(), &record_json).unwrap();
        let lines_file = write_json(&serde_json::json!([
            {
                "start": {"x": 0.0, "y": 0.0},
                "end": {"x": 100.0, "y": 0.0},
                "actual_length": 2.0
            },
            {
                "start": {"x": 0.0, "y": 0.0},
                "end": {"x": 0.0, "y": 50.0},
                "actual_length": 1.25
            }
        ]));

        let json = run_verify(
            calibration_file.path(),
            lines_file.path(),
            &ConsoleOptions::default(),
        )
        .unwrap();
        let report: VerifyReport = serde_json::from_str(&json).unwrap();
        assert_eq!(report.lines.len(), 2);
        assert!((report.lines[0].accuracy - 100.0).abs() < 1e-4);
        assert!((report.lines[1].accuracy - 80.0).abs() < 1e-4);
        assert!((report.aggregate_accuracy.unwrap() - 90.0).abs() < 1e-4);
    }

    #[test]
    fn too_many_lines_fail_with_context() {
        let record_json = run_calibrate(square_input().path()).unwrap();
        let calibration_file = NamedTempFile::new().unwrap();
        fs::write(calibration_file.path(), &record_json).unwrap();
        let line = serde_json::json!({
            "start": {"x": 0.0, "y": 0.0},
            "end": {"x": 10.0, "y": 0.0},
            "actual_length": 0.2
        });
        let lines_file = write_json(&serde_json::json!([line, line, line, line]));

        let err = run_verify(
            calibration_file.path(),
            lines_file.path(),
            &ConsoleOptions::default(),
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("verification line 4"));
    }

    #[test]
    fn degenerate_calibration_is_an_error() {
        let input = write_json(&serde_json::json!({
            "points": [
                {"x": 0.0, "y": 0.0},
                {"x": 0.0, "y": 0.0},
                {"x": 5.0, "y": 5.0},
                {"x": 10.0, "y": 10.0}
            ],
            "width": 1.0,
            "height": 1.0
        }));
        let err = run_calibrate(input.path()).unwrap_err();
        assert!(format!("{err:#}").contains("degenerate"));
    }

    #[test]
    fn arrows_cover_every_edge_direction() {
        let polygon = write_json(&serde_json::json!([
            [100.0, 100.0],
            [400.0, 100.0],
            [400.0, 300.0],
            [100.0, 300.0]
        ]));
        let json = run_arrows(
            polygon.path(),
            ImageSize::new(1280, 720).unwrap(),
            &ConsoleOptions::default(),
        )
        .unwrap();
        let arrows: Vec<roiscope_core::ArrowPlacement> = serde_json::from_str(&json).unwrap();
        assert_eq!(arrows.len(), 8);
        assert_eq!(arrows[0].direction, Direction::Inward);
        assert_eq!(arrows[7].edge.name(), "D-A");
    }

    #[test]
    fn capture_replay_reports_outcomes() {
        let clicks = write_json(&serde_json::json!([
            [0.0, 0.0], [100.0, 100.0], [100.0, 0.0], [0.0, 100.0], [3.0, 3.0]
        ]));
        let json = run_capture(
            clicks.path(),
            Some(ImageSize::new(200, 200).unwrap()),
            &ConsoleOptions::default(),
        )
        .unwrap();
        let report: CaptureReport = serde_json::from_str(&json).unwrap();
        assert_eq!(report.outcomes.len(), 5);
        assert!(report.outcomes[3].is_rejected());
        assert_eq!(report.outcomes[4], CaptureOutcome::Closed);
        assert_eq!(report.state, CaptureState::Closed);
        assert_eq!(report.polygon.unwrap().len(), 3);
        let normalized = report.normalized.unwrap();
        assert_eq!(normalized.points[1], PointXY { x: 0.5, y: 0.5 });
    }
}
