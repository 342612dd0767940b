//! Capture a zone, configure its boundaries and verify a calibration.
//!
//! Run with: `cargo run -p roiscope --example zone_overlay`

use anyhow::{Context, Result};
use roiscope::prelude::*;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();

    let size = ImageSize::new(1280, 720)?;
    let mut capture = PolygonCapture::default();
    for (x, y) in [
        (220.0, 180.0),
        (980.0, 170.0),
        (1040.0, 560.0),
        (610.0, 640.0),
        (180.0, 520.0),
        (224.0, 184.0),
    ] {
        let outcome = capture.add_point(Pt2::new(x, y));
        println!("click ({x:>6.1}, {y:>6.1}) -> {outcome:?}");
    }
    let zone = capture.finish().context("capture did not close")?;

    println!("\nArrows:");
    for arrow in arrow_placements(&zone, size, &ArrowOptions::default())? {
        println!(
            "  {:<4} {:<8} anchor ({:>6.1}, {:>6.1})  angle {:>7.1} deg  length {:>5.1} px",
            arrow.edge.name(),
            arrow.direction,
            arrow.anchor.x,
            arrow.anchor.y,
            arrow.angle_degrees(),
            arrow.length
        );
    }

    let actions = vec![
        BoundaryAction::counter(0, Direction::Inward, ActionKind::Increment, "visitors")?,
        BoundaryAction::counter(0, Direction::Outward, ActionKind::Decrement, "visitors")?,
        BoundaryAction::notify(3, Direction::Inward, "vehicle")?,
    ];
    let normalized = Polygon::new(zone.normalized(size))?;
    let records = edge_config_records("zone-1", &normalized, &actions)?;
    let json = serde_json::to_string_pretty(&records)?;
    println!("\nEdge records:\n{json}");

    let cal = calibrate(
        [
            Pt2::new(400.0, 600.0),
            Pt2::new(430.0, 340.0),
            Pt2::new(860.0, 345.0),
            Pt2::new(900.0, 610.0),
        ],
        5.0,
        3.0,
    )?;
    println!(
        "\nCalibration: {:.5} m/px, residual {:.2e} m",
        cal.meters_per_pixel,
        cal.reprojection_residual()
    );

    let mut verifier = MetricVerifier::for_calibration(&cal, VerifierOptions::default());
    let a = cal.rectangle.points()[0];
    let d = cal.rectangle.points()[3];
    let line = verifier.add_line(a, d, 5.1)?;
    println!(
        "Verification: predicted {:.3} m vs actual {:.3} m -> {:.1}%",
        line.predicted_length, line.actual_length, line.accuracy
    );
    Ok(())
}
