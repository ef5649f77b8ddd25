mod cli;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::{info, warn};

use cheers_core::pipeline::{self, PipelineConfig};
use cheers_core::still::{self, StillConfig};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = cli::Cli::parse();

    match cli.command {
        cli::Command::Live {
            input,
            output,
            sample_rate,
            start_frame,
            max_frames,
            overlay_frames,
            rotated,
            capture_frame,
            capture_out,
            font,
        } => {
            info!(?input, ?output, sample_rate, rotated, "starting live analysis");

            let config = PipelineConfig {
                sample_rate,
                start_frame,
                max_frames,
                overlay_dir: overlay_frames,
                rotated,
                capture_frame,
                capture_path: capture_out,
                font_path: font,
            };

            let report = pipeline::run_pipeline(&input, &config).context("pipeline failed")?;

            if report.frames.is_empty() {
                warn!("no frames analyzed");
            }

            write_report(&report, &output)?;

            info!(
                frame_count = report.frames.len(),
                total_faces = report.frames.iter().map(|f| f.faces.len()).sum::<usize>(),
                captured = report.capture.is_some(),
                ?output,
                "live analysis complete"
            );

            Ok(())
        }
        cli::Command::Still {
            input,
            output,
            annotated,
            font,
        } => {
            info!(?input, ?output, "starting still analysis");

            let config = StillConfig {
                annotated_path: annotated,
                font_path: font,
            };

            let report = still::analyze_still(&input, &config).context("still analysis failed")?;

            if report.words.is_empty() {
                warn!("no text regions detected");
            }

            write_report(&report, &output)?;

            info!(word_count = report.words.len(), ?output, "still analysis complete");

            Ok(())
        }
    }
}

/// Serialize a report as pretty JSON and write it to file.
fn write_report<T: Serialize>(report: &T, output: &Path) -> Result<()> {
    let json = serde_json::to_vec_pretty(report).context("failed to encode report")?;

    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent).context("failed to create output directory")?;
    }

    std::fs::write(output, &json)
        .with_context(|| format!("failed to write {}", output.display()))?;

    info!(?output, bytes = json.len(), "report written");
    Ok(())
}
