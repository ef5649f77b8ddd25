use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "cheers", about = "Face, drink, and text detection overlays for camera footage")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Analyze a recorded clip as the live camera feed.
    Live {
        /// Path to the input video file (MP4, etc.).
        #[arg(short, long)]
        input: PathBuf,

        /// Path to write the JSON report.
        #[arg(short, long)]
        output: PathBuf,

        /// Analyze every Nth frame (default: 2, i.e. 30 samples/sec from 60fps).
        #[arg(short, long, default_value_t = 2)]
        sample_rate: u32,

        /// Frame number to start decoding from.
        #[arg(long, default_value_t = 0)]
        start_frame: u32,

        /// Maximum number of frames to analyze.
        #[arg(long)]
        max_frames: Option<u32>,

        /// Directory to save frames with detection overlays.
        #[arg(long)]
        overlay_frames: Option<PathBuf>,

        /// Detector frames are rotated 90 degrees relative to the display
        /// (front-camera orientation).
        #[arg(long)]
        rotated: bool,

        /// Frame number to capture as a still and run text detection on.
        #[arg(long)]
        capture_frame: Option<u32>,

        /// Path to save the captured still frame.
        #[arg(long)]
        capture_out: Option<PathBuf>,

        /// TTF font for overlay text.
        #[arg(long)]
        font: Option<PathBuf>,
    },

    /// Run text-region detection on a still photo.
    Still {
        /// Path to the input image.
        #[arg(short, long)]
        input: PathBuf,

        /// Path to write the JSON report.
        #[arg(short, long)]
        output: PathBuf,

        /// Path to write a copy with word and character outlines.
        #[arg(long)]
        annotated: Option<PathBuf>,

        /// TTF font for overlay text.
        #[arg(long)]
        font: Option<PathBuf>,
    },
}
