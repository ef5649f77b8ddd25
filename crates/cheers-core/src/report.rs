use serde::Serialize;

use crate::detect::{Classification, FaceObservation, TextObservation};

/// Detection results for one analyzed live frame.
#[derive(Debug, Clone, Serialize)]
pub struct FrameReport {
    pub frame_number: u32,
    pub timestamp_seconds: f64,
    pub faces: Vec<FaceObservation>,
    pub classification: Option<Classification>,
}

/// Text-detection results for one still image.
#[derive(Debug, Clone, Serialize)]
pub struct StillReport {
    pub width: u32,
    pub height: u32,
    pub words: Vec<TextObservation>,
}

/// Full output of a live run: per-frame results plus the optional captured
/// still's text pass.
#[derive(Debug, Clone, Serialize)]
pub struct LiveReport {
    pub frames: Vec<FrameReport>,
    pub capture: Option<StillReport>,
}
