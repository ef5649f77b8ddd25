use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use crate::detect::{
    classify::HueClassifier, face::SkinRegionDetector, DrinkClassifier, FaceDetector,
};
use crate::overlay::OverlayRenderer;
use crate::report::{FrameReport, LiveReport, StillReport};
use crate::still;
use crate::video::decoder::VideoDecoder;
use crate::video::frame::Frame;

/// Parameters for the live analysis pipeline.
pub struct PipelineConfig {
    /// Analyze every Nth decoded frame (1 = every frame).
    pub sample_rate: u32,
    /// Frame number to start decoding from.
    pub start_frame: u32,
    /// Maximum number of frames to analyze, or None for the entire video.
    pub max_frames: Option<u32>,
    /// Directory to write overlay frame images, or None to skip rendering.
    pub overlay_dir: Option<PathBuf>,
    /// Detector frames are rotated 90 degrees relative to the display
    /// (front-camera orientation); face boxes get the axis-swap transform.
    pub rotated: bool,
    /// Frame number to capture as a still and run the text pass on.
    pub capture_frame: Option<u32>,
    /// Path to save the captured still, or None to analyze it in memory only.
    pub capture_path: Option<PathBuf>,
    /// TTF font for overlay text lines.
    pub font_path: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 1,
            start_frame: 0,
            max_frames: None,
            overlay_dir: None,
            rotated: false,
            capture_frame: None,
            capture_path: None,
            font_path: None,
        }
    }
}

/// Run face detection and drink classification over a video file, the
/// file-based rendition of the demo's live camera screen.
pub fn run_pipeline(input: &Path, config: &PipelineConfig) -> Result<LiveReport> {
    if !input.exists() {
        bail!("input video does not exist: {}", input.display());
    }
    if config.sample_rate < 1 {
        bail!("sample_rate must be >= 1, got {}", config.sample_rate);
    }

    info!(
        ?input,
        start_frame = config.start_frame,
        max_frames = ?config.max_frames,
        sample_rate = config.sample_rate,
        rotated = config.rotated,
        "pipeline starting"
    );

    let mut decoder =
        VideoDecoder::open_at_frame(input, config.start_frame).context("failed to open video")?;

    let renderer = match &config.overlay_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create overlay directory {}", dir.display()))?;
            info!(?dir, "overlay frames directory ready");
            Some(OverlayRenderer::new(config.font_path.as_deref()))
        }
        None => None,
    };

    let face_detector = SkinRegionDetector;
    let classifier = HueClassifier;

    let mut frames: Vec<FrameReport> = Vec::new();
    let mut capture: Option<StillReport> = None;

    loop {
        if let Some(max) = config.max_frames {
            if frames.len() >= max as usize {
                break;
            }
        }

        let Some(frame) = decoder.next_frame()? else {
            break;
        };

        if config.capture_frame == Some(frame.frame_number) {
            capture = Some(capture_still(&frame, config)?);
        }

        if frame.frame_number % config.sample_rate != 0 {
            continue;
        }

        let report = analyze_frame(&frame, &face_detector, &classifier);

        if report.faces.is_empty() {
            // The live screen shows its fallback label instead of a box.
            warn!(frame_number = frame.frame_number, "no face detected");
        }

        if let (Some(renderer), Some(dir)) = (&renderer, &config.overlay_dir) {
            let mut overlay = frame.image.clone();
            renderer.render_live(
                &mut overlay,
                frame.frame_number,
                &report.faces,
                report.classification.as_ref(),
                config.rotated,
            );
            renderer
                .save_frame(&overlay, frame.frame_number, dir)
                .context("failed to save overlay frame")?;
        }

        frames.push(report);
    }

    info!(
        analyzed_frames = frames.len(),
        captured = capture.is_some(),
        "pipeline complete"
    );

    Ok(LiveReport { frames, capture })
}

/// Run the detectors on one frame and collect its report.
fn analyze_frame(
    frame: &Frame,
    face_detector: &dyn FaceDetector,
    classifier: &dyn DrinkClassifier,
) -> FrameReport {
    let faces = face_detector.detect_faces(&frame.image);
    let classification = classifier.classify(&frame.image);

    info!(
        frame_number = frame.frame_number,
        face_count = faces.len(),
        drink = ?classification.map(|c| c.drink),
        "frame analyzed"
    );

    FrameReport {
        frame_number: frame.frame_number,
        timestamp_seconds: frame.timestamp_seconds,
        faces,
        classification,
    }
}

/// The photo-capture path: save the raw frame if requested, then run the
/// still-image text pass on it.
fn capture_still(frame: &Frame, config: &PipelineConfig) -> Result<StillReport> {
    info!(frame_number = frame.frame_number, "capturing still frame");

    if let Some(path) = &config.capture_path {
        frame
            .image
            .save(path)
            .with_context(|| format!("failed to save captured still to {}", path.display()))?;
        info!(?path, "captured still written");
    }

    let words = still::analyze_image(&frame.image);
    info!(word_count = words.len(), "captured still text pass complete");

    Ok(StillReport {
        width: frame.image.width(),
        height: frame.image.height(),
        words,
    })
}

#[cfg(test)]
mod tests {
    use image::{Rgb, RgbImage};

    use super::*;
    use crate::detect::{Classification, DrinkKind, FaceObservation};
    use crate::rect::NormalizedRect;

    struct FixedFaces(Vec<FaceObservation>);

    impl FaceDetector for FixedFaces {
        fn detect_faces(&self, _image: &RgbImage) -> Vec<FaceObservation> {
            self.0.clone()
        }
    }

    struct FixedDrink(Option<Classification>);

    impl DrinkClassifier for FixedDrink {
        fn classify(&self, _image: &RgbImage) -> Option<Classification> {
            self.0
        }
    }

    fn frame(frame_number: u32) -> Frame {
        Frame {
            image: RgbImage::from_pixel(64, 64, Rgb([255, 255, 255])),
            frame_number,
            timestamp_seconds: frame_number as f64 / 30.0,
        }
    }

    #[test]
    fn analyze_frame_collects_detector_output() {
        let faces = FixedFaces(vec![FaceObservation {
            bounding_box: NormalizedRect { x: 0.2, y: 0.2, w: 0.3, h: 0.3 },
            confidence: 0.9,
        }]);
        let drink = FixedDrink(Some(Classification {
            drink: DrinkKind::Beer,
            confidence: 0.7,
        }));

        let report = analyze_frame(&frame(42), &faces, &drink);
        assert_eq!(report.frame_number, 42);
        assert_eq!(report.faces.len(), 1);
        assert_eq!(report.classification.unwrap().drink, DrinkKind::Beer);
    }

    #[test]
    fn analyze_frame_with_no_detections() {
        let report = analyze_frame(&frame(0), &FixedFaces(Vec::new()), &FixedDrink(None));
        assert!(report.faces.is_empty());
        assert!(report.classification.is_none());
    }

    #[test]
    fn capture_still_analyzes_in_memory_without_path() {
        let config = PipelineConfig::default();
        let report = capture_still(&frame(3), &config).unwrap();
        assert_eq!(report.width, 64);
        assert_eq!(report.height, 64);
        assert!(report.words.is_empty());
    }

    #[test]
    fn missing_input_fails_fast() {
        let config = PipelineConfig::default();
        let err = run_pipeline(Path::new("does-not-exist.mp4"), &config).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn zero_sample_rate_is_rejected() {
        let config = PipelineConfig {
            sample_rate: 0,
            ..Default::default()
        };
        // Existence is checked first, so point at a file that exists.
        let input = std::env::temp_dir().join("cheers_pipeline_sample_rate_test.mp4");
        std::fs::write(&input, b"").unwrap();
        let err = run_pipeline(&input, &config).unwrap_err();
        assert!(err.to_string().contains("sample_rate"));
        let _ = std::fs::remove_file(&input);
    }
}
