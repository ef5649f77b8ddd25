use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::RgbImage;
use tracing::info;

use crate::detect::{text::StrokeTextDetector, TextDetector, TextObservation};
use crate::overlay::OverlayRenderer;
use crate::report::StillReport;

/// Parameters for the still-image text pass.
#[derive(Default)]
pub struct StillConfig {
    /// Path to write a copy with word and character outlines, or None.
    pub annotated_path: Option<PathBuf>,
    /// TTF font for the overlay status line.
    pub font_path: Option<PathBuf>,
}

/// Run text-region detection over an already-decoded image.
pub fn analyze_image(image: &RgbImage) -> Vec<TextObservation> {
    StrokeTextDetector.detect_text(image)
}

/// Load a photo, detect text regions, and optionally write an annotated copy.
pub fn analyze_still(input: &Path, config: &StillConfig) -> Result<StillReport> {
    let image = image::open(input)
        .with_context(|| format!("failed to load image {}", input.display()))?
        .into_rgb8();

    let words = analyze_image(&image);
    info!(
        ?input,
        word_count = words.len(),
        character_count = words.iter().map(|w| w.character_boxes.len()).sum::<usize>(),
        "still text detection complete"
    );

    if let Some(path) = &config.annotated_path {
        let renderer = OverlayRenderer::new(config.font_path.as_deref());
        let mut annotated = image.clone();
        renderer.render_text(&mut annotated, &words);
        annotated
            .save(path)
            .with_context(|| format!("failed to save annotated image to {}", path.display()))?;
        info!(?path, "annotated still written");
    }

    Ok(StillReport {
        width: image.width(),
        height: image.height(),
        words,
    })
}
