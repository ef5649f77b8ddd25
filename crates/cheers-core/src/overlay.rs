use std::path::{Path, PathBuf};

use ab_glyph::{FontVec, PxScale};
use anyhow::{Context, Result};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use tracing::{debug, info, warn};

use crate::detect::{Classification, FaceObservation, TextObservation};
use crate::rect::{NormalizedRect, ViewSize};

const FACE_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const WORD_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const CHAR_COLOR: Rgb<u8> = Rgb([0, 0, 255]);

/// Word outlines are drawn thicker than character outlines.
const WORD_BORDER: u32 = 2;
const CHAR_BORDER: u32 = 1;
const FACE_BORDER: u32 = 1;

const TEXT_SCALE: f32 = 28.0;
const TEXT_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
const TEXT_LINE_HEIGHT: i32 = 30;

/// Draws detection outlines and status text onto frames.
pub struct OverlayRenderer {
    font: Option<FontVec>,
}

impl OverlayRenderer {
    pub fn new(font_path: Option<&Path>) -> Self {
        Self {
            font: font_path.and_then(load_font),
        }
    }

    /// Draw live-frame results: one outline per detected face plus status
    /// lines. `rotated` marks detector output that is 90 degrees rotated
    /// relative to the frame (front-camera orientation).
    pub fn render_live(
        &self,
        img: &mut RgbImage,
        frame_number: u32,
        faces: &[FaceObservation],
        classification: Option<&Classification>,
        rotated: bool,
    ) {
        for face in faces {
            draw_box(img, face.bounding_box, rotated, FACE_COLOR, FACE_BORDER);
        }

        let Some(font) = &self.font else { return };
        let scale = PxScale::from(TEXT_SCALE);
        let x = 10;
        let mut y = 10;

        draw_text_mut(img, TEXT_COLOR, x, y, scale, font, &format!("F:{frame_number}"));
        y += TEXT_LINE_HEIGHT;

        draw_text_mut(img, TEXT_COLOR, x, y, scale, font, &face_status(faces));
        y += TEXT_LINE_HEIGHT;

        let drink_line = match classification {
            Some(c) => format!("DRINK:{} {:.0}%", c.drink, c.confidence * 100.0),
            None => "DRINK:--".to_string(),
        };
        draw_text_mut(img, TEXT_COLOR, x, y, scale, font, &drink_line);
    }

    /// Draw still-image results: word outlines with their character outlines.
    /// Still images are upright, so no rotation correction applies.
    pub fn render_text(&self, img: &mut RgbImage, observations: &[TextObservation]) {
        for word in observations {
            draw_box(img, word.bounding_box, false, WORD_COLOR, WORD_BORDER);
            for &ch in &word.character_boxes {
                draw_box(img, ch, false, CHAR_COLOR, CHAR_BORDER);
            }
        }

        let Some(font) = &self.font else { return };
        let line = format!("WORDS:{}", observations.len());
        draw_text_mut(img, TEXT_COLOR, 10, 10, PxScale::from(TEXT_SCALE), font, &line);
    }

    /// Write the frame under `dir` as `frame_XXXXXXXX.png`.
    pub fn save_frame(&self, img: &RgbImage, frame_number: u32, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(format!("frame_{frame_number:08}.png"));
        img.save(&path)
            .with_context(|| format!("failed to save overlay frame to {}", path.display()))?;
        debug!(?path, "saved overlay frame");
        Ok(path)
    }
}

/// Status line for the face overlay. The fallback mirrors the demo's
/// "no face detected" label.
pub fn face_status(faces: &[FaceObservation]) -> String {
    match faces.first() {
        Some(best) => format!("FACE:{} @{:.0}%", faces.len(), best.confidence * 100.0),
        None => "FACE:none".to_string(),
    }
}

/// Convert through the view transform and draw a hollow rect, nesting
/// `border` one-pixel outlines for thickness. Degenerate rects are skipped.
fn draw_box(img: &mut RgbImage, rect: NormalizedRect, rotated: bool, color: Rgb<u8>, border: u32) {
    let view = ViewSize {
        w: img.width() as f64,
        h: img.height() as f64,
    };
    let px = rect.to_view_rect(rotated, view).to_pixel_rect();
    if px.w == 0 || px.h == 0 {
        return;
    }

    for inset in 0..border {
        if px.w <= inset * 2 || px.h <= inset * 2 {
            break;
        }
        let outline = Rect::at((px.x + inset) as i32, (px.y + inset) as i32)
            .of_size(px.w - inset * 2, px.h - inset * 2);
        draw_hollow_rect_mut(img, outline, color);
    }
}

fn load_font(path: &Path) -> Option<FontVec> {
    let data = match std::fs::read(path) {
        Ok(data) => data,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read font file");
            return None;
        }
    };
    match FontVec::try_from_vec(data) {
        Ok(font) => {
            info!(path = %path.display(), "loaded overlay font");
            Some(font)
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to parse font file");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rect::NormalizedRect;

    #[test]
    fn face_status_reports_count_and_confidence() {
        let faces = [
            FaceObservation {
                bounding_box: NormalizedRect { x: 0.1, y: 0.1, w: 0.2, h: 0.2 },
                confidence: 0.87,
            },
            FaceObservation {
                bounding_box: NormalizedRect { x: 0.6, y: 0.5, w: 0.1, h: 0.1 },
                confidence: 0.62,
            },
        ];
        assert_eq!(face_status(&faces), "FACE:2 @87%");
    }

    #[test]
    fn face_status_falls_back_when_empty() {
        assert_eq!(face_status(&[]), "FACE:none");
    }

    #[test]
    fn draw_box_outlines_the_view_rect() {
        let mut img = RgbImage::from_pixel(100, 100, Rgb([0, 0, 0]));
        // Bottom-left-origin box in the lower-left quadrant lands in the
        // lower-left of the image after the flip.
        let rect = NormalizedRect { x: 0.1, y: 0.1, w: 0.3, h: 0.3 };
        draw_box(&mut img, rect, false, Rgb([0, 255, 0]), 1);

        // Top edge of the outline: y = (1 - 0.4) * 100 = 60.
        assert_eq!(*img.get_pixel(10, 60), Rgb([0, 255, 0]));
        assert_eq!(*img.get_pixel(50, 50), Rgb([0, 0, 0]));
    }

    #[test]
    fn draw_box_skips_degenerate_rects() {
        let mut img = RgbImage::from_pixel(10, 10, Rgb([0, 0, 0]));
        let rect = NormalizedRect { x: 0.5, y: 0.5, w: 0.0, h: 0.0 };
        draw_box(&mut img, rect, false, Rgb([255, 0, 0]), 2);
        assert!(img.pixels().all(|p| *p == Rgb([0, 0, 0])));
    }
}
