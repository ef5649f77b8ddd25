use image::RgbImage;
use tracing::debug;

use super::common::luma;
use super::{TextDetector, TextObservation};
use crate::rect::{word_bounding_box, NormalizedRect};

/// Luma below this counts as ink (dark text on a light background).
const INK_LUMA: f32 = 0.45;

/// Minimum ink fraction for a row to belong to a text line band.
const MIN_ROW_INK: f64 = 0.02;

/// Minimum ink fraction for a column (within a band) to count as a stroke.
const MIN_COL_INK: f64 = 0.1;

/// Bands separated by this many blank rows or fewer merge into one line.
const LINE_GAP_ROWS: u32 = 2;

/// Stroke runs separated by this many blank columns or fewer merge into one
/// character.
const CHAR_GAP_COLS: u32 = 2;

/// Narrower stroke runs are discarded as noise.
const MIN_CHAR_COLS: u32 = 2;

/// Text-region detection via stroke profiling: dark rows form line bands,
/// dark column runs within a band form character boxes, and characters
/// separated by a wide gap split into words. Each word's box is the tightest
/// enclosure of its character boxes.
pub struct StrokeTextDetector;

impl TextDetector for StrokeTextDetector {
    fn detect_text(&self, image: &RgbImage) -> Vec<TextObservation> {
        let mut observations = Vec::new();

        for (r0, r1) in line_bands(image) {
            let band_h = r1 - r0 + 1;
            // Inter-word gaps scale with line height; characters in one word
            // sit closer together than half the line height.
            let word_gap = (band_h / 2).max(4);

            let runs = character_runs(image, r0, r1);
            debug!(
                band_top = r0,
                band_bottom = r1,
                character_count = runs.len(),
                "text line band"
            );

            for word in group_into_words(&runs, word_gap) {
                let character_boxes: Vec<NormalizedRect> = word
                    .iter()
                    .map(|&(c0, c1)| column_run_to_rect(image, c0, c1, r0, r1))
                    .collect();

                let Some(bounding_box) = word_bounding_box(&character_boxes) else {
                    continue;
                };

                observations.push(TextObservation {
                    bounding_box,
                    character_boxes,
                });
            }
        }

        debug!(word_count = observations.len(), "text detection complete");
        observations
    }
}

fn is_ink(image: &RgbImage, x: u32, y: u32) -> bool {
    luma(*image.get_pixel(x, y)) < INK_LUMA
}

/// Inclusive row ranges of text lines, from the row ink profile.
fn line_bands(image: &RgbImage) -> Vec<(u32, u32)> {
    let (w, h) = (image.width(), image.height());
    if w == 0 || h == 0 {
        return Vec::new();
    }

    let inky_rows: Vec<bool> = (0..h)
        .map(|y| {
            let ink = (0..w).filter(|&x| is_ink(image, x, y)).count();
            ink as f64 / w as f64 > MIN_ROW_INK
        })
        .collect();

    merge_runs(&inky_rows, LINE_GAP_ROWS)
}

/// Inclusive column ranges of characters within one line band.
fn character_runs(image: &RgbImage, r0: u32, r1: u32) -> Vec<(u32, u32)> {
    let w = image.width();
    let band_h = (r1 - r0 + 1) as f64;

    let stroke_cols: Vec<bool> = (0..w)
        .map(|x| {
            let ink = (r0..=r1).filter(|&y| is_ink(image, x, y)).count();
            ink as f64 / band_h > MIN_COL_INK
        })
        .collect();

    merge_runs(&stroke_cols, CHAR_GAP_COLS)
        .into_iter()
        .filter(|&(c0, c1)| c1 - c0 + 1 >= MIN_CHAR_COLS)
        .collect()
}

/// Maximal runs of set flags, merging runs separated by `max_gap` or fewer
/// clear flags. Ranges are inclusive.
fn merge_runs(flags: &[bool], max_gap: u32) -> Vec<(u32, u32)> {
    let mut runs: Vec<(u32, u32)> = Vec::new();

    for (i, &set) in flags.iter().enumerate() {
        if !set {
            continue;
        }
        let i = i as u32;
        match runs.last_mut() {
            Some((_, end)) if i - *end <= max_gap + 1 => *end = i,
            _ => runs.push((i, i)),
        }
    }

    runs
}

/// Split a line's character runs into words wherever the gap between
/// consecutive characters exceeds `word_gap` columns.
fn group_into_words(runs: &[(u32, u32)], word_gap: u32) -> Vec<Vec<(u32, u32)>> {
    let mut words: Vec<Vec<(u32, u32)>> = Vec::new();

    for &run in runs {
        match words.last_mut() {
            Some(word) => {
                let (_, prev_end) = *word.last().unwrap();
                if run.0 - prev_end - 1 > word_gap {
                    words.push(vec![run]);
                } else {
                    word.push(run);
                }
            }
            None => words.push(vec![run]),
        }
    }

    words
}

/// Inclusive pixel ranges to a normalized bottom-left-origin box.
fn column_run_to_rect(image: &RgbImage, c0: u32, c1: u32, r0: u32, r1: u32) -> NormalizedRect {
    let w = image.width() as f64;
    let h = image.height() as f64;
    NormalizedRect {
        x: c0 as f64 / w,
        y: 1.0 - (r1 + 1) as f64 / h,
        w: (c1 - c0 + 1) as f64 / w,
        h: (r1 - r0 + 1) as f64 / h,
    }
}
