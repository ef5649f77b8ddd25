use image::RgbImage;
use tracing::debug;

use super::common::{rgb_to_hsv, Hsv};
use super::{Classification, DrinkClassifier, DrinkKind};

/// Fraction of each axis covered by the centered sampling window.
const CENTER_FRACTION: f64 = 0.5;

/// Pixel stride inside the sampling window.
const SAMPLE_STRIDE: u32 = 4;

/// Minimum share of samples the winning category needs to be reported.
const CONFIDENCE_FLOOR: f64 = 0.2;

fn classify_pixel(hsv: Hsv) -> Option<DrinkKind> {
    // Milk: bright and nearly colorless.
    if hsv.s < 0.12 && hsv.v > 0.8 {
        return Some(DrinkKind::Milk);
    }
    // Coffee: dark warm brown.
    if hsv.v < 0.35 && hsv.h < 50.0 && hsv.s > 0.25 {
        return Some(DrinkKind::Coffee);
    }
    // Beer: saturated amber and gold.
    if (35.0..65.0).contains(&hsv.h) && hsv.s > 0.5 && hsv.v > 0.5 {
        return Some(DrinkKind::Beer);
    }
    // Wine: deep red through purple.
    if (hsv.h < 20.0 || hsv.h > 310.0) && hsv.s > 0.4 && hsv.v > 0.15 {
        return Some(DrinkKind::Wine);
    }
    None
}

/// Classifies the drink in frame by voting sampled center pixels into hue
/// categories. The subject is assumed roughly centered, as in the demo.
pub struct HueClassifier;

impl DrinkClassifier for HueClassifier {
    fn classify(&self, image: &RgbImage) -> Option<Classification> {
        let (w, h) = (image.width(), image.height());
        if w < SAMPLE_STRIDE * 2 || h < SAMPLE_STRIDE * 2 {
            return None;
        }

        let x0 = (w as f64 * (1.0 - CENTER_FRACTION) / 2.0) as u32;
        let y0 = (h as f64 * (1.0 - CENTER_FRACTION) / 2.0) as u32;
        let x1 = w - x0;
        let y1 = h - y0;

        // Vote counts indexed by DrinkKind declaration order.
        let kinds = [
            DrinkKind::Coffee,
            DrinkKind::Beer,
            DrinkKind::Milk,
            DrinkKind::Wine,
        ];
        let mut votes = [0u32; 4];
        let mut total = 0u32;

        let mut y = y0;
        while y < y1 {
            let mut x = x0;
            while x < x1 {
                let hsv = rgb_to_hsv(*image.get_pixel(x, y));
                if let Some(kind) = classify_pixel(hsv) {
                    let slot = match kind {
                        DrinkKind::Coffee => 0,
                        DrinkKind::Beer => 1,
                        DrinkKind::Milk => 2,
                        DrinkKind::Wine => 3,
                    };
                    votes[slot] += 1;
                }
                total += 1;
                x += SAMPLE_STRIDE;
            }
            y += SAMPLE_STRIDE;
        }

        if total == 0 {
            return None;
        }

        let (best, &count) = votes.iter().enumerate().max_by_key(|(_, &count)| count)?;
        let confidence = count as f64 / total as f64;

        debug!(
            coffee = votes[0],
            beer = votes[1],
            milk = votes[2],
            wine = votes[3],
            total,
            "drink vote tally"
        );

        if confidence < CONFIDENCE_FLOOR {
            return None;
        }

        Some(Classification {
            drink: kinds[best],
            confidence,
        })
    }
}
