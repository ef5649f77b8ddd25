pub mod classify;
pub mod common;
pub mod face;
pub mod text;

use std::fmt;

use image::RgbImage;
use serde::Serialize;

use crate::rect::NormalizedRect;

/// A detected face. The bounding box is in the detector's normalized,
/// bottom-left-origin coordinate space.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FaceObservation {
    pub bounding_box: NormalizedRect,
    pub confidence: f64,
}

/// Drink categories the classifier can report, mirroring the demo's
/// label-to-emoji mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DrinkKind {
    Coffee,
    Beer,
    Milk,
    Wine,
}

impl fmt::Display for DrinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DrinkKind::Coffee => "coffee",
            DrinkKind::Beer => "beer",
            DrinkKind::Milk => "milk",
            DrinkKind::Wine => "wine",
        };
        write!(f, "{name}")
    }
}

/// Best-guess drink classification for one frame.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Classification {
    pub drink: DrinkKind,
    pub confidence: f64,
}

/// A detected text region: the enclosing word box plus per-character boxes,
/// all in normalized bottom-left-origin coordinates.
#[derive(Debug, Clone, Serialize)]
pub struct TextObservation {
    pub bounding_box: NormalizedRect,
    pub character_boxes: Vec<NormalizedRect>,
}

/// Finds face regions in a frame.
pub trait FaceDetector {
    fn detect_faces(&self, image: &RgbImage) -> Vec<FaceObservation>;
}

/// Classifies the dominant drink visible in a frame. Returns `None` when no
/// category is confident enough; the caller falls back to an empty label.
pub trait DrinkClassifier {
    fn classify(&self, image: &RgbImage) -> Option<Classification>;
}

/// Finds word regions and their character boxes in a still image.
pub trait TextDetector {
    fn detect_text(&self, image: &RgbImage) -> Vec<TextObservation>;
}
