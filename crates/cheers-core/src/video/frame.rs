use image::RgbImage;

/// A single decoded frame with metadata, the stand-in for a live camera
/// sample buffer.
pub struct Frame {
    /// The frame's image data.
    pub image: RgbImage,
    /// Absolute frame number from the start of the source (0-based).
    pub frame_number: u32,
    /// Elapsed seconds from the start of the source.
    pub timestamp_seconds: f64,
}
