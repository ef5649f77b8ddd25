use std::fmt::{self, Formatter};

use image::{Rgb, RgbImage};

/// HSV representation. H in [0, 360), S and V in [0.0, 1.0].
#[derive(Debug, Clone, Copy)]
pub struct Hsv {
    pub h: f32,
    pub s: f32,
    pub v: f32,
}

impl fmt::Display for Hsv {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[H: {:.0}°, S: {:.2}, V: {:.2}]", self.h, self.s, self.v)
    }
}

pub fn rgb_to_hsv(pixel: Rgb<u8>) -> Hsv {
    let r = pixel[0] as f32 / 255.0;
    let g = pixel[1] as f32 / 255.0;
    let b = pixel[2] as f32 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let v = max;
    let s = if max > 0.0 { delta / max } else { 0.0 };

    let h = if delta < 1e-6 {
        0.0
    } else if (max - r).abs() < 1e-6 {
        60.0 * (((g - b) / delta) % 6.0)
    } else if (max - g).abs() < 1e-6 {
        60.0 * (((b - r) / delta) + 2.0)
    } else {
        60.0 * (((r - g) / delta) + 4.0)
    };

    let h = if h < 0.0 { h + 360.0 } else { h };

    Hsv { h, s, v }
}

/// Rec. 601 luma in [0.0, 1.0].
pub fn luma(pixel: Rgb<u8>) -> f32 {
    let r = pixel[0] as f32 / 255.0;
    let g = pixel[1] as f32 / 255.0;
    let b = pixel[2] as f32 / 255.0;
    0.299 * r + 0.587 * g + 0.114 * b
}

/// Coarse analysis grid laid over a frame. Each cell aggregates a block of
/// pixels; detectors classify cells instead of individual pixels.
#[derive(Debug, Clone, Copy)]
pub struct CellGrid {
    pub cols: u32,
    pub rows: u32,
    cell_w: u32,
    cell_h: u32,
}

impl CellGrid {
    /// The image must be at least `cols` x `rows` pixels.
    pub fn new(image_w: u32, image_h: u32, cols: u32, rows: u32) -> Self {
        assert!(cols > 0 && rows > 0, "grid must have at least one cell");
        assert!(
            image_w >= cols && image_h >= rows,
            "image {image_w}x{image_h} smaller than grid {cols}x{rows}"
        );
        Self {
            cols,
            rows,
            cell_w: image_w / cols,
            cell_h: image_h / rows,
        }
    }

    /// Fraction of the cell's pixels that pass the classifier, sampled with a
    /// small stride to keep per-frame cost low.
    pub fn fraction(
        &self,
        image: &RgbImage,
        cx: u32,
        cy: u32,
        classifier: impl Fn(Hsv) -> bool,
    ) -> f64 {
        debug_assert!(cx < self.cols && cy < self.rows);

        let x0 = cx * self.cell_w;
        let y0 = cy * self.cell_h;
        let stride = (self.cell_w.min(self.cell_h) / 4).max(1);

        let mut total = 0u32;
        let mut matching = 0u32;
        let mut y = y0;
        while y < y0 + self.cell_h {
            let mut x = x0;
            while x < x0 + self.cell_w {
                let hsv = rgb_to_hsv(*image.get_pixel(x, y));
                total += 1;
                if classifier(hsv) {
                    matching += 1;
                }
                x += stride;
            }
            y += stride;
        }

        matching as f64 / total as f64
    }

    /// Normalized width of one cell.
    pub fn norm_cell_w(&self) -> f64 {
        1.0 / self.cols as f64
    }

    /// Normalized height of one cell.
    pub fn norm_cell_h(&self) -> f64 {
        1.0 / self.rows as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hsv_of(r: u8, g: u8, b: u8) -> Hsv {
        rgb_to_hsv(Rgb([r, g, b]))
    }

    #[test]
    fn hsv_primary_colors() {
        let red = hsv_of(255, 0, 0);
        assert!(red.h.abs() < 0.5);
        assert!((red.s - 1.0).abs() < 1e-3);
        assert!((red.v - 1.0).abs() < 1e-3);

        let green = hsv_of(0, 255, 0);
        assert!((green.h - 120.0).abs() < 0.5);

        let blue = hsv_of(0, 0, 255);
        assert!((blue.h - 240.0).abs() < 0.5);
    }

    #[test]
    fn hsv_grayscale_has_zero_saturation() {
        let gray = hsv_of(128, 128, 128);
        assert_eq!(gray.h, 0.0);
        assert_eq!(gray.s, 0.0);
        assert!((gray.v - 128.0 / 255.0).abs() < 1e-3);
    }

    #[test]
    fn luma_extremes() {
        assert!(luma(Rgb([0, 0, 0])) < 1e-6);
        assert!((luma(Rgb([255, 255, 255])) - 1.0).abs() < 1e-3);
    }

    #[test]
    fn cell_fraction_on_uniform_image() {
        let image = RgbImage::from_pixel(64, 64, Rgb([255, 0, 0]));
        let grid = CellGrid::new(64, 64, 8, 8);
        let f = grid.fraction(&image, 3, 3, |hsv| hsv.h < 10.0 && hsv.s > 0.9);
        assert!((f - 1.0).abs() < 1e-9);
        let none = grid.fraction(&image, 3, 3, |hsv| hsv.h > 100.0);
        assert!(none.abs() < 1e-9);
    }
}
