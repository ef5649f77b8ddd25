use serde::Serialize;

/// A rectangle in a detector's normalized coordinate space: both axes range
/// over [0, 1] regardless of image resolution, origin at the bottom-left,
/// y increases upward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NormalizedRect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

/// Dimensions of the destination drawing surface at the moment of conversion.
/// May change between frames, so converted rects must not be cached.
#[derive(Debug, Clone, Copy)]
pub struct ViewSize {
    pub w: f64,
    pub h: f64,
}

/// A rectangle in the drawing surface's own pixel coordinates: origin at the
/// top-left, y increases downward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewRect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

/// A rectangle in absolute integer pixel coordinates, for rasterization.
#[derive(Debug, Clone, Copy)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl NormalizedRect {
    /// Map this normalized, bottom-left-origin box to a top-left-origin view
    /// rectangle scaled to `view`.
    ///
    /// With `rotated` set, the detector's frame is assumed rotated 90 degrees
    /// relative to the display (the front-camera case) and both axes swap
    /// roles; width and height keep their pre-swap values.
    ///
    /// Pure arithmetic. Values outside [0, 1] are passed through without
    /// clamping or validation.
    pub fn to_view_rect(self, rotated: bool, view: ViewSize) -> ViewRect {
        let (x, y) = if rotated {
            (1.0 - (self.y + self.w), 1.0 - (self.x + self.h))
        } else {
            (self.x, 1.0 - (self.y + self.h))
        };
        ViewRect {
            x: x * view.w,
            y: y * view.h,
            w: self.w * view.w,
            h: self.h * view.h,
        }
    }

    /// Right edge in normalized space.
    pub fn right(self) -> f64 {
        self.x + self.w
    }

    /// Top edge in normalized space (bottom-left origin).
    pub fn top(self) -> f64 {
        self.y + self.h
    }
}

/// The tightest rectangle enclosing every box in `boxes`, in the same
/// normalized space. Used to derive a word's box from its per-character
/// boxes. Returns `None` for an empty slice.
///
/// The result depends only on the set of boxes, not their order.
pub fn word_bounding_box(boxes: &[NormalizedRect]) -> Option<NormalizedRect> {
    let first = *boxes.first()?;
    let mut left = first.x;
    let mut bottom = first.y;
    let mut right = first.right();
    let mut top = first.top();

    for b in &boxes[1..] {
        left = left.min(b.x);
        bottom = bottom.min(b.y);
        right = right.max(b.right());
        top = top.max(b.top());
    }

    Some(NormalizedRect {
        x: left,
        y: bottom,
        w: right - left,
        h: top - bottom,
    })
}

impl ViewRect {
    /// Truncate to an integer rect for rasterization. Coordinates below zero
    /// clamp to the surface edge here; the converter itself never clamps.
    pub fn to_pixel_rect(self) -> PixelRect {
        PixelRect {
            x: self.x.max(0.0) as u32,
            y: self.y.max(0.0) as u32,
            w: self.w.max(0.0) as u32,
            h: self.h.max(0.0) as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-6;

    fn rect(x: f64, y: f64, w: f64, h: f64) -> NormalizedRect {
        NormalizedRect { x, y, w, h }
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < TOLERANCE,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn plain_transform_concrete_case() {
        let b = rect(0.2, 0.3, 0.1, 0.4);
        let v = b.to_view_rect(false, ViewSize { w: 1000.0, h: 2000.0 });
        assert_close(v.x, 200.0);
        assert_close(v.y, 600.0);
        assert_close(v.w, 100.0);
        assert_close(v.h, 800.0);
    }

    #[test]
    fn rotated_transform_concrete_case() {
        let b = rect(0.2, 0.3, 0.1, 0.4);
        let v = b.to_view_rect(true, ViewSize { w: 1000.0, h: 2000.0 });
        assert_close(v.x, 600.0);
        assert_close(v.y, 800.0);
        assert_close(v.w, 100.0);
        assert_close(v.h, 800.0);
    }

    #[test]
    fn size_scales_exactly_in_both_modes() {
        let b = rect(0.15, 0.4, 0.3, 0.25);
        let view = ViewSize { w: 640.0, h: 480.0 };
        for rotated in [false, true] {
            let v = b.to_view_rect(rotated, view);
            assert_close(v.w, 0.3 * 640.0);
            assert_close(v.h, 0.25 * 480.0);
        }
    }

    #[test]
    fn full_frame_box_fills_view() {
        let b = rect(0.0, 0.0, 1.0, 1.0);
        let v = b.to_view_rect(false, ViewSize { w: 1920.0, h: 1080.0 });
        assert_close(v.x, 0.0);
        assert_close(v.y, 0.0);
        assert_close(v.w, 1920.0);
        assert_close(v.h, 1080.0);
    }

    #[test]
    fn valid_box_stays_within_view_bounds() {
        let b = rect(0.6, 0.1, 0.35, 0.8);
        let view = ViewSize { w: 800.0, h: 600.0 };
        for rotated in [false, true] {
            let v = b.to_view_rect(rotated, view);
            assert!(v.x >= -TOLERANCE);
            assert!(v.y >= -TOLERANCE);
            assert!(v.x + v.w <= view.w + TOLERANCE);
            assert!(v.y + v.h <= view.h + TOLERANCE);
        }
    }

    #[test]
    fn out_of_range_input_passes_through_unclamped() {
        // Detector noise slightly outside [0, 1] is processed arithmetically.
        let b = rect(-0.05, 0.9, 0.2, 0.2);
        let v = b.to_view_rect(false, ViewSize { w: 100.0, h: 100.0 });
        assert_close(v.x, -5.0);
        assert_close(v.y, -10.0);
    }

    #[test]
    fn word_box_of_singleton_is_identity() {
        let b = rect(0.31, 0.42, 0.07, 0.02);
        let enclosed = word_bounding_box(&[b]).unwrap();
        assert_close(enclosed.x, b.x);
        assert_close(enclosed.y, b.y);
        assert_close(enclosed.w, b.w);
        assert_close(enclosed.h, b.h);
    }

    #[test]
    fn word_box_is_order_independent() {
        let boxes = [
            rect(0.1, 0.5, 0.05, 0.04),
            rect(0.17, 0.49, 0.05, 0.05),
            rect(0.24, 0.51, 0.04, 0.04),
        ];
        let forward = word_bounding_box(&boxes).unwrap();
        let mut reversed = boxes;
        reversed.reverse();
        let backward = word_bounding_box(&reversed).unwrap();
        assert_eq!(forward, backward);
    }

    #[test]
    fn word_box_encloses_every_input() {
        let a = rect(0.1, 0.1, 0.1, 0.1);
        let b = rect(0.6, 0.7, 0.2, 0.1);
        let enclosed = word_bounding_box(&[a, b]).unwrap();
        for input in [a, b] {
            assert!(enclosed.x <= input.x + TOLERANCE);
            assert!(enclosed.y <= input.y + TOLERANCE);
            assert!(enclosed.right() >= input.right() - TOLERANCE);
            assert!(enclosed.top() >= input.top() - TOLERANCE);
        }
        assert!(enclosed.w * enclosed.h >= a.w * a.h);
        assert!(enclosed.w * enclosed.h >= b.w * b.h);
    }

    #[test]
    fn word_box_of_empty_slice_is_none() {
        assert!(word_bounding_box(&[]).is_none());
    }

    #[test]
    fn zero_size_box_is_accepted() {
        let b = rect(0.5, 0.5, 0.0, 0.0);
        let v = b.to_view_rect(false, ViewSize { w: 200.0, h: 200.0 });
        assert_close(v.x, 100.0);
        assert_close(v.y, 100.0);
        assert_close(v.w, 0.0);
        assert_close(v.h, 0.0);
    }

    #[test]
    fn pixel_rect_clamps_negative_origin() {
        let v = ViewRect { x: -3.0, y: -1.0, w: 10.0, h: 10.0 };
        let p = v.to_pixel_rect();
        assert_eq!(p.x, 0);
        assert_eq!(p.y, 0);
        assert_eq!(p.w, 10);
        assert_eq!(p.h, 10);
    }
}
