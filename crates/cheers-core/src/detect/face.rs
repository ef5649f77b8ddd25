use image::RgbImage;
use tracing::debug;

use super::common::{CellGrid, Hsv};
use super::{FaceDetector, FaceObservation};
use crate::rect::NormalizedRect;

/// Cells per axis of the skin-tone analysis grid.
const GRID_COLS: u32 = 32;
const GRID_ROWS: u32 = 32;

/// Minimum fraction of skin-classified samples for a cell to count as skin.
const CELL_THRESHOLD: f64 = 0.5;

/// Minimum cluster size, in cells, to report as a face.
const MIN_CLUSTER_CELLS: usize = 4;

fn is_skin(hsv: Hsv) -> bool {
    hsv.h < 50.0 && hsv.s > 0.15 && hsv.s < 0.75 && hsv.v > 0.35
}

/// Face detection via skin-tone segmentation: classify grid cells against a
/// skin HSV range, then report each connected cell cluster as one face,
/// largest first. Confidence is the cluster's mean skin fraction.
pub struct SkinRegionDetector;

struct Cluster {
    min_cx: u32,
    max_cx: u32,
    min_cy: u32,
    max_cy: u32,
    cells: usize,
    fraction_sum: f64,
}

impl FaceDetector for SkinRegionDetector {
    fn detect_faces(&self, image: &RgbImage) -> Vec<FaceObservation> {
        if image.width() < GRID_COLS || image.height() < GRID_ROWS {
            debug!(
                width = image.width(),
                height = image.height(),
                "frame smaller than analysis grid, skipping face detection"
            );
            return Vec::new();
        }

        let grid = CellGrid::new(image.width(), image.height(), GRID_COLS, GRID_ROWS);

        let mut fractions = vec![0.0f64; (GRID_COLS * GRID_ROWS) as usize];
        for cy in 0..GRID_ROWS {
            for cx in 0..GRID_COLS {
                fractions[(cy * GRID_COLS + cx) as usize] =
                    grid.fraction(image, cx, cy, is_skin);
            }
        }

        let mut clusters = collect_clusters(&fractions);
        clusters.retain(|c| c.cells >= MIN_CLUSTER_CELLS);
        clusters.sort_by(|a, b| b.cells.cmp(&a.cells));

        debug!(cluster_count = clusters.len(), "skin clusters found");

        clusters
            .into_iter()
            .map(|c| FaceObservation {
                bounding_box: cluster_to_rect(&c, &grid),
                confidence: c.fraction_sum / c.cells as f64,
            })
            .collect()
    }
}

/// 4-connected flood fill over cells whose skin fraction passes the
/// threshold.
fn collect_clusters(fractions: &[f64]) -> Vec<Cluster> {
    let mask: Vec<bool> = fractions.iter().map(|&f| f >= CELL_THRESHOLD).collect();
    let mut visited = vec![false; mask.len()];
    let mut clusters = Vec::new();

    for start in 0..mask.len() {
        if !mask[start] || visited[start] {
            continue;
        }

        let mut cluster = Cluster {
            min_cx: u32::MAX,
            max_cx: 0,
            min_cy: u32::MAX,
            max_cy: 0,
            cells: 0,
            fraction_sum: 0.0,
        };

        let mut stack = vec![start];
        visited[start] = true;
        while let Some(idx) = stack.pop() {
            let cx = (idx as u32) % GRID_COLS;
            let cy = (idx as u32) / GRID_COLS;

            cluster.min_cx = cluster.min_cx.min(cx);
            cluster.max_cx = cluster.max_cx.max(cx);
            cluster.min_cy = cluster.min_cy.min(cy);
            cluster.max_cy = cluster.max_cy.max(cy);
            cluster.cells += 1;
            cluster.fraction_sum += fractions[idx];

            let mut visit = |nx: u32, ny: u32| {
                let nidx = (ny * GRID_COLS + nx) as usize;
                if mask[nidx] && !visited[nidx] {
                    visited[nidx] = true;
                    stack.push(nidx);
                }
            };
            if cx > 0 {
                visit(cx - 1, cy);
            }
            if cx + 1 < GRID_COLS {
                visit(cx + 1, cy);
            }
            if cy > 0 {
                visit(cx, cy - 1);
            }
            if cy + 1 < GRID_ROWS {
                visit(cx, cy + 1);
            }
        }

        clusters.push(cluster);
    }

    clusters
}

/// Cell-index bounds to a normalized bottom-left-origin box. Grid rows run
/// top-down, so the vertical axis flips here.
fn cluster_to_rect(cluster: &Cluster, grid: &CellGrid) -> NormalizedRect {
    let x = cluster.min_cx as f64 * grid.norm_cell_w();
    let w = (cluster.max_cx - cluster.min_cx + 1) as f64 * grid.norm_cell_w();
    let top = cluster.min_cy as f64 * grid.norm_cell_h();
    let h = (cluster.max_cy - cluster.min_cy + 1) as f64 * grid.norm_cell_h();
    NormalizedRect {
        x,
        y: 1.0 - (top + h),
        w,
        h,
    }
}

#[cfg(test)]
mod tests {
    use image::Rgb;
    use tracing_test::traced_test;

    use super::*;

    const SKIN: Rgb<u8> = Rgb([209, 163, 127]);
    const BACKGROUND: Rgb<u8> = Rgb([30, 40, 200]);

    fn image_with_skin_block(x0: u32, y0: u32, w: u32, h: u32) -> RgbImage {
        let mut image = RgbImage::from_pixel(128, 128, BACKGROUND);
        for y in y0..y0 + h {
            for x in x0..x0 + w {
                image.put_pixel(x, y, SKIN);
            }
        }
        image
    }

    #[test]
    #[traced_test]
    fn detects_single_skin_block() {
        // Block aligned to the 4px cell grid: columns 32..64, rows 64..96.
        let image = image_with_skin_block(32, 64, 32, 32);
        let faces = SkinRegionDetector.detect_faces(&image);

        assert_eq!(faces.len(), 1);
        let b = faces[0].bounding_box;
        assert!((b.x - 0.25).abs() < 1e-9);
        assert!((b.w - 0.25).abs() < 1e-9);
        assert!((b.h - 0.25).abs() < 1e-9);
        // Rows 64..96 from the top are y in [0.25, 0.5) from the bottom.
        assert!((b.y - 0.25).abs() < 1e-9);
        assert!(faces[0].confidence > 0.9);
    }

    #[test]
    fn detects_two_separate_blocks_largest_first() {
        let mut image = image_with_skin_block(8, 8, 48, 48);
        for y in 96..120 {
            for x in 96..120 {
                image.put_pixel(x, y, SKIN);
            }
        }

        let faces = SkinRegionDetector.detect_faces(&image);
        assert_eq!(faces.len(), 2);
        let first = faces[0].bounding_box;
        let second = faces[1].bounding_box;
        assert!(first.w * first.h > second.w * second.h);
    }

    #[test]
    fn no_faces_on_uniform_background() {
        let image = RgbImage::from_pixel(128, 128, BACKGROUND);
        assert!(SkinRegionDetector.detect_faces(&image).is_empty());
    }

    #[test]
    fn tiny_frame_yields_no_faces() {
        let image = RgbImage::from_pixel(16, 16, SKIN);
        assert!(SkinRegionDetector.detect_faces(&image).is_empty());
    }

    #[test]
    fn speck_below_min_cluster_size_is_ignored() {
        // One grid cell (4x4 px) of skin: below MIN_CLUSTER_CELLS.
        let image = image_with_skin_block(64, 64, 4, 4);
        assert!(SkinRegionDetector.detect_faces(&image).is_empty());
    }
}
