//! Two-pass chamfer distance transform.
//!
//! Each pixel's distance is the cheapest weighted path to the target color
//! (normally the background), where a step into a pixel costs its ink
//! weight `1 − luminance/255` (diagonals ×√2). The result feeds stroke
//! half-width hints into centerline fitting.

use crate::bitmap::{Bitmap, Color};

const SQRT2: f64 = std::f64::consts::SQRT_2;

/// A per-pixel weighted distance grid, indexed `(row, col)`.
#[derive(Debug, Clone)]
pub struct DistanceMap {
    width: u32,
    height: u32,
    dist: Vec<f64>,
}

impl DistanceMap {
    /// Build the map for `bitmap`, measuring distance from pixels of
    /// `target` color.
    ///
    /// With `padded`, pixels on the bitmap border are clamped to at most
    /// one weighted step, as if the target surrounded the image.
    pub fn new(bitmap: &Bitmap, target: Color, padded: bool) -> DistanceMap {
        let (w, h) = (bitmap.width() as usize, bitmap.height() as usize);
        let mut dist = vec![f64::INFINITY; w * h];
        let mut weight = vec![0.0f64; w * h];

        for row in 0..h {
            for col in 0..w {
                let i = row * w + col;
                let color = bitmap.get_color(row as u32, col as u32);
                weight[i] = 1.0 - color.luminance() as f64 / 255.0;
                if color == target {
                    dist[i] = 0.0;
                } else if padded && (row == 0 || col == 0 || row == h - 1 || col == w - 1) {
                    dist[i] = weight[i];
                }
            }
        }

        // Forward pass: relax from the upper, left, and upper-right
        // neighbors already finalized by the scan order.
        for row in 0..h {
            for col in 0..w {
                let i = row * w + col;
                if dist[i] == 0.0 {
                    continue;
                }
                let mut d = dist[i];
                if row > 0 {
                    d = d.min(dist[i - w] + weight[i]);
                    if col + 1 < w {
                        d = d.min(dist[i - w + 1] + weight[i] * SQRT2);
                    }
                }
                if col > 0 {
                    d = d.min(dist[i - 1] + weight[i]);
                }
                dist[i] = d;
            }
        }

        // Backward pass: lower, right, lower-left.
        for row in (0..h).rev() {
            for col in (0..w).rev() {
                let i = row * w + col;
                if dist[i] == 0.0 {
                    continue;
                }
                let mut d = dist[i];
                if row + 1 < h {
                    d = d.min(dist[i + w] + weight[i]);
                    if col > 0 {
                        d = d.min(dist[i + w - 1] + weight[i] * SQRT2);
                    }
                }
                if col + 1 < w {
                    d = d.min(dist[i + 1] + weight[i]);
                }
                dist[i] = d;
            }
        }

        DistanceMap { width: w as u32, height: h as u32, dist }
    }

    pub fn get(&self, row: u32, col: u32) -> f64 {
        self.dist[(row * self.width + col) as usize]
    }

    /// Maximum distance over the 3×3 neighborhood of `(row, col)`; the
    /// stroke half-width hint for a skeleton pixel.
    pub fn neighborhood_max(&self, row: u32, col: u32) -> f64 {
        let mut best = 0.0f64;
        for dr in -1i64..=1 {
            for dc in -1i64..=1 {
                let r = row as i64 + dr;
                let c = col as i64 + dc;
                if r < 0 || c < 0 || r >= self.height as i64 || c >= self.width as i64 {
                    continue;
                }
                best = best.max(self.get(r as u32, c as u32));
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TraceError;

    fn uniform_black_with_white_at(w: u32, h: u32, wr: u32, wc: u32) -> Result<Bitmap, TraceError> {
        let mut data = vec![0u8; (w * h) as usize];
        data[(wr * w + wc) as usize] = 255;
        Bitmap::new(w, h, 1, data)
    }

    #[test]
    fn distance_is_monotone_along_rays_from_a_single_target() {
        let bm = uniform_black_with_white_at(11, 11, 5, 5).unwrap();
        let dm = DistanceMap::new(&bm, Color::WHITE, false);
        assert_eq!(dm.get(5, 5), 0.0);
        for (dr, dc) in [(0i64, 1i64), (1, 0), (0, -1), (-1, 0), (1, 1), (-1, -1)] {
            let mut prev = 0.0;
            for step in 1..=5 {
                let r = (5 + dr * step) as u32;
                let c = (5 + dc * step) as u32;
                let d = dm.get(r, c);
                assert!(d >= prev, "ray ({dr},{dc}) step {step}: {d} < {prev}");
                prev = d;
            }
        }
    }

    #[test]
    fn unit_weight_cardinal_distance_counts_steps() {
        let bm = uniform_black_with_white_at(9, 9, 4, 4).unwrap();
        let dm = DistanceMap::new(&bm, Color::WHITE, false);
        assert!((dm.get(4, 7) - 3.0).abs() < 1e-9);
        assert!((dm.get(1, 4) - 3.0).abs() < 1e-9);
        // The passes relax the anti-diagonal directions at sqrt(2) cost.
        assert!((dm.get(3, 5) - SQRT2).abs() < 1e-9);
        assert!((dm.get(2, 6) - 2.0 * SQRT2).abs() < 1e-9);
    }

    #[test]
    fn padding_clamps_the_border() {
        let mut data = vec![0u8; 49];
        data[3 * 7 + 3] = 255;
        let bm = Bitmap::new(7, 7, 1, data).unwrap();
        let dm = DistanceMap::new(&bm, Color::WHITE, true);
        for col in 0..7 {
            assert!(dm.get(0, col) <= 1.0);
            assert!(dm.get(6, col) <= 1.0);
        }
    }

    #[test]
    fn neighborhood_max_dominates_the_center() {
        let bm = uniform_black_with_white_at(9, 9, 0, 0).unwrap();
        let dm = DistanceMap::new(&bm, Color::WHITE, false);
        assert!(dm.neighborhood_max(4, 4) >= dm.get(4, 4));
    }
}
