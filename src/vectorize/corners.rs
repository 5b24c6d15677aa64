//! Corner detection and outline partitioning.
//!
//! A point's corner angle is measured between the summed offset vectors to
//! its `corner_surround` predecessors and successors. Any point at or
//! below `corner_threshold` opens a search window that slides forward past
//! the best candidate seen so far; candidates at or below
//! `corner_always_threshold` are taken outright, and otherwise the single
//! best (plus any within epsilon of it) wins the window.

use log::debug;

use super::outline::PixelOutline;
use crate::config::FittingOptions;
use crate::curve::{Curve, CurveList};
use crate::distmap::DistanceMap;
use crate::error::TraceError;
use crate::geom::{self, epsilon_equal, int_subtract, RealCoord, Vector};

/// The corner-window size to use for `outline`, shrunk for outlines too
/// short for the configured one. `None` means the outline cannot support
/// corner detection at all.
pub fn effective_surround(outline: &PixelOutline, opts: &FittingOptions) -> Option<usize> {
    if outline.len() > opts.corner_surround * 2 + 2 {
        Some(opts.corner_surround)
    } else {
        let shrunk = outline.len().saturating_sub(3) / 2;
        (shrunk >= 2).then_some(shrunk)
    }
}

/// Find the indices of outline points that remain hard vertices.
///
/// Returned indices are sorted, unique, in `[0, len)`, and never
/// cyclically adjacent to both ends; with `remove_adjacent_corners` no two
/// returned indices are consecutive.
pub fn find_corners(
    outline: &PixelOutline,
    opts: &FittingOptions,
    surround: usize,
) -> Result<Vec<usize>, TraceError> {
    let len = outline.len();
    let mut corners: Vec<usize> = Vec::new();

    let mut p = 0;
    while p < len {
        let angle = corner_angle(outline, p, surround)?;
        if angle > opts.corner_threshold {
            p += 1;
            continue;
        }

        if angle <= opts.corner_always_threshold {
            corners.push(p);
        }

        // Keep looking: a sharper corner may sit within `surround` points
        // of the current best.
        let mut best_index = p;
        let mut best_angle = angle;
        let mut equally_good: Vec<usize> = Vec::new();
        let mut q = p;
        let mut i = p + 1;
        loop {
            if outline.open && i >= len {
                break;
            }
            q = i % len;
            let a = corner_angle(outline, q, surround)?;
            if a <= opts.corner_always_threshold && q >= p {
                corners.push(q);
            }
            if epsilon_equal(a, best_angle) {
                equally_good.push(q);
            } else if a < best_angle {
                best_angle = a;
                best_index = q;
                equally_good.clear();
            }
            i += 1;
            if i >= best_index + surround || i - p >= len {
                break;
            }
        }

        // Candidates at or below the always-threshold were taken inside
        // the window; the best of a merely-sharp window is taken here.
        if best_angle > opts.corner_always_threshold {
            corners.push(best_index);
            corners.extend_from_slice(&equally_good);
        }

        if q < p {
            break; // the window wrapped the cyclic outline
        }
        p = q + 1;
    }

    let corners = remove_adjacent(corners, len - 1, opts.remove_adjacent_corners);
    debug!("{} corners in outline of {} points", corners.len(), len);
    Ok(corners)
}

/// Angle (degrees) between the summed offsets to the `surround` points on
/// either side of `index`. An open outline clamps the window at its ends
/// instead of wrapping.
fn corner_angle(outline: &PixelOutline, index: usize, surround: usize) -> Result<f64, TraceError> {
    let len = outline.len();
    let candidate = outline.points[index];
    let mut inward = Vector::ZERO;
    let mut outward = Vector::ZERO;
    for n in 1..=surround {
        if !outline.open || index >= n {
            let before = outline.points[(index + len - n) % len];
            inward = inward + int_subtract(before, candidate);
        }
        if !outline.open || index + n < len {
            let after = outline.points[(index + n) % len];
            outward = outward + int_subtract(after, candidate);
        }
    }
    geom::angle_degrees(inward, outward)
}

/// Sort, deduplicate, and thin a corner list: a corner at the last index
/// is dropped when index 0 is also a corner (they are cyclically
/// adjacent), and with `remove_adjacent` one of each consecutive pair goes.
fn remove_adjacent(mut corners: Vec<usize>, last_index: usize, remove_adjacent: bool) -> Vec<usize> {
    corners.sort_unstable();
    corners.dedup();
    if corners.is_empty() {
        return corners;
    }
    let first = corners[0];
    let mut out: Vec<usize> = vec![first];
    for &c in &corners[1..] {
        let prev = *out.last().unwrap();
        if c == last_index && first == 0 {
            continue;
        }
        if remove_adjacent && c == prev + 1 {
            continue;
        }
        out.push(c);
    }
    out
}

/// Partition an outline into curves at its corners.
///
/// Each curve spans an inclusive corner-to-corner range, so every corner
/// is both one curve's last point and the next curve's first. No corners
/// means a single curve over the whole outline, cyclic unless the outline
/// is open. With a distance map, each point's z becomes a stroke
/// half-width hint.
pub fn split_at_corners(
    outline: &PixelOutline,
    corners: &[usize],
    opts: &FittingOptions,
    dmap: Option<&DistanceMap>,
    bitmap_height: u32,
) -> CurveList {
    let len = outline.len();
    let mut list = CurveList::new(outline.clockwise, outline.open, outline.color);
    let point = |i: usize| -> RealCoord {
        let c = outline.points[i];
        let mut p = RealCoord::from(c);
        if let Some(dm) = dmap {
            let row = bitmap_height as i32 - 1 - c.y;
            if row >= 0 && c.x >= 0 {
                p.z = dm.neighborhood_max(row as u32, c.x as u32) * opts.width_weight_factor;
            }
        }
        p
    };

    if outline.open {
        // Open outlines keep their endpoints; corners only add interior cuts.
        let mut bounds = vec![0];
        bounds.extend(corners.iter().copied().filter(|&c| c != 0 && c != len - 1));
        bounds.push(len - 1);
        for pair in bounds.windows(2) {
            let mut curve = Curve::new(false);
            for i in pair[0]..=pair[1] {
                curve.push(point(i));
            }
            list.curves.push(curve);
        }
    } else if corners.is_empty() {
        let mut curve = Curve::new(true);
        for i in 0..len {
            curve.push(point(i));
        }
        list.curves.push(curve);
    } else {
        for (n, &start) in corners.iter().enumerate() {
            let end = corners[(n + 1) % corners.len()];
            let mut curve = Curve::new(false);
            let mut i = start;
            loop {
                curve.push(point(i));
                if i == end && curve.len() > 1 {
                    break;
                }
                i = (i + 1) % len;
            }
            list.curves.push(curve);
        }
    }
    list.curves.retain(|c| c.len() > 1);
    list
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmap::Color;
    use crate::geom::Coord;

    fn square_outline(side: i32) -> PixelOutline {
        // Counterclockwise boundary starting at the top-left pixel.
        let mut points = Vec::new();
        for y in (0..side).rev() {
            points.push(Coord::new(0, y));
        }
        for x in 1..side {
            points.push(Coord::new(x, 0));
        }
        for y in 1..side {
            points.push(Coord::new(side - 1, y));
        }
        for x in (1..side - 1).rev() {
            points.push(Coord::new(x, side - 1));
        }
        PixelOutline { points, clockwise: false, open: false, color: Color::BLACK }
    }

    #[test]
    fn square_has_four_corners() {
        let outline = square_outline(10);
        let opts = FittingOptions::default();
        let surround = effective_surround(&outline, &opts).unwrap();
        let corners = find_corners(&outline, &opts, surround).unwrap();
        assert_eq!(corners, vec![0, 9, 18, 27]);
    }

    #[test]
    fn corner_indices_stay_in_bounds_and_non_adjacent() {
        let outline = square_outline(6);
        let opts = FittingOptions { remove_adjacent_corners: true, ..Default::default() };
        let surround = effective_surround(&outline, &opts).unwrap();
        let corners = find_corners(&outline, &opts, surround).unwrap();
        assert!(!corners.is_empty());
        for w in corners.windows(2) {
            assert!(w[1] > w[0] + 1, "adjacent corners {} and {}", w[0], w[1]);
        }
        assert!(corners.iter().all(|&c| c < outline.len()));
    }

    #[test]
    fn short_outline_gets_no_corner_window() {
        let outline = PixelOutline {
            points: (0..5).map(|x| Coord::new(x, 0)).collect(),
            clockwise: false,
            open: false,
            color: Color::BLACK,
        };
        assert_eq!(effective_surround(&outline, &FittingOptions::default()), None);
    }

    #[test]
    fn corners_are_shared_between_curves() {
        let outline = square_outline(10);
        let opts = FittingOptions::default();
        let corners = vec![0usize, 9, 18, 27];
        let list = split_at_corners(&outline, &corners, &opts, None, 10);
        assert_eq!(list.len(), 4);
        for n in 0..4 {
            let curve = &list.curves[n];
            let next = &list.curves[list.next_index(n)];
            assert_eq!(curve.len(), 10);
            assert!(!curve.cyclic);
            assert_eq!(curve.last_point(), next.point(0));
        }
    }

    #[test]
    fn open_outline_endpoints_never_become_cut_points() {
        let outline = PixelOutline {
            points: (0..9).map(|x| Coord::new(x, 0)).collect(),
            clockwise: false,
            open: true,
            color: Color::BLACK,
        };
        let opts = FittingOptions::default();
        let surround = effective_surround(&outline, &opts).unwrap();
        let corners = find_corners(&outline, &opts, surround).unwrap();
        let list = split_at_corners(&outline, &corners, &opts, None, 1);
        assert_eq!(list.len(), 1);
        assert_eq!(list.curves[0].len(), 9);
        assert!(!list.curves[0].cyclic);
    }

    #[test]
    fn no_corners_gives_one_cyclic_curve() {
        let outline = square_outline(8);
        let list = split_at_corners(&outline, &[], &FittingOptions::default(), None, 8);
        assert_eq!(list.len(), 1);
        assert!(list.curves[0].cyclic);
        assert_eq!(list.curves[0].len(), outline.len());
    }
}
