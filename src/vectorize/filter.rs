//! In-place curve conditioning before fitting: knee removal and local
//! smoothing.

use crate::config::FittingOptions;
use crate::curve::{Curve, CurvePoint};
use crate::geom::{int_subtract, Coord, RealCoord, Vector};

/// A smoothing step smaller than this on every axis aborts the whole
/// iteration, keeping the pre-iteration curve (repeated tiny steps walk
/// the curve into self-intersection).
const FILTER_EPSILON: f64 = 0.3;

/// True when the integer deltas to the neighbors form one of the four
/// clockwise right-angle staircase patterns.
fn clockwise_knee(prev: Vector, next: Vector) -> bool {
    (prev.dx == -1.0 && next.dy == -1.0)
        || (prev.dy == 1.0 && next.dx == 1.0)
        || (prev.dx == 1.0 && next.dy == 1.0)
        || (prev.dy == -1.0 && next.dx == -1.0)
}

fn counterclockwise_knee(prev: Vector, next: Vector) -> bool {
    (prev.dy == 1.0 && next.dx == -1.0)
        || (prev.dx == 1.0 && next.dy == -1.0)
        || (prev.dy == -1.0 && next.dx == 1.0)
        || (prev.dx == -1.0 && next.dy == 1.0)
}

/// Drop single-pixel staircase artifacts: points forming an exact
/// integer-grid right angle against their neighbors. Endpoints are kept
/// unless the curve is cyclic.
pub fn remove_knee_points(curve: &mut Curve, clockwise: bool) {
    let len = curve.len();
    if len < 3 {
        return;
    }
    let offset = usize::from(!curve.cyclic);
    let mut kept: Vec<CurvePoint> = Vec::with_capacity(len);
    if offset == 1 {
        kept.push(CurvePoint { coord: curve.point(0), t: 0.0 });
    }

    let prev_index = curve.prev(offset).unwrap_or(0);
    let mut previous: Coord = curve.point(prev_index).to_int();
    for i in offset..len - offset {
        let current = curve.point(i).to_int();
        let next = curve.point(curve.next(i).unwrap_or(len - 1)).to_int();
        let prev_delta = int_subtract(previous, current);
        let next_delta = int_subtract(next, current);
        let knee = if clockwise {
            clockwise_knee(prev_delta, next_delta)
        } else {
            counterclockwise_knee(prev_delta, next_delta)
        };
        if !knee {
            previous = current;
            kept.push(CurvePoint { coord: RealCoord::from(current), t: 0.0 });
        }
    }

    if offset == 1 {
        kept.push(CurvePoint { coord: curve.last_point(), t: 0.0 });
    }
    curve.replace_points(kept);
}

/// `filter_iterations` passes of local averaging toward the two points on
/// either side, endpoints held fixed unless cyclic. Curves under 5 points
/// are left alone.
pub fn filter(curve: &mut Curve, opts: &FittingOptions) {
    if curve.len() < 5 {
        return;
    }
    let offset = usize::from(!curve.cyclic);

    let mut prev_new = RealCoord::new(f64::MAX, f64::MAX, f64::MAX);
    for _ in 0..opts.filter_iterations {
        let len = curve.len();
        let mut new_points: Vec<CurvePoint> = Vec::with_capacity(len);
        if offset == 1 {
            new_points.push(CurvePoint { coord: curve.point(0), t: 0.0 });
        }

        let mut collapsed = false;
        for i in offset..len - offset {
            let candidate = curve.point(i);

            // Offsets from up to two neighbors on each side; the window
            // never reaches across an open curve's ends.
            let mut sum = Vector::ZERO;
            let mut count = 0usize;
            let prev = curve.prev(i);
            let prevprev = prev.and_then(|p| curve.prev(p));
            let next = curve.next(i);
            let nextnext = next.and_then(|n| curve.next(n));
            for neighbor in [prev, prevprev, next, nextnext].into_iter().flatten() {
                sum = sum + (curve.point(neighbor) - candidate);
                count += 1;
            }

            // The candidate counts (2n + 2) times in the average.
            let new_point = candidate + sum * (1.0 / (count + 2) as f64);
            if (prev_new.x - new_point.x).abs() < FILTER_EPSILON
                && (prev_new.y - new_point.y).abs() < FILTER_EPSILON
                && (prev_new.z - new_point.z).abs() < FILTER_EPSILON
            {
                collapsed = true;
                break;
            }
            prev_new = new_point;
            new_points.push(CurvePoint { coord: new_point, t: 0.0 });
        }

        if collapsed {
            break;
        }
        if offset == 1 {
            new_points.push(CurvePoint { coord: curve.last_point(), t: 0.0 });
        }
        curve.replace_points(new_points);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curve_of(points: &[(f64, f64)], cyclic: bool) -> Curve {
        let mut c = Curve::new(cyclic);
        for &(x, y) in points {
            c.push(RealCoord::new(x, y, 0.0));
        }
        c
    }

    #[test]
    fn staircase_knee_is_removed() {
        // At (1, 0): prev delta (-1, 0), next delta (0, 1), a
        // counterclockwise knee.
        let mut c = curve_of(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (2.0, 1.0), (3.0, 1.0)], false);
        remove_knee_points(&mut c, false);
        assert_eq!(c.len(), 4);
        assert!((0..c.len()).all(|i| c.point(i) != RealCoord::new(1.0, 0.0, 0.0)));
    }

    #[test]
    fn endpoints_survive_knee_removal() {
        let mut c = curve_of(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)], false);
        remove_knee_points(&mut c, false);
        assert_eq!(c.point(0), RealCoord::new(0.0, 0.0, 0.0));
        assert_eq!(c.last_point(), RealCoord::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn filtering_keeps_collinear_points_collinear() {
        let pts: Vec<(f64, f64)> = (0..8).map(|i| (i as f64, 2.0 * i as f64)).collect();
        let mut c = curve_of(&pts, false);
        filter(&mut c, &FittingOptions::default());
        assert_eq!(c.point(0), RealCoord::new(0.0, 0.0, 0.0));
        assert_eq!(c.last_point(), RealCoord::new(7.0, 14.0, 0.0));
        for i in 0..c.len() {
            let p = c.point(i);
            assert!((p.y - 2.0 * p.x).abs() < 1e-9, "point {i} drifted off the line");
        }
    }

    #[test]
    fn short_curves_are_not_filtered() {
        let mut c = curve_of(&[(0.0, 0.0), (5.0, 9.0), (10.0, 0.0), (15.0, 9.0)], false);
        let before: Vec<RealCoord> = (0..c.len()).map(|i| c.point(i)).collect();
        filter(&mut c, &FittingOptions::default());
        let after: Vec<RealCoord> = (0..c.len()).map(|i| c.point(i)).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn smoothing_pulls_an_outlier_toward_its_neighbors() {
        let mut c = curve_of(
            &[(0.0, 0.0), (1.0, 0.0), (2.0, 3.0), (3.0, 0.0), (4.0, 0.0)],
            false,
        );
        let opts = FittingOptions { filter_iterations: 1, ..Default::default() };
        filter(&mut c, &opts);
        assert!(c.point(2).y < 3.0);
    }
}
