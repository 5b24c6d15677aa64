//! Least-squares cubic fitting.
//!
//! Each curve between corners becomes one or more splines:
//!
//! 1. estimate endpoint tangents (frozen in the curve's shared handles),
//! 2. assign chord-length parameters,
//! 3. solve a 2x2 least-squares system for the two control-point offsets,
//! 4. accept, demote to a line, or subdivide at the worst point and recurse.
//!
//! A curve that cannot be fit is reported through the warning hook and
//! dropped; fitting always produces output for the remaining curves.

use super::filter::{filter, remove_knee_points};
use crate::config::FittingOptions;
use crate::curve::{Curve, CurveList};
use crate::geom::Vector;
use crate::spline::{Spline, SplineDegree, SplineList};
use crate::TraceHooks;

/// Fit every curve in the list, then post-process junctions.
///
/// Knee removal and filtering happen here so the caller hands over raw
/// corner partitions. Curves that fail to fit are skipped with a warning.
pub fn fit_curve_list(
    list: &mut CurveList,
    opts: &FittingOptions,
    hooks: &mut TraceHooks,
) -> SplineList {
    for curve in &mut list.curves {
        remove_knee_points(curve, list.clockwise);
        filter(curve, opts);
    }
    list.curves.retain(|c| c.len() > 1);

    let mut splines = SplineList::new(list.clockwise, list.open, list.color);
    for curve in &mut list.curves {
        if let Some(fitted) = fit_curve(curve, opts, hooks) {
            splines.splines.extend(fitted);
        }
    }
    change_bad_lines(&mut splines, opts);
    align(&mut splines, opts);
    splines
}

/// Fit one curve. `None` means the curve is degenerate or subdivision
/// bottomed out; a warning has already been issued.
pub fn fit_curve(
    curve: &mut Curve,
    opts: &FittingOptions,
    hooks: &mut TraceHooks,
) -> Option<Vec<Spline>> {
    let len = curve.len();
    if len < 2 {
        hooks.warn("dropping a curve with fewer than two points");
        return None;
    }
    // Subdivision halves point counts, so the recursion is logarithmic;
    // the slack absorbs uneven splits near the ends.
    let max_depth = (len as f64).log2().ceil() as usize + 8;
    fit_recursive(curve, opts, hooks, 0, max_depth)
}

fn fit_recursive(
    curve: &mut Curve,
    opts: &FittingOptions,
    hooks: &mut TraceHooks,
    depth: usize,
    max_depth: usize,
) -> Option<Vec<Spline>> {
    if curve.len() < 4 {
        return Some(vec![fit_with_line(curve)]);
    }

    set_initial_parameter_values(curve);
    ensure_tangents(curve, opts.tangent_surround);
    let mut spline = fit_one_spline(curve);
    let (worst, error) = find_error(curve, &spline);

    if error < opts.error_threshold && !curve.cyclic {
        let (linear, mean_deviation) = spline_linear_enough(&spline, curve, opts);
        spline.linearity = mean_deviation;
        if linear {
            spline.degree = SplineDegree::Linear;
        }
        return Some(vec![spline]);
    }

    // Too far off (or a closed loop, which one cubic can never close):
    // split at the worst point and fit the halves.
    if depth >= max_depth {
        hooks.warn("dropping a curve that would not converge");
        return None;
    }
    if worst == 0 || worst == curve.len() - 1 {
        hooks.warn("dropping a curve whose worst fit point is an endpoint");
        return None;
    }

    let (mut left, mut right) = curve.subdivide(worst);
    let joint = find_half_tangent(&left, false, opts.tangent_surround)
        + find_half_tangent(&right, true, opts.tangent_surround);
    left.end_tangent.set(joint.resolve());

    let left_fit = fit_recursive(&mut left, opts, hooks, depth + 1, max_depth);
    let right_fit = fit_recursive(&mut right, opts, hooks, depth + 1, max_depth);
    if left_fit.is_none() && right_fit.is_none() {
        hooks.warn("dropping a curve after both halves failed to fit");
        return None;
    }
    let mut out = left_fit.unwrap_or_default();
    out.extend(right_fit.unwrap_or_default());
    Some(out)
}

/// A straight segment with control points at the chord thirds.
fn fit_with_line(curve: &Curve) -> Spline {
    let a = curve.point(0);
    let b = curve.last_point();
    let chord = b - a;
    Spline {
        points: [a, a + chord * (1.0 / 3.0), a + chord * (2.0 / 3.0), b],
        degree: SplineDegree::Linear,
        linearity: 0.0,
    }
}

/// Chord-length parameterization over all three components, normalized to
/// `[0, 1]`. A degenerate curve of coincident points gets all-zero `t`.
fn set_initial_parameter_values(curve: &mut Curve) {
    curve.set_t(0, 0.0);
    for i in 1..curve.len() {
        let d = curve.point(i).distance(curve.point(i - 1));
        let t = curve.t(i - 1) + d;
        curve.set_t(i, t);
    }
    let total = curve.t(curve.len() - 1);
    let total = if total == 0.0 { 1.0 } else { total };
    for i in 1..curve.len() {
        let t = curve.t(i) / total;
        curve.set_t(i, t);
    }
}

/// Summed forward-pointing offsets over up to `surround` points at one end.
struct HalfTangent {
    sum: Vector,
    count: usize,
}

impl std::ops::Add for HalfTangent {
    type Output = HalfTangent;
    fn add(self, o: HalfTangent) -> HalfTangent {
        HalfTangent { sum: self.sum + o.sum, count: self.count + o.count }
    }
}

impl HalfTangent {
    fn resolve(&self) -> Vector {
        if self.count > 0 {
            self.sum * (1.0 / self.count as f64)
        } else {
            Vector::ZERO
        }
    }
}

fn find_half_tangent(curve: &Curve, to_start: bool, surround: usize) -> HalfTangent {
    let len = curve.len();
    let mut sum = Vector::ZERO;
    let mut count = 0;
    for i in 1..=surround {
        if i >= len {
            break;
        }
        let offset = if to_start {
            curve.point(i) - curve.point(0)
        } else {
            curve.last_point() - curve.point(len - 1 - i)
        };
        sum = sum + offset;
        count += 1;
    }
    HalfTangent { sum, count }
}

/// Freeze any endpoint tangent not already shared in from a neighbor.
///
/// A cyclic curve wraps, so both ends get the same blend of the incoming
/// and outgoing half tangents. A zero estimate retries with a shrinking
/// window, falling back to the chord.
fn ensure_tangents(curve: &Curve, surround: usize) {
    if curve.cyclic {
        let v = tangent_with_retry(curve, surround, |c, s| {
            (find_half_tangent(c, false, s) + find_half_tangent(c, true, s)).resolve()
        });
        curve.start_tangent.set(v);
        curve.end_tangent.set(v);
        return;
    }
    if curve.start_tangent.get().is_none() {
        let v = tangent_with_retry(curve, surround, |c, s| find_half_tangent(c, true, s).resolve());
        curve.start_tangent.set(v);
    }
    if curve.end_tangent.get().is_none() {
        let v =
            tangent_with_retry(curve, surround, |c, s| find_half_tangent(c, false, s).resolve());
        curve.end_tangent.set(v);
    }
}

fn tangent_with_retry(
    curve: &Curve,
    surround: usize,
    estimate: impl Fn(&Curve, usize) -> Vector,
) -> Vector {
    for s in (1..=surround).rev() {
        let v = estimate(curve, s);
        if !v.is_zero() {
            return v;
        }
    }
    curve.last_point() - curve.point(0)
}

/// Solve for the two control points of a single cubic.
///
/// With the endpoints fixed and the control points constrained to the
/// tangent directions, only two scalar offsets remain; their normal
/// equations are a 2x2 system solved by Cramer's rule. A singular system
/// (straight tangents, degenerate data) leaves both offsets at zero.
fn fit_one_spline(curve: &Curve) -> Spline {
    let start = curve.point(0);
    let end = curve.last_point();
    let t1_hat = curve.start_tangent.get().unwrap_or(Vector::ZERO).normalized();
    let t2_hat = (curve.end_tangent.get().unwrap_or(Vector::ZERO) * -1.0).normalized();

    let mut c = [[0.0f64; 2]; 2];
    let mut x = [0.0f64; 2];
    for i in 0..curve.len() {
        let t = curve.t(i);
        let omt = 1.0 - t;
        let b0 = omt * omt * omt;
        let b1 = 3.0 * t * omt * omt;
        let b2 = 3.0 * t * t * omt;
        let b3 = t * t * t;

        let a1 = t1_hat * b1;
        let a2 = t2_hat * b2;
        let p = curve.point(i);
        let d = Vector::new(
            p.x - (start.x * (b0 + b1) + end.x * (b2 + b3)),
            p.y - (start.y * (b0 + b1) + end.y * (b2 + b3)),
            p.z - (start.z * (b0 + b1) + end.z * (b2 + b3)),
        );

        c[0][0] += a1.dot(a1);
        c[0][1] += a1.dot(a2);
        c[1][1] += a2.dot(a2);
        x[0] += d.dot(a1);
        x[1] += d.dot(a2);
    }
    c[1][0] = c[0][1];

    let det = c[0][0] * c[1][1] - c[0][1] * c[1][0];
    let (alpha1, alpha2) = if det == 0.0 {
        (0.0, 0.0)
    } else {
        ((x[0] * c[1][1] - x[1] * c[0][1]) / det, (c[0][0] * x[1] - c[1][0] * x[0]) / det)
    };

    Spline {
        points: [start, start + t1_hat * alpha1, end + t2_hat * alpha2, end],
        degree: SplineDegree::Cubic,
        linearity: 0.0,
    }
}

/// Worst per-point deviation between the spline and the curve, at the
/// curve's own parameter values.
fn find_error(curve: &Curve, spline: &Spline) -> (usize, f64) {
    let mut worst = 0;
    let mut worst_error = 0.0;
    for i in 0..curve.len() {
        let err = spline.evaluate(curve.t(i)).distance(curve.point(i));
        if err > worst_error {
            worst_error = err;
            worst = i;
        }
    }
    (worst, worst_error)
}

/// Mean deviation of the spline from its own chord, and whether that is
/// small enough to call the segment a line.
///
/// The acceptance threshold is capped at half the chord so short segments
/// do not degrade into lines wholesale.
fn spline_linear_enough(spline: &Spline, curve: &Curve, opts: &FittingOptions) -> (bool, f64) {
    let start = spline.start();
    let end = spline.end();
    let chord = ((end.x - start.x).powi(2) + (end.y - start.y).powi(2)).sqrt();
    if chord == 0.0 {
        return (false, 0.0);
    }
    let dy = end.y - start.y;
    let dx = end.x - start.x;
    let mut sum = 0.0;
    for i in 0..curve.len() {
        let p = spline.evaluate(curve.t(i));
        sum += (dy * (p.x - start.x) - dx * (p.y - start.y)).abs() / chord;
    }
    let mean = sum / curve.len() as f64;
    (mean < opts.line_threshold.min(chord / 2.0), mean)
}

/// Revert dubious lines to cubics, but only in lists that kept at least
/// one real cubic; an all-line list is genuinely polygonal.
pub fn change_bad_lines(list: &mut SplineList, opts: &FittingOptions) {
    if !list.splines.iter().any(|s| s.degree == SplineDegree::Cubic) {
        return;
    }
    for s in &mut list.splines {
        if s.degree == SplineDegree::Linear && s.linearity > opts.line_reversion_threshold {
            s.degree = SplineDegree::Cubic;
        }
    }
}

/// Snap hairline gaps between consecutive splines shut, per axis, by
/// moving both endpoints to their average. Runs to a fixed point.
pub fn align(list: &mut SplineList, opts: &FittingOptions) {
    let len = list.splines.len();
    if len < 2 && list.open {
        return;
    }
    loop {
        let mut changed = false;
        let pairs = if list.open { len - 1 } else { len };
        for i in 0..pairs {
            let j = (i + 1) % len;
            let a = list.splines[i].points[3];
            let b = list.splines[j].points[0];
            let snap = |u: f64, v: f64| -> Option<f64> {
                let gap = (u - v).abs();
                (gap != 0.0 && gap <= opts.align_threshold).then(|| (u + v) / 2.0)
            };
            if let Some(x) = snap(a.x, b.x) {
                list.splines[i].points[3].x = x;
                list.splines[j].points[0].x = x;
                changed = true;
            }
            if let Some(y) = snap(a.y, b.y) {
                list.splines[i].points[3].y = y;
                list.splines[j].points[0].y = y;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
}
