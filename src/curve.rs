//! Curves: the mutable point lists sitting between pixel outlines and
//! fitted splines.
//!
//! A `Curve` owns its points plus a chord-length parameter per point. The
//! tangent at each end lives behind a [`SharedTangent`] handle so the two
//! curves meeting at a subdivision point see bit-for-bit the same vector:
//! the handle is computed once and frozen, never recomputed per side.

use std::cell::OnceCell;
use std::rc::Rc;

use crate::bitmap::Color;
use crate::geom::{RealCoord, Vector};

/// A curve point with its fitting parameter `t ∈ [0, 1]`.
#[derive(Debug, Clone, Copy)]
pub struct CurvePoint {
    pub coord: RealCoord,
    pub t: f64,
}

/// Compute-once-then-frozen tangent shared between adjacent curves.
#[derive(Debug, Clone, Default)]
pub struct SharedTangent(Rc<OnceCell<Vector>>);

impl SharedTangent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<Vector> {
        self.0.get().copied()
    }

    /// Freeze the tangent. A second set is ignored; the first writer wins.
    pub fn set(&self, v: Vector) {
        let _ = self.0.set(v);
    }
}

/// An ordered run of real coordinates between two corners (or a whole
/// outline when it has none).
#[derive(Debug, Clone, Default)]
pub struct Curve {
    points: Vec<CurvePoint>,
    pub cyclic: bool,
    pub start_tangent: SharedTangent,
    pub end_tangent: SharedTangent,
}

impl Curve {
    pub fn new(cyclic: bool) -> Self {
        Curve { points: Vec::new(), cyclic, ..Default::default() }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn push(&mut self, coord: RealCoord) {
        self.points.push(CurvePoint { coord, t: 0.0 });
    }

    pub fn point(&self, i: usize) -> RealCoord {
        self.points[i].coord
    }

    pub fn set_point(&mut self, i: usize, coord: RealCoord) {
        self.points[i].coord = coord;
    }

    pub fn last_point(&self) -> RealCoord {
        self.points[self.points.len() - 1].coord
    }

    pub fn t(&self, i: usize) -> f64 {
        self.points[i].t
    }

    pub fn set_t(&mut self, i: usize, t: f64) {
        self.points[i].t = t;
    }

    /// Index before `i`, wrapping when cyclic. `None` at the start of an
    /// open curve.
    pub fn prev(&self, i: usize) -> Option<usize> {
        if i > 0 {
            Some(i - 1)
        } else if self.cyclic {
            Some(self.points.len() - 1)
        } else {
            None
        }
    }

    /// Index after `i`, wrapping when cyclic. `None` at the end of an open
    /// curve.
    pub fn next(&self, i: usize) -> Option<usize> {
        if i + 1 < self.points.len() {
            Some(i + 1)
        } else if self.cyclic {
            Some(0)
        } else {
            None
        }
    }

    /// Replace the point list, keeping tangents and flags.
    pub fn replace_points(&mut self, points: Vec<CurvePoint>) {
        self.points = points;
    }

    pub fn points(&self) -> &[CurvePoint] {
        &self.points
    }

    /// Split into `[0..=index]` and `[index..]`, the split point shared as
    /// the left curve's last and the right curve's first point.
    ///
    /// The children copy their ranges; parameter values are recomputed per
    /// child at fit time anyway. Endpoint tangent handles are inherited
    /// from the parent so an already-frozen corner tangent stays shared.
    pub fn subdivide(&self, index: usize) -> (Curve, Curve) {
        let mut left = Curve::new(false);
        let mut right = Curve::new(false);
        left.points = self.points[..=index].to_vec();
        right.points = self.points[index..].to_vec();
        left.start_tangent = self.start_tangent.clone();
        right.end_tangent = self.end_tangent.clone();
        let shared = SharedTangent::new();
        left.end_tangent = shared.clone();
        right.start_tangent = shared;
        (left, right)
    }
}

/// The corner partition of one pixel outline, in traversal order. Curves
/// are chained circularly through modular indexing ([`CurveList::next_index`]).
#[derive(Debug, Clone)]
pub struct CurveList {
    pub curves: Vec<Curve>,
    pub clockwise: bool,
    pub open: bool,
    pub color: Color,
}

impl CurveList {
    pub fn new(clockwise: bool, open: bool, color: Color) -> Self {
        CurveList { curves: Vec::new(), clockwise, open, color }
    }

    pub fn len(&self) -> usize {
        self.curves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }

    pub fn next_index(&self, i: usize) -> usize {
        (i + 1) % self.curves.len()
    }

    pub fn prev_index(&self, i: usize) -> usize {
        (i + self.curves.len() - 1) % self.curves.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_tangent_is_write_once() {
        let t = SharedTangent::new();
        assert!(t.get().is_none());
        t.set(Vector::new(1.0, 0.0, 0.0));
        t.set(Vector::new(0.0, 9.0, 0.0));
        assert_eq!(t.get(), Some(Vector::new(1.0, 0.0, 0.0)));
    }

    #[test]
    fn subdivision_shares_the_split_tangent() {
        let mut c = Curve::new(false);
        for i in 0..6 {
            c.push(RealCoord::new(i as f64, 0.0, 0.0));
        }
        let (left, right) = c.subdivide(3);
        assert_eq!(left.len(), 4);
        assert_eq!(right.len(), 3);
        assert_eq!(left.last_point(), right.point(0));
        left.end_tangent.set(Vector::new(2.0, 2.0, 0.0));
        assert_eq!(right.start_tangent.get(), Some(Vector::new(2.0, 2.0, 0.0)));
    }

    #[test]
    fn cyclic_neighbor_indices_wrap() {
        let mut c = Curve::new(true);
        for i in 0..3 {
            c.push(RealCoord::new(i as f64, 0.0, 0.0));
        }
        assert_eq!(c.prev(0), Some(2));
        assert_eq!(c.next(2), Some(0));
        c.cyclic = false;
        assert_eq!(c.prev(0), None);
        assert_eq!(c.next(2), None);
    }
}
