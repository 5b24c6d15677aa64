//! Fitted splines and the caller-owned output aggregate.

use kurbo::{BezPath, Point};

use crate::bitmap::Color;
use crate::geom::RealCoord;

/// Degree of a fitted spline segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplineDegree {
    Linear,
    Cubic,
}

/// One spline segment: four control points, a degree, and the residual
/// deviation from the chord that drove the line/curve decision.
///
/// A `Linear` spline keeps its computed control points; only the degree
/// flag differs, so reverting it to a cubic is a flag flip.
#[derive(Debug, Clone, Copy)]
pub struct Spline {
    pub points: [RealCoord; 4],
    pub degree: SplineDegree,
    pub linearity: f64,
}

impl Spline {
    pub fn start(&self) -> RealCoord {
        self.points[0]
    }

    pub fn end(&self) -> RealCoord {
        self.points[3]
    }

    /// Evaluate at `t` by de Casteljau subdivision (all three components).
    pub fn evaluate(&self, t: f64) -> RealCoord {
        let lerp = |a: RealCoord, b: RealCoord| RealCoord::new(
            a.x + (b.x - a.x) * t,
            a.y + (b.y - a.y) * t,
            a.z + (b.z - a.z) * t,
        );
        let mut p = self.points;
        for level in (1..4).rev() {
            for i in 0..level {
                p[i] = lerp(p[i], p[i + 1]);
            }
        }
        p[0]
    }
}

/// The fitted splines of one outline, in traversal order.
#[derive(Debug, Clone)]
pub struct SplineList {
    pub splines: Vec<Spline>,
    pub clockwise: bool,
    pub open: bool,
    pub color: Color,
}

impl SplineList {
    pub fn new(clockwise: bool, open: bool, color: Color) -> Self {
        SplineList { splines: Vec::new(), clockwise, open, color }
    }

    pub fn len(&self) -> usize {
        self.splines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.splines.is_empty()
    }

    /// Convert to a kurbo path: lines for `Linear` segments, cubics
    /// otherwise; closed unless the list is open.
    pub fn to_bez_path(&self) -> BezPath {
        let mut path = BezPath::new();
        let Some(first) = self.splines.first() else {
            return path;
        };
        let pt = |c: RealCoord| Point::new(c.x, c.y);
        path.move_to(pt(first.start()));
        for s in &self.splines {
            match s.degree {
                SplineDegree::Linear => path.line_to(pt(s.end())),
                SplineDegree::Cubic => path.curve_to(pt(s.points[1]), pt(s.points[2]), pt(s.end())),
            }
        }
        if !self.open {
            path.close_path();
        }
        path
    }

    /// Mean stroke width over all on-curve endpoints (centerline mode).
    pub fn mean_width(&self) -> f64 {
        if self.splines.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.splines.iter().map(|s| s.start().z + s.end().z).sum();
        sum / (2 * self.splines.len()) as f64
    }
}

/// The complete vectorization result, the sole caller-owned output.
#[derive(Debug, Clone)]
pub struct SplineListArray {
    pub lists: Vec<SplineList>,
    pub width: u32,
    pub height: u32,
    pub centerline: bool,
    pub preserve_width: bool,
    pub width_weight_factor: f64,
    pub background: Option<Color>,
}

impl SplineListArray {
    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_spline() -> Spline {
        let a = RealCoord::new(0.0, 0.0, 0.0);
        let b = RealCoord::new(3.0, 6.0, 0.0);
        Spline {
            points: [a, a + (b - a) * (1.0 / 3.0), a + (b - a) * (2.0 / 3.0), b],
            degree: SplineDegree::Linear,
            linearity: 0.0,
        }
    }

    #[test]
    fn evaluate_hits_the_endpoints() {
        let s = line_spline();
        assert_eq!(s.evaluate(0.0), s.start());
        assert_eq!(s.evaluate(1.0), s.end());
    }

    #[test]
    fn evaluate_midpoint_of_a_line() {
        let s = line_spline();
        let mid = s.evaluate(0.5);
        assert!((mid.x - 1.5).abs() < 1e-12);
        assert!((mid.y - 3.0).abs() < 1e-12);
    }
}
