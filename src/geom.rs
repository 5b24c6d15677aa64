//! Shared geometry: integer/real coordinates and 3-component vectors.
//!
//! The z component rides along through every operation; it is 0.0 except in
//! centerline mode, where it carries a stroke half-width hint.

use std::ops::{Add, Mul, Sub};

use crate::error::TraceError;

/// Comparison tolerance for angle snapping and "equally good" corner tests.
pub const REAL_EPSILON: f64 = 0.00001;

/// True when two reals are within [`REAL_EPSILON`] of each other.
pub fn epsilon_equal(a: f64, b: f64) -> bool {
    (a - b).abs() < REAL_EPSILON
}

/// An integer pixel coordinate (y grows upward).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const fn new(x: i32, y: i32) -> Self {
        Coord { x, y }
    }
}

/// A real coordinate. `z` is a stroke-width hint in centerline mode.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RealCoord {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl RealCoord {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        RealCoord { x, y, z }
    }

    /// Round to the nearest integer coordinate, dropping z.
    pub fn to_int(self) -> Coord {
        Coord::new(self.x.round() as i32, self.y.round() as i32)
    }

    /// Euclidean distance to another coordinate (all three components).
    pub fn distance(self, other: RealCoord) -> f64 {
        (self - other).magnitude()
    }
}

impl From<Coord> for RealCoord {
    fn from(c: Coord) -> Self {
        RealCoord::new(c.x as f64, c.y as f64, 0.0)
    }
}

/// A displacement with standard arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector {
    pub dx: f64,
    pub dy: f64,
    pub dz: f64,
}

impl Vector {
    pub const ZERO: Vector = Vector { dx: 0.0, dy: 0.0, dz: 0.0 };

    pub const fn new(dx: f64, dy: f64, dz: f64) -> Self {
        Vector { dx, dy, dz }
    }

    pub fn magnitude(self) -> f64 {
        (self.dx * self.dx + self.dy * self.dy + self.dz * self.dz).sqrt()
    }

    /// Unit vector in the same direction; the zero vector maps to itself.
    pub fn normalized(self) -> Vector {
        let m = self.magnitude();
        if m > 0.0 {
            Vector::new(self.dx / m, self.dy / m, self.dz / m)
        } else {
            self
        }
    }

    pub fn dot(self, other: Vector) -> f64 {
        self.dx * other.dx + self.dy * other.dy + self.dz * other.dz
    }

    pub fn is_zero(self) -> bool {
        self.dx == 0.0 && self.dy == 0.0
    }
}

impl Add for Vector {
    type Output = Vector;
    fn add(self, o: Vector) -> Vector {
        Vector::new(self.dx + o.dx, self.dy + o.dy, self.dz + o.dz)
    }
}

impl Sub for Vector {
    type Output = Vector;
    fn sub(self, o: Vector) -> Vector {
        Vector::new(self.dx - o.dx, self.dy - o.dy, self.dz - o.dz)
    }
}

impl Mul<f64> for Vector {
    type Output = Vector;
    fn mul(self, s: f64) -> Vector {
        Vector::new(self.dx * s, self.dy * s, self.dz * s)
    }
}

impl Sub for RealCoord {
    type Output = Vector;
    fn sub(self, o: RealCoord) -> Vector {
        Vector::new(self.x - o.x, self.y - o.y, self.z - o.z)
    }
}

impl Add<Vector> for RealCoord {
    type Output = RealCoord;
    fn add(self, v: Vector) -> RealCoord {
        RealCoord::new(self.x + v.dx, self.y + v.dy, self.z + v.dz)
    }
}

impl Sub<Vector> for RealCoord {
    type Output = RealCoord;
    fn sub(self, v: Vector) -> RealCoord {
        RealCoord::new(self.x - v.dx, self.y - v.dy, self.z - v.dz)
    }
}

/// Difference of two integer coordinates as a vector (z = 0).
pub fn int_subtract(a: Coord, b: Coord) -> Vector {
    Vector::new((a.x - b.x) as f64, (a.y - b.y) as f64, 0.0)
}

/// Angle between two vectors in degrees, in `[0, 180]`.
///
/// The acos argument is snapped to ±1 when within [`REAL_EPSILON`]; a value
/// outside the domain beyond that tolerance is an impossible numeric state
/// and aborts the call.
pub fn angle_degrees(v: Vector, w: Vector) -> Result<f64, TraceError> {
    let mut d = v.normalized().dot(w.normalized());
    if epsilon_equal(d, 1.0) {
        d = 1.0;
    } else if epsilon_equal(d, -1.0) {
        d = -1.0;
    }
    if !(-1.0..=1.0).contains(&d) {
        return Err(TraceError::Fatal(format!("acos argument {d} out of range")));
    }
    Ok(d.acos().to_degrees())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn angle_of_vector_with_itself_is_zero() {
        let v = Vector::new(3.0, -2.0, 0.0);
        assert!(angle_degrees(v, v).unwrap().abs() < 1e-9);
    }

    #[test]
    fn angle_of_vector_with_negation_is_180() {
        let v = Vector::new(0.25, 7.0, 0.0);
        let a = angle_degrees(v, v * -1.0).unwrap();
        assert!((a - 180.0).abs() < 1e-9);
    }

    #[test]
    fn right_angle_is_90() {
        let a = angle_degrees(Vector::new(1.0, 0.0, 0.0), Vector::new(0.0, 5.0, 0.0)).unwrap();
        assert!((a - 90.0).abs() < 1e-9);
    }

    #[test]
    fn normalize_zero_is_identity() {
        assert_eq!(Vector::ZERO.normalized(), Vector::ZERO);
    }

    #[test]
    fn point_vector_roundtrip() {
        let p = RealCoord::new(1.0, 2.0, 3.0);
        let v = Vector::new(0.5, -1.5, 0.0);
        assert_eq!((p + v) - v, p);
    }
}
