//! Float 2D Vector
//!
//! Plain two-float vector used for positions, velocities and aim directions.
//! Every operation is a fixed sequence of IEEE single-precision steps so two
//! runs on the same target produce bit-identical results.

use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};
use serde::{Serialize, Deserialize};

/// 2D vector with `f32` components.
#[derive(Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    /// X component (world units, +X is right)
    pub x: f32,
    /// Y component (world units, +Y is down)
    pub y: f32,
}

impl Vec2 {
    /// Zero vector
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Unit vector pointing up (-Y in screen space)
    pub const UP: Self = Self { x: 0.0, y: -1.0 };

    /// Unit vector pointing down (+Y)
    pub const DOWN: Self = Self { x: 0.0, y: 1.0 };

    /// Create a new vector.
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Create a vector from integer components.
    #[inline]
    pub fn from_ints(x: i32, y: i32) -> Self {
        Self { x: x as f32, y: y as f32 }
    }

    /// Unit vector for an angle in radians.
    #[inline]
    pub fn direction(angle: f32) -> Self {
        Self { x: angle.cos(), y: angle.sin() }
    }

    /// Dot product.
    #[inline]
    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// Squared length.
    #[inline]
    pub fn length_squared(self) -> f32 {
        self.dot(self)
    }

    /// Euclidean length.
    #[inline]
    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    /// Distance to another point.
    #[inline]
    pub fn distance(self, other: Self) -> f32 {
        (self - other).length()
    }

    /// Squared distance to another point.
    #[inline]
    pub fn distance_squared(self, other: Self) -> f32 {
        (self - other).length_squared()
    }

    /// Normalize to unit length.
    ///
    /// The zero vector normalizes to zero, never NaN. Replays depend on this.
    #[inline]
    pub fn normalize(self) -> Self {
        let len = self.length();
        if len == 0.0 {
            return Self::ZERO;
        }
        self.normalize_with_length(len)
    }

    /// Normalize a vector the caller knows to be non-zero.
    #[inline]
    pub fn normalize_nonzero(self) -> Self {
        self.normalize_with_length(self.length())
    }

    #[inline]
    fn normalize_with_length(self, len: f32) -> Self {
        let inv = 1.0 / len;
        Self { x: self.x * inv, y: self.y * inv }
    }

    /// Linear interpolation: `a + (b - a) * t`.
    #[inline]
    pub fn mix(a: Self, b: Self, t: f32) -> Self {
        a + (b - a) * t
    }

    /// Component-wise product.
    #[inline]
    pub fn mul_elem(self, other: Self) -> Self {
        Self { x: self.x * other.x, y: self.y * other.y }
    }

    /// Replace the X component.
    #[inline]
    pub fn with_x(self, x: f32) -> Self {
        Self { x, y: self.y }
    }

    /// Replace the Y component.
    #[inline]
    pub fn with_y(self, y: f32) -> Self {
        Self { x: self.x, y }
    }

    /// Check whether both components are zero.
    #[inline]
    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

/// Project `point` onto the segment `a..b`.
///
/// Returns `None` for a zero-length segment.
pub fn closest_point_on_line(a: Vec2, b: Vec2, point: Vec2) -> Option<Vec2> {
    let ab = b - a;
    let sq = ab.length_squared();
    if sq <= 0.0 {
        return None;
    }
    let t = ((point - a).dot(ab) / sq).clamp(0.0, 1.0);
    Some(a + ab * t)
}

/// Move `current` by `modifier` while keeping it inside `[min, max]`.
///
/// A value already outside the range is never pushed further out, and an
/// acceleration never overshoots the bound it is heading for.
#[inline]
pub fn saturated_add(min: f32, max: f32, current: f32, modifier: f32) -> f32 {
    if modifier < 0.0 {
        if current < min {
            return current;
        }
        (current + modifier).max(min)
    } else {
        if current > max {
            return current;
        }
        (current + modifier).min(max)
    }
}

// =============================================================================
// OPERATORS
// =============================================================================

impl Add for Vec2 {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Self { x: self.x + other.x, y: self.y + other.y }
    }
}

impl Sub for Vec2 {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Self { x: self.x - other.x, y: self.y - other.y }
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;

    #[inline]
    fn mul(self, scalar: f32) -> Self {
        Self { x: self.x * scalar, y: self.y * scalar }
    }
}

impl Div<f32> for Vec2 {
    type Output = Self;

    #[inline]
    fn div(self, scalar: f32) -> Self {
        Self { x: self.x / scalar, y: self.y / scalar }
    }
}

impl Neg for Vec2 {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self { x: -self.x, y: -self.y }
    }
}

impl AddAssign for Vec2 {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.x += other.x;
        self.y += other.y;
    }
}

impl SubAssign for Vec2 {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.x -= other.x;
        self.y -= other.y;
    }
}

impl MulAssign<f32> for Vec2 {
    #[inline]
    fn mul_assign(&mut self, scalar: f32) {
        self.x *= scalar;
        self.y *= scalar;
    }
}

impl fmt::Debug for Vec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Vec2({:.4}, {:.4})", self.x, self.y)
    }
}

impl fmt::Display for Vec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_vec2_length() {
        let v = Vec2::new(3.0, 4.0);
        assert_eq!(v.length(), 5.0);
        assert_eq!(v.length_squared(), 25.0);
        assert_eq!(Vec2::ZERO.distance(v), 5.0);
    }

    #[test]
    fn test_vec2_normalize() {
        let n = Vec2::new(0.0, -10.0).normalize();
        assert_eq!(n, Vec2::UP);

        let n = Vec2::new(3.0, 4.0).normalize();
        assert!((n.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_vec2_normalize_zero_is_zero() {
        let n = Vec2::ZERO.normalize();
        assert_eq!(n, Vec2::ZERO);
        assert!(!n.x.is_nan() && !n.y.is_nan());
    }

    #[test]
    fn test_vec2_mix() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(10.0, -20.0);
        assert_eq!(Vec2::mix(a, b, 0.5), Vec2::new(5.0, -10.0));
        assert_eq!(Vec2::mix(a, b, 0.0), a);
        assert_eq!(Vec2::mix(a, b, 1.0), b);
    }

    #[test]
    fn test_vec2_ops() {
        let mut v = Vec2::new(1.0, 2.0) + Vec2::new(3.0, 4.0);
        assert_eq!(v, Vec2::new(4.0, 6.0));
        v -= Vec2::new(1.0, 1.0);
        assert_eq!(v, Vec2::new(3.0, 5.0));
        v *= 2.0;
        assert_eq!(v, Vec2::new(6.0, 10.0));
        assert_eq!(-v, Vec2::new(-6.0, -10.0));
        assert_eq!(v / 2.0, Vec2::new(3.0, 5.0));
        assert_eq!(v.dot(Vec2::new(1.0, 0.0)), 6.0);
    }

    #[test]
    fn test_closest_point_on_line() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(100.0, 0.0);
        assert_eq!(closest_point_on_line(a, b, Vec2::new(50.0, 20.0)), Some(Vec2::new(50.0, 0.0)));
        assert_eq!(closest_point_on_line(a, b, Vec2::new(-30.0, 5.0)), Some(a));
        assert_eq!(closest_point_on_line(a, b, Vec2::new(130.0, 5.0)), Some(b));
        assert_eq!(closest_point_on_line(a, a, Vec2::new(1.0, 1.0)), None);
    }

    #[test]
    fn test_saturated_add() {
        assert_eq!(saturated_add(-10.0, 10.0, 9.0, 2.0), 10.0);
        assert_eq!(saturated_add(-10.0, 10.0, 0.0, 2.0), 2.0);
        assert_eq!(saturated_add(-10.0, 10.0, -9.5, -2.0), -10.0);
        // already beyond the cap: never pushed further
        assert_eq!(saturated_add(-10.0, 10.0, 15.0, 2.0), 15.0);
        assert_eq!(saturated_add(-10.0, 10.0, -15.0, -2.0), -15.0);
    }

    proptest! {
        #[test]
        fn test_normalize_never_nan(x in -1.0e6f32..1.0e6, y in -1.0e6f32..1.0e6) {
            let n = Vec2::new(x, y).normalize();
            prop_assert!(!n.x.is_nan());
            prop_assert!(!n.y.is_nan());
            if x != 0.0 || y != 0.0 {
                prop_assert!((n.length() - 1.0).abs() < 1e-3);
            }
        }
    }
}
