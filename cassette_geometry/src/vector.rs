// Copyright 2026 the Cassette Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::format;
use alloc::string::String;
use core::f64::consts::PI;
use core::fmt;
use core::ops::{Add, Div, Mul, Neg, Sub};

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Point, Vec2};

use crate::error::ParseError;
use crate::util::{EPSILON, deg2rad, parse_fields, rad2deg};

/// A 2D point or displacement.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vector2D {
    /// Horizontal component.
    pub x: f64,
    /// Vertical component (grows downward in screen space).
    pub y: f64,
}

impl Vector2D {
    /// The origin.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Create a vector. Both components must be finite.
    pub fn new(x: f64, y: f64) -> Self {
        assert!(
            x.is_finite() && y.is_finite(),
            "Vector2D components must be finite, got ({x}, {y})"
        );
        Self { x, y }
    }

    /// Encode as `"x,y"`.
    pub fn to_object(&self) -> String {
        format!("{},{}", self.x, self.y)
    }

    /// Decode the `"x,y"` form produced by [`Vector2D::to_object`].
    pub fn from_object(text: &str) -> Result<Self, ParseError> {
        let [x, y] = parse_fields::<2>(text)?;
        Ok(Self { x, y })
    }

    /// Snap both components down to a multiple of `grid`.
    pub fn snap(&self, grid: f64) -> Self {
        Self::new((self.x / grid).floor() * grid, (self.y / grid).floor() * grid)
    }

    /// Point at `degrees` on the circle of `radius` around `center`.
    pub fn point_on_circumference(center: Self, radius: f64, degrees: f64) -> Self {
        let radians = deg2rad(degrees);
        Self::new(
            center.x + radius * radians.cos(),
            center.y + radius * radians.sin(),
        )
    }

    /// Angle in degrees of the ray from `self` to `other`, normalized to `[0, 360)`.
    pub fn angle_between(&self, other: Self) -> f64 {
        let mut radians = (other.y - self.y).atan2(other.x - self.x);
        if radians < 0.0 {
            radians += 2.0 * PI;
        }
        rad2deg(radians)
    }

    /// Component-wise sum.
    pub fn add(&self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }

    /// Component-wise difference.
    pub fn sub(&self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }

    /// Scale both components by `factor`.
    pub fn multiply(&self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }

    /// Component-wise product.
    pub fn multiply_by(&self, other: Self) -> Self {
        Self::new(self.x * other.x, self.y * other.y)
    }

    /// Divide both components by `divisor`.
    pub fn divide(&self, divisor: f64) -> Self {
        Self::new(self.x / divisor, self.y / divisor)
    }

    /// Euclidean length.
    pub fn len(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Euclidean distance to `other`.
    pub fn distance(&self, other: Self) -> f64 {
        self.sub(other).len()
    }

    /// Dot product.
    pub fn dot(&self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// True if both components differ by less than `threshold`.
    pub fn similar(&self, other: Self, threshold: f64) -> bool {
        (self.x - other.x).abs() < threshold && (self.y - other.y).abs() < threshold
    }

    /// [`Vector2D::similar`] with the default `1e-6` tolerance.
    pub fn approx_eq(&self, other: Self) -> bool {
        self.similar(other, EPSILON)
    }

    /// Fit a `source` size into a `max` window, keeping the aspect ratio.
    ///
    /// Sizes that already fit are returned unchanged unless `upscale` is set. Otherwise the
    /// worst-fitting axis is pinned to the window and the other is scaled and truncated to a
    /// whole number.
    pub fn scale_to_window(source: Self, max: Self, upscale: bool) -> Self {
        if source.x <= max.x && source.y <= max.y && !upscale {
            return source;
        }
        if max.x / source.x < max.y / source.y {
            Self::new(max.x, (source.y * (max.x / source.x)).trunc())
        } else {
            Self::new((source.x * (max.y / source.y)).trunc(), max.y)
        }
    }
}

impl fmt::Display for Vector2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v2d({}, {})", self.x, self.y)
    }
}

impl Add for Vector2D {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vector2D {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vector2D {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        self.multiply(rhs)
    }
}

impl Div<f64> for Vector2D {
    type Output = Self;

    fn div(self, rhs: f64) -> Self {
        self.divide(rhs)
    }
}

impl Neg for Vector2D {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl From<Point> for Vector2D {
    fn from(p: Point) -> Self {
        Self::new(p.x, p.y)
    }
}

impl From<Vector2D> for Point {
    fn from(v: Vector2D) -> Self {
        Self::new(v.x, v.y)
    }
}

impl From<Vec2> for Vector2D {
    fn from(v: Vec2) -> Self {
        Self::new(v.x, v.y)
    }
}

impl From<Vector2D> for Vec2 {
    fn from(v: Vector2D) -> Self {
        Self::new(v.x, v.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arithmetic() {
        let a = Vector2D::new(1.0, 2.0);
        let b = Vector2D::new(3.0, 5.0);
        assert_eq!(a + b, Vector2D::new(4.0, 7.0));
        assert_eq!(b - a, Vector2D::new(2.0, 3.0));
        assert_eq!(a * 2.0, Vector2D::new(2.0, 4.0));
        assert_eq!(b / 2.0, Vector2D::new(1.5, 2.5));
        assert_eq!(-a, Vector2D::new(-1.0, -2.0));
        assert_eq!(a.multiply_by(b), Vector2D::new(3.0, 10.0));
        assert_eq!(a.dot(b), 13.0);
        assert_eq!(Vector2D::new(3.0, 4.0).len(), 5.0);
        assert_eq!(a.distance(Vector2D::new(4.0, 6.0)), 5.0);
    }

    #[test]
    fn object_form() {
        let v = Vector2D::new(-12.25, 3.0);
        assert_eq!(v.to_object(), "-12.25,3");
        assert_eq!(Vector2D::from_object("-12.25,3").unwrap(), v);
        assert!(Vector2D::from_object("1").is_err());
        assert!(Vector2D::from_object("a,b").is_err());
    }

    #[test]
    fn angle_between_is_normalized() {
        let o = Vector2D::ZERO;
        assert!((o.angle_between(Vector2D::new(1.0, 0.0)) - 0.0).abs() < 1e-9);
        assert!((o.angle_between(Vector2D::new(0.0, 1.0)) - 90.0).abs() < 1e-9);
        assert!((o.angle_between(Vector2D::new(-1.0, 0.0)) - 180.0).abs() < 1e-9);
        assert!((o.angle_between(Vector2D::new(0.0, -1.0)) - 270.0).abs() < 1e-9);
    }

    #[test]
    fn circumference_and_snap() {
        let p = Vector2D::point_on_circumference(Vector2D::new(10.0, 10.0), 5.0, 90.0);
        assert!(p.similar(Vector2D::new(10.0, 15.0), 1e-9));
        assert_eq!(Vector2D::new(17.0, -3.0).snap(5.0), Vector2D::new(15.0, -5.0));
    }

    #[test]
    fn scale_to_window_fits_worst_axis() {
        let fit = Vector2D::scale_to_window(
            Vector2D::new(400.0, 100.0),
            Vector2D::new(200.0, 200.0),
            false,
        );
        assert_eq!(fit, Vector2D::new(200.0, 50.0));
        let small = Vector2D::new(10.0, 10.0);
        assert_eq!(
            Vector2D::scale_to_window(small, Vector2D::new(200.0, 200.0), false),
            small
        );
        assert_eq!(
            Vector2D::scale_to_window(small, Vector2D::new(200.0, 100.0), true),
            Vector2D::new(100.0, 100.0)
        );
    }

    #[test]
    fn kurbo_round_trip() {
        let v = Vector2D::new(1.5, 2.5);
        let p: Point = v.into();
        assert_eq!(Vector2D::from(p), v);
        let d: Vec2 = v.into();
        assert_eq!(Vector2D::from(d), v);
    }

    #[test]
    #[should_panic(expected = "must be finite")]
    fn non_finite_components_are_rejected() {
        let _ = Vector2D::new(f64::NAN, 0.0);
    }
}
