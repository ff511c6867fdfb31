// Copyright 2026 the Cassette Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::format;
use alloc::string::String;
use core::ops::Mul;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::Affine;

use crate::util::{deg2rad, is_one, is_zero, rad2deg};
use crate::vector::Vector2D;

/// Row-major 3x3 affine matrix.
///
/// The bottom row is `[0, 0, 1]` for every matrix built through this API; composition and
/// inversion preserve it. Column vectors are multiplied on the right, so `a * b` applies `b`
/// first.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Matrix2D {
    v: [f64; 9],
}

impl Default for Matrix2D {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix2D {
    /// The identity matrix.
    pub const IDENTITY: Self = Self {
        v: [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
    };

    /// Build from nine row-major values.
    ///
    /// Panics if any value is not finite or the bottom row is not `[0, 0, 1]`.
    pub fn from_values(v: [f64; 9]) -> Self {
        assert!(
            v.iter().all(|n| n.is_finite()),
            "matrix values must be finite"
        );
        assert!(
            is_zero(v[6]) && is_zero(v[7]) && is_one(v[8]),
            "matrix bottom row must be [0, 0, 1]"
        );
        Self { v }
    }

    /// Build from the six values of a CSS `matrix(a, b, c, d, e, f)`.
    pub fn from_css_values(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self::from_values([a, c, e, b, d, f, 0.0, 0.0, 1.0])
    }

    /// Row-major values.
    pub fn values(&self) -> [f64; 9] {
        self.v
    }

    /// Translation by `(x, y)`.
    pub fn translate(x: f64, y: f64) -> Self {
        let mut m = Self::IDENTITY;
        m.v[2] = x;
        m.v[5] = y;
        m
    }

    /// Scale by `(x, y)` about the origin.
    pub fn scale(x: f64, y: f64) -> Self {
        let mut m = Self::IDENTITY;
        m.v[0] = x;
        m.v[4] = y;
        m
    }

    /// Rotation by `degrees` about the origin.
    pub fn rotate(degrees: f64) -> Self {
        let radians = deg2rad(degrees);
        let (sin, cos) = (radians.sin(), radians.cos());
        let mut m = Self::IDENTITY;
        m.v[0] = cos;
        m.v[1] = -sin;
        m.v[3] = sin;
        m.v[4] = cos;
        m
    }

    /// True if every value is within `1e-6` of the identity.
    pub fn is_identity(&self) -> bool {
        self.v
            .iter()
            .zip(Self::IDENTITY.v.iter())
            .all(|(a, b)| is_zero(a - b))
    }

    /// Transform a point (`w = 1`).
    pub fn multiply_vector(&self, p: Vector2D) -> Vector2D {
        let v = &self.v;
        Vector2D::new(
            v[0] * p.x + v[1] * p.y + v[2],
            v[3] * p.x + v[4] * p.y + v[5],
        )
    }

    /// Matrix product `self * other`.
    pub fn multiply_matrix(&self, other: &Self) -> Self {
        let a = &self.v;
        let b = &other.v;
        let mut c = [0.0; 9];
        for row in 0..3 {
            for col in 0..3 {
                c[row * 3 + col] = a[row * 3] * b[col]
                    + a[row * 3 + 1] * b[3 + col]
                    + a[row * 3 + 2] * b[6 + col];
            }
        }
        Self { v: c }
    }

    /// Determinant.
    pub fn determinant(&self) -> f64 {
        let v = &self.v;
        v[0] * (v[4] * v[8] - v[7] * v[5]) - v[1] * (v[3] * v[8] - v[5] * v[6])
            + v[2] * (v[3] * v[7] - v[4] * v[6])
    }

    /// Inverse, or `None` when the matrix is singular.
    pub fn inverse(&self) -> Option<Self> {
        let det = self.determinant();
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        let v = &self.v;
        let inv = 1.0 / det;
        Some(Self {
            v: [
                (v[4] * v[8] - v[7] * v[5]) * inv,
                (v[2] * v[7] - v[1] * v[8]) * inv,
                (v[1] * v[5] - v[2] * v[4]) * inv,
                (v[5] * v[6] - v[3] * v[8]) * inv,
                (v[0] * v[8] - v[2] * v[6]) * inv,
                (v[3] * v[2] - v[0] * v[5]) * inv,
                (v[3] * v[7] - v[6] * v[4]) * inv,
                (v[6] * v[1] - v[0] * v[7]) * inv,
                (v[0] * v[4] - v[3] * v[1]) * inv,
            ],
        })
    }

    /// Rotation component in degrees.
    pub fn decompose_rotation(&self) -> f64 {
        rad2deg(self.v[3].atan2(self.v[0]))
    }

    /// Translation component.
    pub fn decompose_translate(&self) -> Vector2D {
        Vector2D::new(self.v[2], self.v[5])
    }

    /// Scale component (row lengths of the linear part).
    pub fn decompose_scale(&self) -> Vector2D {
        let v = &self.v;
        Vector2D::new(
            (v[0] * v[0] + v[1] * v[1]).sqrt(),
            (v[3] * v[3] + v[4] * v[4]).sqrt(),
        )
    }

    /// `(translate, scale, rotation_degrees)`.
    pub fn decompose(&self) -> (Vector2D, Vector2D, f64) {
        (
            self.decompose_translate(),
            self.decompose_scale(),
            self.decompose_rotation(),
        )
    }

    /// CSS `matrix(a, b, c, d, e, f)` with eight decimals per value.
    pub fn to_css_string(&self) -> String {
        let v = &self.v;
        format!(
            "matrix({:.8}, {:.8}, {:.8}, {:.8}, {:.8}, {:.8})",
            v[0], v[3], v[1], v[4], v[2], v[5]
        )
    }
}

impl Mul for Matrix2D {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        self.multiply_matrix(&rhs)
    }
}

impl Mul<Vector2D> for Matrix2D {
    type Output = Vector2D;

    fn mul(self, rhs: Vector2D) -> Vector2D {
        self.multiply_vector(rhs)
    }
}

impl From<Affine> for Matrix2D {
    fn from(affine: Affine) -> Self {
        let [a, b, c, d, e, f] = affine.as_coeffs();
        Self::from_css_values(a, b, c, d, e, f)
    }
}

impl From<Matrix2D> for Affine {
    fn from(m: Matrix2D) -> Self {
        let v = m.v;
        Self::new([v[0], v[3], v[1], v[4], v[2], v[5]])
    }
}
