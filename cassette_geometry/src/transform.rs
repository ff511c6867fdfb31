// Copyright 2026 the Cassette Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::string::String;
use core::cell::Cell;
use core::fmt;

use crate::error::ParseError;
use crate::matrix::Matrix2D;
use crate::vector::Vector2D;

/// Scale, rotate, and translate components composed about an object's center.
///
/// The composed matrix maps local coordinates (origin at the top-left of a `w x h` object) to
/// the parent's space: the object is first centered on the origin, then scaled (with `flip`
/// supplying the sign), rotated, and finally moved to `translate`. `translate` is therefore the
/// position of the object's center.
///
/// The last composed matrix is cached against the `(w, h)` it was built for; every setter
/// drops the cache.
#[derive(Clone)]
pub struct Transform2D {
    scale: Vector2D,
    rotate: f64,
    translate: Vector2D,
    flip: Vector2D,
    cache: Cell<Option<((u64, u64), Matrix2D)>>,
}

/// Textual record form of a [`Transform2D`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransformRecord {
    /// Encoded translation, `"x,y"`.
    pub translate: String,
    /// Encoded scale, `"x,y"`.
    pub scale: String,
    /// Encoded flip, `"x,y"`.
    pub flip: String,
    /// Rotation in degrees.
    pub rotate: f64,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::new(Vector2D::new(1.0, 1.0), 0.0, Vector2D::ZERO, Vector2D::new(1.0, 1.0))
    }
}

impl fmt::Debug for Transform2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transform2D")
            .field("scale", &self.scale)
            .field("rotate", &self.rotate)
            .field("translate", &self.translate)
            .field("flip", &self.flip)
            .finish_non_exhaustive()
    }
}

impl PartialEq for Transform2D {
    fn eq(&self, other: &Self) -> bool {
        self.scale == other.scale
            && self.rotate == other.rotate
            && self.translate == other.translate
            && self.flip == other.flip
    }
}

fn assert_scale(scale: Vector2D) {
    assert!(scale.x >= 0.0 && scale.y >= 0.0, "invalid scale {scale}");
}

fn assert_flip(flip: Vector2D) {
    let unit = |n: f64| n == 1.0 || n == -1.0;
    assert!(unit(flip.x) && unit(flip.y), "invalid flip {flip}");
}

impl Transform2D {
    /// Create a transform. Panics on a negative scale or a flip component other than `±1`.
    pub fn new(scale: Vector2D, rotate: f64, translate: Vector2D, flip: Vector2D) -> Self {
        assert_scale(scale);
        assert_flip(flip);
        assert!(rotate.is_finite(), "invalid rotate {rotate}");
        Self {
            scale,
            rotate,
            translate,
            flip,
            cache: Cell::new(None),
        }
    }

    /// Scale per axis.
    pub fn scale(&self) -> Vector2D {
        self.scale
    }

    /// Set the scale. Both components must be non-negative; use flip to mirror.
    pub fn set_scale(&mut self, scale: Vector2D) {
        assert_scale(scale);
        self.scale = scale;
        self.cache.set(None);
    }

    /// Rotation in degrees.
    pub fn rotate(&self) -> f64 {
        self.rotate
    }

    /// Set the rotation in degrees.
    pub fn set_rotate(&mut self, degrees: f64) {
        assert!(degrees.is_finite(), "invalid rotate {degrees}");
        self.rotate = degrees;
        self.cache.set(None);
    }

    /// Position of the object's center in parent space.
    pub fn translate(&self) -> Vector2D {
        self.translate
    }

    /// Set the translation.
    pub fn set_translate(&mut self, translate: Vector2D) {
        self.translate = translate;
        self.cache.set(None);
    }

    /// Mirror factors, each `1` or `-1`.
    pub fn flip(&self) -> Vector2D {
        self.flip
    }

    /// Set the mirror factors.
    pub fn set_flip(&mut self, flip: Vector2D) {
        assert_flip(flip);
        self.flip = flip;
        self.cache.set(None);
    }

    /// Encode every component.
    pub fn to_object(&self) -> TransformRecord {
        TransformRecord {
            translate: self.translate.to_object(),
            scale: self.scale.to_object(),
            flip: self.flip.to_object(),
            rotate: self.rotate,
        }
    }

    /// Decode a [`TransformRecord`].
    pub fn from_object(record: &TransformRecord) -> Result<Self, ParseError> {
        Ok(Self::new(
            Vector2D::from_object(&record.scale)?,
            record.rotate,
            Vector2D::from_object(&record.translate)?,
            Vector2D::from_object(&record.flip)?,
        ))
    }

    /// Compose the transform for an object of size `w x h`.
    pub fn transformation_matrix(&self, w: f64, h: f64) -> Matrix2D {
        assert!(w.is_finite() && h.is_finite(), "invalid width and/or height");
        let key = (w.to_bits(), h.to_bits());
        if let Some((cached_key, m)) = self.cache.get() {
            if cached_key == key {
                return m;
            }
        }
        let plain = self.scale == Vector2D::new(1.0, 1.0)
            && self.flip == Vector2D::new(1.0, 1.0)
            && self.rotate == 0.0;
        let m = if plain {
            Matrix2D::translate(self.translate.x - w / 2.0, self.translate.y - h / 2.0)
        } else {
            Matrix2D::translate(self.translate.x, self.translate.y)
                * Matrix2D::rotate(self.rotate)
                * Matrix2D::scale(self.scale.x * self.flip.x, self.scale.y * self.flip.y)
                * Matrix2D::translate(-w / 2.0, -h / 2.0)
        };
        self.cache.set(Some((key, m)));
        m
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_composition() {
        let t = Transform2D::new(
            Vector2D::new(5.0, 6.0),
            45.0,
            Vector2D::new(3.0, 4.0),
            Vector2D::new(1.0, -1.0),
        );
        let expected = [
            3.5355339, 4.2426407, -385.90873, 3.5355339, -4.2426407, 39.355339, 0.0, 0.0, 1.0,
        ];
        let got = t.transformation_matrix(100.0, 100.0).values();
        for (g, e) in got.iter().zip(expected.iter()) {
            assert!((g - e).abs() < 1e-4, "expected {e}, got {g}");
        }
    }

    #[test]
    fn identity_shortcut_centers_on_translate() {
        let mut t = Transform2D::default();
        t.set_translate(Vector2D::new(50.0, 20.0));
        let m = t.transformation_matrix(100.0, 40.0);
        assert_eq!(m, Matrix2D::translate(0.0, 0.0));
        assert_eq!(m * Vector2D::new(50.0, 20.0), Vector2D::new(50.0, 20.0));
    }

    #[test]
    fn rotation_pivots_on_center() {
        let mut t = Transform2D::default();
        t.set_translate(Vector2D::new(50.0, 50.0));
        t.set_rotate(90.0);
        let m = t.transformation_matrix(100.0, 100.0);
        assert!((m * Vector2D::new(50.0, 50.0)).similar(Vector2D::new(50.0, 50.0), 1e-9));
        assert!((m * Vector2D::new(100.0, 50.0)).similar(Vector2D::new(50.0, 100.0), 1e-9));
    }

    #[test]
    fn setters_invalidate_the_cache() {
        let mut t = Transform2D::default();
        let before = t.transformation_matrix(10.0, 10.0);
        t.set_scale(Vector2D::new(2.0, 2.0));
        let after = t.transformation_matrix(10.0, 10.0);
        assert_ne!(before, after);
        assert_eq!(after, t.transformation_matrix(10.0, 10.0));
        assert_ne!(after, t.transformation_matrix(20.0, 10.0));
    }

    #[test]
    fn record_form() {
        let t = Transform2D::new(
            Vector2D::new(2.0, 3.0),
            30.0,
            Vector2D::new(-1.0, 4.5),
            Vector2D::new(-1.0, 1.0),
        );
        let record = t.to_object();
        assert_eq!(record.flip, "-1,1");
        assert_eq!(Transform2D::from_object(&record).unwrap(), t);
    }

    #[test]
    #[should_panic(expected = "invalid flip")]
    fn flip_must_be_unit() {
        let mut t = Transform2D::default();
        t.set_flip(Vector2D::new(0.5, 1.0));
    }

    #[test]
    #[should_panic(expected = "invalid scale")]
    fn scale_must_be_non_negative() {
        let mut t = Transform2D::default();
        t.set_scale(Vector2D::new(-1.0, 1.0));
    }
}
