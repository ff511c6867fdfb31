// Copyright 2026 the Cassette Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::Rect;

use crate::error::ParseError;
use crate::line::Line2D;
use crate::util::parse_fields;
use crate::vector::Vector2D;

/// Axis-aligned rectangle stored as origin and extent.
///
/// Extents may be negative (an un-normalized box, as produced by dragging a fence up and to
/// the left) until [`Box2D::normalize`] is called. Derived edges and corners are computed.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Box2D {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub w: f64,
    /// Height.
    pub h: f64,
}

impl Box2D {
    /// The empty box at the origin.
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        w: 0.0,
        h: 0.0,
    };

    /// Create a box. All values must be finite.
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        assert!(
            x.is_finite() && y.is_finite() && w.is_finite() && h.is_finite(),
            "Box2D values must be finite, got ({x}, {y}, {w}, {h})"
        );
        Self { x, y, w, h }
    }

    /// Smallest normalized box containing every point. Empty input yields [`Box2D::ZERO`].
    pub fn from_points<I: IntoIterator<Item = Vector2D>>(points: I) -> Self {
        let mut iter = points.into_iter();
        let Some(first) = iter.next() else {
            return Self::ZERO;
        };
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in iter {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Self::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    /// Decode the `"x, y, w, h"` form produced by `to_string`.
    pub fn from_string(text: &str) -> Result<Self, ParseError> {
        let [x, y, w, h] = parse_fields::<4>(text)?;
        Ok(Self { x, y, w, h })
    }

    /// Left edge.
    pub fn left(&self) -> f64 {
        self.x
    }

    /// Top edge.
    pub fn top(&self) -> f64 {
        self.y
    }

    /// Right edge, `x + w`.
    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    /// Bottom edge, `y + h`.
    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    /// Width.
    pub fn width(&self) -> f64 {
        self.w
    }

    /// Height.
    pub fn height(&self) -> f64 {
        self.h
    }

    /// Horizontal center.
    pub fn cx(&self) -> f64 {
        self.x + self.w / 2.0
    }

    /// Vertical center.
    pub fn cy(&self) -> f64 {
        self.y + self.h / 2.0
    }

    /// Center point.
    pub fn center(&self) -> Vector2D {
        Vector2D::new(self.cx(), self.cy())
    }

    /// Top left corner.
    pub fn top_left(&self) -> Vector2D {
        Vector2D::new(self.x, self.y)
    }

    /// Top right corner.
    pub fn top_right(&self) -> Vector2D {
        Vector2D::new(self.right(), self.y)
    }

    /// Bottom right corner.
    pub fn bottom_right(&self) -> Vector2D {
        Vector2D::new(self.right(), self.bottom())
    }

    /// Bottom left corner.
    pub fn bottom_left(&self) -> Vector2D {
        Vector2D::new(self.x, self.bottom())
    }

    /// The four corners, clockwise from the top left.
    pub fn corners(&self) -> [Vector2D; 4] {
        [
            self.top_left(),
            self.top_right(),
            self.bottom_right(),
            self.bottom_left(),
        ]
    }

    /// Move the right edge, keeping the left edge.
    pub fn set_right(&mut self, right: f64) {
        self.w = right - self.x;
    }

    /// Move the bottom edge, keeping the top edge.
    pub fn set_bottom(&mut self, bottom: f64) {
        self.h = bottom - self.y;
    }

    /// Move the box so its center is `center`.
    pub fn set_center(&mut self, center: Vector2D) {
        self.x = center.x - self.w / 2.0;
        self.y = center.y - self.h / 2.0;
    }

    /// Equivalent box with non-negative extents.
    pub fn normalize(&self) -> Self {
        Self::new(
            self.x.min(self.right()),
            self.y.min(self.bottom()),
            self.w.abs(),
            self.h.abs(),
        )
    }

    /// Grow by `dx` on the left and right and `dy` on the top and bottom, keeping the center.
    pub fn inflate(&self, dx: f64, dy: f64) -> Self {
        let mut out = Self::new(self.x, self.y, self.w + dx * 2.0, self.h + dy * 2.0);
        out.set_center(self.center());
        out
    }

    /// Scale the extents about the center.
    pub fn scale(&self, sx: f64, sy: f64) -> Self {
        Self::new(
            self.cx() - (self.w * sx) / 2.0,
            self.cy() - (self.h * sy) / 2.0,
            self.w * sx,
            self.h * sy,
        )
    }

    /// Multiply every value, origin included, by `factor`.
    pub fn multiply(&self, factor: f64) -> Self {
        Self::new(
            self.x * factor,
            self.y * factor,
            self.w * factor,
            self.h * factor,
        )
    }

    /// Divide every value, origin included, by `divisor`.
    pub fn divide(&self, divisor: f64) -> Self {
        Self::new(
            self.x / divisor,
            self.y / divisor,
            self.w / divisor,
            self.h / divisor,
        )
    }

    /// Exact equality of all four values.
    pub fn equals(&self, other: &Self) -> bool {
        self == other
    }

    /// Smallest box containing both boxes.
    pub fn union(&self, other: &Self) -> Self {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Self::new(x, y, right - x, bottom - y)
    }

    /// Union of every box; `None` for an empty iterator.
    pub fn union_all<'a, I: IntoIterator<Item = &'a Self>>(boxes: I) -> Option<Self> {
        boxes
            .into_iter()
            .fold(None, |acc: Option<Self>, b| match acc {
                Some(u) => Some(u.union(b)),
                None => Some(*b),
            })
    }

    /// Edge `nth` as a segment: 0 top, 1 right, 2 bottom, 3 left (clockwise).
    pub fn get_edge(&self, nth: usize) -> Line2D {
        match nth {
            0 => Line2D::new(self.top_left(), self.top_right()),
            1 => Line2D::new(self.top_right(), self.bottom_right()),
            2 => Line2D::new(self.bottom_right(), self.bottom_left()),
            3 => Line2D::new(self.bottom_left(), self.top_left()),
            _ => panic!("box edge index must be in 0..4, got {nth}"),
        }
    }

    /// Overlapping region of two boxes.
    ///
    /// Boxes that only touch along an edge or corner do not intersect.
    pub fn intersect_with_box(&self, other: &Self) -> Option<Self> {
        let min_right = self.right().min(other.right());
        let max_left = self.x.max(other.x);
        let min_bottom = self.bottom().min(other.bottom());
        let max_top = self.y.max(other.y);
        if max_left < min_right && max_top < min_bottom {
            Some(Self::new(
                max_left,
                max_top,
                min_right - max_left,
                min_bottom - max_top,
            ))
        } else {
            None
        }
    }

    /// Horizontal distance between centers.
    pub fn proximity_x(&self, other: &Self) -> f64 {
        (self.cx() - other.cx()).abs()
    }

    /// Vertical distance between centers.
    pub fn proximity_y(&self, other: &Self) -> f64 {
        (self.cy() - other.cy()).abs()
    }

    /// True if `self` lies entirely within `other` (shared edges allowed).
    pub fn is_inside(&self, other: &Self) -> bool {
        self.x >= other.x
            && self.y >= other.y
            && self.right() <= other.right()
            && self.bottom() <= other.bottom()
    }

    /// Point containment; the right and bottom edges are exclusive.
    pub fn point_in_box(&self, point: Vector2D) -> bool {
        point.x >= self.x && point.y >= self.y && point.x < self.right() && point.y < self.bottom()
    }

    /// True if either extent is zero or negative.
    pub fn is_empty(&self) -> bool {
        self.w <= 0.0 || self.h <= 0.0
    }
}

impl fmt::Display for Box2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}, {}", self.x, self.y, self.w, self.h)
    }
}

impl From<Rect> for Box2D {
    fn from(r: Rect) -> Self {
        let r = r.abs();
        Self::new(r.x0, r.y0, r.width(), r.height())
    }
}

impl From<Box2D> for Rect {
    fn from(b: Box2D) -> Self {
        Self::new(b.x, b.y, b.right(), b.bottom()).abs()
    }
}
