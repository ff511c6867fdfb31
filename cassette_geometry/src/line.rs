// Copyright 2026 the Cassette Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::string::String;
use core::fmt;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::Line;

use crate::error::ParseError;
use crate::intersection::Intersection2D;
use crate::vector::Vector2D;

/// A line segment between two points.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Line2D {
    /// First endpoint.
    pub start: Vector2D,
    /// Second endpoint.
    pub end: Vector2D,
}

/// Textual record form of a [`Line2D`]: each endpoint as an `"x,y"` string.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineRecord {
    /// Encoded start point.
    pub start: String,
    /// Encoded end point.
    pub end: String,
}

impl Line2D {
    /// Create a segment from two points.
    pub fn new(start: Vector2D, end: Vector2D) -> Self {
        Self { start, end }
    }

    /// Create a segment from endpoint coordinates.
    pub fn from_coords(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self::new(Vector2D::new(x1, y1), Vector2D::new(x2, y2))
    }

    /// Start x.
    pub fn x1(&self) -> f64 {
        self.start.x
    }

    /// Start y.
    pub fn y1(&self) -> f64 {
        self.start.y
    }

    /// End x.
    pub fn x2(&self) -> f64 {
        self.end.x
    }

    /// End y.
    pub fn y2(&self) -> f64 {
        self.end.y
    }

    /// Encode both endpoints.
    pub fn to_object(&self) -> LineRecord {
        LineRecord {
            start: self.start.to_object(),
            end: self.end.to_object(),
        }
    }

    /// Decode a [`LineRecord`].
    pub fn from_object(record: &LineRecord) -> Result<Self, ParseError> {
        Ok(Self::new(
            Vector2D::from_object(&record.start)?,
            Vector2D::from_object(&record.end)?,
        ))
    }

    /// Segment length.
    pub fn len(&self) -> f64 {
        self.start.distance(self.end)
    }

    /// Slope `dy / dx`; [`f64::INFINITY`] for vertical segments.
    pub fn slope(&self) -> f64 {
        let dx = self.start.x - self.end.x;
        if dx == 0.0 {
            return f64::INFINITY;
        }
        (self.start.y - self.end.y) / dx
    }

    /// Squared distance from `point` to the closest point on the segment.
    pub fn distance_to_segment_squared(&self, point: Vector2D) -> f64 {
        fn dist2(a: Vector2D, b: Vector2D) -> f64 {
            let d = a - b;
            d.x * d.x + d.y * d.y
        }
        let l2 = dist2(self.start, self.end);
        if l2 == 0.0 {
            return dist2(point, self.start);
        }
        let t = (point - self.start).dot(self.end - self.start) / l2;
        if t < 0.0 {
            return dist2(point, self.start);
        }
        if t > 1.0 {
            return dist2(point, self.end);
        }
        dist2(point, self.point_on_line(t))
    }

    /// Distance from `point` to the closest point on the segment.
    pub fn distance_to_segment(&self, point: Vector2D) -> f64 {
        self.distance_to_segment_squared(point).sqrt()
    }

    /// Point at parameter `t` (0 is the start, 1 the end).
    pub fn point_on_line(&self, t: f64) -> Vector2D {
        Vector2D::new(
            self.x1() + (self.x2() - self.x1()) * t,
            self.y1() + (self.y2() - self.y1()) * t,
        )
    }

    /// Intersect two segments using parametric cross products.
    pub fn intersect_with_line(&self, other: &Self) -> Intersection2D {
        let ua_t = (other.x2() - other.x1()) * (self.y1() - other.y1())
            - (other.y2() - other.y1()) * (self.x1() - other.x1());
        let ub_t = (self.x2() - self.x1()) * (self.y1() - other.y1())
            - (self.y2() - self.y1()) * (self.x1() - other.x1());
        let u_b = (other.y2() - other.y1()) * (self.x2() - self.x1())
            - (other.x2() - other.x1()) * (self.y2() - self.y1());

        if u_b != 0.0 {
            let ua = ua_t / u_b;
            let ub = ub_t / u_b;
            if (0.0..=1.0).contains(&ua) && (0.0..=1.0).contains(&ub) {
                Intersection2D::Intersection(self.point_on_line(ua))
            } else {
                Intersection2D::NoIntersection
            }
        } else if ua_t == 0.0 || ub_t == 0.0 {
            Intersection2D::Coincident
        } else {
            Intersection2D::Parallel
        }
    }

    /// Scale both endpoints by `factor`.
    pub fn multiply(&self, factor: f64) -> Self {
        Self::new(self.start * factor, self.end * factor)
    }
}

impl fmt::Display for Line2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line2d: {} : {}", self.start, self.end)
    }
}

impl From<Line> for Line2D {
    fn from(line: Line) -> Self {
        Self::new(line.p0.into(), line.p1.into())
    }
}

impl From<Line2D> for Line {
    fn from(line: Line2D) -> Self {
        Self::new(line.start, line.end)
    }
}
