// Copyright 2026 the Cassette Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::vector::Vector2D;

/// Outcome of [`Line2D::intersect_with_line`](crate::Line2D::intersect_with_line).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Intersection2D {
    /// The segments cross at the given point.
    Intersection(Vector2D),
    /// The infinite lines cross, but outside at least one of the segments.
    NoIntersection,
    /// The segments are parallel and do not share a line.
    Parallel,
    /// The segments lie on the same line.
    Coincident,
}

impl Intersection2D {
    /// Textual status matching the four outcomes.
    pub fn status(&self) -> &'static str {
        match self {
            Self::Intersection(_) => "Intersection",
            Self::NoIntersection => "No Intersection",
            Self::Parallel => "Parallel",
            Self::Coincident => "Coincident",
        }
    }

    /// The crossing point, if the segments intersect.
    pub fn point(&self) -> Option<Vector2D> {
        match self {
            Self::Intersection(p) => Some(*p),
            _ => None,
        }
    }
}
