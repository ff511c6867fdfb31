// Copyright 2026 the Cassette Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cassette Geometry: small 2D value types for a retained-mode scene graph.
//!
//! These types back the construct viewer's scene graph and layout engine. They are plain
//! `Copy` values; every operation returns a new value rather than mutating in place.
//!
//! - [`Vector2D`]: a point or displacement.
//! - [`Box2D`]: an axis-aligned rectangle stored as `(x, y, w, h)`. Widths and heights may be
//!   negative until [`Box2D::normalize`] is called.
//! - [`Line2D`]: a segment with distance and intersection queries returning an
//!   [`Intersection2D`].
//! - [`Matrix2D`]: a row-major 3x3 affine matrix whose bottom row is always `[0, 0, 1]`.
//! - [`Transform2D`]: decomposed scale, rotation, translation and flip, composed on demand
//!   into a [`Matrix2D`] that pivots around the center of a `width x height` box.
//!
//! Each type converts to and from its Kurbo counterpart ([`kurbo::Point`], [`kurbo::Rect`],
//! [`kurbo::Line`], [`kurbo::Affine`]) so callers can hand geometry to Kurbo-based code.
//!
//! ## Textual forms
//!
//! Vectors encode as `"x,y"`, boxes as `"x, y, w, h"`, and lines and transforms as small
//! records of vector strings. Decoding failures are reported as [`ParseError`].
//!
//! ```
//! use cassette_geometry::{Box2D, Vector2D};
//!
//! let v = Vector2D::new(3.5, -2.0);
//! assert_eq!(Vector2D::from_object(&v.to_object()).unwrap(), v);
//!
//! let b = Box2D::new(10.0, 20.0, 30.0, 40.0);
//! assert_eq!(Box2D::from_string(&b.to_string()).unwrap(), b);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod box2d;
mod error;
mod intersection;
mod line;
mod matrix;
mod transform;
mod util;
mod vector;

pub use box2d::Box2D;
pub use error::ParseError;
pub use intersection::Intersection2D;
pub use line::{Line2D, LineRecord};
pub use matrix::Matrix2D;
pub use transform::{Transform2D, TransformRecord};
pub use util::{deg2rad, is_one, is_zero, rad2deg};
pub use vector::Vector2D;
