// Copyright 2026 the Cassette Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cassette Scene: a retained-mode 2D scene graph.
//!
//! The construct viewer draws blocks, list options, connectors and chrome as nodes in a
//! [`SceneGraph`]. Each node has a local transform (center position, uniform scale, rotation
//! about the center), a size, paint fields, and a [`Glyph`] fixed at construction that decides
//! how it is drawn.
//!
//! - [`SceneGraph`]: generational arena of [`Node2D`] values with a single root. Parent and
//!   child links are stored as [`NodeId`]s, so there are no reference cycles and destroyed
//!   nodes can never be reached through a stale handle.
//! - [`Glyph`]: the closed set of visuals. [`Glyph::render`] is a pure function from node state
//!   to [`RenderCommand`]s in node-local space.
//! - [`SceneGraph::update`]: full re-render of every attached node into a [`DisplayList`]
//!   ordered back to front.
//! - [`TextCache`]: scene-scoped, bounded memo of a [`TextMeasure`].
//!
//! ## Queries
//!
//! [`SceneGraph::find_nodes_at`] and [`SceneGraph::find_nodes_within`] visit every attached
//! node in pre-order with children in paint order, so the last hit is the topmost node. They
//! are linear in the number of nodes; scenes here hold at most a few thousand.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod glyph;
mod node;
mod scene;
mod text;
mod types;

pub use glyph::{Glyph, GlyphMetrics, RenderCommand, Stroke};
pub use node::{DataAttribute, Node2D, NodeProps, NodeUpdate, TextAlign};
pub use scene::{DisplayItem, DisplayList, SceneGraph};
pub use text::{AverageCharWidth, Font, FontWeight, TextCache, TextKey, TextMeasure};
pub use types::{NodeFlags, NodeId, Sides};
