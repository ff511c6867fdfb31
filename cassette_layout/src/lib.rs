// Copyright 2026 the Cassette Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cassette Layout: places a genetic construct onto a [`cassette_scene::SceneGraph`].
//!
//! A construct is a [`Block`] whose components are other blocks. [`Layout`] draws a banner
//! and title, then flows the visible components left to right in rows that wrap at the
//! scene's available width. Components that are constructs themselves are laid out by a
//! nested [`Layout`] below their block and joined to it with a connector line. List blocks
//! stack their active options underneath.
//!
//! - [`Layout::update`]: one incremental pass. Nodes are reused between passes and anything
//!   not touched by the latest pass is destroyed, so repeated updates are idempotent.
//! - [`BlockStore`]: the block data a pass reads.
//! - [`CollapseStore`]: collapsed state per construct, kept outside the layout so it
//!   survives rebuilding the viewer.
//! - [`LayoutMetrics`]: every fixed distance the pass uses.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod appearance;
mod layout;
mod metrics;
mod model;
mod store;

pub use appearance::{
    BLOCK_HOVER_CLASS, BLOCK_HOVER_CLASS_NO_IMAGE, BLOCK_SEPARATOR, BLOCK_TEXT_COLOR,
    COLLAPSED_LABEL_TYPE, FILLER_TEXT_COLOR, NODE_TYPE, TITLE_HOVER_CLASS,
};
pub use layout::{Layout, LayoutResult, UpdateOptions};
pub use metrics::LayoutMetrics;
pub use model::{
    Block, BlockId, BlockMetadata, BlockRules, BlockStore, ColorRef, FALLBACK_COLOR,
    FILLER_COLOR, PALETTE, is_hex, role_display_name,
};
pub use store::{CollapseStore, MemoryCollapseStore, collapsed_key};
