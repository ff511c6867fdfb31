// Copyright 2026 the Cassette Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cassette Viewer: the interactive layer over a laid out construct.
//!
//! A [`ConstructViewer`] owns a construct's scene and [`cassette_layout::Layout`] and turns
//! pointer input into selection, inline editing, collapsing, fence selection and block
//! drags. It never edits blocks itself: every change is a [`ViewerAction`] for the host to
//! apply before the next [`ConstructViewer::update`].
//!
//! - [`ConstructViewerUserInterface`]: hit testing and event handling, usable without a
//!   [`ConstructViewer`] through a [`ViewerContext`].
//! - [`UserInterface`]: the selection overlay and its recycled decorations.
//! - [`Fence`]: rubber-band selection.
//! - [`ViewerDropTarget`] and [`ViewerHost`]: the viewer as a target of a
//!   [`cassette_dnd::DragCoordinator`].
//! - [`insertion_site`] and [`natural_order`]: block tree queries hosts need to apply
//!   drops.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod config;
mod document;
mod fence;
mod interface;
mod selection;
mod types;
mod viewer;

pub use config::{Platform, ViewerConfig};
pub use document::{InsertionSite, block_parent, insertion_site, natural_order};
pub use fence::Fence;
pub use interface::{ConstructViewerUserInterface, ViewerContext};
pub use selection::{Decoration, DecorationId, UserInterface};
pub use types::{
    BLOCK_EDITOR_CLASS, BlockRegion, CONSTRUCT_VIEWER_SOURCE, Cursor, Document, DragItem, Edge,
    EditTarget, Focus, INVENTORY_SOURCE, Insertion, NearestBlock, PopupMenu, TITLE_EDITOR_CLASS,
    ViewerAction,
};
pub use viewer::{ConstructViewer, ViewerAccess, ViewerDropTarget, ViewerHost};
