// Copyright 2026 the Cassette Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Handles and flags shared by the scene graph and its clients.

/// Identifier for a node in a [`SceneGraph`](crate::SceneGraph) (generational).
///
/// A slot freed by [`SceneGraph::destroy`](crate::SceneGraph::destroy) is reused with a bumped
/// generation, so an old id never aliases the new occupant.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

bitflags::bitflags! {
    /// Node flags controlling visibility and identity.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct NodeFlags: u8 {
        /// Node is drawn. Hidden nodes are still hit tested.
        const VISIBLE = 0b0000_0001;
        /// The scene graph's root; it never has a parent.
        const ROOT    = 0b0000_0010;
    }
}

impl Default for NodeFlags {
    fn default() -> Self {
        Self::VISIBLE
    }
}

bitflags::bitflags! {
    /// Which edges of a rectangle carry a stroke.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Sides: u8 {
        /// Top edge.
        const TOP    = 0b0001;
        /// Right edge.
        const RIGHT  = 0b0010;
        /// Bottom edge.
        const BOTTOM = 0b0100;
        /// Left edge.
        const LEFT   = 0b1000;
    }
}

impl Default for Sides {
    fn default() -> Self {
        Self::all()
    }
}
