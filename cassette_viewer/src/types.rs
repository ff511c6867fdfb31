// Copyright 2026 the Cassette Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Values exchanged between the viewer and its host.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use cassette_dnd::Payload;
use cassette_geometry::{Box2D, Vector2D};
use cassette_layout::{BlockId, BlockStore, CollapseStore};
use cassette_scene::NodeId;
use hashbrown::HashMap;

/// [`Payload::source`] of drags started from a construct viewer.
pub const CONSTRUCT_VIEWER_SOURCE: &str = "construct-viewer";

/// [`Payload::source`] of drags started from the inventory; dropped blocks are cloned.
pub const INVENTORY_SOURCE: &str = "inventory";

/// Class of the inline editor opened over a block.
pub const BLOCK_EDITOR_CLASS: &str = "inline-editor-block";

/// Class of the inline editor opened over a construct title.
pub const TITLE_EDITOR_CLASS: &str = "inline-editor-construct-title";

/// What the host has focused.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Focus {
    /// The focused construct.
    pub construct_id: Option<BlockId>,
    /// Selected blocks.
    pub block_ids: Vec<BlockId>,
    /// Focused option per list block.
    pub options: HashMap<BlockId, BlockId>,
}

impl Focus {
    /// True if `block` is selected.
    pub fn has_block(&self, block: &str) -> bool {
        self.block_ids.iter().any(|id| id == block)
    }
}

/// Host data a viewer reads while handling input.
pub struct Document<'a> {
    /// Every block.
    pub blocks: &'a BlockStore,
    /// Current focus.
    pub focus: &'a Focus,
    /// Collapsed state per construct.
    pub collapse: &'a mut dyn CollapseStore,
}

impl fmt::Debug for Document<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("blocks", &self.blocks.len())
            .field("focus", &self.focus)
            .finish_non_exhaustive()
    }
}

/// What a drag carries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DragItem {
    /// Blocks, in natural order.
    Blocks(Vec<BlockId>),
    /// A whole construct, e.g. from the inventory.
    Construct {
        /// The construct.
        id: BlockId,
        /// Templates can only be dropped on a new-construct target.
        template: bool,
    },
    /// A role symbol; dropping it creates a block with that role.
    Role(String),
}

impl DragItem {
    /// True for a template construct.
    pub fn is_template(&self) -> bool {
        matches!(self, Self::Construct { template: true, .. })
    }
}

/// Side of a block targeted by a drop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Edge {
    /// Insert before the block.
    Left,
    /// Insert after the block.
    Right,
}

/// Where a drop would land.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Insertion {
    /// Target block.
    pub block: BlockId,
    /// Its node.
    pub node: NodeId,
    /// `None` to drop into the block, otherwise beside it.
    pub edge: Option<Edge>,
}

/// Result of the nearest-block search during a drag.
#[derive(Clone, Debug, PartialEq)]
pub struct NearestBlock {
    /// The block.
    pub block: BlockId,
    /// Its node.
    pub node: NodeId,
    /// The node's AABB.
    pub aabb: Box2D,
    /// Edge under the pointer, if any.
    pub edge: Option<Edge>,
}

/// Part of a block under a point.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BlockRegion {
    /// Outside the block and its option rows.
    None,
    /// The block body.
    Main,
    /// The expander triangle of a block with nested content.
    Triangle,
    /// An option row of a list block.
    ListOption {
        /// The list block.
        block: BlockId,
        /// The option, `None` for the empty-list placeholder.
        option: Option<BlockId>,
    },
}

/// Which context menu to open.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PopupMenu {
    /// Block menu.
    Block,
    /// Construct menu.
    Construct,
}

/// What an inline editor renames.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditTarget {
    /// A block.
    Block(BlockId),
    /// The construct title.
    ConstructTitle(BlockId),
}

/// Pointer cursor over the viewer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Cursor {
    /// Arrow.
    #[default]
    Default,
    /// Over something clickable.
    Pointer,
}

/// A side effect for the host to perform.
///
/// Positions and bounds are in document space.
#[derive(Clone, Debug, PartialEq)]
pub enum ViewerAction {
    /// Focus a construct.
    ConstructSelected(BlockId),
    /// Replace the block selection.
    BlockSelected(Vec<BlockId>),
    /// Toggle blocks in the selection.
    BlockToggleSelected(Vec<BlockId>),
    /// Extend the selection from `current` to `block` among siblings.
    BlockAddToSelectionsRange {
        /// Clicked block.
        block: BlockId,
        /// Blocks selected before the click.
        current: Vec<BlockId>,
    },
    /// Focus one option of a list block.
    OptionSelected {
        /// The list block.
        block: BlockId,
        /// The option.
        option: BlockId,
    },
    /// Open an inline editor; its value renames `target` on commit.
    ShowInlineEditor {
        /// What is renamed.
        target: EditTarget,
        /// Initial text.
        value: String,
        /// Editor bounds.
        bounds: Box2D,
        /// Editor style class.
        class: &'static str,
    },
    /// Show the inspector.
    OpenInspector,
    /// Open a context menu.
    OpenPopup {
        /// Which menu.
        menu: PopupMenu,
        /// Where.
        position: Vector2D,
    },
    /// Open an undo transaction; the drag that follows closes it.
    Transact,
    /// Remove blocks from their parents; they travel with the drag.
    RemoveBlocks(Vec<BlockId>),
    /// Add a dropped payload at the insertion point, or at the start of an empty
    /// construct, then select what was added.
    AddItemAtInsertionPoint {
        /// The dropped payload.
        payload: Payload<DragItem>,
        /// Where it goes.
        insertion: Option<Insertion>,
    },
    /// Autoscroll towards a point while a fence is dragged.
    MouseScroll(Vector2D),
    /// Stop autoscrolling.
    EndMouseScroll,
    /// Lay the viewer out again.
    Update,
}
