// Copyright 2026 the Cassette Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Read-only queries over the block tree of a construct.

use alloc::vec::Vec;

use cassette_layout::{Block, BlockId, BlockStore};

use crate::types::{Edge, Insertion};

/// The block whose components include `block`, searching the tree under `construct`.
pub fn block_parent<'a>(blocks: &'a BlockStore, construct: &str, block: &str) -> Option<&'a Block> {
    let mut stack = alloc::vec![blocks.block(construct)];
    while let Some(current) = stack.pop() {
        if current.components.iter().any(|id| id == block) {
            return Some(current);
        }
        stack.extend(current.components.iter().filter_map(|id| blocks.get(id)));
    }
    None
}

/// `selected` in the order the blocks appear in the construct, depth first, leaving out
/// blocks nested under another selected block.
///
/// Ids that are not part of the construct are dropped.
pub fn natural_order(blocks: &BlockStore, construct: &str, selected: &[BlockId]) -> Vec<BlockId> {
    fn walk(
        blocks: &BlockStore,
        id: &str,
        selected: &[BlockId],
        covered: bool,
        out: &mut Vec<BlockId>,
    ) {
        for child in &blocks.block(id).components {
            let picked = selected.contains(child);
            if picked && !covered {
                out.push(child.clone());
            }
            walk(blocks, child, selected, covered || picked, out);
        }
    }

    let mut out = Vec::with_capacity(selected.len());
    walk(blocks, construct, selected, false, &mut out);
    if out.len() < selected.len() {
        log::trace!(
            "{} selected blocks are nested or outside {construct}",
            selected.len() - out.len()
        );
    }
    out
}

/// Where dropped blocks go.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InsertionSite {
    /// Insert into `parent`'s components at `index`.
    At {
        /// Receiving block.
        parent: BlockId,
        /// Component index.
        index: usize,
    },
    /// `displaced` has a sequence, so it cannot take children. Replace it at `index` in
    /// `parent` with a new empty block holding `displaced` followed by the dropped blocks.
    PushDown {
        /// Parent of the displaced block.
        parent: BlockId,
        /// Index of the displaced block in `parent`.
        index: usize,
        /// The drop target.
        displaced: BlockId,
    },
}

/// Resolve an insertion point into a parent and component index.
///
/// Without an insertion point blocks go at the end of the construct. An edge inserts beside
/// its block; no edge inserts into the block as its last component.
///
/// Panics if the insertion block is not part of the construct.
pub fn insertion_site(
    blocks: &BlockStore,
    construct: &str,
    insertion: Option<&Insertion>,
) -> InsertionSite {
    let Some(insertion) = insertion else {
        return InsertionSite::At {
            parent: construct.into(),
            index: blocks.block(construct).components.len(),
        };
    };
    let Some(parent) = block_parent(blocks, construct, &insertion.block) else {
        panic!("block {} is not part of construct {construct}", insertion.block);
    };
    let position = parent
        .components
        .iter()
        .position(|id| *id == insertion.block)
        .unwrap_or(parent.components.len());

    match insertion.edge {
        Some(edge) => InsertionSite::At {
            parent: parent.id.clone(),
            index: position + usize::from(edge == Edge::Right),
        },
        None => {
            let target = blocks.block(&insertion.block);
            if target.has_sequence {
                InsertionSite::PushDown {
                    parent: parent.id.clone(),
                    index: position,
                    displaced: target.id.clone(),
                }
            } else {
                InsertionSite::At {
                    parent: target.id.clone(),
                    index: target.components.len(),
                }
            }
        }
    }
}
