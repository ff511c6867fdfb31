// Copyright 2026 the Cassette Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The scene graph: node arena, structure edits, transforms, and spatial queries.

use alloc::vec::Vec;
use core::fmt;

use cassette_geometry::{Box2D, Matrix2D, Vector2D};

use crate::glyph::{GlyphMetrics, RenderCommand};
use crate::node::{Node2D, NodeProps, NodeUpdate};
use crate::text::TextCache;
use crate::types::{NodeFlags, NodeId};

/// One node's contribution to a [`DisplayList`].
#[derive(Clone, Debug, PartialEq)]
pub struct DisplayItem {
    /// Source node.
    pub node: NodeId,
    /// Local space to parent space.
    pub local_transform: Matrix2D,
    /// Local space to scene space.
    pub world_transform: Matrix2D,
    /// Node size in local units.
    pub size: Vector2D,
    /// Whether the node is drawn (hidden nodes keep their slot in paint order).
    pub visible: bool,
    /// Glyph, text and affordance commands in local coordinates.
    pub commands: Vec<RenderCommand>,
}

/// Every node's render output in paint order (back to front).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DisplayList {
    /// Items, parents before their children.
    pub items: Vec<DisplayItem>,
}

impl DisplayList {
    /// Item for `node`, if it was rendered.
    pub fn item(&self, node: NodeId) -> Option<&DisplayItem> {
        self.items.iter().find(|item| item.node == node)
    }
}

/// A retained-mode 2D scene.
///
/// Nodes live in a generational arena and are addressed by [`NodeId`]. The root node is created
/// with the graph, carries [`NodeFlags::ROOT`], and never has a parent. Nodes created with
/// [`SceneGraph::create_node`] start detached; attach them with [`SceneGraph::append_child`] or
/// [`SceneGraph::insert_back`].
///
/// Structural preconditions (attaching a parented node, detaching an orphan, addressing a
/// destroyed node) are programmer errors and panic.
///
/// ```
/// use cassette_geometry::{Box2D, Vector2D};
/// use cassette_scene::{Glyph, NodeProps, SceneGraph};
///
/// let mut scene = SceneGraph::new(800.0, 600.0);
/// let block = scene.create_node(NodeProps {
///     glyph: Glyph::Rectangle,
///     bounds: Some(Box2D::new(10.0, 10.0, 80.0, 30.0)),
///     ..NodeProps::default()
/// });
/// scene.append_child(scene.root(), block);
///
/// assert_eq!(scene.find_nodes_at(Vector2D::new(20.0, 20.0)), vec![block]);
/// assert_eq!(scene.aabb(), Some(Box2D::new(10.0, 10.0, 80.0, 30.0)));
/// ```
pub struct SceneGraph {
    /// slots
    nodes: Vec<Option<Node2D>>,
    /// last generation per slot (persists across frees)
    generations: Vec<u32>,
    free_list: Vec<usize>,
    root: NodeId,
    next_uuid: u64,
    width: f64,
    height: f64,
    available_width: f64,
    available_height: f64,
    dark: bool,
    text: TextCache,
    metrics: GlyphMetrics,
}

impl fmt::Debug for SceneGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.nodes.len();
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        f.debug_struct("SceneGraph")
            .field("nodes_total", &total)
            .field("nodes_alive", &alive)
            .field("free_list", &self.free_list.len())
            .field("size", &(self.width, self.height))
            .field("available", &(self.available_width, self.available_height))
            .finish_non_exhaustive()
    }
}

impl SceneGraph {
    /// Create a scene of logical size `width x height`; the viewport starts at the same size.
    pub fn new(width: f64, height: f64) -> Self {
        Self::with_text_cache(width, height, TextCache::default())
    }

    /// Create a scene that measures text through `text`.
    pub fn with_text_cache(width: f64, height: f64, text: TextCache) -> Self {
        let mut scene = Self {
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            root: NodeId::new(0, 0),
            next_uuid: 0,
            width,
            height,
            available_width: width,
            available_height: height,
            dark: false,
            text,
            metrics: GlyphMetrics::default(),
        };
        let root = scene.create_node(NodeProps::default());
        scene.node_mut(root).flags |= NodeFlags::ROOT;
        scene.root = root;
        scene
    }

    /// The root node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Logical (document) size.
    pub fn size(&self) -> Vector2D {
        Vector2D::new(self.width, self.height)
    }

    /// Set the logical size.
    pub fn set_size(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    /// Size of the window the scene is shown in.
    pub fn available_size(&self) -> Vector2D {
        Vector2D::new(self.available_width, self.available_height)
    }

    /// Set the viewport size.
    pub fn set_available_size(&mut self, width: f64, height: f64) {
        self.available_width = width;
        self.available_height = height;
    }

    /// Dim the whole scene, e.g. while a modal interaction is in progress.
    pub fn darken(&mut self) {
        self.dark = true;
    }

    /// Undo [`SceneGraph::darken`].
    pub fn lighten(&mut self) {
        self.dark = false;
    }

    /// True while darkened.
    pub fn is_dark(&self) -> bool {
        self.dark
    }

    /// Glyph sizes used when rendering.
    pub fn glyph_metrics(&self) -> &GlyphMetrics {
        &self.metrics
    }

    /// Replace the glyph sizes.
    pub fn set_glyph_metrics(&mut self, metrics: GlyphMetrics) {
        self.metrics = metrics;
    }

    // --- arena ---

    /// Create a detached node.
    pub fn create_node(&mut self, props: NodeProps) -> NodeId {
        self.next_uuid += 1;
        let uuid = self.next_uuid;
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(Node2D::new(generation, uuid, props));
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId indices are 32-bit."
            )]
            (idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.nodes.push(Some(Node2D::new(generation, uuid, props)));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId indices are 32-bit."
            )]
            ((self.nodes.len() - 1) as u32, generation)
        };
        let id = NodeId::new(idx, generation);
        log::trace!("created node {id:?} uuid {uuid}");
        id
    }

    /// Remove `id` and its whole subtree, detaching it from its parent first.
    ///
    /// Panics for the root or a stale id.
    pub fn destroy(&mut self, id: NodeId) {
        assert!(id != self.root, "the scene root cannot be destroyed");
        if let Some(parent) = self.node(id).parent {
            self.unlink(id, parent);
        }
        self.free_subtree(id);
    }

    fn free_subtree(&mut self, id: NodeId) {
        let children = core::mem::take(&mut self.node_mut(id).children);
        for child in children {
            self.free_subtree(child);
        }
        self.nodes[id.idx()] = None;
        self.free_list.push(id.idx());
        log::trace!("destroyed node {id:?}");
    }

    /// Returns true if `id` refers to a live node.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.nodes
            .get(id.idx())
            .and_then(|n| n.as_ref())
            .is_some_and(|n| n.generation == id.1)
    }

    /// Number of live nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len() - self.free_list.len()
    }

    /// Always false: the root is alive for the graph's whole lifetime.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Live node, or `None` for a stale id.
    pub fn get(&self, id: NodeId) -> Option<&Node2D> {
        let n = self.nodes.get(id.idx())?.as_ref()?;
        (n.generation == id.1).then_some(n)
    }

    /// Live node, mutably, or `None` for a stale id.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node2D> {
        let n = self.nodes.get_mut(id.idx())?.as_mut()?;
        if n.generation != id.1 {
            return None;
        }
        Some(n)
    }

    /// Live node; panics if `id` is stale.
    pub fn node(&self, id: NodeId) -> &Node2D {
        self.get(id).expect("dangling NodeId")
    }

    /// Live node, mutably; panics if `id` is stale.
    pub fn node_mut(&mut self, id: NodeId) -> &mut Node2D {
        self.get_mut(id).expect("dangling NodeId")
    }

    /// Apply a partial update to a node.
    pub fn set(&mut self, id: NodeId, update: NodeUpdate) {
        update.apply(self.node_mut(id));
    }

    /// Parent of a live node, or `None` for the root and detached nodes.
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Children of a node in paint order, or an empty slice if the id is stale.
    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |n| n.children.as_slice())
    }

    // --- structure ---

    /// Append `child` as the topmost child of `parent`. Returns `child`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> NodeId {
        assert!(
            self.node(child).parent.is_none() && child != self.root,
            "cannot append a parented node"
        );
        assert!(
            !self.is_node_or_child_of(parent, child),
            "cannot append a node beneath itself"
        );
        self.node_mut(parent).children.push(child);
        self.node_mut(child).parent = Some(parent);
        child
    }

    /// Detach `child` from `parent`. Returns `child`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> NodeId {
        assert!(
            self.node(parent).children.contains(&child),
            "node is not our child"
        );
        self.unlink(child, parent);
        child
    }

    /// Detach a parented node from its parent.
    pub fn detach(&mut self, id: NodeId) {
        let parent = self.node(id).parent.expect("node is not parented");
        self.unlink(id, parent);
    }

    /// Attach an unparented node as the bottom-most child of `parent`.
    pub fn insert_back(&mut self, id: NodeId, parent: NodeId) {
        assert!(
            self.node(id).parent.is_none() && id != self.root,
            "node is already parented"
        );
        assert!(
            !self.is_node_or_child_of(parent, id),
            "cannot insert a node beneath itself"
        );
        self.node_mut(parent).children.insert(0, id);
        self.node_mut(id).parent = Some(parent);
    }

    /// Move a parented node to the bottom of its parent's paint order.
    pub fn send_to_back(&mut self, id: NodeId) {
        let parent = self.node(id).parent.expect("node is not attached");
        if self.node(parent).children.first() == Some(&id) {
            return;
        }
        self.unlink(id, parent);
        self.insert_back(id, parent);
    }

    /// True if `id` is `other` or one of its descendants.
    pub fn is_node_or_child_of(&self, id: NodeId, other: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == other {
                return true;
            }
            current = self.parent_of(node);
        }
        false
    }

    fn unlink(&mut self, id: NodeId, parent: NodeId) {
        let siblings = &mut self.node_mut(parent).children;
        if let Some(pos) = siblings.iter().position(|&c| c == id) {
            siblings.remove(pos);
        }
        self.node_mut(id).parent = None;
    }

    // --- transforms ---

    /// Local transform of a node.
    pub fn local_transform(&self, id: NodeId) -> Matrix2D {
        self.node(id).local_transform()
    }

    /// Matrix from the node's local space to scene space: every ancestor's local transform
    /// composed with the node's own.
    pub fn transformation_matrix(&self, id: NodeId) -> Matrix2D {
        let node = self.node(id);
        let local = node.local_transform();
        match node.parent {
            Some(parent) => self.transformation_matrix(parent) * local,
            None => local,
        }
    }

    /// Inverse of [`SceneGraph::transformation_matrix`]; `None` when degenerate.
    pub fn inverse_transformation_matrix(&self, id: NodeId) -> Option<Matrix2D> {
        self.transformation_matrix(id).inverse()
    }

    /// Map a scene-space point into the node's local space.
    pub fn global_to_local(&self, id: NodeId, point: Vector2D) -> Option<Vector2D> {
        self.inverse_transformation_matrix(id)
            .map(|m| m.multiply_vector(point))
    }

    /// Map a local point into scene space.
    pub fn local_to_global(&self, id: NodeId, point: Vector2D) -> Vector2D {
        self.transformation_matrix(id).multiply_vector(point)
    }

    /// True if the scene-space point falls within the node's `0..=width x 0..=height` box.
    pub fn contains_global_point(&self, id: NodeId, point: Vector2D) -> bool {
        let node = self.node(id);
        self.global_to_local(id, point).is_some_and(|p| {
            p.x >= 0.0 && p.y >= 0.0 && p.x <= node.width && p.y <= node.height
        })
    }

    /// Scene-space bounding box of the node's transformed corners.
    pub fn aabb_of(&self, id: NodeId) -> Box2D {
        let node = self.node(id);
        let m = self.transformation_matrix(id);
        let corners = Box2D::new(0.0, 0.0, node.width, node.height).corners();
        Box2D::from_points(corners.iter().map(|&c| m.multiply_vector(c)))
    }

    /// Union of the node's AABB and every descendant's.
    pub fn aabb_with_children(&self, id: NodeId) -> Box2D {
        self.node(id)
            .children
            .iter()
            .fold(self.aabb_of(id), |acc, &child| {
                acc.union(&self.aabb_with_children(child))
            })
    }

    /// Measure `text` in the node's font, through the scene's text cache.
    pub fn measure_text(&mut self, id: NodeId, text: &str) -> Vector2D {
        let font = self.node(id).font.clone();
        self.text.measure(text, &font)
    }

    /// The scene's text cache.
    pub fn text_cache_mut(&mut self) -> &mut TextCache {
        &mut self.text
    }

    // --- queries ---

    /// Visit the root and every attached descendant, pre-order, children in paint order.
    pub fn traverse(&self, mut callback: impl FnMut(NodeId, &Node2D)) {
        let mut stack = Vec::new();
        stack.push(self.root);
        while let Some(id) = stack.pop() {
            let node = self.node(id);
            callback(id, node);
            stack.extend(node.children.iter().rev().copied());
        }
    }

    /// Attached non-root nodes containing `point`, in traversal order (last is topmost).
    pub fn find_nodes_at(&self, point: Vector2D) -> Vec<NodeId> {
        let mut hits = Vec::new();
        self.traverse(|id, node| {
            if node.parent.is_some() && self.contains_global_point(id, point) {
                hits.push(id);
            }
        });
        hits
    }

    /// Attached non-root nodes whose AABB overlaps `area`, in traversal order.
    pub fn find_nodes_within(&self, area: &Box2D) -> Vec<NodeId> {
        let mut hits = Vec::new();
        self.traverse(|id, node| {
            if node.parent.is_some() && self.aabb_of(id).intersect_with_box(area).is_some() {
                hits.push(id);
            }
        });
        hits
    }

    /// Union of every attached non-root node's AABB; `None` when there are none.
    pub fn aabb(&self) -> Option<Box2D> {
        let mut aabb: Option<Box2D> = None;
        self.traverse(|id, node| {
            if node.parent.is_some() {
                let b = self.aabb_of(id);
                aabb = Some(aabb.map_or(b, |a| a.union(&b)));
            }
        });
        aabb
    }

    // --- rendering ---

    /// Render a node and its subtree, appending to `out` in paint order.
    pub fn update_branch(&mut self, id: NodeId, out: &mut DisplayList) {
        let parent_matrix = self
            .node(id)
            .parent
            .map_or(Matrix2D::IDENTITY, |p| self.transformation_matrix(p));
        self.render_into(id, parent_matrix, out);
    }

    fn render_into(&mut self, id: NodeId, parent_matrix: Matrix2D, out: &mut DisplayList) {
        self.node_mut(id).sync_line();
        let node = self.node(id);
        let local = node.local_transform();
        let world = parent_matrix * local;
        out.items.push(DisplayItem {
            node: id,
            local_transform: local,
            world_transform: world,
            size: node.size(),
            visible: node.is_visible(),
            commands: node.render(&self.metrics),
        });
        let children = node.children.clone();
        for child in children {
            self.render_into(child, world, out);
        }
    }

    /// Re-render every attached node. There is no damage tracking: everything is emitted.
    pub fn update(&mut self) -> DisplayList {
        let mut out = DisplayList::default();
        self.render_into(self.root, Matrix2D::IDENTITY, &mut out);
        log::debug!("scene update rendered {} nodes", out.items.len());
        out
    }
}
