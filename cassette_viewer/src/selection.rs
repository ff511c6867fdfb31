// Copyright 2026 the Cassette Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Selection overlay.

use alloc::vec::Vec;

use cassette_geometry::{Box2D, Vector2D};
use cassette_scene::{NodeId, SceneGraph};
use hashbrown::HashMap;

/// Identity of a selection decoration.
///
/// Renderers key their overlay elements on it; a decoration keeps its id while it is
/// recycled from one selected node to another.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DecorationId(u32);

/// The highlight drawn over one selected node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Decoration {
    /// Identity.
    pub id: DecorationId,
    /// Overlay-space bounds: the node's AABB with its children, one unit larger each way.
    pub bounds: Box2D,
}

/// Selection state over a scene, with one decoration per selected node.
///
/// Decorations of nodes that leave the selection go to a bucket and are reused for newly
/// selected nodes before any new decoration is made.
#[derive(Clone, Debug, Default)]
pub struct UserInterface {
    selections: Vec<NodeId>,
    decorations: HashMap<NodeId, Decoration>,
    next_decoration: u32,
    size: Vector2D,
}

impl UserInterface {
    /// An empty overlay.
    pub fn new() -> Self {
        Self::default()
    }

    /// Selected nodes, in selection order.
    pub fn selections(&self) -> &[NodeId] {
        &self.selections
    }

    /// Replace the selection. An empty slice clears it.
    pub fn set_selections(&mut self, scene: &SceneGraph, nodes: &[NodeId]) {
        self.selections = nodes.to_vec();
        self.update_selections(scene);
    }

    /// Add nodes that are not selected yet.
    pub fn add_to_selections(&mut self, scene: &SceneGraph, nodes: &[NodeId]) {
        let mut added = 0;
        for &node in nodes {
            if !self.is_selected(node) {
                self.selections.push(node);
                added += 1;
            }
        }
        if added > 0 {
            self.update_selections(scene);
        }
    }

    /// Remove a node from the selection if it is there.
    ///
    /// Panics if `node` does not belong to `scene`.
    pub fn remove_from_selections(&mut self, scene: &SceneGraph, node: NodeId) {
        assert!(scene.is_alive(node), "node is not in our scene graph");
        if let Some(index) = self.selections.iter().position(|&n| n == node) {
            self.selections.remove(index);
            self.update_selections(scene);
        }
    }

    /// True if `node` is selected.
    pub fn is_selected(&self, node: NodeId) -> bool {
        self.selections.contains(&node)
    }

    /// Bring the decorations in line with the selection and the current node bounds.
    ///
    /// Selected nodes that were destroyed leave the selection.
    pub fn update_selections(&mut self, scene: &SceneGraph) {
        self.selections.retain(|&node| scene.is_alive(node));

        let mut bucket: Vec<Decoration> = Vec::new();
        let selections = &self.selections;
        self.decorations.retain(|node, decoration| {
            let keep = selections.contains(node);
            if !keep {
                bucket.push(*decoration);
            }
            keep
        });

        for &node in &self.selections {
            let bounds = scene.aabb_with_children(node);
            let bounds = Box2D::new(bounds.x, bounds.y, bounds.w + 1.0, bounds.h + 1.0);
            let decoration = match self.decorations.get(&node) {
                Some(existing) => existing.id,
                None => match bucket.pop() {
                    Some(recycled) => recycled.id,
                    None => {
                        self.next_decoration += 1;
                        DecorationId(self.next_decoration)
                    }
                },
            };
            self.decorations.insert(
                node,
                Decoration {
                    id: decoration,
                    bounds,
                },
            );
        }

        if !bucket.is_empty() {
            log::trace!("retired {} selection decorations", bucket.len());
        }
    }

    /// The decoration of a selected node.
    pub fn decoration(&self, node: NodeId) -> Option<&Decoration> {
        self.decorations.get(&node)
    }

    /// Decorations in selection order.
    pub fn decorations(&self) -> impl Iterator<Item = (NodeId, &Decoration)> + '_ {
        self.selections
            .iter()
            .filter_map(|&node| self.decorations.get(&node).map(|d| (node, d)))
    }

    /// General refresh after the scene changed.
    pub fn update(&mut self, scene: &SceneGraph) {
        self.update_selections(scene);
    }

    /// Match the overlay to the scene's logical size.
    pub fn update_size(&mut self, scene: &SceneGraph) {
        self.size = scene.size();
    }

    /// Overlay size as of the last [`update_size`](Self::update_size).
    pub fn size(&self) -> Vector2D {
        self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cassette_scene::{Glyph, NodeProps};

    fn scene_with(boxes: &[Box2D]) -> (SceneGraph, Vec<NodeId>) {
        let mut scene = SceneGraph::new(400.0, 300.0);
        let root = scene.root();
        let nodes = boxes
            .iter()
            .map(|&bounds| {
                let id = scene.create_node(NodeProps {
                    glyph: Glyph::Rectangle,
                    bounds: Some(bounds),
                    ..NodeProps::default()
                });
                scene.append_child(root, id)
            })
            .collect();
        (scene, nodes)
    }

    #[test]
    fn decoration_is_one_unit_larger() {
        let (scene, nodes) = scene_with(&[Box2D::new(10.0, 20.0, 80.0, 30.0)]);
        let mut ui = UserInterface::new();
        ui.set_selections(&scene, &nodes);
        let decoration = ui.decoration(nodes[0]).expect("selected node is decorated");
        assert_eq!(decoration.bounds, Box2D::new(10.0, 20.0, 81.0, 31.0));
    }

    #[test]
    fn decorations_are_recycled() {
        let (scene, nodes) = scene_with(&[
            Box2D::new(0.0, 0.0, 10.0, 10.0),
            Box2D::new(20.0, 0.0, 10.0, 10.0),
            Box2D::new(40.0, 0.0, 10.0, 10.0),
        ]);
        let mut ui = UserInterface::new();
        ui.set_selections(&scene, &nodes[..1]);
        let first = ui.decoration(nodes[0]).map(|d| d.id);

        ui.set_selections(&scene, &nodes[1..2]);
        assert_eq!(ui.decoration(nodes[0]), None);
        assert_eq!(
            ui.decoration(nodes[1]).map(|d| d.id),
            first,
            "the freed decoration moves to the new selection"
        );

        ui.add_to_selections(&scene, &nodes);
        assert_eq!(ui.selections(), &[nodes[1], nodes[0], nodes[2]]);
        let ids: Vec<_> = ui.decorations().map(|(_, d)| d.id).collect();
        assert_eq!(ids.len(), 3);
        assert!(ids[1] != ids[0] && ids[2] != ids[0] && ids[1] != ids[2]);
    }

    #[test]
    fn remove_and_clear() {
        let (scene, nodes) = scene_with(&[
            Box2D::new(0.0, 0.0, 10.0, 10.0),
            Box2D::new(20.0, 0.0, 10.0, 10.0),
        ]);
        let mut ui = UserInterface::new();
        ui.set_selections(&scene, &nodes);
        ui.remove_from_selections(&scene, nodes[0]);
        assert!(!ui.is_selected(nodes[0]));
        assert!(ui.is_selected(nodes[1]));
        ui.set_selections(&scene, &[]);
        assert_eq!(ui.decorations().count(), 0);
    }

    #[test]
    fn destroyed_nodes_leave_the_selection() {
        let (mut scene, nodes) = scene_with(&[
            Box2D::new(0.0, 0.0, 10.0, 10.0),
            Box2D::new(20.0, 0.0, 10.0, 10.0),
        ]);
        let mut ui = UserInterface::new();
        ui.set_selections(&scene, &nodes);
        scene.destroy(nodes[0]);
        ui.update(&scene);
        assert_eq!(ui.selections(), &[nodes[1]]);
    }

    #[test]
    #[should_panic(expected = "node is not in our scene graph")]
    fn removing_a_foreign_node_panics() {
        let (mut scene, nodes) = scene_with(&[Box2D::new(0.0, 0.0, 10.0, 10.0)]);
        let mut ui = UserInterface::new();
        scene.destroy(nodes[0]);
        ui.remove_from_selections(&scene, nodes[0]);
    }

    #[test]
    fn size_follows_the_scene() {
        let (mut scene, _) = scene_with(&[]);
        let mut ui = UserInterface::new();
        scene.set_size(640.0, 200.0);
        ui.update_size(&scene);
        assert_eq!(ui.size(), Vector2D::new(640.0, 200.0));
    }
}
