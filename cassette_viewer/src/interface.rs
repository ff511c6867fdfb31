// Copyright 2026 the Cassette Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Input interpretation for one construct viewer.

use alloc::vec;
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt;
use core::mem;

use cassette_dnd::{DragCoordinator, DragOptions, Payload};
use cassette_event_state::{DragTrack, Modifiers, MouseEvent, MouseEventKind, MouseTrap};
use cassette_geometry::{Box2D, Vector2D};
use cassette_layout::{
    Block, BlockId, BlockStore, COLLAPSED_LABEL_TYPE, CollapseStore, Layout, NODE_TYPE,
};
use cassette_scene::{NodeId, NodeUpdate, SceneGraph};

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

use crate::config::ViewerConfig;
use crate::document::natural_order;
use crate::fence::Fence;
use crate::selection::UserInterface;
use crate::types::{
    BLOCK_EDITOR_CLASS, BlockRegion, CONSTRUCT_VIEWER_SOURCE, Cursor, DragItem, Edge,
    EditTarget, Focus, Insertion, NearestBlock, PopupMenu, TITLE_EDITOR_CLASS, ViewerAction,
};

/// Everything an input handler reads or touches besides the interface itself.
pub struct ViewerContext<'a> {
    /// The viewer's scene.
    pub scene: &'a mut SceneGraph,
    /// The viewer's layout.
    pub layout: &'a mut Layout,
    /// Every block.
    pub blocks: &'a BlockStore,
    /// Current focus.
    pub focus: &'a Focus,
    /// Collapsed state per construct.
    pub collapse: &'a mut dyn CollapseStore,
}

impl fmt::Debug for ViewerContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewerContext")
            .field("layout", &self.layout)
            .field("focus", &self.focus)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SelectAction {
    Replace,
    Add,
    Toggle,
    OptionSelect,
}

/// Templates are editable only while authored.
fn is_editable(construct: &Block) -> bool {
    construct.is_authoring() || !construct.rules.fixed
}

fn accepts_drops(construct: &Block) -> bool {
    !construct.is_frozen() && is_editable(construct)
}

fn set_title_hover(scene: &mut SceneGraph, layout: &Layout, hover: bool) {
    let Some(title) = layout.title_node() else {
        return;
    };
    if !scene.is_alive(title) || scene.node(title).hover == hover {
        return;
    }
    scene.set(
        title,
        NodeUpdate {
            hover: Some(hover),
            ..NodeUpdate::default()
        },
    );
}

/// The construct viewer's input layer.
///
/// Interprets [`MouseTrap`] events over a laid out construct: clicks select blocks, list
/// options or the construct title, a drag that starts on a block hands the selected blocks
/// to a [`DragCoordinator`], and a drag that starts elsewhere pulls out a [`Fence`]. As a
/// drop target it tracks the insertion point under the pointer.
///
/// Anything the host owns (focus, block data, popups, editors, undo) is requested through
/// [`ViewerAction`]s collected until [`take_actions`](Self::take_actions).
#[derive(Debug)]
pub struct ConstructViewerUserInterface {
    config: ViewerConfig,
    construct: BlockId,
    overlay: UserInterface,
    mouse_trap: MouseTrap,
    fence: Option<Fence>,
    insertion: Option<Insertion>,
    edge_marker: Option<Vector2D>,
    block_marker: Option<Box2D>,
    drag_inside: bool,
    cursor: Cursor,
    actions: Vec<ViewerAction>,
}

impl ConstructViewerUserInterface {
    /// An interface for `construct` with the default thresholds.
    pub fn new(construct: impl Into<BlockId>) -> Self {
        Self::with_config(construct, ViewerConfig::default())
    }

    /// An interface for `construct`.
    pub fn with_config(construct: impl Into<BlockId>, config: ViewerConfig) -> Self {
        Self {
            config,
            construct: construct.into(),
            overlay: UserInterface::new(),
            mouse_trap: MouseTrap::new(),
            fence: None,
            insertion: None,
            edge_marker: None,
            block_marker: None,
            drag_inside: false,
            cursor: Cursor::Default,
            actions: Vec::new(),
        }
    }

    /// Thresholds in use.
    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// The construct shown.
    pub fn construct_id(&self) -> &str {
        &self.construct
    }

    /// Selection overlay.
    pub fn overlay(&self) -> &UserInterface {
        &self.overlay
    }

    /// Selection overlay.
    pub fn overlay_mut(&mut self) -> &mut UserInterface {
        &mut self.overlay
    }

    /// Mouse normalizer for the viewer's element.
    pub fn mouse_trap(&self) -> &MouseTrap {
        &self.mouse_trap
    }

    /// Mouse normalizer for the viewer's element.
    pub fn mouse_trap_mut(&mut self) -> &mut MouseTrap {
        &mut self.mouse_trap
    }

    /// The fence being dragged out.
    pub fn fence(&self) -> Option<&Fence> {
        self.fence.as_ref()
    }

    /// Cursor to show.
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Where a drop would land right now.
    pub fn insertion_point(&self) -> Option<&Insertion> {
        self.insertion.as_ref()
    }

    /// Top-left of the edge insertion marker, when shown.
    pub fn edge_marker(&self) -> Option<Vector2D> {
        self.edge_marker
    }

    /// Bounds of the block insertion marker, when shown.
    pub fn block_marker(&self) -> Option<Box2D> {
        self.block_marker
    }

    /// True while a drag hovers the viewer.
    pub fn is_drag_inside(&self) -> bool {
        self.drag_inside
    }

    /// Actions collected since the last call.
    pub fn take_actions(&mut self) -> Vec<ViewerAction> {
        mem::take(&mut self.actions)
    }

    /// Actions collected so far.
    pub fn actions(&self) -> &[ViewerAction] {
        &self.actions
    }

    // --- hit testing ---

    /// Topmost node at `point` that means something to the viewer: part of the title, a
    /// block node, or the block owning a list option row.
    pub fn top_node_at(&self, scene: &SceneGraph, layout: &Layout, point: Vector2D) -> Option<NodeId> {
        let title = layout.title_node();
        for &hit in scene.find_nodes_at(point).iter().rev() {
            if let Some(title) = title
                && scene.is_node_or_child_of(hit, title)
            {
                return Some(hit);
            }
            if layout.element_from_node(hit).is_some() {
                return Some(hit);
            }
            if layout.list_option_at(hit).is_some() || layout.empty_list_at(hit).is_some() {
                return scene.parent_of(hit);
            }
        }
        None
    }

    /// Topmost block at `point`.
    pub fn top_block_at(&self, scene: &SceneGraph, layout: &Layout, point: Vector2D) -> Option<BlockId> {
        self.top_node_at(scene, layout, point)
            .and_then(|node| layout.element_from_node(node))
            .map(BlockId::from)
    }

    /// True if `node` is the construct title or part of it.
    pub fn is_construct_title_node(
        &self,
        scene: &SceneGraph,
        layout: &Layout,
        node: Option<NodeId>,
    ) -> bool {
        match (node, layout.title_node()) {
            (Some(node), Some(title)) => scene.is_node_or_child_of(node, title),
            _ => false,
        }
    }

    /// The block a drag with a proxy of `proxy_size` centered at `point` is aimed at, and
    /// whether the pointer is over its left or right edge.
    ///
    /// The proxy is clamped to [`ViewerConfig::max_proxy_extent`]. The block overlapping it
    /// most wins; with no overlap the block nearest vertically, then horizontally. List
    /// blocks cannot take children, so each half of a list block counts as an edge.
    /// `None` only when nothing is laid out.
    pub fn nearest_block_and_optional_vertical_edge_at(
        &self,
        scene: &SceneGraph,
        layout: &Layout,
        blocks: &BlockStore,
        point: Vector2D,
        proxy_size: Vector2D,
    ) -> Option<NearestBlock> {
        let width = proxy_size.x.min(self.config.max_proxy_extent);
        let height = proxy_size.y.min(self.config.max_proxy_extent);
        let proxy = Box2D::new(point.x - width / 2.0, point.y - height / 2.0, width, height);

        let items: Vec<(BlockId, NodeId, Box2D)> = layout
            .all_nodes_and_blocks()
            .into_iter()
            .filter(|(_, node)| scene.is_alive(*node))
            .map(|(block, node)| (block, node, scene.aabb_of(node)))
            .collect();

        let mut best: Option<(usize, f64)> = None;
        for (index, (_, _, aabb)) in items.iter().enumerate() {
            if let Some(overlap) = aabb.intersect_with_box(&proxy) {
                let area = overlap.w * overlap.h;
                if best.is_none_or(|(_, best_area)| area > best_area) {
                    best = Some((index, area));
                }
            }
        }
        let index = match best {
            Some((index, _)) => index,
            None => {
                let distance = |aabb: &Box2D| (aabb.proximity_y(&proxy), aabb.proximity_x(&proxy));
                items
                    .iter()
                    .enumerate()
                    .min_by(|(_, a), (_, b)| {
                        distance(&a.2)
                            .partial_cmp(&distance(&b.2))
                            .unwrap_or(Ordering::Equal)
                    })
                    .map(|(index, _)| index)?
            }
        };

        let (block, node, aabb) = items.into_iter().nth(index)?;
        let threshold = if blocks.block(&block).is_list() {
            (aabb.w / 2.0).ceil()
        } else {
            self.config.edge_threshold
        };
        let mut edge = None;
        if point.x <= aabb.x + threshold {
            edge = Some(Edge::Left);
        }
        if point.x >= aabb.right() - threshold {
            edge = Some(Edge::Right);
        }
        Some(NearestBlock {
            block,
            node,
            aabb,
            edge,
        })
    }

    /// Part of `block` under `point`.
    ///
    /// Option rows hang below their list block, so they are checked only outside the block.
    pub fn block_region(
        &self,
        scene: &SceneGraph,
        layout: &Layout,
        block: &str,
        point: Vector2D,
    ) -> BlockRegion {
        let Some(node) = layout.node_from_element(block) else {
            return BlockRegion::None;
        };
        let bounds = scene.aabb_of(node);
        if point.x < bounds.x
            || point.x > bounds.right()
            || point.y < bounds.y
            || point.y > bounds.bottom()
        {
            for &child in scene.children_of(node) {
                let (list, option) = if let Some((list, option)) = layout.list_option_at(child) {
                    (list, Some(option))
                } else if let Some(list) = layout.empty_list_at(child) {
                    (list, None)
                } else {
                    continue;
                };
                if scene.aabb_of(child).point_in_box(point) {
                    return BlockRegion::ListOption {
                        block: list.into(),
                        option: option.map(BlockId::from),
                    };
                }
            }
            return BlockRegion::None;
        }

        if scene.node(node).has_children {
            let size = self.config.triangle_size;
            let inset_x = point.x - bounds.x;
            let inset_y = point.y - bounds.y;
            if inset_x < size && inset_y < size && inset_y <= size - inset_x {
                return BlockRegion::Triangle;
            }
        }
        BlockRegion::Main
    }

    /// True if `point` is over the collapse toggle: the "N more..." label, or the triangle
    /// at the left of the banner.
    pub fn construct_expander(&self, scene: &SceneGraph, layout: &Layout, point: Vector2D) -> bool {
        let Some(&hit) = scene.find_nodes_at(point).last() else {
            return false;
        };
        if scene
            .node(hit)
            .data_attribute
            .as_ref()
            .is_some_and(|attribute| attribute.is(NODE_TYPE, COLLAPSED_LABEL_TYPE))
        {
            return true;
        }
        if layout.banner_node() == Some(hit) {
            let aabb = scene.aabb_of(hit);
            return point.x - aabb.x < aabb.h;
        }
        false
    }

    /// Blocks behind the overlay's selected nodes.
    pub fn selected_elements(&self, layout: &Layout) -> Vec<BlockId> {
        self.overlay
            .selections()
            .iter()
            .filter_map(|&node| layout.element_from_node(node))
            .map(BlockId::from)
            .collect()
    }

    /// Size of a drag proxy showing `draggables` side by side, up to
    /// [`ViewerConfig::proxy_block_limit`] of them.
    pub fn drag_proxy_size(&self, scene: &SceneGraph, layout: &Layout, draggables: &[BlockId]) -> Vector2D {
        let mut size = Vector2D::ZERO;
        for node in draggables
            .iter()
            .filter_map(|id| layout.node_from_element(id))
            .take(self.config.proxy_block_limit)
        {
            let node = scene.node(node);
            size.x += node.width;
            size.y = size.y.max(node.height);
        }
        size
    }

    fn block_editor_bounds(&self, scene: &SceneGraph, layout: &Layout, block: &str) -> Box2D {
        let aabb = layout
            .node_from_element(block)
            .map_or(Box2D::ZERO, |node| scene.aabb_of(node));
        let origin = self.mouse_trap.local_to_global(aabb.top_left());
        Box2D::new(origin.x, origin.y, aabb.w, aabb.h)
    }

    fn title_editor_bounds(&self, scene: &SceneGraph, layout: &Layout, title: NodeId) -> Box2D {
        let aabb = scene.aabb_of(title);
        let origin = self.mouse_trap.local_to_global(aabb.top_left());
        let blocks = layout.blocks_aabb(scene);
        let width = layout
            .title_text_width()
            .min(blocks.w)
            .max(scene.available_size().x / 2.0);
        Box2D::new(origin.x, origin.y + 6.0, width, aabb.h - 12.0)
    }

    // --- mouse ---

    /// Route a [`MouseTrap`] event.
    pub fn handle_event<H>(
        &mut self,
        cx: &mut ViewerContext<'_>,
        dnd: &mut DragCoordinator<DragItem, H>,
        event: MouseEvent,
    ) {
        match event.kind {
            MouseEventKind::Enter => self.mouse_enter(cx),
            MouseEventKind::Leave => self.mouse_leave(cx),
            // Selection waits for the release, which might end a drag instead.
            MouseEventKind::Down(_) => {}
            MouseEventKind::Move(point) => self.mouse_move(cx, point),
            MouseEventKind::Drag(track) => self.mouse_drag(cx, dnd, track, event.modifiers),
            MouseEventKind::Up(point) => self.mouse_up(cx, point, event.modifiers),
            MouseEventKind::DoubleClick(point) => self.double_click(cx, point),
            MouseEventKind::ContextMenu(point) => self.context_menu(cx, point),
        }
    }

    /// Clear the title hover.
    pub fn mouse_enter(&mut self, cx: &mut ViewerContext<'_>) {
        set_title_hover(cx.scene, cx.layout, false);
    }

    /// Clear the title hover.
    pub fn mouse_leave(&mut self, cx: &mut ViewerContext<'_>) {
        set_title_hover(cx.scene, cx.layout, false);
    }

    /// Hover feedback for a move without a button held.
    pub fn mouse_move(&mut self, cx: &mut ViewerContext<'_>, point: Vector2D) {
        let mut clickable = false;
        if !cx.layout.is_collapsed() {
            let top = cx.scene.find_nodes_at(point).last().copied();
            let is_title = self.is_construct_title_node(cx.scene, cx.layout, top);
            let is_block = self.top_block_at(cx.scene, cx.layout, point).is_some();
            if is_editable(cx.blocks.block(&self.construct)) {
                set_title_hover(cx.scene, cx.layout, is_title);
            }
            clickable = is_title || is_block;
        }
        self.cursor = if clickable {
            Cursor::Pointer
        } else {
            Cursor::Default
        };
    }

    /// Pointer moved with the left button held.
    ///
    /// Past the drag threshold a drag starting on a block becomes a block drag: the trap's
    /// track is cancelled, an undo transaction opened, and the blocks handed to `dnd`,
    /// removed from the construct unless Alt copies them. Elsewhere a fence starts, and
    /// further moves stretch it.
    pub fn mouse_drag<H>(
        &mut self,
        cx: &mut ViewerContext<'_>,
        dnd: &mut DragCoordinator<DragItem, H>,
        track: DragTrack,
        modifiers: Modifiers,
    ) {
        if cx.layout.is_collapsed() {
            return;
        }
        if track.distance > self.config.drag_threshold && self.fence.is_none() {
            match self.top_block_at(cx.scene, cx.layout, track.start) {
                Some(block) => self.start_block_drag(cx, dnd, block, track.point, modifiers),
                None => {
                    self.actions
                        .push(ViewerAction::ConstructSelected(self.construct.clone()));
                    if !modifiers.contains(Modifiers::SHIFT) {
                        self.actions.push(ViewerAction::BlockSelected(Vec::new()));
                    }
                    self.fence = Some(Fence::new(track.point, cx.scene.size()));
                }
            }
        } else if let Some(fence) = &mut self.fence {
            self.actions.push(ViewerAction::MouseScroll(
                self.mouse_trap.local_to_global(track.point),
            ));
            fence.update(track.point, cx.scene.size());
        }
    }

    fn start_block_drag<H>(
        &mut self,
        cx: &mut ViewerContext<'_>,
        dnd: &mut DragCoordinator<DragItem, H>,
        block: BlockId,
        point: Vector2D,
        modifiers: Modifiers,
    ) {
        self.mouse_trap.cancel_drag();
        let blocks = cx.blocks;
        if !accepts_drops(blocks.block(&self.construct)) {
            return;
        }
        if dnd.is_dragging() {
            log::warn!("block drag from {} ignored, a drag is running", self.construct);
            return;
        }
        self.actions.push(ViewerAction::Transact);

        let mut draggables = Vec::new();
        if cx.focus.has_block(&block) {
            draggables = self.selected_elements(cx.layout);
        }
        if draggables.is_empty() {
            draggables = vec![block];
            self.actions
                .push(ViewerAction::BlockSelected(draggables.clone()));
        }

        let position = self.mouse_trap.local_to_global(point);
        let proxy_size = self.drag_proxy_size(cx.scene, cx.layout, &draggables);
        let copying = modifiers.contains(Modifiers::ALT);
        let ids = natural_order(blocks, &self.construct, &draggables);
        if !copying {
            self.actions.push(ViewerAction::RemoveBlocks(ids.clone()));
        }
        log::debug!("dragging {} blocks from {}", ids.len(), self.construct);
        let payload = Payload::new(DragItem::Blocks(ids))
            .with_source(CONSTRUCT_VIEWER_SOURCE)
            .with_copying(copying);
        let options = DragOptions::default().with_undo_transaction();
        if let Err(error) = dnd.start_drag(proxy_size, position, payload, options) {
            log::warn!("block drag failed to start: {error}");
        }
    }

    /// Left button released: finish a fence, or select.
    pub fn mouse_up(&mut self, cx: &mut ViewerContext<'_>, point: Vector2D, modifiers: Modifiers) {
        if let Some(mut fence) = self.fence.take() {
            self.select_nodes_by_rectangle(cx, fence.bounds());
            fence.dispose();
            self.actions.push(ViewerAction::EndMouseScroll);
        } else {
            self.mouse_select(cx, point, modifiers);
        }
    }

    /// Open the inspector when a block is double clicked.
    pub fn double_click(&mut self, cx: &mut ViewerContext<'_>, point: Vector2D) {
        if let Some(top) = self.top_node_at(cx.scene, cx.layout, point)
            && cx.layout.element_from_node(top).is_some()
        {
            self.actions.push(ViewerAction::OpenInspector);
        }
    }

    /// Construct menu over the title, block menu elsewhere.
    ///
    /// With nothing selected the block under the pointer is selected first; with nothing
    /// selected and no block there, no menu opens.
    pub fn context_menu(&mut self, cx: &mut ViewerContext<'_>, point: Vector2D) {
        self.select_construct(cx.focus);
        let position = self.mouse_trap.local_to_global(point);
        let top = cx.scene.find_nodes_at(point).last().copied();
        if self.is_construct_title_node(cx.scene, cx.layout, top) {
            self.actions.push(ViewerAction::OpenPopup {
                menu: PopupMenu::Construct,
                position,
            });
            return;
        }
        if self.overlay.selections().is_empty() {
            let Some(block) = self.top_block_at(cx.scene, cx.layout, point) else {
                return;
            };
            self.actions.push(ViewerAction::BlockSelected(vec![block]));
        }
        self.actions.push(ViewerAction::OpenPopup {
            menu: PopupMenu::Block,
            position,
        });
    }

    /// A click: toggles collapse, selects blocks or options, or opens an inline editor.
    ///
    /// Shift adds to the selection; the platform toggle modifier or Alt toggles. Clicking the
    /// expander triangle of a block also shows or hides its nested construct. Clicking an
    /// already selected block of an editable construct edits its name.
    pub fn mouse_select(&mut self, cx: &mut ViewerContext<'_>, point: Vector2D, modifiers: Modifiers) {
        let blocks = cx.blocks;
        let construct = blocks.block(&self.construct);
        self.select_construct(cx.focus);

        if self.construct_expander(cx.scene, cx.layout, point) {
            let collapsed = !cx.layout.is_collapsed();
            cx.layout.set_collapsed(cx.collapse, collapsed);
            if collapsed {
                self.actions.push(ViewerAction::BlockSelected(Vec::new()));
            }
            self.actions.push(ViewerAction::Update);
            return;
        }
        if cx.layout.is_collapsed() {
            return;
        }
        let editable = is_editable(construct);

        let Some(block) = self.top_block_at(cx.scene, cx.layout, point) else {
            self.actions.push(ViewerAction::BlockSelected(Vec::new()));
            if editable
                && let Some(top) = self.top_node_at(cx.scene, cx.layout, point)
                && self.is_construct_title_node(cx.scene, cx.layout, Some(top))
                && let Some(title) = cx.layout.title_node()
            {
                let bounds = self.title_editor_bounds(cx.scene, cx.layout, title);
                self.actions.push(ViewerAction::ShowInlineEditor {
                    target: EditTarget::ConstructTitle(self.construct.clone()),
                    value: construct.display_name(Some("New Construct"), false),
                    bounds,
                    class: TITLE_EDITOR_CLASS,
                });
                set_title_hover(cx.scene, cx.layout, false);
            }
            return;
        };

        let mut action = SelectAction::Replace;
        if modifiers.contains(Modifiers::SHIFT) {
            action = SelectAction::Add;
        }
        if modifiers.is_toggle(self.config.platform.is_mac()) || modifiers.contains(Modifiers::ALT) {
            action = SelectAction::Toggle;
        }

        match self.block_region(cx.scene, cx.layout, &block, point) {
            BlockRegion::Triangle => {
                if let Some(node) = cx.layout.node_from_element(&block) {
                    let show = !cx.scene.node(node).show_children;
                    cx.scene.set(
                        node,
                        NodeUpdate {
                            show_children: Some(show),
                            ..NodeUpdate::default()
                        },
                    );
                }
                self.actions.push(ViewerAction::Update);
                if action == SelectAction::Replace {
                    action = SelectAction::Add;
                }
            }
            BlockRegion::ListOption {
                block: list,
                option: Some(option),
            } => {
                self.actions
                    .push(ViewerAction::OptionSelected { block: list, option });
                action = SelectAction::OptionSelect;
            }
            _ => {}
        }

        match action {
            SelectAction::Toggle => {
                self.actions
                    .push(ViewerAction::BlockToggleSelected(vec![block]));
            }
            SelectAction::Add => {
                let current = self.selected_elements(cx.layout);
                self.actions
                    .push(ViewerAction::BlockAddToSelectionsRange { block, current });
            }
            SelectAction::OptionSelect => {}
            SelectAction::Replace => {
                if cx.focus.has_block(&block) && editable {
                    let value = cx.layout.part_name(blocks, &block);
                    let bounds = self.block_editor_bounds(cx.scene, cx.layout, &block);
                    self.actions.push(ViewerAction::ShowInlineEditor {
                        target: EditTarget::Block(block),
                        value,
                        bounds,
                        class: BLOCK_EDITOR_CLASS,
                    });
                } else {
                    self.actions.push(ViewerAction::BlockSelected(vec![block]));
                }
            }
        }
    }

    /// Select the blocks touched by `area`, added to the current selection.
    pub fn select_nodes_by_rectangle(&mut self, cx: &mut ViewerContext<'_>, area: Box2D) {
        let mut parts: Vec<BlockId> = Vec::new();
        for hit in cx.scene.find_nodes_within(&area) {
            if let Some(block) = cx.layout.element_from_node(hit) {
                parts.push(block.into());
            } else if let Some(list) = cx
                .layout
                .list_option_at(hit)
                .map(|(list, _)| list)
                .or_else(|| cx.layout.empty_list_at(hit))
                && !parts.iter().any(|part| part == list)
            {
                parts.push(list.into());
            }
        }
        parts.extend(cx.focus.block_ids.iter().cloned());
        self.actions.push(ViewerAction::BlockSelected(parts));
    }

    fn select_construct(&mut self, focus: &Focus) {
        if focus.construct_id.as_deref() != Some(self.construct.as_str()) {
            self.actions
                .push(ViewerAction::ConstructSelected(self.construct.clone()));
        }
    }

    // --- drop target ---

    /// A drag entered the viewer.
    pub fn drag_enter(&mut self, cx: &mut ViewerContext<'_>) {
        self.drag_inside = true;
        self.hide_edge_insertion_point();
        self.hide_block_insertion_point();
        self.select_construct(cx.focus);
    }

    /// A drag left the viewer or dropped on it.
    pub fn drag_leave(&mut self) {
        self.drag_inside = false;
        self.hide_edge_insertion_point();
        self.hide_block_insertion_point();
    }

    /// Track the insertion point under a drag at document position `global`.
    ///
    /// Nothing is shown over a collapsed, frozen or locked template construct, or for a
    /// dragged template.
    pub fn drag_over(
        &mut self,
        cx: &mut ViewerContext<'_>,
        global: Vector2D,
        payload: &Payload<DragItem>,
        proxy_size: Vector2D,
    ) {
        if cx.layout.is_collapsed() {
            return;
        }
        self.select_construct(cx.focus);
        if !accepts_drops(cx.blocks.block(&self.construct)) || payload.item.is_template() {
            return;
        }
        let local = self.mouse_trap.global_to_local(global);
        match self.nearest_block_and_optional_vertical_edge_at(
            cx.scene, cx.layout, cx.blocks, local, proxy_size,
        ) {
            Some(hit) => match hit.edge {
                Some(edge) => self.show_insertion_point_for_edge(hit, edge),
                None => self.show_insertion_point_for_block(hit),
            },
            None => self.show_default_insert_point(cx.layout),
        }
    }

    /// A payload was dropped on the viewer. Returns false when the drop is ignored.
    pub fn drop_payload(&mut self, cx: &mut ViewerContext<'_>, payload: &Payload<DragItem>) -> bool {
        if cx.layout.is_collapsed()
            || !accepts_drops(cx.blocks.block(&self.construct))
            || payload.item.is_template()
        {
            return false;
        }
        self.actions.push(ViewerAction::AddItemAtInsertionPoint {
            payload: payload.clone(),
            insertion: self.insertion.clone(),
        });
        self.actions
            .push(ViewerAction::ConstructSelected(self.construct.clone()));
        true
    }

    fn show_default_insert_point(&mut self, layout: &Layout) {
        self.hide_block_insertion_point();
        let point = layout.initial_layout_point();
        self.show_edge_marker_at(point.x, point.y);
    }

    fn show_insertion_point_for_edge(&mut self, hit: NearestBlock, edge: Edge) {
        self.hide_block_insertion_point();
        let x = match edge {
            Edge::Left => hit.aabb.x,
            Edge::Right => hit.aabb.right(),
        };
        self.show_edge_marker_at((x - 3.0).max(0.0), hit.aabb.y + 1.0);
        self.insertion = Some(Insertion {
            block: hit.block,
            node: hit.node,
            edge: Some(edge),
        });
    }

    fn show_edge_marker_at(&mut self, x: f64, y: f64) {
        self.edge_marker = Some(Vector2D::new(x, y - 10.0));
    }

    fn show_insertion_point_for_block(&mut self, hit: NearestBlock) {
        self.hide_edge_insertion_point();
        let aabb = hit.aabb;
        self.block_marker = Some(Box2D::new(
            aabb.x - 6.0,
            aabb.y - 6.0,
            aabb.w + 1.0,
            aabb.h + 1.0,
        ));
        self.insertion = Some(Insertion {
            block: hit.block,
            node: hit.node,
            edge: None,
        });
    }

    fn hide_block_insertion_point(&mut self) {
        self.block_marker = None;
        self.insertion = None;
    }

    fn hide_edge_insertion_point(&mut self) {
        self.edge_marker = None;
        self.insertion = None;
    }

    // --- refresh ---

    /// Sync the overlay with the layout's selected nodes and the scene size, and shade the
    /// scene: lighter when the construct is focused.
    pub fn update(&mut self, scene: &mut SceneGraph, layout: &Layout, focused: bool) {
        self.overlay.set_selections(scene, layout.selected_nodes());
        self.overlay.update_size(scene);
        if focused {
            scene.lighten();
        } else {
            scene.darken();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::String;
    use cassette_dnd::Release;
    use cassette_layout::{MemoryCollapseStore, UpdateOptions};

    struct Fixture {
        scene: SceneGraph,
        layout: Layout,
        blocks: BlockStore,
        focus: Focus,
        collapse: MemoryCollapseStore,
        ui: ConstructViewerUserInterface,
    }

    impl Fixture {
        fn new(blocks: BlockStore) -> Self {
            let mut fixture = Self {
                scene: SceneGraph::new(1000.0, 600.0),
                layout: Layout::new(),
                blocks,
                focus: Focus {
                    construct_id: Some("c".into()),
                    ..Focus::default()
                },
                collapse: MemoryCollapseStore::new(),
                ui: ConstructViewerUserInterface::new("c"),
            };
            fixture.relayout();
            fixture
        }

        fn relayout(&mut self) {
            let options = UpdateOptions::new("c", &self.blocks)
                .with_current_blocks(&self.focus.block_ids);
            self.layout.update(&mut self.scene, &self.collapse, &options);
            self.ui.update(&mut self.scene, &self.layout, true);
        }

        fn cx(&mut self) -> (ViewerContext<'_>, &mut ConstructViewerUserInterface) {
            (
                ViewerContext {
                    scene: &mut self.scene,
                    layout: &mut self.layout,
                    blocks: &self.blocks,
                    focus: &self.focus,
                    collapse: &mut self.collapse,
                },
                &mut self.ui,
            )
        }

        fn click(&mut self, point: Vector2D, modifiers: Modifiers) -> Vec<ViewerAction> {
            let (mut cx, ui) = self.cx();
            ui.mouse_select(&mut cx, point, modifiers);
            ui.take_actions()
        }
    }

    fn named(id: &str, name: &str) -> Block {
        Block::new(id).with_name(name)
    }

    // c: a (1, 62), b (81, 62), g (161, 62), each 80 x 30. Title (0, 18, 970, 40).
    fn three_blocks() -> BlockStore {
        [
            named("c", "Construct").with_components(["a", "b", "g"]),
            named("a", "pTet"),
            named("b", "RBS1"),
            named("g", "GFP"),
        ]
        .into_iter()
        .collect()
    }

    // c: l (1, 62, 123 x 30) with rows for o1 and o3 at y 93 and 115, then x.
    fn list_blocks() -> BlockStore {
        [
            named("c", "Construct").with_components(["l", "x"]),
            named("l", "Promoters").with_options([("o1", true), ("o2", false), ("o3", true)]),
            named("x", "Next"),
            named("o1", "Option One"),
            named("o2", "Option Two"),
            named("o3", "Option Three"),
        ]
        .into_iter()
        .collect()
    }

    fn at(x: f64, y: f64) -> Vector2D {
        Vector2D::new(x, y)
    }

    fn ids(values: &[&str]) -> Vec<BlockId> {
        values.iter().map(|&v| String::from(v)).collect()
    }

    #[test]
    fn hit_testing() {
        let f = Fixture::new(three_blocks());
        let (scene, layout, ui) = (&f.scene, &f.layout, &f.ui);
        assert_eq!(ui.top_block_at(scene, layout, at(40.0, 77.0)).as_deref(), Some("a"));
        assert_eq!(ui.top_block_at(scene, layout, at(100.0, 77.0)).as_deref(), Some("b"));
        assert_eq!(ui.top_block_at(scene, layout, at(500.0, 77.0)), None);

        let title = ui.top_node_at(scene, layout, at(100.0, 30.0));
        assert!(title.is_some());
        assert!(ui.is_construct_title_node(scene, layout, title));
        assert!(!ui.is_construct_title_node(scene, layout, None));
        assert!(ui.construct_expander(scene, layout, at(5.0, 5.0)));
        assert!(!ui.construct_expander(scene, layout, at(40.0, 5.0)));
    }

    #[test]
    fn option_rows_resolve_to_their_block() {
        let f = Fixture::new(list_blocks());
        let (scene, layout, ui) = (&f.scene, &f.layout, &f.ui);
        assert_eq!(ui.top_block_at(scene, layout, at(10.0, 100.0)).as_deref(), Some("l"));
        assert_eq!(
            ui.block_region(scene, layout, "l", at(10.0, 100.0)),
            BlockRegion::ListOption {
                block: "l".into(),
                option: Some("o1".into()),
            }
        );
        assert_eq!(
            ui.block_region(scene, layout, "l", at(10.0, 120.0)),
            BlockRegion::ListOption {
                block: "l".into(),
                option: Some("o3".into()),
            }
        );
        assert_eq!(ui.block_region(scene, layout, "l", at(60.0, 77.0)), BlockRegion::Main);
        assert_eq!(ui.block_region(scene, layout, "l", at(600.0, 77.0)), BlockRegion::None);
    }

    #[test]
    fn triangle_region() {
        let mut f = Fixture::new(three_blocks());
        let a = f.layout.node_from_element("a").expect("laid out");
        f.scene.node_mut(a).has_children = true;
        let (scene, layout, ui) = (&f.scene, &f.layout, &f.ui);
        assert_eq!(ui.block_region(scene, layout, "a", at(5.0, 66.0)), BlockRegion::Triangle);
        assert_eq!(ui.block_region(scene, layout, "a", at(15.0, 80.0)), BlockRegion::Main);
    }

    #[test]
    fn nearest_block_and_edges() {
        let f = Fixture::new(three_blocks());
        let (scene, layout, ui) = (&f.scene, &f.layout, &f.ui);
        let proxy = at(20.0, 20.0);
        let nearest = |point| {
            ui.nearest_block_and_optional_vertical_edge_at(scene, layout, &f.blocks, point, proxy)
                .map(|hit| (hit.block, hit.edge))
        };
        assert_eq!(nearest(at(50.0, 77.0)), Some(("a".into(), None)));
        assert_eq!(
            nearest(at(75.0, 77.0)),
            Some(("a".into(), Some(Edge::Right))),
            "largest overlap wins"
        );
        assert_eq!(nearest(at(90.0, 77.0)), Some(("b".into(), Some(Edge::Left))));
        assert_eq!(
            nearest(at(500.0, 300.0)),
            Some(("g".into(), Some(Edge::Right))),
            "no overlap falls back to proximity"
        );
    }

    #[test]
    fn list_blocks_are_all_edge() {
        let f = Fixture::new(list_blocks());
        let (scene, layout, ui) = (&f.scene, &f.layout, &f.ui);
        let hit = ui
            .nearest_block_and_optional_vertical_edge_at(scene, layout, &f.blocks, at(60.0, 77.0), at(1.0, 1.0))
            .expect("over l");
        assert_eq!(hit.block, "l");
        assert_eq!(hit.edge, Some(Edge::Left), "left half of 123 wide block");
        let hit = ui
            .nearest_block_and_optional_vertical_edge_at(scene, layout, &f.blocks, at(70.0, 77.0), at(1.0, 1.0))
            .expect("over l");
        assert_eq!(hit.edge, Some(Edge::Right));
    }

    #[test]
    fn click_replaces_shift_adds_toggle_toggles() {
        let mut f = Fixture::new(three_blocks());
        assert_eq!(
            f.click(at(40.0, 77.0), Modifiers::empty()),
            [ViewerAction::BlockSelected(ids(&["a"]))]
        );
        assert_eq!(
            f.click(at(40.0, 77.0), Modifiers::SHIFT),
            [ViewerAction::BlockAddToSelectionsRange {
                block: "a".into(),
                current: Vec::new(),
            }]
        );
        assert_eq!(
            f.click(at(40.0, 77.0), Modifiers::CTRL),
            [ViewerAction::BlockToggleSelected(ids(&["a"]))]
        );
        assert_eq!(
            f.click(at(40.0, 77.0), Modifiers::ALT),
            [ViewerAction::BlockToggleSelected(ids(&["a"]))],
            "alt toggles on every platform"
        );
    }

    #[test]
    fn click_on_empty_space_clears_and_selects_the_construct() {
        let mut f = Fixture::new(three_blocks());
        f.focus.construct_id = Some("other".into());
        assert_eq!(
            f.click(at(600.0, 77.0), Modifiers::empty()),
            [
                ViewerAction::ConstructSelected("c".into()),
                ViewerAction::BlockSelected(Vec::new()),
            ]
        );
    }

    #[test]
    fn clicking_a_focused_block_edits_it() {
        let mut f = Fixture::new(three_blocks());
        f.focus.block_ids = ids(&["a"]);
        f.relayout();
        let actions = f.click(at(40.0, 77.0), Modifiers::empty());
        assert_eq!(
            actions,
            [ViewerAction::ShowInlineEditor {
                target: EditTarget::Block("a".into()),
                value: "pTet".into(),
                bounds: Box2D::new(1.0, 62.0, 80.0, 30.0),
                class: BLOCK_EDITOR_CLASS,
            }]
        );

        let mut fixed = three_blocks();
        if let Some(c) = fixed.get_mut("c") {
            c.rules.fixed = true;
        }
        let mut f = Fixture::new(fixed);
        f.focus.block_ids = ids(&["a"]);
        assert_eq!(
            f.click(at(40.0, 77.0), Modifiers::empty()),
            [ViewerAction::BlockSelected(ids(&["a"]))],
            "templates are not edited in place"
        );
    }

    #[test]
    fn clicking_the_title_edits_it() {
        let mut f = Fixture::new(three_blocks());
        let title = f.layout.title_node().expect("title");
        f.scene.node_mut(title).hover = true;
        let actions = f.click(at(100.0, 30.0), Modifiers::empty());
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0], ViewerAction::BlockSelected(Vec::new()));
        let ViewerAction::ShowInlineEditor {
            target,
            value,
            bounds,
            class,
        } = &actions[1]
        else {
            panic!("expected the title editor");
        };
        assert_eq!(target, &EditTarget::ConstructTitle("c".into()));
        assert_eq!(value, "Construct");
        assert_eq!(*class, TITLE_EDITOR_CLASS);
        assert_eq!(bounds.y, 24.0);
        assert_eq!(bounds.h, 28.0);
        assert_eq!(bounds.w, 500.0, "at least half the available width");
        assert!(!f.scene.node(title).hover);
    }

    #[test]
    fn option_click_selects_the_option() {
        let mut f = Fixture::new(list_blocks());
        assert_eq!(
            f.click(at(10.0, 120.0), Modifiers::empty()),
            [ViewerAction::OptionSelected {
                block: "l".into(),
                option: "o3".into(),
            }]
        );
    }

    #[test]
    fn triangle_click_toggles_nested_content() {
        let mut f = Fixture::new(three_blocks());
        let a = f.layout.node_from_element("a").expect("laid out");
        f.scene.node_mut(a).has_children = true;
        let shown = f.scene.node(a).show_children;
        let actions = f.click(at(5.0, 66.0), Modifiers::empty());
        assert_eq!(f.scene.node(a).show_children, !shown);
        assert_eq!(
            actions,
            [
                ViewerAction::Update,
                ViewerAction::BlockAddToSelectionsRange {
                    block: "a".into(),
                    current: Vec::new(),
                },
            ]
        );
    }

    #[test]
    fn banner_triangle_collapses() {
        let mut f = Fixture::new(three_blocks());
        let actions = f.click(at(5.0, 5.0), Modifiers::empty());
        assert_eq!(
            actions,
            [ViewerAction::BlockSelected(Vec::new()), ViewerAction::Update]
        );
        assert!(f.layout.is_collapsed());
        assert!(f.collapse.is_collapsed("c"));

        f.relayout();
        assert!(
            f.click(at(40.0, 77.0), Modifiers::empty()).is_empty(),
            "blocks ignore clicks while collapsed"
        );
        assert_eq!(
            f.click(at(950.0, 77.0), Modifiers::empty()),
            [ViewerAction::Update],
            "the more label expands"
        );
        assert!(!f.collapse.is_collapsed("c"));
    }

    #[test]
    fn hover_and_cursor() {
        let mut f = Fixture::new(three_blocks());
        let title = f.layout.title_node().expect("title");
        {
            let (mut cx, ui) = f.cx();
            ui.mouse_move(&mut cx, at(100.0, 30.0));
            assert_eq!(ui.cursor(), Cursor::Pointer);
        }
        assert!(f.scene.node(title).hover);
        {
            let (mut cx, ui) = f.cx();
            ui.mouse_move(&mut cx, at(600.0, 200.0));
            assert_eq!(ui.cursor(), Cursor::Default);
            ui.mouse_move(&mut cx, at(40.0, 77.0));
            assert_eq!(ui.cursor(), Cursor::Pointer);
        }
        assert!(!f.scene.node(title).hover);
    }

    #[test]
    fn double_click_opens_the_inspector_over_blocks_only() {
        let mut f = Fixture::new(three_blocks());
        let (mut cx, ui) = f.cx();
        ui.double_click(&mut cx, at(600.0, 77.0));
        assert!(ui.actions().is_empty());
        ui.double_click(&mut cx, at(40.0, 77.0));
        assert_eq!(ui.take_actions(), [ViewerAction::OpenInspector]);
    }

    #[test]
    fn context_menus() {
        let mut f = Fixture::new(three_blocks());
        f.ui.mouse_trap_mut().set_element_offset(at(10.0, 100.0));
        let (mut cx, ui) = f.cx();
        ui.context_menu(&mut cx, at(100.0, 30.0));
        assert_eq!(
            ui.take_actions(),
            [ViewerAction::OpenPopup {
                menu: PopupMenu::Construct,
                position: at(110.0, 130.0),
            }]
        );
        ui.context_menu(&mut cx, at(40.0, 77.0));
        assert_eq!(
            ui.take_actions(),
            [
                ViewerAction::BlockSelected(ids(&["a"])),
                ViewerAction::OpenPopup {
                    menu: PopupMenu::Block,
                    position: at(50.0, 177.0),
                },
            ]
        );
        ui.context_menu(&mut cx, at(600.0, 200.0));
        assert!(ui.take_actions().is_empty(), "no block, no selection, no menu");
    }

    #[test]
    fn fence_selects_touched_blocks() {
        let mut f = Fixture::new(list_blocks());
        f.focus.block_ids = ids(&["x"]);
        let mut dnd: DragCoordinator<DragItem, ()> = DragCoordinator::new();
        let (mut cx, ui) = f.cx();

        let track = DragTrack {
            point: at(5.0, 140.0),
            start: at(5.0, 150.0),
            distance: 10.0,
        };
        ui.mouse_drag(&mut cx, &mut dnd, track, Modifiers::SHIFT);
        assert!(ui.fence().is_some());
        assert_eq!(ui.take_actions(), [ViewerAction::ConstructSelected("c".into())]);

        let track = DragTrack {
            point: at(20.0, 110.0),
            start: at(5.0, 150.0),
            distance: 42.0,
        };
        ui.mouse_drag(&mut cx, &mut dnd, track, Modifiers::SHIFT);
        assert_eq!(ui.take_actions(), [ViewerAction::MouseScroll(at(20.0, 110.0))]);
        assert_eq!(ui.fence().map(Fence::bounds), Some(Box2D::new(5.0, 110.0, 15.0, 30.0)));

        ui.mouse_up(&mut cx, at(20.0, 110.0), Modifiers::empty());
        assert!(ui.fence().is_none());
        assert_eq!(
            ui.take_actions(),
            [
                ViewerAction::BlockSelected(ids(&["l", "x"])),
                ViewerAction::EndMouseScroll,
            ],
            "option rows select their list block once"
        );
        assert!(!dnd.is_dragging());
    }

    #[test]
    fn short_drags_do_nothing() {
        let mut f = Fixture::new(three_blocks());
        let mut dnd: DragCoordinator<DragItem, ()> = DragCoordinator::new();
        let (mut cx, ui) = f.cx();
        let track = DragTrack {
            point: at(45.0, 77.0),
            start: at(40.0, 77.0),
            distance: 5.0,
        };
        ui.mouse_drag(&mut cx, &mut dnd, track, Modifiers::empty());
        assert!(ui.actions().is_empty());
        assert!(ui.fence().is_none());
        assert!(!dnd.is_dragging());
    }

    #[test]
    fn block_drag_hands_off_to_dnd() {
        let mut f = Fixture::new(three_blocks());
        let mut dnd: DragCoordinator<DragItem, ()> = DragCoordinator::new();
        let (mut cx, ui) = f.cx();
        let track = DragTrack {
            point: at(60.0, 77.0),
            start: at(40.0, 77.0),
            distance: 20.0,
        };
        ui.mouse_drag(&mut cx, &mut dnd, track, Modifiers::empty());
        assert_eq!(
            ui.take_actions(),
            [
                ViewerAction::Transact,
                ViewerAction::BlockSelected(ids(&["a"])),
                ViewerAction::RemoveBlocks(ids(&["a"])),
            ]
        );
        let session = dnd.session().expect("drag started");
        assert_eq!(session.payload().item, DragItem::Blocks(ids(&["a"])));
        assert_eq!(session.payload().source.as_deref(), Some(CONSTRUCT_VIEWER_SOURCE));
        assert!(!session.payload().copying);
        assert_eq!(session.proxy_size(), at(80.0, 30.0));
        assert_eq!(dnd.pointer_up(&mut (), at(5000.0, 5000.0)), Release::Missed);
    }

    #[test]
    fn dragging_the_selection_copies_with_alt() {
        let mut f = Fixture::new(three_blocks());
        f.focus.block_ids = ids(&["g", "a"]);
        f.relayout();
        assert_eq!(f.ui.overlay().selections().len(), 2);

        let mut dnd: DragCoordinator<DragItem, ()> = DragCoordinator::new();
        let (mut cx, ui) = f.cx();
        let track = DragTrack {
            point: at(60.0, 77.0),
            start: at(40.0, 77.0),
            distance: 20.0,
        };
        ui.mouse_drag(&mut cx, &mut dnd, track, Modifiers::ALT);
        assert_eq!(ui.take_actions(), [ViewerAction::Transact]);
        let session = dnd.session().expect("drag started");
        assert_eq!(session.payload().item, DragItem::Blocks(ids(&["a", "g"])));
        assert!(session.payload().copying);
        assert_eq!(session.proxy_size(), at(160.0, 30.0));
    }

    #[test]
    fn frozen_constructs_do_not_drag() {
        let mut blocks = three_blocks();
        if let Some(c) = blocks.get_mut("c") {
            c.rules.frozen = true;
        }
        let mut f = Fixture::new(blocks);
        let mut dnd: DragCoordinator<DragItem, ()> = DragCoordinator::new();
        let (mut cx, ui) = f.cx();
        let track = DragTrack {
            point: at(60.0, 77.0),
            start: at(40.0, 77.0),
            distance: 20.0,
        };
        ui.mouse_drag(&mut cx, &mut dnd, track, Modifiers::empty());
        assert!(ui.actions().is_empty());
        assert!(!dnd.is_dragging());
        assert!(!ui.mouse_trap().is_dragging(), "the track is cancelled either way");
    }

    #[test]
    fn drag_over_tracks_the_insertion_point() {
        let mut f = Fixture::new(three_blocks());
        let (mut cx, ui) = f.cx();
        let payload = Payload::new(DragItem::Role("promoter".into()));
        ui.drag_enter(&mut cx);
        assert!(ui.is_drag_inside());

        ui.drag_over(&mut cx, at(75.0, 77.0), &payload, at(20.0, 20.0));
        let insertion = ui.insertion_point().expect("edge");
        assert_eq!(insertion.block, "a");
        assert_eq!(insertion.edge, Some(Edge::Right));
        assert_eq!(ui.edge_marker(), Some(at(78.0, 53.0)));
        assert_eq!(ui.block_marker(), None);

        ui.drag_over(&mut cx, at(121.0, 77.0), &payload, at(20.0, 20.0));
        let insertion = ui.insertion_point().expect("block");
        assert_eq!(insertion.block, "b");
        assert_eq!(insertion.edge, None);
        assert_eq!(ui.edge_marker(), None);
        assert_eq!(ui.block_marker(), Some(Box2D::new(75.0, 56.0, 81.0, 31.0)));

        assert!(ui.drop_payload(&mut cx, &payload));
        let actions = ui.take_actions();
        assert_eq!(
            actions[0],
            ViewerAction::AddItemAtInsertionPoint {
                payload: payload.clone(),
                insertion: Some(Insertion {
                    block: "b".into(),
                    node: cx.layout.node_from_element("b").expect("laid out"),
                    edge: None,
                }),
            }
        );
        assert_eq!(actions[1], ViewerAction::ConstructSelected("c".into()));

        ui.drag_leave();
        assert!(!ui.is_drag_inside());
        assert_eq!(ui.insertion_point(), None);
        assert_eq!(ui.block_marker(), None);
    }

    #[test]
    fn empty_constructs_get_the_default_insertion_point() {
        let blocks: BlockStore = [named("c", "Empty")].into_iter().collect();
        let mut f = Fixture::new(blocks);
        let initial = f.layout.initial_layout_point();
        let (mut cx, ui) = f.cx();
        let payload = Payload::new(DragItem::Blocks(ids(&["z"])));
        ui.drag_over(&mut cx, at(300.0, 300.0), &payload, at(80.0, 30.0));
        assert_eq!(ui.insertion_point(), None);
        assert_eq!(ui.edge_marker(), Some(at(initial.x, initial.y - 10.0)));
    }

    #[test]
    fn templates_are_refused() {
        let mut f = Fixture::new(three_blocks());
        let (mut cx, ui) = f.cx();
        let payload = Payload::new(DragItem::Construct {
            id: "t".into(),
            template: true,
        });
        ui.drag_over(&mut cx, at(40.0, 77.0), &payload, at(20.0, 20.0));
        assert_eq!(ui.insertion_point(), None);
        assert!(!ui.drop_payload(&mut cx, &payload));
        assert!(ui.actions().is_empty());
    }

    #[test]
    fn update_shades_by_focus() {
        let mut f = Fixture::new(three_blocks());
        f.ui.update(&mut f.scene, &f.layout, false);
        assert!(f.scene.is_dark());
        f.ui.update(&mut f.scene, &f.layout, true);
        assert!(!f.scene.is_dark());
        assert_eq!(f.ui.overlay().size(), f.scene.size());
    }
}
