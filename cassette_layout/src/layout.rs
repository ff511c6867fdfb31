// Copyright 2026 the Cassette Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The incremental construct layout.

use alloc::borrow::ToOwned;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use core::mem;

use cassette_geometry::{Box2D, Line2D, Vector2D};
use cassette_scene::{NodeId, NodeUpdate, SceneGraph};
use hashbrown::HashMap;

use crate::appearance::{self, BLOCK_HOVER_CLASS, BLOCK_HOVER_CLASS_NO_IMAGE};
use crate::appearance::{BLOCK_TEXT_COLOR, FILLER_TEXT_COLOR};
use crate::metrics::LayoutMetrics;
use crate::model::{Block, BlockId, BlockStore};
use crate::store::{CollapseStore, collapsed_key};

/// Inputs of a layout pass.
#[derive(Clone, Copy)]
pub struct UpdateOptions<'a> {
    /// Id of the construct to lay out.
    pub construct: &'a str,
    /// Every block the construct refers to, transitively.
    pub blocks: &'a BlockStore,
    /// Selected blocks; the ones this layout shows become [`Layout::selected_nodes`].
    pub current_blocks: &'a [BlockId],
    /// Focused option per list block; the first active option is focused otherwise.
    pub focused_options: Option<&'a HashMap<BlockId, BlockId>>,
    /// Overrides [`Block::color`] for block and connector fills.
    pub block_color: Option<&'a dyn Fn(&Block) -> String>,
}

impl fmt::Debug for UpdateOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateOptions")
            .field("construct", &self.construct)
            .field("blocks", &self.blocks.len())
            .field("current_blocks", &self.current_blocks)
            .field("focused_options", &self.focused_options)
            .field("block_color", &self.block_color.is_some())
            .finish()
    }
}

impl<'a> UpdateOptions<'a> {
    /// Lay out `construct` with nothing selected or focused.
    pub fn new(construct: &'a str, blocks: &'a BlockStore) -> Self {
        Self {
            construct,
            blocks,
            current_blocks: &[],
            focused_options: None,
            block_color: None,
        }
    }

    /// Set the selected blocks.
    #[must_use]
    pub fn with_current_blocks(mut self, current_blocks: &'a [BlockId]) -> Self {
        self.current_blocks = current_blocks;
        self
    }

    /// Set the focused option of each list block.
    #[must_use]
    pub fn with_focused_options(mut self, focused: &'a HashMap<BlockId, BlockId>) -> Self {
        self.focused_options = Some(focused);
        self
    }

    /// Override block fills.
    #[must_use]
    pub fn with_block_color(mut self, block_color: &'a dyn Fn(&Block) -> String) -> Self {
        self.block_color = Some(block_color);
        self
    }
}

/// Outcome of [`Layout::update`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LayoutResult {
    /// Vertical space used, including nested constructs and list options.
    pub height: f64,
    /// Blocks pushed past the first row of a collapsed root construct.
    pub clipped_blocks: usize,
}

/// State shared by the root layout and every nested layout during one update.
#[derive(Clone, Copy)]
struct Pass<'a> {
    blocks: &'a BlockStore,
    current_blocks: &'a [BlockId],
    focused_options: Option<&'a HashMap<BlockId, BlockId>>,
    block_color: Option<&'a dyn Fn(&Block) -> String>,
    store: &'a dyn CollapseStore,
    /// Taken from the root construct; nested constructs never author on their own.
    authoring: bool,
}

impl Pass<'_> {
    /// Blocks are never hidden while authoring.
    fn is_hidden(&self, id: &str) -> bool {
        !self.authoring && self.blocks.block(id).is_hidden()
    }

    fn some_children_visible(&self, block: &Block) -> bool {
        block.components.iter().any(|id| !self.is_hidden(id))
    }

    fn first_visible_child<'b>(&self, block: &'b Block) -> Option<&'b str> {
        block
            .components
            .iter()
            .map(String::as_str)
            .find(|id| !self.is_hidden(id))
    }

    fn fill_color(&self, block: &Block) -> String {
        match self.block_color {
            Some(block_color) => block_color(block),
            None => block.color(),
        }
    }
}

fn text_color(block: &Block) -> &'static str {
    if block.is_filler() {
        FILLER_TEXT_COLOR
    } else {
        BLOCK_TEXT_COLOR
    }
}

#[derive(Clone, Copy, Debug)]
struct Stamped {
    node: NodeId,
    stamp: u64,
}

/// Maps a construct onto scene nodes, reusing nodes from pass to pass.
///
/// Every pass bumps a generation counter. Each node the pass needs is created or reused and
/// stamped with the new generation; at the end of the pass anything still carrying an older
/// stamp is destroyed. Calling [`update`](Self::update) twice with the same input therefore
/// leaves the scene unchanged.
///
/// Blocks are placed left to right and wrap onto a new row when they would cross the
/// viewport's right edge. A block whose children are shown gets a nested `Layout` below it,
/// indented, without header chrome; nested layouts are kept per block id across passes.
///
/// ```
/// use cassette_layout::{Block, BlockStore, Layout, MemoryCollapseStore, UpdateOptions};
/// use cassette_scene::SceneGraph;
///
/// let blocks: BlockStore = [
///     Block::new("c").with_name("pTet-GFP").with_components(["p", "g"]),
///     Block::new("p").with_name("pTet"),
///     Block::new("g").with_name("GFP"),
/// ]
/// .into_iter()
/// .collect();
///
/// let mut scene = SceneGraph::new(800.0, 600.0);
/// let mut layout = Layout::new();
/// let store = MemoryCollapseStore::new();
/// let result = layout.update(&mut scene, &store, &UpdateOptions::new("c", &blocks));
///
/// let p = layout.node_from_element("p").unwrap();
/// let g = layout.node_from_element("g").unwrap();
/// assert_eq!(scene.node(p).bounds().y, scene.node(g).bounds().y);
/// assert!(scene.node(p).bounds().x < scene.node(g).bounds().x);
/// assert!(result.height > 0.0);
/// ```
pub struct Layout {
    metrics: LayoutMetrics,
    construct: Option<BlockId>,
    base_color: String,
    show_header: bool,
    inset_x: f64,
    inset_y: f64,
    initial_row_x_limit: f64,
    root: bool,
    collapsed: bool,
    update_reference: u64,

    banner: Option<NodeId>,
    title: Option<NodeId>,
    title_text_width: f64,
    vertical: Option<NodeId>,
    collapsed_label: Option<NodeId>,
    rows: Vec<NodeId>,

    parts: HashMap<BlockId, Stamped>,
    nodes_to_parts: HashMap<NodeId, BlockId>,
    /// Block ids in placement order of the last pass.
    order: Vec<BlockId>,
    list_nodes: HashMap<BlockId, HashMap<BlockId, NodeId>>,
    empty_nodes: HashMap<BlockId, NodeId>,
    connectors: HashMap<(BlockId, BlockId), Stamped>,
    nested: HashMap<BlockId, Self>,

    selected: Vec<NodeId>,
    disposed: bool,
}

impl fmt::Debug for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Layout")
            .field("construct", &self.construct)
            .field("root", &self.root)
            .field("inset", &(self.inset_x, self.inset_y))
            .field("update_reference", &self.update_reference)
            .field("parts", &self.parts.len())
            .field("rows", &self.rows.len())
            .field("nested", &self.nested.len())
            .field("collapsed", &self.collapsed)
            .finish_non_exhaustive()
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::new()
    }
}

impl Layout {
    /// A root layout with the default metrics.
    pub fn new() -> Self {
        Self::with_metrics(LayoutMetrics::default())
    }

    /// A root layout: draws header chrome and sizes the scene after each pass.
    pub fn with_metrics(metrics: LayoutMetrics) -> Self {
        Self {
            metrics,
            construct: None,
            base_color: String::from("white"),
            show_header: true,
            inset_x: 0.0,
            inset_y: 0.0,
            initial_row_x_limit: f64::NEG_INFINITY,
            root: true,
            collapsed: false,
            update_reference: 0,
            banner: None,
            title: None,
            title_text_width: 0.0,
            vertical: None,
            collapsed_label: None,
            rows: Vec::new(),
            parts: HashMap::new(),
            nodes_to_parts: HashMap::new(),
            order: Vec::new(),
            list_nodes: HashMap::new(),
            empty_nodes: HashMap::new(),
            connectors: HashMap::new(),
            nested: HashMap::new(),
            selected: Vec::new(),
            disposed: false,
        }
    }

    fn nested_with(metrics: LayoutMetrics) -> Self {
        Self {
            show_header: false,
            root: false,
            ..Self::with_metrics(metrics)
        }
    }

    /// The metrics this layout places with.
    pub fn metrics(&self) -> &LayoutMetrics {
        &self.metrics
    }

    /// Id of the construct laid out by the last pass.
    pub fn construct_id(&self) -> Option<&str> {
        self.construct.as_deref()
    }

    /// True for the outermost layout.
    pub fn is_root(&self) -> bool {
        self.root
    }

    /// Generation of the last pass; zero before the first.
    pub fn update_reference(&self) -> u64 {
        self.update_reference
    }

    /// Color of the construct's banner, bars and title.
    pub fn base_color(&self) -> &str {
        &self.base_color
    }

    /// Top-left corner of this layout's area.
    pub fn inset(&self) -> Vector2D {
        Vector2D::new(self.inset_x, self.inset_y)
    }

    /// Lay out `options.construct` into `scene`.
    ///
    /// Reads the collapsed state of the construct, and of each nested construct, from
    /// `store`. Panics if the layout was disposed or the construct refers to a block missing
    /// from `options.blocks`.
    pub fn update(
        &mut self,
        scene: &mut SceneGraph,
        store: &dyn CollapseStore,
        options: &UpdateOptions<'_>,
    ) -> LayoutResult {
        let construct = options.blocks.block(options.construct);
        let pass = Pass {
            blocks: options.blocks,
            current_blocks: options.current_blocks,
            focused_options: options.focused_options,
            block_color: options.block_color,
            store,
            authoring: construct.is_authoring(),
        };
        self.run(scene, options.construct, &pass)
    }

    fn run(&mut self, scene: &mut SceneGraph, construct_id: &str, pass: &Pass<'_>) -> LayoutResult {
        assert!(!self.disposed, "cannot update a disposed layout");
        let construct = pass.blocks.block(construct_id);
        self.construct = Some(construct.id.clone());
        self.base_color = construct.color();
        self.collapsed = pass.store.is_collapsed(construct_id);

        let result = self.layout(scene, construct, pass);
        self.post_layout(scene, construct, pass, result);
        self.auto_size(scene);
        result
    }

    /// Where the first block is placed: right of the gutter and below the header.
    pub fn initial_layout_point(&self) -> Vector2D {
        let m = &self.metrics;
        let header = if self.show_header {
            m.banner_height + m.title_height + m.row_bar_height
        } else {
            m.row_bar_height
        };
        Vector2D::new(self.inset_x + m.row_bar_width, self.inset_y + header)
    }

    fn layout(&mut self, scene: &mut SceneGraph, construct: &Block, pass: &Pass<'_>) -> LayoutResult {
        self.update_reference += 1;
        let stamp = self.update_reference;
        let m = self.metrics;

        self.banner_factory(scene);
        self.title_factory(scene, construct, pass);

        let xlimit = scene.available_size().x - self.inset_x - m.right_pad;
        let mx = xlimit
            - if self.collapsed {
                m.collapsed_message_width
            } else {
                0.0
            };

        let mut stale_nested = mem::take(&mut self.nested);
        self.order.clear();

        let initial = self.initial_layout_point();
        let (start_x, start_y) = (initial.x, initial.y);
        let (mut xp, mut yp) = (start_x, start_y);
        let mut row: Option<NodeId> = None;
        // Height of the nested constructs below the current row.
        let mut nested_vertical = 0.0;
        // Height of the tallest option list on the current row.
        let mut max_list_height: f64 = 0.0;
        let mut row_nested: Vec<BlockId> = Vec::new();
        let mut row_index = 0_usize;
        let mut clipped_blocks = 0_usize;

        for part in construct
            .components
            .iter()
            .filter(|id| !pass.is_hidden(id.as_str()))
        {
            let row_node = match row {
                Some(row_node) => row_node,
                None => {
                    let bounds =
                        Box2D::new(self.inset_x, yp - m.row_bar_height, 0.0, m.row_bar_height);
                    let row_node = self.row_factory(scene, bounds);
                    row = Some(row_node);
                    row_node
                }
            };
            let row_end = if row_index == 0 {
                xp.max(self.initial_row_x_limit)
            } else {
                xp
            };
            self.stretch_row(scene, row_node, self.inset_x, row_end);

            let block = pass.blocks.block(part);
            let node = self.part_factory(scene, block, pass);
            let name = block.display_name(Some("New Block"), true);
            let mut width = self.preferred_width(scene, node, &name);

            let mut list_count = 0_u32;
            for option in block.active_options() {
                list_count += 1;
                let label = pass.blocks.block(option).metadata.name.as_deref();
                let label_width = self.preferred_width(scene, node, label.unwrap_or_default());
                width = width.max(label_width + m.option_dot_width);
            }

            if xp + width > mx {
                self.shift_row_nested(scene, &row_nested, max_list_height, pass);
                row_nested.clear();
                xp = start_x;
                yp += m.row_height + nested_vertical + max_list_height;
                nested_vertical = 0.0;
                max_list_height = 0.0;
                let bounds = Box2D::new(xp, yp - m.row_bar_height, 0.0, m.row_bar_height);
                row = Some(self.row_factory(scene, bounds));
                row_index += 1;
            }

            if row_index > 0 && self.collapsed {
                clipped_blocks += 1;
            }

            max_list_height = max_list_height.max(f64::from(list_count) * m.option_height);

            scene.set(
                node,
                NodeUpdate {
                    bounds: Some(Box2D::new(xp, yp, width, m.block_height)),
                    text: Some(Some(name)),
                    fill: Some(pass.fill_color(block)),
                    color: Some(String::from(text_color(block))),
                    ..NodeUpdate::default()
                },
            );

            self.update_list_for_block(scene, block, node, width, pass);

            if scene.node(node).show_children
                && pass.some_children_visible(block)
                && !self.collapsed
            {
                let nested_x = self.inset_x + m.nested_inset_x;
                let nested_y = yp + nested_vertical + m.block_height + m.nested_inset_y;
                let mut nested = stale_nested
                    .remove(part)
                    .unwrap_or_else(|| Self::nested_with(m));
                nested.initial_row_x_limit =
                    scene.aabb_of(node).center().x + m.row_bar_width / 2.0;
                nested.inset_x = nested_x;
                nested.inset_y = nested_y;
                nested_vertical += nested.run(scene, part, pass).height + m.nested_inset_y;
                row_nested.push(part.clone());
                if let Some(mut duplicate) = self.nested.insert(part.clone(), nested) {
                    duplicate.dispose(scene);
                }
            }

            xp += width;
        }

        if let Some(row_node) = row {
            let row_end = if row_index == 0 {
                xp.max(self.initial_row_x_limit)
            } else {
                xp
            };
            self.stretch_row(scene, row_node, self.inset_x + m.row_bar_width, row_end);
            self.shift_row_nested(scene, &row_nested, max_list_height, pass);
        }

        self.dispose_rows(scene, stamp);
        for (_, mut stale) in stale_nested {
            stale.dispose(scene);
        }
        self.drop_parts(scene, stamp);
        self.drop_list_items(scene, stamp);
        self.drop_empty_blocks(scene, stamp);

        let height_used = yp - start_y + m.block_height;
        let mut bar_height = height_used - m.block_height + m.row_bar_height;
        if bar_height <= m.row_bar_height {
            bar_height = 0.0;
        }
        let vertical = self.vertical_factory(scene);
        scene.set(
            vertical,
            NodeUpdate {
                bounds: Some(Box2D::new(
                    self.inset_x,
                    start_y - m.row_bar_height,
                    m.row_bar_width,
                    bar_height,
                )),
                ..NodeUpdate::default()
            },
        );

        self.selected = pass
            .current_blocks
            .iter()
            .filter_map(|id| self.node_from_element(id))
            .collect();

        log::debug!(
            "layout pass {stamp} of {}: {} blocks, {} rows, {} nested",
            construct.id,
            self.parts.len(),
            self.rows.len(),
            self.nested.len()
        );

        LayoutResult {
            height: height_used + nested_vertical + m.row_bar_height + max_list_height,
            clipped_blocks: if self.collapsed && self.root {
                clipped_blocks
            } else {
                0
            },
        }
    }

    fn stretch_row(&self, scene: &mut SceneGraph, row: NodeId, start: f64, end: f64) {
        let width = end - start;
        scene.set(
            row,
            NodeUpdate {
                translate_x: Some(start + width / 2.0),
                width: Some(width),
                ..NodeUpdate::default()
            },
        );
    }

    /// Push the nested constructs of a finished row below its tallest option list.
    fn shift_row_nested(
        &mut self,
        scene: &mut SceneGraph,
        row_nested: &[BlockId],
        max_list_height: f64,
        pass: &Pass<'_>,
    ) {
        if max_list_height <= 0.0 {
            return;
        }
        for id in row_nested {
            if let Some(child) = self.nested.get_mut(id) {
                child.inset_y += max_list_height;
                child.run(scene, id, pass);
            }
        }
    }

    /// Text width plus padding and room for the role symbol, at least the minimum width.
    fn preferred_width(&self, scene: &mut SceneGraph, node: NodeId, text: &str) -> f64 {
        let m = &self.metrics;
        let role = if scene.node(node).role_name.is_some() {
            m.role_icon + m.text_pad
        } else {
            0.0
        };
        let measured = scene.measure_text(node, text).x;
        (measured + m.text_pad * 2.0 + role).max(m.min_block_width)
    }

    // --- node factories ---

    fn banner_factory(&mut self, scene: &mut SceneGraph) {
        if self.show_header && self.banner.is_none() {
            let banner = scene.create_node(appearance::banner());
            scene.append_child(scene.root(), banner);
            self.banner = Some(banner);
        }
        if let Some(banner) = self.banner {
            let width = scene.available_size().x - self.inset_x;
            scene.set(
                banner,
                NodeUpdate {
                    fill: Some(self.base_color.clone()),
                    stroke: Some(self.base_color.clone()),
                    bounds: Some(Box2D::new(
                        self.inset_x,
                        self.inset_y,
                        width,
                        self.metrics.banner_height,
                    )),
                    ..NodeUpdate::default()
                },
            );
        }
    }

    fn title_factory(&mut self, scene: &mut SceneGraph, construct: &Block, pass: &Pass<'_>) {
        if !self.show_header {
            return;
        }
        let m = self.metrics;
        let title = match self.title {
            Some(title) => title,
            None => {
                let title = scene.create_node(appearance::title(&m));
                scene.append_child(scene.root(), title);
                self.title = Some(title);
                title
            }
        };

        let mut text = construct.display_name(Some("New Construct"), false);
        if construct.is_template() {
            text.push_str(" Template");
        }
        if pass.authoring {
            text.push_str(" (Authoring)");
        }
        self.title_text_width = scene.measure_text(title, &text).x + m.text_pad;

        let width = scene.available_size().x - self.inset_x - m.right_pad;
        scene.set(
            title,
            NodeUpdate {
                text: Some(Some(text)),
                color: Some(self.base_color.clone()),
                bounds: Some(Box2D::new(
                    self.inset_x,
                    self.inset_y + m.banner_height,
                    width,
                    m.title_height,
                )),
                ..NodeUpdate::default()
            },
        );
    }

    fn vertical_factory(&mut self, scene: &mut SceneGraph) -> NodeId {
        let vertical = match self.vertical {
            Some(vertical) => vertical,
            None => {
                let vertical = scene.create_node(appearance::bar());
                scene.append_child(scene.root(), vertical);
                self.vertical = Some(vertical);
                vertical
            }
        };
        scene.set(
            vertical,
            NodeUpdate {
                fill: Some(self.base_color.clone()),
                ..NodeUpdate::default()
            },
        );
        vertical
    }

    /// Reuse a row bar not yet stamped this pass, or create one.
    fn row_factory(&mut self, scene: &mut SceneGraph, bounds: Box2D) -> NodeId {
        let stamp = self.update_reference;
        let recycled = self
            .rows
            .iter()
            .copied()
            .find(|&row| scene.node(row).update_reference != stamp);
        let row = match recycled {
            Some(row) => row,
            None => {
                let row = scene.create_node(appearance::bar());
                scene.append_child(scene.root(), row);
                self.rows.push(row);
                row
            }
        };
        scene.set(
            row,
            NodeUpdate {
                bounds: Some(bounds),
                fill: Some(self.base_color.clone()),
                stroke_width: Some(0.0),
                update_reference: Some(stamp),
                ..NodeUpdate::default()
            },
        );
        row
    }

    /// Get or create the node of a block and stamp it.
    fn part_factory(&mut self, scene: &mut SceneGraph, block: &Block, pass: &Pass<'_>) -> NodeId {
        let stamp = self.update_reference;
        let role = block.role();
        let node = match self.parts.get_mut(&block.id) {
            Some(part) => {
                part.stamp = stamp;
                part.node
            }
            None => {
                let node = scene.create_node(appearance::part(&self.metrics, role));
                scene.append_child(scene.root(), node);
                self.parts.insert(block.id.clone(), Stamped { node, stamp });
                self.nodes_to_parts.insert(node, block.id.clone());
                node
            }
        };
        let hover = if role.is_some() {
            BLOCK_HOVER_CLASS
        } else {
            BLOCK_HOVER_CLASS_NO_IMAGE
        };
        scene.set(
            node,
            NodeUpdate {
                has_children: Some(pass.some_children_visible(block)),
                role_name: Some(role.map(ToOwned::to_owned)),
                hover_class: Some(Some(String::from(hover))),
                ..NodeUpdate::default()
            },
        );
        self.order.push(block.id.clone());
        node
    }

    /// Stack the option rows of a list block below it, or a placeholder when none is active.
    fn update_list_for_block(
        &mut self,
        scene: &mut SceneGraph,
        block: &Block,
        node: NodeId,
        width: f64,
        pass: &Pass<'_>,
    ) {
        if !block.is_list() {
            return;
        }
        let m = self.metrics;
        let stamp = self.update_reference;
        let fill = pass.fill_color(block);
        let enabled: Vec<&str> = block.active_options().collect();

        if enabled.is_empty() {
            let empty = match self.empty_nodes.get(&block.id) {
                Some(&empty) if scene.is_alive(empty) => empty,
                _ => {
                    let empty = scene.create_node(appearance::empty_list_item(&m));
                    scene.append_child(node, empty);
                    self.empty_nodes.insert(block.id.clone(), empty);
                    empty
                }
            };
            scene.set(
                empty,
                NodeUpdate {
                    bounds: Some(Box2D::new(0.0, m.block_height + 1.0, width, m.option_height)),
                    fill: Some(fill),
                    update_reference: Some(stamp),
                    ..NodeUpdate::default()
                },
            );
            return;
        }

        let focused = pass
            .focused_options
            .and_then(|focused| focused.get(&block.id))
            .map(String::as_str);
        let focused_index = enabled
            .iter()
            .position(|&id| Some(id) == focused)
            .unwrap_or(0);

        for (index, &option) in enabled.iter().enumerate() {
            let option_block = pass.blocks.block(option);
            let nodes = self.list_nodes.entry(block.id.clone()).or_default();
            let list_node = match nodes.get(option) {
                Some(&list_node) => list_node,
                None => {
                    let list_node = scene.create_node(appearance::list_item(&m));
                    scene.append_child(node, list_node);
                    nodes.insert(String::from(option), list_node);
                    list_node
                }
            };
            #[allow(
                clippy::cast_precision_loss,
                reason = "Option counts of a list block are tiny."
            )]
            let y = m.block_height + 1.0 + index as f64 * m.option_height;
            scene.set(
                list_node,
                NodeUpdate {
                    bounds: Some(Box2D::new(0.0, y, width, m.option_height)),
                    text: Some(option_block.metadata.name.clone()),
                    fill: Some(fill.clone()),
                    color: Some(String::from(text_color(block))),
                    option_selected: Some(index == focused_index),
                    update_reference: Some(stamp),
                    ..NodeUpdate::default()
                },
            );
        }
    }

    // --- eviction ---

    fn dispose_rows(&mut self, scene: &mut SceneGraph, stamp: u64) {
        self.rows.retain(|&row| {
            let keep = scene.node(row).update_reference == stamp;
            if !keep {
                scene.destroy(row);
            }
            keep
        });
    }

    fn drop_parts(&mut self, scene: &mut SceneGraph, stamp: u64) {
        let stale: Vec<BlockId> = self
            .parts
            .iter()
            .filter(|(_, part)| part.stamp != stamp)
            .map(|(id, _)| id.clone())
            .collect();
        for id in stale {
            if let Some(part) = self.parts.remove(&id) {
                self.nodes_to_parts.remove(&part.node);
                if scene.is_alive(part.node) {
                    scene.destroy(part.node);
                }
                log::trace!("evicted block {id}");
            }
        }
    }

    /// Option rows are children of their block, so evicted blocks took theirs along.
    fn drop_list_items(&mut self, scene: &mut SceneGraph, stamp: u64) {
        for nodes in self.list_nodes.values_mut() {
            nodes.retain(|_, &mut list_node| {
                let keep = scene
                    .get(list_node)
                    .is_some_and(|n| n.update_reference == stamp);
                if !keep && scene.is_alive(list_node) {
                    scene.destroy(list_node);
                }
                keep
            });
        }
        self.list_nodes.retain(|_, nodes| !nodes.is_empty());
    }

    fn drop_empty_blocks(&mut self, scene: &mut SceneGraph, stamp: u64) {
        self.empty_nodes.retain(|_, &mut empty| {
            let keep = scene
                .get(empty)
                .is_some_and(|n| n.update_reference == stamp);
            if !keep && scene.is_alive(empty) {
                scene.destroy(empty);
            }
            keep
        });
    }

    // --- after layout ---

    fn post_layout(
        &mut self,
        scene: &mut SceneGraph,
        construct: &Block,
        pass: &Pass<'_>,
        result: LayoutResult,
    ) {
        if self.collapsed {
            let m = self.metrics;
            let label = match self.collapsed_label {
                Some(label) => label,
                None => {
                    let label = scene.create_node(appearance::collapsed_label(&m));
                    scene.append_child(scene.root(), label);
                    self.collapsed_label = Some(label);
                    label
                }
            };
            let text = if result.clipped_blocks > 0 {
                format!("{} more...", result.clipped_blocks)
            } else {
                String::from("More")
            };
            let x = scene.available_size().x - m.collapsed_message_width;
            scene.set(
                label,
                NodeUpdate {
                    text: Some(Some(text)),
                    bounds: Some(Box2D::new(
                        x,
                        self.initial_layout_point().y,
                        m.collapsed_message_width,
                        m.block_height,
                    )),
                    ..NodeUpdate::default()
                },
            );
        } else {
            for part in &construct.components {
                let block = pass.blocks.block(part);
                if block.is_construct()
                    && !pass.is_hidden(part)
                    && pass.some_children_visible(block)
                    && let Some(node) = self.node_from_element(part)
                    && scene.node(node).show_children
                {
                    self.update_connection(scene, block, node, pass);
                }
            }
            if let Some(label) = self.collapsed_label.take()
                && scene.is_alive(label)
            {
                scene.destroy(label);
            }
        }
        self.dispose_connections(scene);
    }

    /// Drop a line from the center of `source` to the top of its first visible child.
    fn update_connection(
        &mut self,
        scene: &mut SceneGraph,
        source: &Block,
        source_node: NodeId,
        pass: &Pass<'_>,
    ) {
        let Some(destination) = pass.first_visible_child(source) else {
            return;
        };
        let Some(destination_node) = self.node_from_element(destination) else {
            return;
        };
        let stamp = self.update_reference;
        let key = (source.id.clone(), String::from(destination));
        let line_node = match self.connectors.get_mut(&key) {
            Some(connector) => {
                connector.stamp = stamp;
                connector.node
            }
            None => {
                let node = scene.create_node(appearance::connector(&self.metrics, &source.id));
                scene.append_child(scene.root(), node);
                self.connectors.insert(key, Stamped { node, stamp });
                node
            }
        };
        let from = scene.aabb_of(source_node).center();
        let to = Vector2D::new(from.x, scene.aabb_of(destination_node).top());
        scene.set(
            line_node,
            NodeUpdate {
                stroke: Some(pass.fill_color(source)),
                line: Some(Line2D::new(from, to)),
                ..NodeUpdate::default()
            },
        );
        scene.send_to_back(line_node);
    }

    fn dispose_connections(&mut self, scene: &mut SceneGraph) {
        let stamp = self.update_reference;
        self.connectors.retain(|_, connector| {
            let keep = connector.stamp == stamp;
            if !keep && scene.is_alive(connector.node) {
                scene.destroy(connector.node);
            }
            keep
        });
    }

    /// Fit the scene's logical size to the blocks. Only the root layout sizes the scene.
    fn auto_size(&self, scene: &mut SceneGraph) {
        if !self.root {
            return;
        }
        let m = &self.metrics;
        let aabb = self.blocks_aabb(scene);
        let width = aabb.right().max(m.min_width);
        let height = if self.collapsed {
            m.collapsed_height
        } else {
            aabb.bottom().max(m.min_height) + m.bottom_pad
        };
        scene.set_size(width, height);
    }

    // --- queries ---

    /// Bounds of the block nodes and their option rows, including nested layouts.
    ///
    /// Always spans from the origin across the available width.
    pub fn blocks_aabb(&self, scene: &SceneGraph) -> Box2D {
        let mut aabb = Box2D::new(0.0, 0.0, scene.available_size().x, 0.0);
        for (id, part) in &self.parts {
            if !scene.is_alive(part.node) {
                continue;
            }
            aabb = aabb.union(&scene.aabb_of(part.node));
            if let Some(nodes) = self.list_nodes.get(id) {
                for &list_node in nodes.values() {
                    aabb = aabb.union(&scene.aabb_of(list_node));
                }
            }
        }
        for nested in self.nested.values() {
            aabb = nested.blocks_aabb(scene).union(&aabb);
        }
        aabb
    }

    /// The block a node represents, searching nested layouts too.
    pub fn element_from_node(&self, node: NodeId) -> Option<&str> {
        self.nodes_to_parts
            .get(&node)
            .map(String::as_str)
            .or_else(|| {
                self.nested
                    .values()
                    .find_map(|nested| nested.element_from_node(node))
            })
    }

    /// The node representing a block, searching nested layouts too.
    pub fn node_from_element(&self, id: &str) -> Option<NodeId> {
        self.parts.get(id).map(|part| part.node).or_else(|| {
            self.nested
                .values()
                .find_map(|nested| nested.node_from_element(id))
        })
    }

    /// Every placed block and its node: this layout's in placement order, then each nested
    /// layout's after it.
    pub fn all_nodes_and_blocks(&self) -> Vec<(BlockId, NodeId)> {
        let mut out: Vec<(BlockId, NodeId)> = self
            .order
            .iter()
            .filter_map(|id| self.parts.get(id).map(|part| (id.clone(), part.node)))
            .collect();
        for id in &self.order {
            if let Some(nested) = self.nested.get(id) {
                out.extend(nested.all_nodes_and_blocks());
            }
        }
        out
    }

    /// Block ids in placement order of the last pass, without nested layouts.
    pub fn placed_blocks(&self) -> &[BlockId] {
        &self.order
    }

    /// If `node` is an option row, the list block and the option it shows.
    pub fn list_option_at(&self, node: NodeId) -> Option<(&str, &str)> {
        self.list_nodes
            .iter()
            .find_map(|(block, nodes)| {
                nodes
                    .iter()
                    .find(|&(_, &n)| n == node)
                    .map(|(option, _)| (block.as_str(), option.as_str()))
            })
            .or_else(|| {
                self.nested
                    .values()
                    .find_map(|nested| nested.list_option_at(node))
            })
    }

    /// If `node` is an empty-list placeholder, the list block it belongs to.
    pub fn empty_list_at(&self, node: NodeId) -> Option<&str> {
        self.empty_nodes
            .iter()
            .find(|&(_, &n)| n == node)
            .map(|(block, _)| block.as_str())
            .or_else(|| {
                self.nested
                    .values()
                    .find_map(|nested| nested.empty_list_at(node))
            })
    }

    /// The option row node of `option` in list block `block`.
    pub fn option_node(&self, block: &str, option: &str) -> Option<NodeId> {
        self.list_nodes
            .get(block)
            .and_then(|nodes| nodes.get(option).copied())
            .or_else(|| {
                self.nested
                    .values()
                    .find_map(|nested| nested.option_node(block, option))
            })
    }

    /// Display name of a block as shown on its node.
    pub fn part_name(&self, blocks: &BlockStore, id: &str) -> String {
        blocks.block(id).display_name(Some("New Block"), true)
    }

    /// The nested layout of a block, if its children are shown.
    pub fn nested_layout(&self, id: &str) -> Option<&Self> {
        self.nested.get(id)
    }

    /// The construct title node.
    pub fn title_node(&self) -> Option<NodeId> {
        self.title
    }

    /// Width of the title text plus padding, as of the last pass.
    pub fn title_text_width(&self) -> f64 {
        self.title_text_width
    }

    /// The banner node carrying the expander triangle.
    pub fn banner_node(&self) -> Option<NodeId> {
        self.banner
    }

    /// The vertical gutter bar.
    pub fn vertical_node(&self) -> Option<NodeId> {
        self.vertical
    }

    /// Row bars, in creation order.
    pub fn row_nodes(&self) -> &[NodeId] {
        &self.rows
    }

    /// The connector from `source` to its first visible child.
    pub fn connector_node(&self, source: &str, destination: &str) -> Option<NodeId> {
        self.connectors
            .get(&(String::from(source), String::from(destination)))
            .map(|connector| connector.node)
    }

    /// The "N more..." label shown while collapsed.
    pub fn collapsed_label(&self) -> Option<NodeId> {
        self.collapsed_label
    }

    /// Collapsed state as of the last pass.
    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    /// Record the collapsed state of the construct. Takes effect on the next update.
    ///
    /// Panics before the first update, when no construct is known.
    pub fn set_collapsed(&mut self, store: &mut dyn CollapseStore, collapsed: bool) {
        let Some(construct) = self.construct.as_deref() else {
            panic!("set_collapsed before the first update");
        };
        store.set(&collapsed_key(construct), collapsed);
        self.collapsed = collapsed;
    }

    /// Nodes of the selected blocks this layout, or a nested one, shows.
    pub fn selected_nodes(&self) -> &[NodeId] {
        &self.selected
    }

    /// True once [`dispose`](Self::dispose) ran.
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Destroy every node this layout and its nested layouts created.
    ///
    /// Panics if called twice.
    pub fn dispose(&mut self, scene: &mut SceneGraph) {
        assert!(!self.disposed, "Layout already disposed");
        self.disposed = true;
        let chrome = [
            self.banner.take(),
            self.title.take(),
            self.vertical.take(),
            self.collapsed_label.take(),
        ];
        let rows = mem::take(&mut self.rows);
        let parts = self.parts.drain().map(|(_, part)| part.node);
        let connectors = self.connectors.drain().map(|(_, c)| c.node);
        let nodes: Vec<NodeId> = chrome
            .into_iter()
            .flatten()
            .chain(rows)
            .chain(parts)
            .chain(connectors)
            .collect();
        for node in nodes {
            if scene.is_alive(node) {
                scene.destroy(node);
            }
        }
        self.nodes_to_parts.clear();
        self.list_nodes.clear();
        self.empty_nodes.clear();
        self.order.clear();
        self.selected.clear();
        for (_, mut nested) in self.nested.drain() {
            nested.dispose(scene);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ColorRef;
    use crate::store::MemoryCollapseStore;
    use alloc::vec;
    use cassette_scene::Glyph;

    fn named(id: &str, name: &str) -> Block {
        Block::new(id).with_name(name)
    }

    fn store_of(blocks: Vec<Block>) -> BlockStore {
        blocks.into_iter().collect()
    }

    fn three_blocks() -> BlockStore {
        store_of(vec![
            named("c", "Construct").with_components(["a", "b", "g"]),
            named("a", "pTet"),
            named("b", "RBS1"),
            named("g", "GFP"),
        ])
    }

    fn run(
        layout: &mut Layout,
        scene: &mut SceneGraph,
        blocks: &BlockStore,
        store: &MemoryCollapseStore,
    ) -> LayoutResult {
        layout.update(scene, store, &UpdateOptions::new("c", blocks))
    }

    fn bounds(scene: &SceneGraph, layout: &Layout, id: &str) -> Box2D {
        scene
            .node(layout.node_from_element(id).expect("block is laid out"))
            .bounds()
    }

    #[test]
    fn three_leaf_blocks_share_a_row() {
        let blocks = three_blocks();
        let mut scene = SceneGraph::new(9999.0, 600.0);
        let mut layout = Layout::new();
        run(&mut layout, &mut scene, &blocks, &MemoryCollapseStore::new());

        let a = bounds(&scene, &layout, "a");
        let b = bounds(&scene, &layout, "b");
        let g = bounds(&scene, &layout, "g");
        assert_eq!(a.y, 62.0);
        assert!(a.y == b.y && b.y == g.y, "one row");
        assert!(a.x < b.x && b.x < g.x, "left to right");
        for bounds in [a, b, g] {
            assert!(bounds.w >= layout.metrics().min_block_width);
            assert_eq!(bounds.h, 30.0);
        }
        assert_eq!(a.x, 1.0);
        assert_eq!(b.x, a.right());
        assert_eq!(layout.placed_blocks(), ["a", "b", "g"]);
    }

    #[test]
    fn blocks_carry_name_colors_and_role() {
        let mut blocks = three_blocks();
        blocks.insert(
            named("a", "pTet")
                .with_role("promoter")
                .with_color(ColorRef::Index(2)),
        );
        let mut scene = SceneGraph::new(1000.0, 600.0);
        let mut layout = Layout::new();
        run(&mut layout, &mut scene, &blocks, &MemoryCollapseStore::new());

        let a = scene.node(layout.node_from_element("a").expect("laid out"));
        assert_eq!(a.glyph(), Glyph::Role);
        assert_eq!(a.text.as_deref(), Some("pTet"));
        assert_eq!(a.fill, crate::model::PALETTE[2]);
        assert_eq!(a.color, BLOCK_TEXT_COLOR);
        assert_eq!(a.role_name.as_deref(), Some("promoter"));
        assert_eq!(a.hover_class.as_deref(), Some(BLOCK_HOVER_CLASS));
        // 4 chars at 12px * 0.6 = 29, + 2 * 10 padding + 27 + 10 for the symbol.
        assert_eq!(a.width, 86.0);

        let b = scene.node(layout.node_from_element("b").expect("laid out"));
        assert_eq!(b.role_name, None);
        assert_eq!(b.width, 80.0, "narrow blocks get the minimum width");
    }

    #[test]
    fn update_is_idempotent() {
        let blocks = three_blocks();
        let mut scene = SceneGraph::new(1000.0, 600.0);
        let mut layout = Layout::new();
        let store = MemoryCollapseStore::new();
        let first = run(&mut layout, &mut scene, &blocks, &store);
        let nodes = layout.all_nodes_and_blocks();
        let before: Vec<Box2D> = nodes.iter().map(|(_, n)| scene.node(*n).bounds()).collect();
        let count = scene.len();

        let second = run(&mut layout, &mut scene, &blocks, &store);
        assert_eq!(first, second);
        assert_eq!(scene.len(), count, "no nodes created or destroyed");
        assert_eq!(layout.all_nodes_and_blocks(), nodes, "same nodes reused");
        let after: Vec<Box2D> = nodes.iter().map(|(_, n)| scene.node(*n).bounds()).collect();
        assert_eq!(before, after);
        assert_eq!(layout.update_reference(), 2);
    }

    #[test]
    fn removed_blocks_are_evicted() {
        let mut blocks = three_blocks();
        let mut scene = SceneGraph::new(1000.0, 600.0);
        let mut layout = Layout::new();
        let store = MemoryCollapseStore::new();
        run(&mut layout, &mut scene, &blocks, &store);
        let b = layout.node_from_element("b").expect("laid out");
        let count = scene.len();

        blocks.insert(named("c", "Construct").with_components(["a", "g"]));
        run(&mut layout, &mut scene, &blocks, &store);
        assert!(!scene.is_alive(b));
        assert_eq!(layout.node_from_element("b"), None);
        assert_eq!(layout.element_from_node(b), None);
        assert_eq!(scene.len(), count - 1);
        assert_eq!(bounds(&scene, &layout, "g").x, bounds(&scene, &layout, "a").right());
    }

    #[test]
    fn wrapping_starts_a_new_row() {
        let blocks = three_blocks();
        // xlimit = 200 - 30 = 170: two 80 wide blocks fit after the gutter, the third wraps.
        let mut scene = SceneGraph::new(200.0, 600.0);
        let mut layout = Layout::new();
        let result = run(&mut layout, &mut scene, &blocks, &MemoryCollapseStore::new());

        let a = bounds(&scene, &layout, "a");
        let b = bounds(&scene, &layout, "b");
        let g = bounds(&scene, &layout, "g");
        assert_eq!(a.y, b.y);
        assert_eq!(g.y, a.y + layout.metrics().row_height);
        assert_eq!(g.x, a.x, "wrapped block returns to the row start");
        assert_eq!(layout.row_nodes().len(), 2);

        let vertical = scene.node(layout.vertical_node().expect("gutter"));
        assert_eq!(vertical.height, 64.0);
        assert_eq!(result.height, 60.0 + 30.0 + 4.0);
        assert_eq!(scene.size().y, g.bottom() + layout.metrics().bottom_pad);
    }

    #[test]
    fn rows_are_recycled() {
        let mut blocks = three_blocks();
        let mut scene = SceneGraph::new(200.0, 600.0);
        let mut layout = Layout::new();
        let store = MemoryCollapseStore::new();
        run(&mut layout, &mut scene, &blocks, &store);
        let rows = layout.row_nodes().to_vec();
        assert_eq!(rows.len(), 2);

        blocks.insert(named("c", "Construct").with_components(["a"]));
        run(&mut layout, &mut scene, &blocks, &store);
        assert_eq!(layout.row_nodes(), &rows[..1]);
        assert!(!scene.is_alive(rows[1]));
        let vertical = scene.node(layout.vertical_node().expect("gutter"));
        assert_eq!(vertical.height, 0.0, "single row needs no gutter");
    }

    #[test]
    fn first_row_bar_spans_to_the_last_block() {
        let blocks = three_blocks();
        let mut scene = SceneGraph::new(1000.0, 600.0);
        let mut layout = Layout::new();
        run(&mut layout, &mut scene, &blocks, &MemoryCollapseStore::new());
        let row = scene.node(layout.row_nodes()[0]).bounds();
        assert_eq!(row.x, 1.0);
        assert_eq!(row.right(), bounds(&scene, &layout, "g").right());
        assert_eq!(row.y, 58.0);
        assert_eq!(row.h, 4.0);
    }

    #[test]
    fn header_chrome() {
        let mut blocks = three_blocks();
        let mut construct = named("c", "Tet").with_components(["a"]);
        construct.rules.fixed = true;
        construct.rules.authoring = true;
        construct.metadata.color = Some(ColorRef::Index(5));
        blocks.insert(construct);
        let mut scene = SceneGraph::new(500.0, 600.0);
        let mut layout = Layout::new();
        run(&mut layout, &mut scene, &blocks, &MemoryCollapseStore::new());

        let title = scene.node(layout.title_node().expect("title"));
        assert_eq!(title.text.as_deref(), Some("Tet Template (Authoring)"));
        assert_eq!(title.bounds(), Box2D::new(0.0, 18.0, 470.0, 40.0));
        assert_eq!(title.color, crate::model::PALETTE[5]);
        // 24 chars at 20px * 0.6 = 288, plus padding.
        assert_eq!(layout.title_text_width(), 298.0);

        let banner = scene.node(layout.banner_node().expect("banner"));
        assert_eq!(banner.glyph(), Glyph::ConstructBanner);
        assert_eq!(banner.bounds(), Box2D::new(0.0, 0.0, 500.0, 18.0));
        assert_eq!(banner.fill, crate::model::PALETTE[5]);
    }

    fn list_blocks() -> BlockStore {
        store_of(vec![
            named("c", "Construct").with_components(["l", "e", "x"]),
            named("l", "Promoters").with_options([("o1", true), ("o2", false), ("o3", true)]),
            named("e", "Empty").with_options(Vec::<(&str, bool)>::new()),
            named("x", "Next"),
            named("o1", "Option One"),
            named("o2", "Option Two"),
            named("o3", "Option Three"),
        ])
    }

    #[test]
    fn list_options_stack_below_the_block() {
        let blocks = list_blocks();
        let mut scene = SceneGraph::new(1000.0, 600.0);
        let mut layout = Layout::new();
        let result = run(&mut layout, &mut scene, &blocks, &MemoryCollapseStore::new());

        // "Option Three": 12 chars -> 87 + 20 padding + 16 for the dot.
        let l = bounds(&scene, &layout, "l");
        assert_eq!(l.w, 123.0);

        let o1 = layout.option_node("l", "o1").expect("active option");
        let o3 = layout.option_node("l", "o3").expect("active option");
        assert_eq!(layout.option_node("l", "o2"), None, "inactive options are skipped");
        assert_eq!(scene.node(o1).bounds(), Box2D::new(0.0, 31.0, 123.0, 22.0));
        assert_eq!(scene.node(o3).bounds(), Box2D::new(0.0, 53.0, 123.0, 22.0));
        assert!(scene.node(o1).option_selected, "first option focused by default");
        assert!(!scene.node(o3).option_selected);
        assert_eq!(scene.parent_of(o1), layout.node_from_element("l"));
        assert_eq!(layout.list_option_at(o3), Some(("l", "o3")));
        assert_eq!(scene.aabb_of(o3).bottom(), 62.0 + 53.0 + 22.0);

        let e = layout.node_from_element("e").expect("laid out");
        let empty = scene.children_of(e)[0];
        assert_eq!(scene.node(empty).glyph(), Glyph::EmptyListItem);
        assert_eq!(layout.empty_list_at(empty), Some("e"));

        assert_eq!(result.height, 30.0 + 4.0 + 44.0, "tallest list extends the row");
    }

    #[test]
    fn focused_option_is_selected() {
        let blocks = list_blocks();
        let mut scene = SceneGraph::new(1000.0, 600.0);
        let mut layout = Layout::new();
        let mut focused = HashMap::new();
        focused.insert(BlockId::from("l"), BlockId::from("o3"));
        let options = UpdateOptions::new("c", &blocks).with_focused_options(&focused);
        layout.update(&mut scene, &MemoryCollapseStore::new(), &options);

        let o1 = layout.option_node("l", "o1").expect("active option");
        let o3 = layout.option_node("l", "o3").expect("active option");
        assert!(!scene.node(o1).option_selected);
        assert!(scene.node(o3).option_selected);
    }

    #[test]
    fn deactivated_options_are_dropped() {
        let mut blocks = list_blocks();
        let mut scene = SceneGraph::new(1000.0, 600.0);
        let mut layout = Layout::new();
        let store = MemoryCollapseStore::new();
        run(&mut layout, &mut scene, &blocks, &store);
        let o3 = layout.option_node("l", "o3").expect("active option");

        blocks.insert(named("l", "Promoters").with_options([("o1", true), ("o3", false)]));
        run(&mut layout, &mut scene, &blocks, &store);
        assert!(!scene.is_alive(o3));
        assert_eq!(layout.option_node("l", "o3"), None);
        assert!(layout.option_node("l", "o1").is_some());
    }

    fn nested_blocks() -> BlockStore {
        store_of(vec![
            named("c", "Construct").with_components(["p", "x"]),
            named("p", "Parent").with_components(["q1", "q2"]),
            named("q1", "Child One"),
            named("q2", "Child Two"),
            named("x", "Next"),
        ])
    }

    #[test]
    fn nested_constructs_lay_out_below_their_block() {
        let blocks = nested_blocks();
        let mut scene = SceneGraph::new(1000.0, 600.0);
        let mut layout = Layout::new();
        let result = run(&mut layout, &mut scene, &blocks, &MemoryCollapseStore::new());

        let p = bounds(&scene, &layout, "p");
        let q1 = bounds(&scene, &layout, "q1");
        let q2 = bounds(&scene, &layout, "q2");
        assert_eq!(bounds(&scene, &layout, "x").x, p.right(), "siblings stay on the row");
        assert_eq!(q1.x, 21.0);
        assert_eq!(q1.y, 62.0 + 30.0 + 20.0 + 4.0);
        assert_eq!(q2.x, q1.right());

        let nested = layout.nested_layout("p").expect("children shown");
        assert!(!nested.is_root());
        assert_eq!(nested.inset(), Vector2D::new(20.0, 112.0));
        assert_eq!(nested.title_node(), None, "no header on nested layouts");
        assert_eq!(layout.element_from_node(layout.node_from_element("q1").expect("nested")), Some("q1"));

        // Nested: 30 block + 4 bar; plus the 20 gap below it.
        assert_eq!(result.height, 30.0 + 54.0 + 4.0);

        let line = layout.connector_node("p", "q1").expect("connector");
        let segment = scene.node(line).line().expect("line node");
        assert_eq!(segment.start, Vector2D::new(p.cx(), p.cy()));
        assert_eq!(segment.end, Vector2D::new(p.cx(), q1.y));
        assert_eq!(scene.children_of(scene.root())[0], line, "connectors sit behind blocks");

        let names: Vec<BlockId> = layout
            .all_nodes_and_blocks()
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        assert_eq!(names, ["p", "x", "q1", "q2"]);
    }

    #[test]
    fn nested_first_row_reaches_the_connector() {
        let blocks = store_of(vec![
            named("c", "Construct").with_components(["w", "p"]),
            named("w", "A rather long first block name"),
            named("p", "Parent").with_components(["q1"]),
            named("q1", "Q"),
        ]);
        let mut scene = SceneGraph::new(1000.0, 600.0);
        let mut layout = Layout::new();
        run(&mut layout, &mut scene, &blocks, &MemoryCollapseStore::new());
        let p = bounds(&scene, &layout, "p");
        let nested = layout.nested_layout("p").expect("children shown");
        let row = scene.node(nested.row_nodes()[0]).bounds();
        assert_eq!(row.right(), p.cx() + 0.5);
    }

    #[test]
    fn hidden_children_close_the_nested_layout() {
        let mut blocks = nested_blocks();
        let mut scene = SceneGraph::new(1000.0, 600.0);
        let mut layout = Layout::new();
        let store = MemoryCollapseStore::new();
        run(&mut layout, &mut scene, &blocks, &store);
        let q1 = layout.node_from_element("q1").expect("nested");
        let line = layout.connector_node("p", "q1").expect("connector");

        for id in ["q1", "q2"] {
            let mut child = blocks.block(id).clone();
            child.rules.hidden = true;
            blocks.insert(child);
        }
        run(&mut layout, &mut scene, &blocks, &store);
        assert!(layout.nested_layout("p").is_none());
        assert!(!scene.is_alive(q1));
        assert!(!scene.is_alive(line));
        let p = scene.node(layout.node_from_element("p").expect("laid out"));
        assert!(!p.has_children, "no triangle without visible children");
    }

    #[test]
    fn authoring_shows_hidden_blocks() {
        let mut blocks = three_blocks();
        let mut hidden = named("b", "RBS1");
        hidden.rules.hidden = true;
        blocks.insert(hidden);
        let mut scene = SceneGraph::new(1000.0, 600.0);
        let mut layout = Layout::new();
        let store = MemoryCollapseStore::new();
        run(&mut layout, &mut scene, &blocks, &store);
        assert_eq!(layout.node_from_element("b"), None);

        let mut construct = blocks.block("c").clone();
        construct.rules.authoring = true;
        blocks.insert(construct);
        run(&mut layout, &mut scene, &blocks, &store);
        assert!(layout.node_from_element("b").is_some());
    }

    #[test]
    fn collapsing_a_block_drops_its_children() {
        let blocks = nested_blocks();
        let mut scene = SceneGraph::new(1000.0, 600.0);
        let mut layout = Layout::new();
        let store = MemoryCollapseStore::new();
        run(&mut layout, &mut scene, &blocks, &store);
        let p = layout.node_from_element("p").expect("laid out");
        scene.node_mut(p).show_children = false;

        let result = run(&mut layout, &mut scene, &blocks, &store);
        assert!(layout.nested_layout("p").is_none());
        assert_eq!(layout.node_from_element("q1"), None);
        assert_eq!(layout.connector_node("p", "q1"), None);
        assert!(scene.node(p).has_children, "triangle stays to expand again");
        assert_eq!(result.height, 34.0);
    }

    #[test]
    fn list_height_pushes_nested_constructs_down() {
        let blocks = store_of(vec![
            named("c", "Construct").with_components(["p", "l"]),
            named("p", "Parent").with_components(["q1"]),
            named("q1", "Q"),
            named("l", "List").with_options([("o1", true), ("o2", true)]),
            named("o1", "A"),
            named("o2", "B"),
        ]);
        let mut scene = SceneGraph::new(1000.0, 600.0);
        let mut layout = Layout::new();
        run(&mut layout, &mut scene, &blocks, &MemoryCollapseStore::new());

        // The list on the same row is 44 tall, so the nested construct moves below it.
        let q1 = bounds(&scene, &layout, "q1");
        assert_eq!(q1.y, 62.0 + 30.0 + 20.0 + 44.0 + 4.0);
        let nested = layout.nested_layout("p").expect("children shown");
        assert_eq!(nested.inset().y, 156.0);
    }

    #[test]
    fn collapsed_construct_counts_clipped_blocks() {
        let blocks = store_of(vec![
            named("c", "Construct").with_components(["a", "b", "d", "e", "f"]),
            named("a", "A"),
            named("b", "B"),
            named("d", "D"),
            named("e", "E"),
            named("f", "F"),
        ]);
        // xlimit 370, minus the 100 wide label: three blocks fit on the first row.
        let mut scene = SceneGraph::new(400.0, 600.0);
        let mut layout = Layout::new();
        let mut store = MemoryCollapseStore::new();
        run(&mut layout, &mut scene, &blocks, &store);
        layout.set_collapsed(&mut store, true);
        assert!(store.is_collapsed("c"));

        let result = run(&mut layout, &mut scene, &blocks, &store);
        assert!(layout.is_collapsed());
        assert_eq!(result.clipped_blocks, 2);
        let label = scene.node(layout.collapsed_label().expect("label"));
        assert_eq!(label.text.as_deref(), Some("2 more..."));
        assert_eq!(label.bounds(), Box2D::new(300.0, 62.0, 100.0, 30.0));
        assert_eq!(scene.size().y, layout.metrics().collapsed_height);

        layout.set_collapsed(&mut store, false);
        run(&mut layout, &mut scene, &blocks, &store);
        assert_eq!(layout.collapsed_label(), None);
    }

    #[test]
    fn collapsed_without_overflow_says_more() {
        let blocks = three_blocks();
        let mut scene = SceneGraph::new(1000.0, 600.0);
        let mut layout = Layout::new();
        let mut store = MemoryCollapseStore::new();
        store.set(&collapsed_key("c"), true);
        let result = run(&mut layout, &mut scene, &blocks, &store);
        assert_eq!(result.clipped_blocks, 0);
        let label = scene.node(layout.collapsed_label().expect("label"));
        assert_eq!(label.text.as_deref(), Some("More"));
    }

    #[test]
    fn scene_is_sized_to_the_blocks() {
        let blocks = three_blocks();
        let mut scene = SceneGraph::new(1000.0, 600.0);
        let mut layout = Layout::new();
        run(&mut layout, &mut scene, &blocks, &MemoryCollapseStore::new());
        assert_eq!(scene.size(), Vector2D::new(1000.0, 92.0 + 50.0));
        assert_eq!(layout.blocks_aabb(&scene), Box2D::new(0.0, 0.0, 1000.0, 92.0));
    }

    #[test]
    fn selections_follow_current_blocks() {
        let blocks = nested_blocks();
        let mut scene = SceneGraph::new(1000.0, 600.0);
        let mut layout = Layout::new();
        let current = vec![BlockId::from("x"), BlockId::from("q2"), BlockId::from("gone")];
        let options = UpdateOptions::new("c", &blocks).with_current_blocks(&current);
        layout.update(&mut scene, &MemoryCollapseStore::new(), &options);
        let expected = vec![
            layout.node_from_element("x").expect("laid out"),
            layout.node_from_element("q2").expect("nested"),
        ];
        assert_eq!(layout.selected_nodes(), expected.as_slice());
    }

    #[test]
    fn block_color_override() {
        let blocks = nested_blocks();
        let mut scene = SceneGraph::new(1000.0, 600.0);
        let mut layout = Layout::new();
        let gray = |_: &Block| String::from("gray");
        let options = UpdateOptions::new("c", &blocks).with_block_color(&gray);
        layout.update(&mut scene, &MemoryCollapseStore::new(), &options);
        for (_, node) in layout.all_nodes_and_blocks() {
            assert_eq!(scene.node(node).fill, "gray");
        }
        let line = layout.connector_node("p", "q1").expect("connector");
        assert_eq!(scene.node(line).stroke, "gray");
    }

    #[test]
    fn dispose_removes_everything() {
        let blocks = list_blocks();
        let mut scene = SceneGraph::new(1000.0, 600.0);
        let mut layout = Layout::new();
        run(&mut layout, &mut scene, &nested_blocks(), &MemoryCollapseStore::new());
        run(&mut layout, &mut scene, &blocks, &MemoryCollapseStore::new());
        layout.dispose(&mut scene);
        assert!(layout.is_disposed());
        assert_eq!(scene.len(), 1, "only the root is left");
    }

    #[test]
    #[should_panic(expected = "Layout already disposed")]
    fn double_dispose_panics() {
        let mut scene = SceneGraph::new(1000.0, 600.0);
        let mut layout = Layout::new();
        layout.dispose(&mut scene);
        layout.dispose(&mut scene);
    }

    #[test]
    #[should_panic(expected = "unknown block")]
    fn missing_component_panics() {
        let blocks = store_of(vec![named("c", "Construct").with_components(["nope"])]);
        let mut scene = SceneGraph::new(1000.0, 600.0);
        run(&mut Layout::new(), &mut scene, &blocks, &MemoryCollapseStore::new());
    }
}
