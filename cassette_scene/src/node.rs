// Copyright 2026 the Cassette Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene nodes, their construction properties, and partial updates.

use alloc::string::String;
use alloc::vec::Vec;
use core::cell::Cell;
use core::fmt;

use cassette_geometry::{Box2D, Line2D, Matrix2D, Transform2D, Vector2D};

use crate::glyph::{Glyph, GlyphMetrics, RenderCommand};
use crate::text::Font;
use crate::types::{NodeFlags, NodeId};

/// Horizontal alignment of a node's text run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextAlign {
    /// Flush left, offset by the node's text indent.
    Left,
    /// Centered.
    #[default]
    Center,
    /// Flush right.
    Right,
}

/// A `data-<name>="<value>"` style tag attached to a node for external tooling.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataAttribute {
    /// Attribute name without the `data-` prefix.
    pub name: String,
    /// Attribute value.
    pub value: String,
}

impl DataAttribute {
    /// A `name`/`value` tag.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// True if this tag is `name` = `value`.
    pub fn is(&self, name: &str, value: &str) -> bool {
        self.name == name && self.value == value
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct TransformKey {
    translate_x: u64,
    translate_y: u64,
    width: u64,
    height: u64,
    scale: u64,
    rotate: u64,
}

/// A node in a [`SceneGraph`](crate::SceneGraph).
///
/// Position is expressed by `translate_x`/`translate_y`, which locate the node's center in its
/// parent's space; scale and rotation pivot about that center. Paint and glyph state are plain
/// public fields read by [`Glyph::render`]. Structure (parent, children) and identity (glyph,
/// uuid) are owned by the scene graph.
#[derive(Clone)]
pub struct Node2D {
    pub(crate) generation: u32,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) flags: NodeFlags,
    glyph: Glyph,
    uuid: u64,

    /// Center x in parent space.
    pub translate_x: f64,
    /// Center y in parent space.
    pub translate_y: f64,
    /// Width in local units.
    pub width: f64,
    /// Height in local units.
    pub height: f64,
    /// Uniform scale about the center.
    pub scale: f64,
    /// Rotation about the center, in degrees.
    pub rotate: f64,

    /// Fill color.
    pub fill: String,
    /// Stroke color.
    pub stroke: String,
    /// Stroke width; zero disables the stroke.
    pub stroke_width: f64,
    /// Text color.
    pub color: String,
    /// Text font.
    pub font: Font,
    /// Optional text run.
    pub text: Option<String>,
    /// Text alignment.
    pub text_align: TextAlign,
    /// Left indent applied to the text run.
    pub text_indent: f64,
    /// Extra style classes for renderers that understand them.
    pub classes: Option<String>,

    /// Show the inline-edit affordance.
    pub hover: bool,
    /// Style class of the inline-edit affordance.
    pub hover_class: Option<String>,

    /// Role symbol drawn by [`Glyph::Role`].
    pub role_name: Option<String>,
    /// Draw the expander triangle of [`Glyph::Role`].
    pub has_children: bool,
    /// Whether nested content under this node is expanded.
    pub show_children: bool,
    /// Draw the selection dot of [`Glyph::ListItem`].
    pub option_selected: bool,

    /// Segment drawn by [`Glyph::Line`]; see [`Node2D::set_line`].
    line: Option<Line2D>,

    /// External tag.
    pub data_attribute: Option<DataAttribute>,
    /// Generation stamp written by the owning layout.
    pub update_reference: u64,

    transform_cache: Cell<Option<(TransformKey, Matrix2D)>>,
}

impl fmt::Debug for Node2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node2D")
            .field("glyph", &self.glyph)
            .field("uuid", &self.uuid)
            .field("parent", &self.parent)
            .field("children", &self.children.len())
            .field("bounds", &self.bounds())
            .field("text", &self.text)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Node2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Node = glyph:{:?} text:{}",
            self.glyph,
            self.text.as_deref().unwrap_or("")
        )
    }
}

impl Node2D {
    pub(crate) fn new(generation: u32, uuid: u64, props: NodeProps) -> Self {
        let mut node = Self {
            generation,
            parent: None,
            children: Vec::new(),
            flags: if props.visible {
                NodeFlags::VISIBLE
            } else {
                NodeFlags::empty()
            },
            glyph: props.glyph,
            uuid,
            translate_x: 0.0,
            translate_y: 0.0,
            width: 0.0,
            height: 0.0,
            scale: props.scale,
            rotate: props.rotate,
            fill: props.fill,
            stroke: props.stroke,
            stroke_width: props.stroke_width,
            color: props.color,
            font: props.font,
            text: props.text,
            text_align: props.text_align,
            text_indent: props.text_indent,
            classes: props.classes,
            hover: false,
            hover_class: props.hover_class,
            role_name: props.role_name,
            has_children: false,
            show_children: props.show_children,
            option_selected: false,
            line: None,
            data_attribute: props.data_attribute,
            update_reference: 0,
            transform_cache: Cell::new(None),
        };
        if let Some(bounds) = props.bounds {
            node.set_bounds(bounds);
        }
        if let Some(line) = props.line {
            node.set_line(line);
        }
        node
    }

    /// The glyph chosen at construction.
    pub fn glyph(&self) -> Glyph {
        self.glyph
    }

    /// Unique id assigned at construction; never reused within a scene graph.
    pub fn uuid(&self) -> u64 {
        self.uuid
    }

    /// Parent node, or `None` for the root and detached nodes.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in paint order (last is topmost).
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Flags.
    pub fn flags(&self) -> NodeFlags {
        self.flags
    }

    /// True for the scene graph's root.
    pub fn is_root(&self) -> bool {
        self.flags.contains(NodeFlags::ROOT)
    }

    /// True unless hidden.
    pub fn is_visible(&self) -> bool {
        self.flags.contains(NodeFlags::VISIBLE)
    }

    /// Show or hide the node. Hidden nodes are still hit tested.
    pub fn set_visible(&mut self, visible: bool) {
        self.flags.set(NodeFlags::VISIBLE, visible);
    }

    /// Size as a vector.
    pub fn size(&self) -> Vector2D {
        Vector2D::new(self.width, self.height)
    }

    /// Bounds in parent space, ignoring scale and rotation.
    pub fn bounds(&self) -> Box2D {
        Box2D::new(
            self.translate_x - self.width / 2.0,
            self.translate_y - self.height / 2.0,
            self.width,
            self.height,
        )
    }

    /// Center the node on `bounds` and take its size.
    pub fn set_bounds(&mut self, bounds: Box2D) {
        self.translate_x = bounds.cx();
        self.translate_y = bounds.cy();
        self.width = bounds.w;
        self.height = bounds.h;
    }

    /// The segment drawn by a line node.
    pub fn line(&self) -> Option<Line2D> {
        self.line
    }

    /// Set the segment and derive the node's geometry from it.
    ///
    /// Width becomes the segment length, height the stroke width (at least 1), the center the
    /// segment midpoint, and rotation the segment's angle.
    pub fn set_line(&mut self, line: Line2D) {
        self.line = Some(line);
        self.sync_line();
    }

    pub(crate) fn sync_line(&mut self) {
        if let Some(line) = self.line {
            self.width = line.len();
            self.height = self.stroke_width.max(1.0);
            let mid = line.point_on_line(0.5);
            self.translate_x = mid.x;
            self.translate_y = mid.y;
            self.rotate = line.start.angle_between(line.end);
        }
    }

    /// Matrix from local space to the parent's space.
    ///
    /// Cached against the transform fields and size; any change to them is picked up on the
    /// next call.
    pub fn local_transform(&self) -> Matrix2D {
        let key = TransformKey {
            translate_x: self.translate_x.to_bits(),
            translate_y: self.translate_y.to_bits(),
            width: self.width.to_bits(),
            height: self.height.to_bits(),
            scale: self.scale.to_bits(),
            rotate: self.rotate.to_bits(),
        };
        if let Some((cached, m)) = self.transform_cache.get()
            && cached == key
        {
            return m;
        }
        let transform = Transform2D::new(
            Vector2D::new(self.scale, self.scale),
            self.rotate,
            Vector2D::new(self.translate_x, self.translate_y),
            Vector2D::new(1.0, 1.0),
        );
        let m = transform.transformation_matrix(self.width, self.height);
        self.transform_cache.set(Some((key, m)));
        m
    }

    /// Render commands for this node alone, in local coordinates.
    ///
    /// The glyph draws first, then the text run, then the inline-edit affordance.
    pub fn render(&self, metrics: &GlyphMetrics) -> Vec<RenderCommand> {
        let mut commands = self.glyph.render(self, metrics);
        if let Some(text) = self.text.as_deref()
            && !text.is_empty()
            && self.glyph.draws_text()
        {
            commands.push(RenderCommand::Text {
                bounds: Box2D::new(0.0, 0.0, self.width, self.height),
                text: String::from(text),
                font: self.font.clone(),
                color: self.color.clone(),
                align: self.text_align,
                indent: self.text_indent,
            });
        }
        if self.hover {
            commands.push(RenderCommand::InlineEditHover {
                bounds: Box2D::new(0.0, 0.0, self.width, self.height),
                text: self.text.clone().unwrap_or_default(),
                class: self.hover_class.clone(),
            });
        }
        commands
    }
}

/// Construction properties for [`SceneGraph::create_node`](crate::SceneGraph::create_node).
///
/// [`NodeProps::for_glyph`] applies the per-glyph defaults; struct update syntax overrides the
/// rest.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeProps {
    /// Glyph, fixed for the node's lifetime.
    pub glyph: Glyph,
    /// Initial bounds in parent space.
    pub bounds: Option<Box2D>,
    /// Initial segment for line nodes.
    pub line: Option<Line2D>,
    /// Initial visibility.
    pub visible: bool,
    /// Uniform scale.
    pub scale: f64,
    /// Rotation in degrees.
    pub rotate: f64,
    /// Fill color.
    pub fill: String,
    /// Stroke color.
    pub stroke: String,
    /// Stroke width.
    pub stroke_width: f64,
    /// Text color.
    pub color: String,
    /// Text font.
    pub font: Font,
    /// Text run.
    pub text: Option<String>,
    /// Text alignment.
    pub text_align: TextAlign,
    /// Text indent.
    pub text_indent: f64,
    /// Extra style classes.
    pub classes: Option<String>,
    /// Inline-edit affordance class.
    pub hover_class: Option<String>,
    /// Role symbol.
    pub role_name: Option<String>,
    /// Whether nested content is expanded.
    pub show_children: bool,
    /// External tag.
    pub data_attribute: Option<DataAttribute>,
}

impl Default for NodeProps {
    fn default() -> Self {
        Self {
            glyph: Glyph::None,
            bounds: None,
            line: None,
            visible: true,
            scale: 1.0,
            rotate: 0.0,
            fill: String::from("dodgerblue"),
            stroke: String::from("black"),
            stroke_width: 0.0,
            color: String::from("black"),
            font: Font::default(),
            text: None,
            text_align: TextAlign::Center,
            text_indent: 0.0,
            classes: None,
            hover_class: None,
            role_name: None,
            show_children: false,
            data_attribute: None,
        }
    }
}

impl NodeProps {
    /// Defaults for `glyph`.
    ///
    /// Role nodes get left-aligned dark text indented by `text_pad` and start expanded; line
    /// nodes get a thick red stroke.
    pub fn for_glyph(glyph: Glyph, metrics: &GlyphMetrics) -> Self {
        let base = Self {
            glyph,
            ..Self::default()
        };
        match glyph {
            Glyph::Role => Self {
                text_align: TextAlign::Left,
                text_indent: metrics.text_pad,
                color: String::from("#1D222D"),
                show_children: true,
                ..base
            },
            Glyph::Line => Self {
                stroke: String::from("red"),
                stroke_width: 10.0,
                ..base
            },
            _ => base,
        }
    }
}

/// A partial update applied by [`SceneGraph::set`](crate::SceneGraph::set).
///
/// Every `Some` field overwrites the node's value. There is no glyph field: a node's glyph
/// cannot change after construction.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodeUpdate {
    /// Center the node on these bounds and take their size.
    pub bounds: Option<Box2D>,
    /// Center x.
    pub translate_x: Option<f64>,
    /// Center y.
    pub translate_y: Option<f64>,
    /// Width.
    pub width: Option<f64>,
    /// Height.
    pub height: Option<f64>,
    /// Uniform scale.
    pub scale: Option<f64>,
    /// Rotation in degrees.
    pub rotate: Option<f64>,
    /// Visibility.
    pub visible: Option<bool>,
    /// Fill color.
    pub fill: Option<String>,
    /// Stroke color.
    pub stroke: Option<String>,
    /// Stroke width.
    pub stroke_width: Option<f64>,
    /// Text color.
    pub color: Option<String>,
    /// Font.
    pub font: Option<Font>,
    /// Text run; `Some(None)` clears it.
    pub text: Option<Option<String>>,
    /// Text alignment.
    pub text_align: Option<TextAlign>,
    /// Text indent.
    pub text_indent: Option<f64>,
    /// Style classes; `Some(None)` clears them.
    pub classes: Option<Option<String>>,
    /// Inline-edit affordance.
    pub hover: Option<bool>,
    /// Inline-edit affordance class.
    pub hover_class: Option<Option<String>>,
    /// Role symbol; `Some(None)` clears it.
    pub role_name: Option<Option<String>>,
    /// Expander triangle.
    pub has_children: Option<bool>,
    /// Expanded state.
    pub show_children: Option<bool>,
    /// Option selection dot.
    pub option_selected: Option<bool>,
    /// Segment for line nodes.
    pub line: Option<Line2D>,
    /// External tag.
    pub data_attribute: Option<DataAttribute>,
    /// Generation stamp.
    pub update_reference: Option<u64>,
}

impl NodeUpdate {
    pub(crate) fn apply(self, node: &mut Node2D) {
        if let Some(bounds) = self.bounds {
            node.set_bounds(bounds);
        }
        if let Some(value) = self.translate_x {
            node.translate_x = value;
        }
        if let Some(value) = self.translate_y {
            node.translate_y = value;
        }
        if let Some(value) = self.width {
            node.width = value;
        }
        if let Some(value) = self.height {
            node.height = value;
        }
        if let Some(value) = self.scale {
            node.scale = value;
        }
        if let Some(value) = self.rotate {
            node.rotate = value;
        }
        if let Some(value) = self.fill {
            node.fill = value;
        }
        if let Some(value) = self.stroke {
            node.stroke = value;
        }
        if let Some(value) = self.stroke_width {
            node.stroke_width = value;
        }
        if let Some(value) = self.color {
            node.color = value;
        }
        if let Some(value) = self.font {
            node.font = value;
        }
        if let Some(value) = self.text {
            node.text = value;
        }
        if let Some(value) = self.text_align {
            node.text_align = value;
        }
        if let Some(value) = self.text_indent {
            node.text_indent = value;
        }
        if let Some(value) = self.classes {
            node.classes = value;
        }
        if let Some(value) = self.hover {
            node.hover = value;
        }
        if let Some(value) = self.hover_class {
            node.hover_class = value;
        }
        if let Some(value) = self.role_name {
            node.role_name = value;
        }
        if let Some(value) = self.has_children {
            node.has_children = value;
        }
        if let Some(value) = self.show_children {
            node.show_children = value;
        }
        if let Some(value) = self.option_selected {
            node.option_selected = value;
        }
        if let Some(value) = self.update_reference {
            node.update_reference = value;
        }
        if let Some(visible) = self.visible {
            node.set_visible(visible);
        }
        if let Some(data) = self.data_attribute {
            node.data_attribute = Some(data);
        }
        if let Some(line) = self.line {
            node.set_line(line);
        } else if self.stroke_width.is_some() {
            node.sync_line();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(props: NodeProps) -> Node2D {
        Node2D::new(1, 1, props)
    }

    #[test]
    fn defaults() {
        let n = node(NodeProps::default());
        assert_eq!(n.fill, "dodgerblue");
        assert_eq!(n.stroke, "black");
        assert_eq!(n.stroke_width, 0.0);
        assert_eq!(n.scale, 1.0);
        assert_eq!(n.font.size, 32.0);
        assert_eq!(n.font.family, "Helvetica");
        assert_eq!(n.text_align, TextAlign::Center);
        assert!(n.is_visible());
        assert_eq!(n.glyph(), Glyph::None);
    }

    #[test]
    fn role_defaults() {
        let metrics = GlyphMetrics::default();
        let n = node(NodeProps::for_glyph(Glyph::Role, &metrics));
        assert_eq!(n.text_align, TextAlign::Left);
        assert_eq!(n.text_indent, metrics.text_pad);
        assert!(n.show_children);
    }

    #[test]
    fn bounds_center_the_node() {
        let mut n = node(NodeProps::default());
        n.set_bounds(Box2D::new(10.0, 20.0, 100.0, 30.0));
        assert_eq!((n.translate_x, n.translate_y), (60.0, 35.0));
        assert_eq!(n.bounds(), Box2D::new(10.0, 20.0, 100.0, 30.0));
        let m = n.local_transform();
        assert_eq!(m * Vector2D::ZERO, Vector2D::new(10.0, 20.0));
    }

    #[test]
    fn local_transform_tracks_field_changes() {
        let mut n = node(NodeProps {
            bounds: Some(Box2D::new(0.0, 0.0, 10.0, 10.0)),
            ..NodeProps::default()
        });
        let before = n.local_transform();
        n.translate_x += 5.0;
        let after = n.local_transform();
        assert_eq!(after * Vector2D::ZERO, before * Vector2D::new(5.0, 0.0));
    }

    #[test]
    fn line_nodes_derive_geometry() {
        let metrics = GlyphMetrics::default();
        let mut n = node(NodeProps {
            stroke_width: 2.0,
            ..NodeProps::for_glyph(Glyph::Line, &metrics)
        });
        n.set_line(Line2D::from_coords(10.0, 10.0, 10.0, 50.0));
        assert_eq!(n.width, 40.0);
        assert_eq!(n.height, 2.0);
        assert_eq!((n.translate_x, n.translate_y), (10.0, 30.0));
        assert!((n.rotate - 90.0).abs() < 1e-9);
    }

    #[test]
    fn update_applies_only_present_fields() {
        let mut n = node(NodeProps::default());
        NodeUpdate {
            fill: Some("red".into()),
            text: Some(Some("GFP".into())),
            visible: Some(false),
            ..NodeUpdate::default()
        }
        .apply(&mut n);
        assert_eq!(n.fill, "red");
        assert_eq!(n.text.as_deref(), Some("GFP"));
        assert_eq!(n.stroke, "black");
        assert!(!n.is_visible());
        NodeUpdate {
            text: Some(None),
            ..NodeUpdate::default()
        }
        .apply(&mut n);
        assert!(n.text.is_none());
    }

    #[test]
    fn render_appends_text_and_hover() {
        let mut n = node(NodeProps {
            glyph: Glyph::Rectangle,
            text: Some("RBS1".into()),
            bounds: Some(Box2D::new(0.0, 0.0, 80.0, 30.0)),
            ..NodeProps::default()
        });
        n.hover = true;
        let commands = n.render(&GlyphMetrics::default());
        assert!(matches!(commands[0], RenderCommand::Rect { .. }));
        assert!(matches!(commands[1], RenderCommand::Text { .. }));
        assert!(matches!(commands[2], RenderCommand::InlineEditHover { .. }));
    }
}
