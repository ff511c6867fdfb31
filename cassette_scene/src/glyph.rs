// Copyright 2026 the Cassette Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Glyphs: the closed set of node visuals and the render commands they produce.

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use cassette_geometry::{Box2D, Line2D, Vector2D};
use smallvec::SmallVec;

use crate::node::{Node2D, TextAlign};
use crate::text::Font;
use crate::types::Sides;

/// Visual kind of a node, chosen when the node is created.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Glyph {
    /// Filled, optionally stroked rectangle.
    Rectangle,
    /// Rule along the top edge with a filled expander triangle in the corner.
    ConstructBanner,
    /// A block: rectangle with an optional role symbol and a child-content triangle.
    Role,
    /// A stroked segment; geometry comes from [`Node2D::line`].
    Line,
    /// One option row of a list block.
    ListItem,
    /// Placeholder row of a list block without options.
    EmptyListItem,
    /// Draws nothing.
    #[default]
    None,
}

/// Fixed sizes used by the glyphs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlyphMetrics {
    /// Side of the role symbol.
    pub role_icon: f64,
    /// Horizontal padding around block text.
    pub text_pad: f64,
    /// Width reserved at the right of a block for its context-menu dots.
    pub context_dots_width: f64,
    /// Side of the selection dot on option rows.
    pub option_dot_size: f64,
    /// Left inset of the selection dot.
    pub option_dot_left: f64,
    /// Legs of the child-content triangle in the top-left corner of a block.
    pub triangle_size: f64,
}

impl Default for GlyphMetrics {
    fn default() -> Self {
        Self {
            role_icon: 27.0,
            text_pad: 10.0,
            context_dots_width: 10.0,
            option_dot_size: 5.0,
            option_dot_left: 10.0,
            triangle_size: 18.0,
        }
    }
}

/// Stroke of a [`RenderCommand::Rect`].
#[derive(Clone, Debug, PartialEq)]
pub struct Stroke {
    /// Color.
    pub color: String,
    /// Width, straddling the rectangle's edges.
    pub width: f64,
    /// Stroked edges.
    pub sides: Sides,
}

/// A drawing instruction in node-local coordinates.
#[derive(Clone, Debug, PartialEq)]
pub enum RenderCommand {
    /// Rectangle with optional fill and stroke.
    Rect {
        /// Outer bounds, already grown to straddle the stroke.
        bounds: Box2D,
        /// Fill color.
        fill: Option<String>,
        /// Stroke.
        stroke: Option<Stroke>,
    },
    /// Filled closed polygon.
    Polygon {
        /// Vertices.
        points: SmallVec<[Vector2D; 4]>,
        /// Fill color.
        fill: String,
    },
    /// Stroked segment.
    Line {
        /// Segment.
        line: Line2D,
        /// Stroke color.
        color: String,
        /// Stroke width.
        width: f64,
    },
    /// Filled ellipse inscribed in `bounds`.
    Ellipse {
        /// Bounding box.
        bounds: Box2D,
        /// Fill color.
        fill: String,
    },
    /// Named role symbol scaled into `bounds`.
    RoleIcon {
        /// Symbol name.
        role: String,
        /// Placement.
        bounds: Box2D,
    },
    /// Single line of text laid out in `bounds`.
    Text {
        /// Layout box.
        bounds: Box2D,
        /// Content.
        text: String,
        /// Font.
        font: Font,
        /// Color.
        color: String,
        /// Alignment.
        align: TextAlign,
        /// Left indent.
        indent: f64,
    },
    /// Inline-edit affordance covering the node.
    InlineEditHover {
        /// Covered area.
        bounds: Box2D,
        /// Text being edited.
        text: String,
        /// Style class.
        class: Option<String>,
    },
}

fn stroked_rect(node: &Node2D, sides: Sides) -> RenderCommand {
    let sw = node.stroke_width;
    let stroke = (sw > 0.0).then(|| Stroke {
        color: node.stroke.clone(),
        width: sw,
        sides,
    });
    RenderCommand::Rect {
        bounds: Box2D::new(-sw / 2.0, -sw / 2.0, node.width + sw, node.height + sw),
        fill: Some(node.fill.clone()),
        stroke,
    }
}

impl Glyph {
    /// Whether nodes with this glyph draw their text run.
    pub fn draws_text(self) -> bool {
        !matches!(self, Self::Line | Self::EmptyListItem)
    }

    /// Render `node` into commands. Pure: reads the node and nothing else.
    pub fn render(self, node: &Node2D, metrics: &GlyphMetrics) -> Vec<RenderCommand> {
        match self {
            Self::Rectangle | Self::EmptyListItem => vec![stroked_rect(node, Sides::all())],
            Self::ConstructBanner => {
                let h = node.height;
                vec![
                    RenderCommand::Line {
                        line: Line2D::from_coords(0.0, 0.0, node.width, 0.0),
                        color: String::from("gray"),
                        width: 1.0,
                    },
                    RenderCommand::Polygon {
                        points: SmallVec::from_buf([
                            Vector2D::ZERO,
                            Vector2D::new(h, 0.0),
                            Vector2D::new(0.0, h),
                            Vector2D::ZERO,
                        ]),
                        fill: node.fill.clone(),
                    },
                ]
            }
            Self::Role => {
                let mut out = vec![stroked_rect(node, Sides::all())];
                if let Some(role) = node.role_name.as_ref() {
                    let x = node.width - metrics.role_icon - 2.0 - metrics.context_dots_width;
                    let y = node.height / 2.0 - metrics.role_icon / 2.0;
                    out.push(RenderCommand::RoleIcon {
                        role: role.clone(),
                        bounds: Box2D::new(x, y, metrics.role_icon, metrics.role_icon),
                    });
                }
                if node.has_children {
                    let t = metrics.triangle_size;
                    let mut points = SmallVec::new();
                    points.extend([Vector2D::ZERO, Vector2D::new(t, 0.0), Vector2D::new(0.0, t)]);
                    out.push(RenderCommand::Polygon {
                        points,
                        fill: node.stroke.clone(),
                    });
                }
                out
            }
            Self::ListItem => {
                let mut out = vec![stroked_rect(node, Sides::LEFT | Sides::RIGHT)];
                if node.option_selected {
                    let s = metrics.option_dot_size;
                    out.push(RenderCommand::Ellipse {
                        bounds: Box2D::new(
                            metrics.option_dot_left,
                            node.height / 2.0 - s / 2.0,
                            s,
                            s,
                        ),
                        fill: node.color.clone(),
                    });
                }
                out
            }
            Self::Line => match node.line() {
                // Drawn along the local x axis; the node's rotation aligns it with the segment.
                Some(_) => vec![RenderCommand::Line {
                    line: Line2D::from_coords(
                        0.0,
                        node.height / 2.0,
                        node.width,
                        node.height / 2.0,
                    ),
                    color: node.stroke.clone(),
                    width: node.stroke_width,
                }],
                None => Vec::new(),
            },
            Self::None => Vec::new(),
        }
    }
}
