// Copyright 2026 the Cassette Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Initial properties of every node kind the layout creates.

use alloc::string::String;

use cassette_geometry::Line2D;
use cassette_scene::{DataAttribute, Font, Glyph, NodeProps, TextAlign};

use crate::metrics::LayoutMetrics;

/// Stroke drawn between adjacent blocks; matches the viewer background.
pub const BLOCK_SEPARATOR: &str = "rgb(52, 57, 77)";

/// Text color of regular blocks.
pub const BLOCK_TEXT_COLOR: &str = "#1d222d";

/// Text color of filler blocks.
pub const FILLER_TEXT_COLOR: &str = "#6B6F7C";

/// Hover class of the construct title.
pub const TITLE_HOVER_CLASS: &str = "inline-editor-hover-title";

/// Hover class of a block showing a role symbol.
pub const BLOCK_HOVER_CLASS: &str = "inline-editor-hover-block";

/// Hover class of a block without a role symbol.
pub const BLOCK_HOVER_CLASS_NO_IMAGE: &str = "inline-editor-hover-block-noimage";

/// Name of the data attribute classifying layout nodes.
pub const NODE_TYPE: &str = "nodetype";

/// [`NODE_TYPE`] value of the "N more..." label of a collapsed construct.
pub const COLLAPSED_LABEL_TYPE: &str = "moreLabel";

fn node_type(value: &str) -> Option<DataAttribute> {
    Some(DataAttribute::new(NODE_TYPE, value))
}

pub(crate) fn banner() -> NodeProps {
    NodeProps {
        glyph: Glyph::ConstructBanner,
        data_attribute: node_type("construct-banner"),
        ..NodeProps::default()
    }
}

pub(crate) fn title(metrics: &LayoutMetrics) -> NodeProps {
    NodeProps {
        glyph: Glyph::Rectangle,
        fill: String::from("transparent"),
        stroke_width: 0.0,
        font: Font::with_size(metrics.title_font_size),
        text_align: TextAlign::Left,
        text_indent: 4.0,
        hover_class: Some(String::from(TITLE_HOVER_CLASS)),
        data_attribute: node_type("construct-title"),
        ..NodeProps::default()
    }
}

pub(crate) fn bar() -> NodeProps {
    NodeProps {
        glyph: Glyph::Rectangle,
        stroke_width: 0.0,
        ..NodeProps::default()
    }
}

pub(crate) fn part(metrics: &LayoutMetrics, role: Option<&str>) -> NodeProps {
    let hover = if role.is_some() {
        BLOCK_HOVER_CLASS
    } else {
        BLOCK_HOVER_CLASS_NO_IMAGE
    };
    NodeProps {
        color: String::from("black"),
        stroke_width: 1.0,
        stroke: String::from(BLOCK_SEPARATOR),
        font: Font::with_size(metrics.block_font_size),
        role_name: role.map(String::from),
        hover_class: Some(String::from(hover)),
        data_attribute: node_type("block"),
        ..NodeProps::for_glyph(Glyph::Role, &metrics.glyph_metrics())
    }
}

pub(crate) fn list_item(metrics: &LayoutMetrics) -> NodeProps {
    NodeProps {
        glyph: Glyph::ListItem,
        color: String::from("black"),
        stroke_width: 1.0,
        stroke: String::from(BLOCK_SEPARATOR),
        font: Font::with_size(metrics.block_font_size),
        data_attribute: node_type("part"),
        ..NodeProps::default()
    }
}

pub(crate) fn empty_list_item(metrics: &LayoutMetrics) -> NodeProps {
    NodeProps {
        glyph: Glyph::EmptyListItem,
        stroke_width: 0.0,
        stroke: String::from(BLOCK_SEPARATOR),
        font: Font::with_size(metrics.block_font_size),
        ..NodeProps::default()
    }
}

pub(crate) fn collapsed_label(metrics: &LayoutMetrics) -> NodeProps {
    NodeProps {
        glyph: Glyph::Rectangle,
        color: String::from("white"),
        fill: String::from("transparent"),
        stroke: String::from("transparent"),
        stroke_width: 0.0,
        font: Font::with_size(metrics.block_font_size),
        data_attribute: node_type(COLLAPSED_LABEL_TYPE),
        ..NodeProps::default()
    }
}

pub(crate) fn connector(metrics: &LayoutMetrics, source: &str) -> NodeProps {
    NodeProps {
        line: Some(Line2D::from_coords(0.0, 0.0, 0.0, 0.0)),
        stroke_width: metrics.row_bar_width,
        data_attribute: Some(DataAttribute::new("connection", source)),
        ..NodeProps::for_glyph(Glyph::Line, &metrics.glyph_metrics())
    }
}
