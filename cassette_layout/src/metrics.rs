// Copyright 2026 the Cassette Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout constants.

use cassette_scene::GlyphMetrics;

/// Every fixed distance the layout engine uses, in scene units.
///
/// The defaults reproduce the construct viewer's standard look. Derived limits such as
/// [`min_width`](Self::min_width) are plain fields so hosts can tune them independently.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutMetrics {
    /// Height of a block.
    pub block_height: f64,
    /// Height of the construct title.
    pub title_height: f64,
    /// Vertical advance from one row to the next.
    pub row_height: f64,
    /// Height of the bar drawn above each row.
    pub row_bar_height: f64,
    /// Width of the vertical gutter bar; blocks start this far right of the inset.
    pub row_bar_width: f64,
    /// Padding around block text.
    pub text_pad: f64,
    /// Narrowest block.
    pub min_block_width: f64,
    /// Width reserved for the context-menu dots of a block.
    pub context_dots_width: f64,
    /// Height of the banner above the title.
    pub banner_height: f64,
    /// Horizontal indent of a nested construct.
    pub nested_inset_x: f64,
    /// Gap between a block and its nested construct, and below each nested construct.
    pub nested_inset_y: f64,
    /// Side of the role symbol.
    pub role_icon: f64,
    /// Smallest scene width.
    pub min_width: f64,
    /// Smallest scene height before bottom padding.
    pub min_height: f64,
    /// Scene height of a collapsed construct.
    pub collapsed_height: f64,
    /// Width of the "N more..." label of a collapsed construct.
    pub collapsed_message_width: f64,
    /// Extra scene height below the last row.
    pub bottom_pad: f64,
    /// Space kept free at the right of each row.
    pub right_pad: f64,
    /// Width added to option labels for the selection dot.
    pub option_dot_width: f64,
    /// Height of one list option row.
    pub option_height: f64,
    /// Side of the selection dot.
    pub option_dot_size: f64,
    /// Left inset of the selection dot.
    pub option_dot_left: f64,
    /// Legs of the child-content triangle.
    pub triangle_size: f64,
    /// Font size of the construct title.
    pub title_font_size: f64,
    /// Font size of blocks, options and labels.
    pub block_font_size: f64,
}

impl Default for LayoutMetrics {
    fn default() -> Self {
        let block_height = 30.0;
        let title_height = 40.0;
        let row_bar_height = 4.0;
        let banner_height = 18.0;
        Self {
            block_height,
            title_height,
            row_height: 60.0,
            row_bar_height,
            row_bar_width: 1.0,
            text_pad: 10.0,
            min_block_width: 80.0,
            context_dots_width: 10.0,
            banner_height,
            nested_inset_x: 20.0,
            nested_inset_y: 20.0,
            role_icon: 27.0,
            min_width: block_height * 4.0,
            min_height: block_height + row_bar_height + title_height,
            collapsed_height: block_height + title_height + banner_height + row_bar_height,
            collapsed_message_width: 100.0,
            bottom_pad: 50.0,
            right_pad: 30.0,
            option_dot_width: 16.0,
            option_height: 22.0,
            option_dot_size: 5.0,
            option_dot_left: 10.0,
            triangle_size: 18.0,
            title_font_size: 20.0,
            block_font_size: 12.0,
        }
    }
}

impl LayoutMetrics {
    /// The subset of metrics the scene's glyphs draw with.
    pub fn glyph_metrics(&self) -> GlyphMetrics {
        GlyphMetrics {
            role_icon: self.role_icon,
            text_pad: self.text_pad,
            context_dots_width: self.context_dots_width,
            option_dot_size: self.option_dot_size,
            option_dot_left: self.option_dot_left,
            triangle_size: self.triangle_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_defaults() {
        let m = LayoutMetrics::default();
        assert_eq!(m.min_width, 120.0);
        assert_eq!(m.min_height, 74.0);
        assert_eq!(m.collapsed_height, 92.0);
    }

    #[test]
    fn glyph_metrics_match_scene_defaults() {
        assert_eq!(
            LayoutMetrics::default().glyph_metrics(),
            GlyphMetrics::default(),
            "the scene and layout defaults describe the same look"
        );
    }
}
