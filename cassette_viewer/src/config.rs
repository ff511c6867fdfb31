// Copyright 2026 the Cassette Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Viewer tuning.

/// Operating system family, for the selection toggle modifier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Platform {
    /// Windows.
    Windows,
    /// macOS: Command toggles selection.
    Mac,
    /// Linux.
    Linux,
    /// Other X11 systems.
    Unix,
    /// Anything else.
    #[default]
    Unknown,
}

impl Platform {
    /// Guess the platform from a browser user agent string.
    pub fn from_user_agent(agent: &str) -> Self {
        if agent.contains("Windows") {
            Self::Windows
        } else if agent.contains("Mac") {
            Self::Mac
        } else if agent.contains("Linux") {
            Self::Linux
        } else if agent.contains("X11") {
            Self::Unix
        } else {
            Self::Unknown
        }
    }

    /// True on macOS.
    pub fn is_mac(self) -> bool {
        self == Self::Mac
    }
}

/// Thresholds of the construct viewer's input handling, in scene units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewerConfig {
    /// Pointer travel before a press becomes a block drag or a fence.
    pub drag_threshold: f64,
    /// Width of the band at each side of a block that targets its edge rather than the block.
    pub edge_threshold: f64,
    /// Legs of the expander triangle in the top-left corner of a block.
    pub triangle_size: f64,
    /// Largest drag proxy side used when looking for the nearest block.
    pub max_proxy_extent: f64,
    /// Most blocks drawn in a drag proxy.
    pub proxy_block_limit: usize,
    /// Platform, for the selection toggle modifier.
    pub platform: Platform,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            drag_threshold: 8.0,
            edge_threshold: 20.0,
            triangle_size: 18.0,
            max_proxy_extent: 100.0,
            proxy_block_limit: 5,
            platform: Platform::Unknown,
        }
    }
}
