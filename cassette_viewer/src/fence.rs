// Copyright 2026 the Cassette Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rubber-band selection.

use cassette_geometry::{Box2D, Vector2D};

/// A fence dragged out over empty canvas to select the blocks it touches.
///
/// The selection box spans the start and end points whatever the drag direction. The
/// drawn rectangle is that box clipped to the overlay; it keeps its last value while the
/// pointer is entirely outside.
#[derive(Clone, Debug, PartialEq)]
pub struct Fence {
    start: Vector2D,
    end: Vector2D,
    visible: Option<Box2D>,
    disposed: bool,
}

impl Fence {
    /// Start a fence at `start` over an overlay of `client_size`.
    pub fn new(start: Vector2D, client_size: Vector2D) -> Self {
        let mut fence = Self {
            start,
            end: start,
            visible: None,
            disposed: false,
        };
        fence.update(start, client_size);
        fence
    }

    /// Move the free corner to `end`, returning the rectangle to draw.
    pub fn update(&mut self, end: Vector2D, client_size: Vector2D) -> Option<Box2D> {
        self.end = end;
        let client = Box2D::new(0.0, 0.0, client_size.x, client_size.y);
        if let Some(clipped) = self.bounds().intersect_with_box(&client) {
            self.visible = Some(clipped);
        }
        self.visible
    }

    /// The selection box.
    pub fn bounds(&self) -> Box2D {
        Box2D::from_points([self.start, self.end])
    }

    /// The rectangle to draw, clipped to the overlay.
    pub fn visible(&self) -> Option<Box2D> {
        self.visible
    }

    /// Where the fence started.
    pub fn start(&self) -> Vector2D {
        self.start
    }

    /// True once [`dispose`](Self::dispose) ran.
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Remove the fence from display.
    ///
    /// Panics if called twice.
    pub fn dispose(&mut self) {
        assert!(!self.disposed, "Fence already disposed");
        self.disposed = true;
        self.visible = None;
    }
}
