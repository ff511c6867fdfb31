// Copyright 2026 the Cassette Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mouse input normalization for a single element.
//!
//! [`MouseTrap`] turns raw pointer input for one element into a small vocabulary of
//! events in element-local coordinates:
//!
//! - A left button press starts a *drag track*. Until the matching release every move is
//!   reported as [`MouseEventKind::Drag`] with the start point and the distance travelled,
//!   even when the pointer leaves the element.
//! - A second left press close to the first in both time and space is a double click. It
//!   does not start a drag track.
//! - Other buttons are ignored for down and up; context menus and enter/leave pass through.
//!
//! Hosts feed positions in document space (page coordinates including scroll). The trap
//! subtracts the element's document offset, which the host keeps current with
//! [`MouseTrap::set_element_offset`].
//!
//! ```
//! use cassette_event_state::{MouseEventKind, MouseTrap, PointerInput};
//! use kurbo::Point;
//!
//! let mut trap = MouseTrap::new();
//! trap.set_element_offset(Point::new(100.0, 50.0));
//!
//! let down = trap.mouse_down(PointerInput::left(Point::new(110.0, 60.0), 0));
//! assert!(matches!(down.map(|e| e.kind), Some(MouseEventKind::Down(_))));
//!
//! let drag = trap.mouse_move(PointerInput::left(Point::new(113.0, 64.0), 16));
//! let MouseEventKind::Drag(track) = drag.kind else {
//!     panic!("expected a drag");
//! };
//! assert_eq!(track.distance, 5.0);
//! ```

use cassette_geometry::Vector2D;
use kurbo::Point;

use crate::modifiers::Modifiers;

/// Mouse button identifier, numbered like DOM `which`: 1 left, 2 middle, 3 right.
pub type Button = u8;

/// The left mouse button.
pub const LEFT_BUTTON: Button = 1;

/// Double-click thresholds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MouseTrapConfig {
    /// Longest gap between two presses of a double click, in milliseconds.
    pub double_click_time: u64,
    /// Furthest two presses of a double click may be apart.
    pub double_click_distance: f64,
}

impl Default for MouseTrapConfig {
    fn default() -> Self {
        Self {
            double_click_time: 500,
            double_click_distance: 4.0,
        }
    }
}

/// One raw pointer sample.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerInput {
    /// Position in document space.
    pub position: Point,
    /// Button pressed or released; ignored by moves.
    pub button: Button,
    /// Modifier keys held.
    pub modifiers: Modifiers,
    /// Event time in milliseconds.
    pub timestamp: u64,
}

impl PointerInput {
    /// A left-button sample without modifiers.
    pub fn left(position: Point, timestamp: u64) -> Self {
        Self {
            position,
            button: LEFT_BUTTON,
            modifiers: Modifiers::empty(),
            timestamp,
        }
    }

    /// The same sample with `modifiers` held.
    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// The same sample for another button.
    #[must_use]
    pub fn with_button(mut self, button: Button) -> Self {
        self.button = button;
        self
    }
}

/// Position of a move during a drag track.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragTrack {
    /// Current pointer position, element-local.
    pub point: Vector2D,
    /// Where the track started, element-local.
    pub start: Vector2D,
    /// Straight-line distance from `start` to `point`.
    pub distance: f64,
}

/// What happened.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MouseEventKind {
    /// The pointer entered the element.
    Enter,
    /// The pointer left the element.
    Leave,
    /// Left press that started a drag track.
    Down(Vector2D),
    /// Move without a drag track.
    Move(Vector2D),
    /// Move during a drag track.
    Drag(DragTrack),
    /// Left release ending a drag track.
    Up(Vector2D),
    /// Second left press of a double click.
    DoubleClick(Vector2D),
    /// Context menu request.
    ContextMenu(Vector2D),
}

/// A normalized mouse event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MouseEvent {
    /// What happened, with element-local positions.
    pub kind: MouseEventKind,
    /// Modifier keys held.
    pub modifiers: Modifiers,
}

impl MouseEvent {
    fn new(kind: MouseEventKind, modifiers: Modifiers) -> Self {
        Self { kind, modifiers }
    }

    /// The element-local position, for every kind but enter and leave.
    pub fn point(&self) -> Option<Vector2D> {
        match self.kind {
            MouseEventKind::Enter | MouseEventKind::Leave => None,
            MouseEventKind::Down(p)
            | MouseEventKind::Move(p)
            | MouseEventKind::Up(p)
            | MouseEventKind::DoubleClick(p)
            | MouseEventKind::ContextMenu(p) => Some(p),
            MouseEventKind::Drag(track) => Some(track.point),
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct LastClick {
    position: Vector2D,
    timestamp: u64,
}

/// Mouse state machine for one element.
#[derive(Clone, Debug, Default)]
pub struct MouseTrap {
    config: MouseTrapConfig,
    element_offset: Vector2D,
    last_left_click: Option<LastClick>,
    drag_start: Option<Vector2D>,
}

impl MouseTrap {
    /// A trap with the default double-click thresholds and the element at the origin.
    pub fn new() -> Self {
        Self::default()
    }

    /// A trap with custom double-click thresholds.
    pub fn with_config(config: MouseTrapConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// The double-click thresholds.
    pub fn config(&self) -> &MouseTrapConfig {
        &self.config
    }

    /// Document offset of the element's top-left corner, scroll included.
    pub fn element_offset(&self) -> Vector2D {
        self.element_offset
    }

    /// Move the element; later events are made local to the new offset.
    pub fn set_element_offset(&mut self, offset: impl Into<Vector2D>) {
        self.element_offset = offset.into();
    }

    /// Document space to element-local.
    pub fn global_to_local(&self, point: impl Into<Vector2D>) -> Vector2D {
        point.into().sub(self.element_offset)
    }

    /// Element-local to document space.
    pub fn local_to_global(&self, point: impl Into<Vector2D>) -> Vector2D {
        point.into().add(self.element_offset)
    }

    /// True while a drag track is running.
    pub fn is_dragging(&self) -> bool {
        self.drag_start.is_some()
    }

    /// Element-local start of the running drag track.
    pub fn drag_start(&self) -> Option<Vector2D> {
        self.drag_start
    }

    /// The pointer entered the element.
    pub fn mouse_enter(&self, modifiers: Modifiers) -> MouseEvent {
        MouseEvent::new(MouseEventKind::Enter, modifiers)
    }

    /// The pointer left the element. A running drag track continues.
    pub fn mouse_leave(&self, modifiers: Modifiers) -> MouseEvent {
        MouseEvent::new(MouseEventKind::Leave, modifiers)
    }

    /// A button went down over the element.
    ///
    /// Returns `None` for buttons other than left. A left press within the double-click
    /// thresholds of the previous one is a [`MouseEventKind::DoubleClick`] and does not start
    /// a drag track; anything else starts one and reports [`MouseEventKind::Down`].
    pub fn mouse_down(&mut self, input: PointerInput) -> Option<MouseEvent> {
        if input.button != LEFT_BUTTON {
            return None;
        }
        let local = self.global_to_local(input.position);

        if let Some(last) = self.last_left_click
            && last.position.distance(local) <= self.config.double_click_distance
            && input.timestamp.saturating_sub(last.timestamp) <= self.config.double_click_time
        {
            self.last_left_click = None;
            log::trace!("double click at {local:?}");
            return Some(MouseEvent::new(
                MouseEventKind::DoubleClick(local),
                input.modifiers,
            ));
        }

        self.last_left_click = Some(LastClick {
            position: local,
            timestamp: input.timestamp,
        });
        self.drag_start = Some(local);
        Some(MouseEvent::new(MouseEventKind::Down(local), input.modifiers))
    }

    /// The pointer moved: a drag step while a drag track runs, a plain move otherwise.
    pub fn mouse_move(&mut self, input: PointerInput) -> MouseEvent {
        let local = self.global_to_local(input.position);
        let kind = match self.drag_start {
            Some(start) => MouseEventKind::Drag(DragTrack {
                point: local,
                start,
                distance: local.distance(start),
            }),
            None => MouseEventKind::Move(local),
        };
        MouseEvent::new(kind, input.modifiers)
    }

    /// A button went up anywhere in the document.
    ///
    /// Only a left release that ends a drag track is reported.
    pub fn mouse_up(&mut self, input: PointerInput) -> Option<MouseEvent> {
        if input.button != LEFT_BUTTON || self.drag_start.is_none() {
            return None;
        }
        let local = self.global_to_local(input.position);
        self.cancel_drag();
        Some(MouseEvent::new(MouseEventKind::Up(local), input.modifiers))
    }

    /// A context menu was requested over the element.
    pub fn context_menu(&self, input: PointerInput) -> MouseEvent {
        let local = self.global_to_local(input.position);
        MouseEvent::new(MouseEventKind::ContextMenu(local), input.modifiers)
    }

    /// End the running drag track, if any. The matching release will be ignored.
    pub fn cancel_drag(&mut self) {
        if self.drag_start.take().is_some() {
            log::trace!("drag track ended");
        }
    }
}
