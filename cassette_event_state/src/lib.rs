// Copyright 2026 the Cassette Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cassette Event State: pointer input normalization.
//!
//! [`MouseTrap`] converts raw document-space pointer samples for one element into
//! element-local [`MouseEvent`]s: left-button drag tracks, double clicks, plain moves,
//! context menus and enter/leave. It owns no element and installs no listeners; the host
//! forwards its input and acts on the returned events.
//!
//! This crate is `no_std`.

#![no_std]

mod modifiers;
mod mouse_trap;

pub use modifiers::Modifiers;
pub use mouse_trap::{
    Button, DragTrack, LEFT_BUTTON, MouseEvent, MouseEventKind, MouseTrap, MouseTrapConfig,
    PointerInput,
};
