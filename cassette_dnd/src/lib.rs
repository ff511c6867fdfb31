// Copyright 2026 the Cassette Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cassette DnD: one drag at a time across many drop targets.
//!
//! A [`DragCoordinator`] holds registered [`DropTarget`]s and [`DragMonitor`]s with their
//! bounds. The host starts a drag with a [`Payload`], then forwards pointer moves and the
//! release. The coordinator picks the topmost target under the pointer, fires
//! enter/over/leave, and on release runs the drag's [`DragHooks`] to decide the drop.
//!
//! - Drops can be decided immediately or deferred and settled later with
//!   [`DragCoordinator::resolve_drop`].
//! - A drag may carry an undo transaction, closed through a [`TransactionSink`] when the
//!   drag ends. Rejected drops commit or abort it according to [`DropFailurePolicy`].
//! - Callbacks receive a host context `C` by `&mut`, so targets can stay small handles.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod coordinator;
mod error;
mod types;

pub use coordinator::{DragCoordinator, DragSession, DragState};
pub use error::{DragError, DropError};
pub use types::{
    DragHooks, DragMonitor, DragOptions, DropFailurePolicy, DropResolution, DropTarget,
    DropTicket, MonitorId, NoHooks, NoTransactions, Payload, Release, TargetId,
    TransactionSink,
};
