// Copyright 2026 the Cassette Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Handles, payloads and callback traits.

use alloc::boxed::Box;
use alloc::string::String;

use cassette_geometry::Vector2D;

use crate::error::DropError;

/// Handle of a registered drop target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(pub(crate) u32);

/// Handle of a registered monitor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonitorId(pub(crate) u32);

/// Handle of a drop waiting for [`DragCoordinator::resolve_drop`](crate::DragCoordinator::resolve_drop).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DropTicket(pub(crate) u32);

/// What is being dragged.
#[derive(Clone, Debug, PartialEq)]
pub struct Payload<I> {
    /// The dragged item. A drop hook may replace it before the target sees it.
    pub item: I,
    /// Where the drag came from, e.g. `"construct-viewer"` or `"inventory"`.
    pub source: Option<String>,
    /// Whether the drop should copy rather than move the item.
    pub copying: bool,
}

impl<I> Payload<I> {
    /// A payload with no source that moves its item.
    pub fn new(item: I) -> Self {
        Self {
            item,
            source: None,
            copying: false,
        }
    }

    /// Set the source.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Set the copying flag.
    #[must_use]
    pub fn with_copying(mut self, copying: bool) -> Self {
        self.copying = copying;
        self
    }
}

/// A region that can accept drops.
///
/// Positions are in the coordinator's space (document space for a browser host). Every
/// method receives the host context `C`.
pub trait DropTarget<I, C> {
    /// The drag moved onto this target.
    fn drag_enter(&mut self, ctx: &mut C, position: Vector2D, payload: &Payload<I>) {
        let _ = (ctx, position, payload);
    }

    /// The drag moved over this target. Always preceded by [`drag_enter`](Self::drag_enter).
    fn drag_over(
        &mut self,
        ctx: &mut C,
        position: Vector2D,
        payload: &Payload<I>,
        proxy_size: Vector2D,
    ) {
        let _ = (ctx, position, payload, proxy_size);
    }

    /// The drag moved off this target, or a drop on it finished or failed.
    fn drag_leave(&mut self, ctx: &mut C) {
        let _ = ctx;
    }

    /// The pointer was released over this target, before the drop resolves.
    fn drag_end(&mut self, ctx: &mut C, position: Vector2D) {
        let _ = (ctx, position);
    }

    /// The payload was dropped here.
    fn drop_payload(
        &mut self,
        ctx: &mut C,
        position: Vector2D,
        payload: &Payload<I>,
        proxy_size: Vector2D,
    );
}

/// A passive region told when a drag hovers it, whatever targets overlap it.
///
/// Monitors never receive drops. Typical use is autoscrolling a container.
pub trait DragMonitor<I, C> {
    /// The drag entered the monitor's bounds.
    fn monitor_enter(&mut self, ctx: &mut C, position: Vector2D, payload: &Payload<I>);
    /// The drag moved within the monitor's bounds.
    fn monitor_over(&mut self, ctx: &mut C, position: Vector2D, payload: &Payload<I>);
    /// The drag left the monitor's bounds or ended.
    fn monitor_leave(&mut self, ctx: &mut C, position: Vector2D, payload: &Payload<I>);
}

/// Result of [`DragHooks::on_drop`].
#[derive(Clone, Debug, PartialEq)]
pub enum DropResolution<I> {
    /// Resolved now. `Ok(Some(item))` replaces the payload item before the target's drop.
    Ready(Result<Option<I>, DropError>),
    /// Resolved later through [`DragCoordinator::resolve_drop`](crate::DragCoordinator::resolve_drop).
    Deferred,
}

/// Per-drag callbacks supplied by whoever starts the drag.
pub trait DragHooks<I, C> {
    /// The pointer was released over `target`. The default accepts the payload as is.
    fn on_drop(&mut self, ctx: &mut C, target: TargetId, position: Vector2D) -> DropResolution<I> {
        let _ = (ctx, target, position);
        DropResolution::Ready(Ok(None))
    }

    /// The drop was rejected.
    fn on_drop_failure(&mut self, ctx: &mut C, error: &DropError, target: TargetId) {
        let _ = (ctx, error, target);
    }

    /// The target took the drop.
    fn on_drag_complete(
        &mut self,
        ctx: &mut C,
        target: TargetId,
        position: Vector2D,
        payload: &Payload<I>,
    ) {
        let _ = (ctx, target, position, payload);
    }
}

/// Hooks that accept every drop unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoHooks;

impl<I, C> DragHooks<I, C> for NoHooks {}

/// Receives the outcome of the host's undo transaction around a drag.
pub trait TransactionSink<C> {
    /// Keep the changes made during the drag as one undo step.
    fn commit(&mut self, ctx: &mut C);
    /// Roll back the changes made during the drag.
    fn abort(&mut self, ctx: &mut C);
}

/// A sink for hosts without undo.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoTransactions;

impl<C> TransactionSink<C> for NoTransactions {
    fn commit(&mut self, _ctx: &mut C) {}
    fn abort(&mut self, _ctx: &mut C) {}
}

/// What the undo transaction does when a drop is rejected.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DropFailurePolicy {
    /// Commit it anyway, keeping whatever changed before the drop.
    #[default]
    Commit,
    /// Roll it back.
    Abort,
}

/// Options of a single drag.
pub struct DragOptions<I, C> {
    /// Drop callbacks.
    pub hooks: Box<dyn DragHooks<I, C>>,
    /// Whether the host opened an undo transaction that the drag must close.
    pub undo_redo_transaction: bool,
}

impl<I, C> core::fmt::Debug for DragOptions<I, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DragOptions")
            .field("undo_redo_transaction", &self.undo_redo_transaction)
            .finish_non_exhaustive()
    }
}

impl<I, C> Default for DragOptions<I, C> {
    fn default() -> Self {
        Self {
            hooks: Box::new(NoHooks),
            undo_redo_transaction: false,
        }
    }
}

impl<I, C> DragOptions<I, C> {
    /// Use `hooks` for this drag.
    #[must_use]
    pub fn with_hooks(mut self, hooks: impl DragHooks<I, C> + 'static) -> Self {
        self.hooks = Box::new(hooks);
        self
    }

    /// Close the host's undo transaction when the drag ends.
    #[must_use]
    pub fn with_undo_transaction(mut self) -> Self {
        self.undo_redo_transaction = true;
        self
    }
}

/// Outcome of releasing the pointer or resolving a deferred drop.
#[derive(Clone, Debug, PartialEq)]
pub enum Release {
    /// The target accepted the payload.
    Dropped(TargetId),
    /// The drop hooks rejected the payload.
    Failed(TargetId, DropError),
    /// The hooks deferred the decision; pass the ticket to `resolve_drop`.
    Pending(DropTicket),
    /// Released outside every target.
    Missed,
}
