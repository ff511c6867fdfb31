// Copyright 2026 the Cassette Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The drag coordinator.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use cassette_geometry::{Box2D, Vector2D};
use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::error::{DragError, DropError};
use crate::types::{
    DragHooks, DragMonitor, DragOptions, DropFailurePolicy, DropResolution, DropTarget,
    DropTicket, MonitorId, NoTransactions, Payload, Release, TargetId, TransactionSink,
};

struct TargetEntry<I, C> {
    id: TargetId,
    bounds: Box2D,
    zorder: i32,
    target: Box<dyn DropTarget<I, C>>,
}

struct MonitorEntry<I, C> {
    id: MonitorId,
    bounds: Box2D,
    monitor: Box<dyn DragMonitor<I, C>>,
}

/// The running drag.
pub struct DragSession<I, C> {
    payload: Payload<I>,
    proxy_size: Vector2D,
    position: Vector2D,
    last_target: Option<TargetId>,
    last_monitors: SmallVec<[MonitorId; 4]>,
    hooks: Box<dyn DragHooks<I, C>>,
    undo_redo_transaction: bool,
}

impl<I, C> DragSession<I, C> {
    /// What is being dragged.
    pub fn payload(&self) -> &Payload<I> {
        &self.payload
    }

    /// Size of the drag proxy.
    pub fn proxy_size(&self) -> Vector2D {
        self.proxy_size
    }

    /// Last pointer position.
    pub fn position(&self) -> Vector2D {
        self.position
    }

    /// Target under the pointer after the last move.
    pub fn current_target(&self) -> Option<TargetId> {
        self.last_target
    }

    /// Monitors under the pointer after the last move.
    pub fn active_monitors(&self) -> &[MonitorId] {
        &self.last_monitors
    }
}

impl<I: fmt::Debug, C> fmt::Debug for DragSession<I, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DragSession")
            .field("payload", &self.payload)
            .field("proxy_size", &self.proxy_size)
            .field("position", &self.position)
            .field("last_target", &self.last_target)
            .field("last_monitors", &self.last_monitors)
            .field("undo_redo_transaction", &self.undo_redo_transaction)
            .finish_non_exhaustive()
    }
}

/// Whether a drag is running.
#[derive(Debug)]
pub enum DragState<I, C> {
    /// No drag.
    Idle,
    /// A drag between `start_drag` and release or cancel.
    Dragging(DragSession<I, C>),
}

struct PendingDrop<I, C> {
    target: TargetId,
    position: Vector2D,
    payload: Payload<I>,
    proxy_size: Vector2D,
    hooks: Box<dyn DragHooks<I, C>>,
    undo_redo_transaction: bool,
}

/// Coordinates one drag at a time across registered drop targets and monitors.
///
/// The host forwards pointer moves and the release while a drag runs. On each move the
/// topmost target under the pointer (highest `zorder`; among equals the one registered
/// last) gets `drag_enter`/`drag_over`, and the previous one `drag_leave`. Monitors are
/// tracked as a set: every monitor under the pointer is notified, whatever targets overlap.
///
/// `I` is the dragged item and `C` the host context handed to every callback.
///
/// ```
/// use cassette_dnd::{DragCoordinator, DragOptions, DropTarget, Payload, Release};
/// use cassette_geometry::{Box2D, Vector2D};
///
/// struct Bin;
/// impl DropTarget<&'static str, Vec<&'static str>> for Bin {
///     fn drop_payload(
///         &mut self,
///         log: &mut Vec<&'static str>,
///         _: Vector2D,
///         payload: &Payload<&'static str>,
///         _: Vector2D,
///     ) {
///         log.push(payload.item);
///     }
/// }
///
/// let mut dnd = DragCoordinator::new();
/// let bin = dnd.register_target(Box2D::new(0.0, 0.0, 100.0, 100.0), 0, Box::new(Bin));
/// let mut log = Vec::new();
///
/// dnd.start_drag(
///     Vector2D::new(20.0, 10.0),
///     Vector2D::new(200.0, 200.0),
///     Payload::new("pTet"),
///     DragOptions::default(),
/// )
/// .unwrap();
/// dnd.pointer_move(&mut log, Vector2D::new(50.0, 50.0));
/// let release = dnd.pointer_up(&mut log, Vector2D::new(50.0, 50.0));
///
/// assert_eq!(release, Release::Dropped(bin));
/// assert_eq!(log, ["pTet"]);
/// assert!(!dnd.is_dragging());
/// ```
pub struct DragCoordinator<I, C> {
    targets: Vec<TargetEntry<I, C>>,
    monitors: Vec<MonitorEntry<I, C>>,
    state: DragState<I, C>,
    pending: HashMap<DropTicket, PendingDrop<I, C>>,
    transactions: Box<dyn TransactionSink<C>>,
    failure_policy: DropFailurePolicy,
    next_id: u32,
}

impl<I, C> fmt::Debug for DragCoordinator<I, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let targets: Vec<_> = self
            .targets
            .iter()
            .map(|t| (t.id, t.bounds, t.zorder))
            .collect();
        let monitors: Vec<_> = self.monitors.iter().map(|m| (m.id, m.bounds)).collect();
        f.debug_struct("DragCoordinator")
            .field("targets", &targets)
            .field("monitors", &monitors)
            .field("dragging", &self.is_dragging())
            .field("pending", &self.pending.len())
            .field("failure_policy", &self.failure_policy)
            .finish_non_exhaustive()
    }
}

impl<I, C> Default for DragCoordinator<I, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I, C> DragCoordinator<I, C> {
    /// A coordinator without undo support.
    pub fn new() -> Self {
        Self::with_transactions(Box::new(NoTransactions))
    }

    /// A coordinator that closes the host's undo transactions through `transactions`.
    pub fn with_transactions(transactions: Box<dyn TransactionSink<C>>) -> Self {
        Self {
            targets: Vec::new(),
            monitors: Vec::new(),
            state: DragState::Idle,
            pending: HashMap::new(),
            transactions,
            failure_policy: DropFailurePolicy::default(),
            next_id: 0,
        }
    }

    /// Choose what happens to the undo transaction of a rejected drop.
    #[must_use]
    pub fn with_failure_policy(mut self, policy: DropFailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// What happens to the undo transaction of a rejected drop.
    pub fn failure_policy(&self) -> DropFailurePolicy {
        self.failure_policy
    }

    fn next_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    // --- registration ---

    /// Register a drop target covering `bounds`.
    pub fn register_target(
        &mut self,
        bounds: Box2D,
        zorder: i32,
        target: Box<dyn DropTarget<I, C>>,
    ) -> TargetId {
        let id = TargetId(self.next_id());
        self.targets.push(TargetEntry {
            id,
            bounds,
            zorder,
            target,
        });
        id
    }

    /// Move or resize a target.
    pub fn set_target_bounds(&mut self, id: TargetId, bounds: Box2D) -> Result<(), DragError> {
        let entry = self
            .targets
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(DragError::UnknownTarget(id))?;
        entry.bounds = bounds;
        Ok(())
    }

    /// Current bounds of a target.
    pub fn target_bounds(&self, id: TargetId) -> Option<Box2D> {
        self.targets.iter().find(|t| t.id == id).map(|t| t.bounds)
    }

    /// Remove a target, returning it. A running drag forgets it without a `drag_leave`.
    pub fn unregister_target(
        &mut self,
        id: TargetId,
    ) -> Result<Box<dyn DropTarget<I, C>>, DragError> {
        let index = self
            .targets
            .iter()
            .position(|t| t.id == id)
            .ok_or(DragError::UnknownTarget(id))?;
        if let DragState::Dragging(session) = &mut self.state
            && session.last_target == Some(id)
        {
            session.last_target = None;
        }
        Ok(self.targets.remove(index).target)
    }

    /// Register a monitor covering `bounds`.
    pub fn register_monitor(
        &mut self,
        bounds: Box2D,
        monitor: Box<dyn DragMonitor<I, C>>,
    ) -> MonitorId {
        let id = MonitorId(self.next_id());
        self.monitors.push(MonitorEntry {
            id,
            bounds,
            monitor,
        });
        id
    }

    /// Move or resize a monitor.
    pub fn set_monitor_bounds(&mut self, id: MonitorId, bounds: Box2D) -> Result<(), DragError> {
        let entry = self
            .monitors
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(DragError::UnknownMonitor(id))?;
        entry.bounds = bounds;
        Ok(())
    }

    /// Remove a monitor, returning it. A running drag forgets it without a `monitor_leave`.
    pub fn unregister_monitor(
        &mut self,
        id: MonitorId,
    ) -> Result<Box<dyn DragMonitor<I, C>>, DragError> {
        let index = self
            .monitors
            .iter()
            .position(|m| m.id == id)
            .ok_or(DragError::UnknownMonitor(id))?;
        if let DragState::Dragging(session) = &mut self.state {
            session.last_monitors.retain(|m| *m != id);
        }
        Ok(self.monitors.remove(index).monitor)
    }

    // --- queries ---

    /// The drag state.
    pub fn state(&self) -> &DragState<I, C> {
        &self.state
    }

    /// True between `start_drag` and release or cancel.
    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    /// The running drag.
    pub fn session(&self) -> Option<&DragSession<I, C>> {
        match &self.state {
            DragState::Dragging(session) => Some(session),
            DragState::Idle => None,
        }
    }

    /// Where to draw the drag proxy: its size, centered on the pointer.
    pub fn proxy(&self) -> Option<Box2D> {
        self.session().map(|s| {
            Box2D::new(
                s.position.x - s.proxy_size.x / 2.0,
                s.position.y - s.proxy_size.y / 2.0,
                s.proxy_size.x,
                s.proxy_size.y,
            )
        })
    }

    /// Drops waiting for [`resolve_drop`](Self::resolve_drop).
    pub fn pending_drops(&self) -> usize {
        self.pending.len()
    }

    /// Topmost target containing `point`.
    pub fn target_at(&self, point: Vector2D) -> Option<TargetId> {
        self.target_index_at(point).map(|i| self.targets[i].id)
    }

    fn target_index_at(&self, point: Vector2D) -> Option<usize> {
        let mut best: Option<usize> = None;
        for (index, entry) in self.targets.iter().enumerate() {
            if !entry.bounds.point_in_box(point) {
                continue;
            }
            if best.is_none_or(|b| entry.zorder >= self.targets[b].zorder) {
                best = Some(index);
            }
        }
        best
    }

    /// Every monitor containing `point`, in registration order.
    pub fn monitors_at(&self, point: Vector2D) -> SmallVec<[MonitorId; 4]> {
        self.monitors
            .iter()
            .filter(|m| m.bounds.point_in_box(point))
            .map(|m| m.id)
            .collect()
    }

    fn target_mut(&mut self, id: TargetId) -> Option<&mut Box<dyn DropTarget<I, C>>> {
        self.targets
            .iter_mut()
            .find(|t| t.id == id)
            .map(|t| &mut t.target)
    }

    // --- the drag ---

    /// Start dragging `payload` with a proxy of `proxy_size` centered on `position`.
    ///
    /// No target is entered until the first [`pointer_move`](Self::pointer_move).
    pub fn start_drag(
        &mut self,
        proxy_size: Vector2D,
        position: Vector2D,
        payload: Payload<I>,
        options: DragOptions<I, C>,
    ) -> Result<(), DragError> {
        if self.is_dragging() {
            return Err(DragError::AlreadyDragging);
        }
        self.state = DragState::Dragging(DragSession {
            payload,
            proxy_size,
            position,
            last_target: None,
            last_monitors: SmallVec::new(),
            hooks: options.hooks,
            undo_redo_transaction: options.undo_redo_transaction,
        });
        log::debug!("drag started at {position:?}");
        Ok(())
    }

    /// The pointer moved during the drag.
    ///
    /// Panics when no drag is running.
    pub fn pointer_move(&mut self, ctx: &mut C, position: Vector2D) {
        let target = self.target_at(position);
        let monitors = self.monitors_at(position);
        let DragState::Dragging(session) = &mut self.state else {
            panic!("pointer_move without a drag in progress");
        };
        session.position = position;
        let previous = session.last_target;

        if target != previous
            && let Some(old) = previous
            && let Some(entry) = self.targets.iter_mut().find(|t| t.id == old)
        {
            entry.target.drag_leave(ctx);
        }
        if target != previous
            && let Some(new) = target
            && let Some(entry) = self.targets.iter_mut().find(|t| t.id == new)
        {
            entry.target.drag_enter(ctx, position, &session.payload);
        }
        session.last_target = target;
        if let Some(current) = target
            && let Some(entry) = self.targets.iter_mut().find(|t| t.id == current)
        {
            entry
                .target
                .drag_over(ctx, position, &session.payload, session.proxy_size);
        }

        for entry in &mut self.monitors {
            if session.last_monitors.contains(&entry.id) && !monitors.contains(&entry.id) {
                entry.monitor.monitor_leave(ctx, position, &session.payload);
            }
        }
        for entry in &mut self.monitors {
            if monitors.contains(&entry.id) && !session.last_monitors.contains(&entry.id) {
                entry.monitor.monitor_enter(ctx, position, &session.payload);
            }
        }
        for entry in &mut self.monitors {
            if monitors.contains(&entry.id) {
                entry.monitor.monitor_over(ctx, position, &session.payload);
            }
        }
        session.last_monitors = monitors;
    }

    /// The pointer was released, ending the drag.
    ///
    /// Active monitors get `monitor_leave`. Over a target, the target gets `drag_end` and
    /// the drag's hooks decide the drop; a deferred decision returns [`Release::Pending`].
    /// Outside every target the undo transaction, if any, is aborted.
    ///
    /// Panics when no drag is running.
    pub fn pointer_up(&mut self, ctx: &mut C, position: Vector2D) -> Release {
        let DragState::Dragging(mut session) = core::mem::replace(&mut self.state, DragState::Idle)
        else {
            panic!("pointer_up without a drag in progress");
        };
        session.position = position;

        for entry in &mut self.monitors {
            if session.last_monitors.contains(&entry.id) {
                entry.monitor.monitor_leave(ctx, position, &session.payload);
            }
        }

        let Some(target) = self.target_at(position) else {
            if session.undo_redo_transaction {
                self.transactions.abort(ctx);
            }
            log::debug!("drag released outside every target");
            return Release::Missed;
        };

        if let Some(entry) = self.target_mut(target) {
            entry.drag_end(ctx, position);
        }

        let resolution = session.hooks.on_drop(ctx, target, position);
        let pending = PendingDrop {
            target,
            position,
            payload: session.payload,
            proxy_size: session.proxy_size,
            hooks: session.hooks,
            undo_redo_transaction: session.undo_redo_transaction,
        };
        match resolution {
            DropResolution::Ready(result) => self.finish_drop(ctx, pending, result),
            DropResolution::Deferred => {
                let ticket = DropTicket(self.next_id());
                self.pending.insert(ticket, pending);
                log::debug!("drop on {target:?} deferred as {ticket:?}");
                Release::Pending(ticket)
            }
        }
    }

    /// Settle a deferred drop.
    pub fn resolve_drop(
        &mut self,
        ctx: &mut C,
        ticket: DropTicket,
        result: Result<Option<I>, DropError>,
    ) -> Result<Release, DragError> {
        let pending = self
            .pending
            .remove(&ticket)
            .ok_or(DragError::UnknownDrop(ticket))?;
        Ok(self.finish_drop(ctx, pending, result))
    }

    fn finish_drop(
        &mut self,
        ctx: &mut C,
        pending: PendingDrop<I, C>,
        result: Result<Option<I>, DropError>,
    ) -> Release {
        let PendingDrop {
            target,
            position,
            mut payload,
            proxy_size,
            mut hooks,
            undo_redo_transaction,
        } = pending;

        let result = match result {
            Ok(item) if self.target_mut(target).is_some() => Ok(item),
            Ok(_) => Err(DropError::TargetGone(target)),
            Err(error) => Err(error),
        };

        match result {
            Ok(item) => {
                if let Some(item) = item {
                    payload.item = item;
                }
                if let Some(entry) = self.target_mut(target) {
                    entry.drop_payload(ctx, position, &payload, proxy_size);
                    entry.drag_leave(ctx);
                }
                hooks.on_drag_complete(ctx, target, position, &payload);
                if undo_redo_transaction {
                    self.transactions.commit(ctx);
                }
                Release::Dropped(target)
            }
            Err(error) => {
                log::warn!("drop on {target:?} failed: {error}");
                hooks.on_drop_failure(ctx, &error, target);
                if let Some(entry) = self.target_mut(target) {
                    entry.drag_leave(ctx);
                }
                if undo_redo_transaction {
                    match self.failure_policy {
                        DropFailurePolicy::Commit => self.transactions.commit(ctx),
                        DropFailurePolicy::Abort => self.transactions.abort(ctx),
                    }
                }
                Release::Failed(target, error)
            }
        }
    }

    /// End the running drag without a drop. Does nothing when idle.
    ///
    /// Pending drops are unaffected; they belong to drags that already ended.
    pub fn cancel_drag(&mut self) {
        if let DragState::Dragging(_) = core::mem::replace(&mut self.state, DragState::Idle) {
            log::debug!("drag cancelled");
        }
    }
}
