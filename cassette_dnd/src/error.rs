// Copyright 2026 the Cassette Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::string::String;

use crate::types::{DropTicket, MonitorId, TargetId};

/// Misuse of a [`DragCoordinator`](crate::DragCoordinator) that the caller can recover from.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DragError {
    /// `start_drag` was called while another drag is running.
    #[error("a drag is already in progress")]
    AlreadyDragging,
    /// The target was never registered or was unregistered.
    #[error("drop target {0:?} is not registered")]
    UnknownTarget(TargetId),
    /// The monitor was never registered or was unregistered.
    #[error("monitor {0:?} is not registered")]
    UnknownMonitor(MonitorId),
    /// The ticket was already resolved or never issued.
    #[error("no pending drop for {0:?}")]
    UnknownDrop(DropTicket),
}

/// Why a drop did not happen.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DropError {
    /// The drop hooks refused the payload.
    #[error("drop rejected: {0}")]
    Rejected(String),
    /// The target was unregistered while its drop was pending.
    #[error("drop target {0:?} went away before the drop resolved")]
    TargetGone(TargetId),
}

impl DropError {
    /// A rejection with a reason.
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected(reason.into())
    }
}
