// Copyright 2026 the Cassette Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Persistence of per-construct collapsed state.

use alloc::format;
use alloc::string::String;

use hashbrown::HashMap;

/// Key under which the collapsed state of `construct_id` is stored.
pub fn collapsed_key(construct_id: &str) -> String {
    format!("{construct_id}-collapsed")
}

/// A small key/value store for view state that outlives a layout.
///
/// Browser hosts back this with local storage; the default value of a missing key is
/// `false`.
pub trait CollapseStore {
    /// Stored flag for `key`, or `None` if it was never written.
    fn get(&self, key: &str) -> Option<bool>;

    /// Store `value` under `key`.
    fn set(&mut self, key: &str, value: bool);

    /// Whether the construct is collapsed.
    fn is_collapsed(&self, construct_id: &str) -> bool {
        self.get(&collapsed_key(construct_id)).unwrap_or(false)
    }
}

/// In-memory [`CollapseStore`].
#[derive(Clone, Debug, Default)]
pub struct MemoryCollapseStore {
    values: HashMap<String, bool>,
}

impl MemoryCollapseStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when nothing has been stored.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl CollapseStore for MemoryCollapseStore {
    fn get(&self, key: &str) -> Option<bool> {
        self.values.get(key).copied()
    }

    fn set(&mut self, key: &str, value: bool) {
        self.values.insert(String::from(key), value);
    }
}
