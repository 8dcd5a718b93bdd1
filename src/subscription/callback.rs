// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Change callbacks keyed by subscription handle.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

/// Handle returned by [`CallbackRegistry::register`], needed to unsubscribe.
///
/// Handles are never reused within one registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Returns the numeric handle.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sub({})", self.0)
    }
}

/// Callback receiving the changed key and its new value.
pub type ChangeCallback = Arc<dyn Fn(&str, f64) + Send + Sync>;

#[derive(Default)]
struct Entries {
    last_id: u64,
    callbacks: Vec<(SubscriptionId, ChangeCallback)>,
}

/// Ordered set of settings change callbacks.
///
/// Callbacks run in registration order. Dispatch works on a snapshot, so a
/// callback may subscribe, unsubscribe, or write settings without
/// deadlocking; changes take effect from the next dispatch.
#[derive(Default)]
pub struct CallbackRegistry {
    entries: Mutex<Entries>,
}

impl CallbackRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a closure for value changes.
    pub fn on_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&str, f64) + Send + Sync + 'static,
    {
        self.register(Arc::new(callback))
    }

    /// Registers an already shared callback.
    pub fn register(&self, callback: ChangeCallback) -> SubscriptionId {
        let mut entries = self.entries.lock();
        entries.last_id += 1;
        let id = SubscriptionId(entries.last_id);
        entries.callbacks.push((id, callback));
        id
    }

    /// Removes the callback registered under `id`.
    ///
    /// Returns `false` if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut entries = self.entries.lock();
        let before = entries.callbacks.len();
        entries.callbacks.retain(|(existing, _)| *existing != id);
        entries.callbacks.len() != before
    }

    /// Calls every registered callback with `key` and `value`.
    pub fn dispatch(&self, key: &str, value: f64) {
        let snapshot: Vec<ChangeCallback> = self
            .entries
            .lock()
            .callbacks
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();
        for callback in snapshot {
            callback(key, value);
        }
    }

    /// Returns the number of registered callbacks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().callbacks.len()
    }

    /// Returns `true` if no callbacks are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("callbacks", &self.len())
            .finish_non_exhaustive()
    }
}
