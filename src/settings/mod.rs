// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Key-value settings the brightness value is persisted to.
//!
//! The controller receives a [`SettingsStore`] at construction instead of
//! reaching for a process-wide handle. Desktop integrations implement the
//! trait over their own settings backend; [`MemorySettings`] is an
//! in-process store for tests and headless use.

mod memory;

pub use memory::MemorySettings;

use crate::error::SettingsError;
use crate::subscription::{ChangeCallback, SubscriptionId};

/// Key holding a custom brightness percentage.
pub const BRIGHTNESS_KEY: &str = "brightness";

/// Key holding the desktop text-scaling factor.
pub const TEXT_SCALING_FACTOR_KEY: &str = "text-scaling-factor";

/// A numeric key-value store with change notification.
///
/// A successful [`set`](Self::set) notifies subscribers, including the
/// writer itself; callers tell their own echoes apart. Stores may skip the
/// notification when the value is unchanged.
pub trait SettingsStore: Send + Sync {
    /// Reads `key`, or `None` if it has no value.
    fn get(&self, key: &str) -> Option<f64>;

    /// Writes `value` to `key`.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if the store does not know the key or
    /// refuses the write.
    fn set(&self, key: &str, value: f64) -> Result<(), SettingsError>;

    /// Registers a callback for changes to any key.
    fn subscribe(&self, callback: ChangeCallback) -> SubscriptionId;

    /// Removes a callback. Returns `true` if it was registered.
    fn unsubscribe(&self, id: SubscriptionId) -> bool;
}
