// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-process settings store.

use std::collections::HashMap;

use parking_lot::RwLock;

use super::SettingsStore;
use crate::error::SettingsError;
use crate::subscription::{CallbackRegistry, ChangeCallback, SubscriptionId};

/// Settings held in memory.
///
/// By default any key may be written. A store created with
/// [`with_keys`](Self::with_keys) only accepts the listed keys, like a
/// schema-backed store would.
///
/// # Examples
///
/// ```
/// use ddc_brightness::settings::{MemorySettings, SettingsStore, BRIGHTNESS_KEY};
///
/// let settings = MemorySettings::new().with_value(BRIGHTNESS_KEY, 75.0);
/// assert_eq!(settings.get(BRIGHTNESS_KEY), Some(75.0));
///
/// settings.set(BRIGHTNESS_KEY, 40.0).unwrap();
/// assert_eq!(settings.get(BRIGHTNESS_KEY), Some(40.0));
/// ```
#[derive(Debug, Default)]
pub struct MemorySettings {
    values: RwLock<HashMap<String, f64>>,
    allowed: Option<Vec<String>>,
    callbacks: CallbackRegistry,
}

impl MemorySettings {
    /// Creates an empty store accepting any key.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts the store to the given keys.
    #[must_use]
    pub fn with_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    /// Seeds `key` with `value` without notifying anyone.
    #[must_use]
    pub fn with_value(self, key: impl Into<String>, value: f64) -> Self {
        self.values.write().insert(key.into(), value);
        self
    }

    /// Returns the number of active subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.callbacks.len()
    }

    fn check_key(&self, key: &str) -> Result<(), SettingsError> {
        match &self.allowed {
            Some(keys) if !keys.iter().any(|k| k == key) => {
                Err(SettingsError::UnknownKey(key.to_string()))
            }
            _ => Ok(()),
        }
    }
}

impl SettingsStore for MemorySettings {
    fn get(&self, key: &str) -> Option<f64> {
        self.values.read().get(key).copied()
    }

    fn set(&self, key: &str, value: f64) -> Result<(), SettingsError> {
        self.check_key(key)?;
        if !value.is_finite() {
            return Err(SettingsError::Rejected(format!(
                "{key} must be finite, got {value}"
            )));
        }
        self.values.write().insert(key.to_string(), value);
        tracing::trace!(key, value, "Setting written");
        self.callbacks.dispatch(key, value);
        Ok(())
    }

    fn subscribe(&self, callback: ChangeCallback) -> SubscriptionId {
        self.callbacks.register(callback)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.callbacks.unsubscribe(id)
    }
}
