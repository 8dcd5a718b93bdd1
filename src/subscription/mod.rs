// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Callback subscriptions for settings changes.
//!
//! Settings stores keep a [`CallbackRegistry`] and hand out the
//! [`SubscriptionId`] it returns; dropping a listener means passing that
//! handle back.
//!
//! ```
//! use ddc_brightness::subscription::CallbackRegistry;
//!
//! let registry = CallbackRegistry::new();
//! let id = registry.on_changed(|key, value| {
//!     println!("{key} changed to {value}");
//! });
//!
//! registry.dispatch("brightness", 40.0);
//! assert!(registry.unsubscribe(id));
//! ```

mod callback;

pub use callback::{CallbackRegistry, ChangeCallback, SubscriptionId};
