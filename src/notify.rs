// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Transient user notifications.

/// Fire-and-forget sink for short user-visible messages.
///
/// Desktop integrations route these to their notification tray. Delivery
/// failures are the sink's own business; callers never wait on it.
pub trait Notifier: Send + Sync {
    /// Shows a transient message.
    fn notify(&self, title: &str, body: &str);
}

/// Notifier that writes messages to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, title: &str, body: &str) {
        tracing::warn!(title, body, "Notification");
    }
}

impl<F> Notifier for F
where
    F: Fn(&str, &str) + Send + Sync,
{
    fn notify(&self, title: &str, body: &str) {
        self(title, body);
    }
}
