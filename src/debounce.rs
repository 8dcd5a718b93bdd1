// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Coalescing of rapid value changes into a single apply.
//!
//! [`DebouncedApplier`] is a two-state machine:
//!
//! - **Idle** - nothing scheduled.
//! - **Pending** - a timer is armed with a deadline and holds the most recent
//!   requested value.
//!
//! The window is measured from the first request of a burst: later requests
//! replace the stored value but never push the deadline back, so a continuous
//! drag still applies at a steady rate.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use ddc_brightness::debounce::DebouncedApplier;
//! use ddc_brightness::types::{BrightnessValue, ValueRange};
//! use parking_lot::Mutex;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let applied = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&applied);
//! let debouncer = DebouncedApplier::new(Duration::from_millis(10), move |value: BrightnessValue| {
//!     sink.lock().push(value.value());
//! });
//!
//! for raw in [10.0, 20.0, 30.0] {
//!     debouncer.request_apply(BrightnessValue::clamped(raw, ValueRange::PERCENT));
//! }
//! tokio::time::sleep(Duration::from_millis(50)).await;
//!
//! assert_eq!(*applied.lock(), vec![30.0]);
//! # }
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::types::BrightnessValue;

/// Debounce interval used when none is configured.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(600);

/// Callback invoked with the value to apply.
type ApplyCallback = Arc<dyn Fn(BrightnessValue) + Send + Sync>;

/// The armed timer and the value it will apply.
struct Pending {
    value: BrightnessValue,
    deadline: Instant,
    generation: u64,
    timer: JoinHandle<()>,
}

#[derive(Default)]
struct Slot {
    pending: Option<Pending>,
    generation: u64,
}

impl Slot {
    /// Cancels the armed timer, then clears it.
    fn cancel(&mut self) -> Option<BrightnessValue> {
        let pending = self.pending.as_ref()?;
        pending.timer.abort();
        self.pending.take().map(|p| p.value)
    }
}

/// Coalesces value requests and applies the last one after a quiet period,
/// or immediately on commit.
///
/// At most one timer is armed per applier. The slot is cleared before the
/// apply callback runs, so the callback may itself call back into the
/// applier.
///
/// Methods that arm a timer must be called from within a Tokio runtime.
pub struct DebouncedApplier {
    interval: Duration,
    slot: Arc<Mutex<Slot>>,
    apply: ApplyCallback,
}

impl DebouncedApplier {
    /// Creates an idle applier that invokes `apply` when a value is due.
    pub fn new<F>(interval: Duration, apply: F) -> Self
    where
        F: Fn(BrightnessValue) + Send + Sync + 'static,
    {
        Self {
            interval,
            slot: Arc::new(Mutex::new(Slot::default())),
            apply: Arc::new(apply),
        }
    }

    /// Returns the debounce interval.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Requests that `value` be applied once the window closes.
    ///
    /// When idle, arms a timer for `now + interval`. When already pending,
    /// replaces the stored value and keeps the existing deadline.
    pub fn request_apply(&self, value: BrightnessValue) {
        let mut slot = self.slot.lock();
        if let Some(pending) = slot.pending.as_mut() {
            tracing::trace!(value = %value, "Replacing pending value");
            pending.value = value;
            return;
        }

        slot.generation = slot.generation.wrapping_add(1);
        let generation = slot.generation;
        let deadline = Instant::now() + self.interval;
        let timer = tokio::spawn(fire_at(
            Arc::clone(&self.slot),
            Arc::clone(&self.apply),
            deadline,
            generation,
        ));
        tracing::debug!(value = %value, interval_ms = self.interval.as_millis(), "Scheduled apply");
        slot.pending = Some(Pending {
            value,
            deadline,
            generation,
            timer,
        });
    }

    /// Cancels any pending timer and applies `value` synchronously.
    pub fn commit_now(&self, value: BrightnessValue) {
        let superseded = self.slot.lock().cancel();
        if let Some(old) = superseded {
            tracing::debug!(superseded = %old, value = %value, "Committing over pending apply");
        }
        (self.apply)(value);
    }

    /// Cancels the pending apply, if any, and returns the value it held.
    pub fn cancel(&self) -> Option<BrightnessValue> {
        self.slot.lock().cancel()
    }

    /// Returns `true` while a timer is armed.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.slot.lock().pending.is_some()
    }

    /// Returns the value the armed timer will apply.
    #[must_use]
    pub fn pending_value(&self) -> Option<BrightnessValue> {
        self.slot.lock().pending.as_ref().map(|p| p.value)
    }

    /// Returns the deadline of the armed timer.
    #[must_use]
    pub fn pending_deadline(&self) -> Option<Instant> {
        self.slot.lock().pending.as_ref().map(|p| p.deadline)
    }
}

async fn fire_at(slot: Arc<Mutex<Slot>>, apply: ApplyCallback, deadline: Instant, generation: u64) {
    tokio::time::sleep_until(deadline).await;

    // A commit or cancel may have replaced this timer while it was waking.
    let due = slot
        .lock()
        .pending
        .take_if(|p| p.generation == generation)
        .map(|p| p.value);

    if let Some(value) = due {
        tracing::debug!(value = %value, "Debounce window elapsed");
        apply(value);
    }
}

impl Drop for DebouncedApplier {
    fn drop(&mut self) {
        self.slot.lock().cancel();
    }
}

impl fmt::Debug for DebouncedApplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebouncedApplier")
            .field("interval", &self.interval)
            .field("pending", &self.pending_value())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ValueRange;

    fn value(raw: f64) -> BrightnessValue {
        BrightnessValue::clamped(raw, ValueRange::PERCENT)
    }

    fn recording(interval: Duration) -> (DebouncedApplier, Arc<Mutex<Vec<f64>>>) {
        let applied = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&applied);
        let debouncer = DebouncedApplier::new(interval, move |v: BrightnessValue| {
            sink.lock().push(v.value());
        });
        (debouncer, applied)
    }

    #[tokio::test(start_paused = true)]
    async fn burst_applies_last_value_once() {
        let (debouncer, applied) = recording(DEFAULT_DEBOUNCE);

        for raw in [10.0, 20.0, 30.0, 40.0, 55.0] {
            debouncer.request_apply(value(raw));
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        assert!(debouncer.is_pending());
        assert!(applied.lock().is_empty());

        tokio::time::sleep(Duration::from_secs(2)).await;

        assert_eq!(*applied.lock(), vec![55.0]);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_is_not_extended_by_later_requests() {
        let (debouncer, applied) = recording(Duration::from_millis(600));

        debouncer.request_apply(value(10.0));
        let deadline = debouncer.pending_deadline().unwrap();

        tokio::time::sleep(Duration::from_millis(400)).await;
        debouncer.request_apply(value(20.0));
        assert_eq!(debouncer.pending_deadline(), Some(deadline));
        assert_eq!(debouncer.pending_value(), Some(value(20.0)));

        // 650 ms after the first request: fired even though the second
        // request came only 250 ms ago.
        tokio::time::sleep(Duration::from_millis(250)).await;
        assert_eq!(*applied.lock(), vec![20.0]);
    }

    #[tokio::test(start_paused = true)]
    async fn commit_cancels_pending_timer() {
        let (debouncer, applied) = recording(DEFAULT_DEBOUNCE);

        debouncer.request_apply(value(10.0));
        debouncer.commit_now(value(80.0));
        assert!(!debouncer.is_pending());
        assert_eq!(*applied.lock(), vec![80.0]);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(*applied.lock(), vec![80.0]);
    }

    #[tokio::test(start_paused = true)]
    async fn commit_when_idle_applies_immediately() {
        let (debouncer, applied) = recording(DEFAULT_DEBOUNCE);
        debouncer.commit_now(value(33.0));
        assert_eq!(*applied.lock(), vec![33.0]);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_returns_pending_value() {
        let (debouncer, applied) = recording(DEFAULT_DEBOUNCE);

        assert_eq!(debouncer.cancel(), None);
        debouncer.request_apply(value(64.0));
        assert_eq!(debouncer.cancel(), Some(value(64.0)));

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(applied.lock().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn new_burst_after_fire_arms_fresh_timer() {
        let (debouncer, applied) = recording(DEFAULT_DEBOUNCE);

        debouncer.request_apply(value(1.0));
        tokio::time::sleep(Duration::from_secs(1)).await;
        debouncer.request_apply(value(2.0));
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert_eq!(*applied.lock(), vec![1.0, 2.0]);
    }

    #[tokio::test(start_paused = true)]
    async fn apply_callback_may_reenter() {
        let slot: Arc<Mutex<Option<Arc<DebouncedApplier>>>> = Arc::new(Mutex::new(None));
        let applied = Arc::new(Mutex::new(Vec::new()));

        let handle = Arc::clone(&slot);
        let sink = Arc::clone(&applied);
        let debouncer = Arc::new(DebouncedApplier::new(DEFAULT_DEBOUNCE, move |v| {
            sink.lock().push(v.value());
            if let Some(d) = handle.lock().as_ref() {
                assert!(!d.is_pending());
            }
        }));
        *slot.lock() = Some(Arc::clone(&debouncer));

        debouncer.request_apply(value(5.0));
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(*applied.lock(), vec![5.0]);

        slot.lock().take();
    }
}
