// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Broadcast channel for controller events.

use tokio::sync::broadcast;

use super::BrightnessEvent;

/// Events buffered per subscriber before the oldest are dropped.
const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Fan-out of [`BrightnessEvent`]s to any number of receivers.
///
/// A receiver that falls more than the capacity behind loses the oldest
/// events and sees `RecvError::Lagged` once. Publishing never blocks and
/// never fails, even with no receivers.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<BrightnessEvent>,
}

impl EventBus {
    /// Creates a bus with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Creates a bus buffering up to `capacity` events per receiver.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Returns a receiver for events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<BrightnessEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of live receivers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Publishes `event`, dropping it if nobody listens.
    pub fn publish(&self, event: BrightnessEvent) {
        let _ = self.publish_counted(event);
    }

    /// Publishes `event` and returns how many receivers got it.
    #[must_use]
    pub fn publish_counted(&self, event: BrightnessEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::ApplyReport;
    use crate::event::Origin;
    use crate::types::{BrightnessValue, ValueRange};

    fn percent(raw: f64) -> BrightnessValue {
        BrightnessValue::clamped(raw, ValueRange::PERCENT)
    }

    fn user_change(raw: f64) -> BrightnessEvent {
        BrightnessEvent::ValueChanged {
            value: percent(raw),
            origin: Origin::User,
        }
    }

    #[test]
    fn receivers_are_counted_until_dropped() {
        let bus = EventBus::default();
        assert_eq!(bus.subscriber_count(), 0);

        let panel = bus.subscribe();
        let logger = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        drop(panel);
        assert_eq!(bus.subscriber_count(), 1);
        drop(logger);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn every_receiver_sees_events_in_order() {
        let bus = EventBus::new();
        let mut panel = bus.subscribe();
        let mut logger = bus.subscribe();

        bus.publish(user_change(30.0));
        bus.publish(BrightnessEvent::Applied {
            value: percent(30.0),
            report: ApplyReport::default(),
        });

        for rx in [&mut panel, &mut logger] {
            assert_eq!(rx.recv().await.unwrap(), user_change(30.0));
            assert!(rx.recv().await.unwrap().is_applied());
        }
    }

    #[test]
    fn events_without_receivers_are_discarded() {
        let bus = EventBus::new();
        assert_eq!(bus.publish_counted(user_change(10.0)), 0);

        let mut late = bus.subscribe();
        assert!(late.try_recv().is_err());
        assert_eq!(
            bus.publish_counted(BrightnessEvent::DevicesRefreshed { count: 3 }),
            1
        );
        assert_eq!(
            late.try_recv().unwrap(),
            BrightnessEvent::DevicesRefreshed { count: 3 }
        );
    }

    #[test]
    fn small_capacity_lags_slow_receivers() {
        let bus = EventBus::with_capacity(2);
        let mut slow = bus.subscribe();

        for raw in [10.0, 20.0, 30.0] {
            bus.publish(user_change(raw));
        }

        assert!(matches!(
            slow.try_recv(),
            Err(broadcast::error::TryRecvError::Lagged(1))
        ));
        assert_eq!(slow.try_recv().unwrap(), user_change(20.0));
    }

    #[test]
    fn clones_publish_into_one_channel() {
        let bus = EventBus::new();
        let producer = bus.clone();
        let mut rx = bus.subscribe();

        producer.publish(user_change(55.0));
        assert_eq!(rx.try_recv().unwrap().value(), Some(percent(55.0)));
    }
}
