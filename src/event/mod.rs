// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Events published by the brightness controller.
//!
//! The [`EventBus`] uses tokio's broadcast channel so several observers
//! (a panel widget, a logger, tests) can follow the same controller.
//!
//! # Examples
//!
//! ```
//! use ddc_brightness::event::{BrightnessEvent, EventBus, Origin};
//! use ddc_brightness::types::{BrightnessValue, ValueRange};
//!
//! let bus = EventBus::new();
//! let mut rx = bus.subscribe();
//!
//! let value = BrightnessValue::clamped(40.0, ValueRange::PERCENT);
//! bus.publish(BrightnessEvent::ValueChanged { value, origin: Origin::User });
//! assert!(rx.try_recv().is_ok());
//! ```

mod brightness_event;
mod event_bus;

pub use brightness_event::{BrightnessEvent, Origin};
pub use event_bus::EventBus;
