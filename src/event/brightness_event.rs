// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Brightness event types.

use crate::device::ApplyReport;
use crate::types::BrightnessValue;

/// Where a value change came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    /// The user moved the slider, typed a value, or pressed reset.
    User,
    /// The settings store changed without this controller writing it.
    External,
}

/// Something the controller did or observed.
#[derive(Debug, Clone, PartialEq)]
pub enum BrightnessEvent {
    /// The current value changed.
    ValueChanged {
        /// The new value.
        value: BrightnessValue,
        /// Who changed it.
        origin: Origin,
    },

    /// A value was written to the devices.
    Applied {
        /// The applied value.
        value: BrightnessValue,
        /// Per-device outcome.
        report: ApplyReport,
    },

    /// The device list was re-enumerated.
    DevicesRefreshed {
        /// Number of devices found.
        count: usize,
    },
}

impl BrightnessEvent {
    /// Returns the value carried by the event, if any.
    #[must_use]
    pub fn value(&self) -> Option<BrightnessValue> {
        match self {
            Self::ValueChanged { value, .. } | Self::Applied { value, .. } => Some(*value),
            Self::DevicesRefreshed { .. } => None,
        }
    }

    /// Returns `true` for [`BrightnessEvent::Applied`].
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ValueRange;

    #[test]
    fn value_accessor() {
        let value = BrightnessValue::clamped(10.0, ValueRange::PERCENT);
        let event = BrightnessEvent::Applied {
            value,
            report: ApplyReport::default(),
        };
        assert_eq!(event.value(), Some(value));
        assert!(event.is_applied());
        assert_eq!(BrightnessEvent::DevicesRefreshed { count: 2 }.value(), None);
    }
}
