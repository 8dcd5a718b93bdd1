// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Normalized slider position.

use std::fmt;

/// A slider position in `[0, 1]`.
///
/// Construction clamps rather than rejects: toolkits routinely report
/// slightly out-of-range positions while dragging past the ends.
///
/// # Examples
///
/// ```
/// use ddc_brightness::types::SliderPosition;
///
/// assert_eq!(SliderPosition::new(0.25).value(), 0.25);
/// assert_eq!(SliderPosition::new(1.7).value(), 1.0);
/// assert_eq!(SliderPosition::new(f64::NAN), SliderPosition::MIN);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct SliderPosition(f64);

impl SliderPosition {
    /// Leftmost position.
    pub const MIN: Self = Self(0.0);

    /// Rightmost position.
    pub const MAX: Self = Self(1.0);

    /// Creates a position, clamping into `[0, 1]`. NaN maps to `0`.
    #[must_use]
    pub fn new(position: f64) -> Self {
        if position.is_nan() {
            return Self::MIN;
        }
        Self(position.clamp(0.0, 1.0))
    }

    /// Returns the position as a float in `[0, 1]`.
    #[must_use]
    pub const fn value(&self) -> f64 {
        self.0
    }

    /// Returns the position scaled to `0..=100` and rounded.
    ///
    /// This is the level written to a monitor's brightness register.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn percent(&self) -> u16 {
        // Safe: self.0 is within [0, 1]
        (self.0 * 100.0).round() as u16
    }
}

impl From<f64> for SliderPosition {
    fn from(position: f64) -> Self {
        Self::new(position)
    }
}

impl fmt::Display for SliderPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}", self.0)
    }
}
