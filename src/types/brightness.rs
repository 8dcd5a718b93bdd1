// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bounded brightness value.

use std::fmt;

use crate::convert;
use crate::error::ValueError;

use super::{SliderPosition, ValueRange};

/// A brightness value that always lies within its [`ValueRange`] and is
/// rounded to the range's precision.
///
/// # Examples
///
/// ```
/// use ddc_brightness::types::{BrightnessValue, SliderPosition, ValueRange};
///
/// let value = BrightnessValue::new(75.0, ValueRange::PERCENT).unwrap();
/// assert_eq!(value.position().value(), 0.75);
/// assert_eq!(value.to_string(), "75");
///
/// // Out-of-range values are rejected by `new` and clamped by `clamped`
/// assert!(BrightnessValue::new(150.0, ValueRange::PERCENT).is_err());
/// assert_eq!(BrightnessValue::clamped(150.0, ValueRange::PERCENT).value(), 100.0);
///
/// let half = BrightnessValue::from_position(SliderPosition::new(0.5), ValueRange::PERCENT);
/// assert_eq!(half.value(), 50.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrightnessValue {
    raw: f64,
    range: ValueRange,
}

impl BrightnessValue {
    /// Creates a value, rounding it to the range's precision.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::NonFinite` for NaN or infinite input and
    /// `ValueError::OutOfRange` if the rounded value falls outside `range`.
    pub fn new(raw: f64, range: ValueRange) -> Result<Self, ValueError> {
        if !raw.is_finite() {
            return Err(ValueError::NonFinite);
        }
        let rounded = range.round(raw);
        if !range.contains(rounded) {
            return Err(ValueError::OutOfRange {
                min: range.min(),
                max: range.max(),
                actual: raw,
            });
        }
        Ok(Self { raw: rounded, range })
    }

    /// Creates a value, clamping into the range and rounding.
    ///
    /// NaN maps to the range minimum, infinities to the nearest bound.
    #[must_use]
    pub fn clamped(raw: f64, range: ValueRange) -> Self {
        // Rounding can push a value just past a bound that has more
        // decimals than the range displays, so clamp again afterwards.
        let raw = range.clamp(range.round(range.clamp(raw)));
        Self { raw, range }
    }

    /// Creates the value a slider position stands for.
    #[must_use]
    pub fn from_position(position: SliderPosition, range: ValueRange) -> Self {
        let raw = convert::to_value(position.value(), range.min(), range.max(), range.decimals());
        Self {
            raw: range.clamp(raw),
            range,
        }
    }

    /// Returns the numeric value.
    #[must_use]
    pub const fn value(&self) -> f64 {
        self.raw
    }

    /// Returns the range this value belongs to.
    #[must_use]
    pub const fn range(&self) -> ValueRange {
        self.range
    }

    /// Returns the slider position representing this value.
    #[must_use]
    pub fn position(&self) -> SliderPosition {
        SliderPosition::new(convert::to_position(
            self.raw,
            self.range.min(),
            self.range.max(),
        ))
    }

    /// Returns the level written to a monitor's brightness register (0-100).
    ///
    /// For the percentage range this is the value itself.
    #[must_use]
    pub fn register_level(&self) -> u16 {
        self.position().percent()
    }

    /// Returns `true` if both values render identically at this range's
    /// precision.
    #[must_use]
    pub fn approx_eq(&self, other: f64) -> bool {
        self.range.approx_eq(self.raw, other)
    }
}

impl fmt::Display for BrightnessValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.*}", usize::from(self.range.decimals()), self.raw)
    }
}
