// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Validation of raw UI input into legal brightness values.
//!
//! # Examples
//!
//! ```
//! use ddc_brightness::normalize::{RawInput, ValueNormalizer};
//! use ddc_brightness::types::ValueRange;
//!
//! let normalizer = ValueNormalizer::new(ValueRange::PERCENT, 75.0).unwrap();
//!
//! let value = normalizer.normalize(RawInput::Text("150")).unwrap();
//! assert_eq!(value.value(), 100.0);
//!
//! assert!(normalizer.normalize(RawInput::Text("abc")).is_err());
//! assert!(normalizer.is_default(75.0));
//! ```

use crate::error::{ParseError, ValueError};
use crate::types::{BrightnessValue, SliderPosition, ValueRange};

/// A raw value as delivered by a UI widget or the settings store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawInput<'a> {
    /// Free text typed into an entry.
    Text(&'a str),
    /// A slider position, nominally in `[0, 1]`.
    Slider(f64),
    /// A value already expressed in the domain's units.
    Value(f64),
}

/// Turns raw input into a clamped, rounded [`BrightnessValue`] and answers
/// whether a value equals the configured default.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueNormalizer {
    range: ValueRange,
    default: BrightnessValue,
}

impl ValueNormalizer {
    /// Creates a normalizer for `range` with the given default value.
    ///
    /// # Errors
    ///
    /// Returns `ValueError` if `default` is not a legal value of `range`.
    pub fn new(range: ValueRange, default: f64) -> Result<Self, ValueError> {
        let default = BrightnessValue::new(default, range)?;
        Ok(Self { range, default })
    }

    /// Returns the value range.
    #[must_use]
    pub const fn range(&self) -> ValueRange {
        self.range
    }

    /// Returns the default value.
    #[must_use]
    pub const fn default_value(&self) -> BrightnessValue {
        self.default
    }

    /// Normalizes raw input.
    ///
    /// Text must be a finite numeric literal (surrounding whitespace is
    /// ignored). Every successful result is clamped to the range and
    /// rounded to its precision.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if text input is empty, not a number, or not
    /// finite. Numeric input never fails.
    pub fn normalize(&self, input: RawInput<'_>) -> Result<BrightnessValue, ParseError> {
        match input {
            RawInput::Text(text) => {
                let raw = parse_number(text)?;
                Ok(BrightnessValue::clamped(raw, self.range))
            }
            RawInput::Slider(position) => Ok(BrightnessValue::from_position(
                SliderPosition::new(position),
                self.range,
            )),
            RawInput::Value(raw) => Ok(BrightnessValue::clamped(raw, self.range)),
        }
    }

    /// Normalizes a slider position. Never fails.
    #[must_use]
    pub fn from_slider(&self, position: SliderPosition) -> BrightnessValue {
        BrightnessValue::from_position(position, self.range)
    }

    /// Returns `true` if `value` is within half a display unit of the
    /// default.
    #[must_use]
    pub fn is_default(&self, value: f64) -> bool {
        self.default.approx_eq(value)
    }
}

fn parse_number(text: &str) -> Result<f64, ParseError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }
    let raw: f64 = trimmed
        .parse()
        .map_err(|_| ParseError::InvalidNumber(trimmed.to_string()))?;
    if !raw.is_finite() {
        return Err(ParseError::NonFinite(trimmed.to_string()));
    }
    Ok(raw)
}
