// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bounds and precision of a brightness domain.

use std::fmt;

use crate::convert;
use crate::error::ValueError;

/// The closed interval `[min, max]` a brightness value lives in, together
/// with the number of decimals it is rounded to.
///
/// Two domains are common: an integer percentage (`0..=100`, no decimals)
/// and a text-scaling factor (`0.5..=3.0`, two decimals).
///
/// # Examples
///
/// ```
/// use ddc_brightness::types::ValueRange;
///
/// let range = ValueRange::new(0.5, 3.0, 2).unwrap();
/// assert_eq!(range.clamp(4.0), 3.0);
/// assert_eq!(range.round(1.234), 1.23);
///
/// assert!(ValueRange::new(10.0, 0.0, 0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueRange {
    min: f64,
    max: f64,
    decimals: u8,
}

impl ValueRange {
    /// Largest supported number of decimals.
    pub const MAX_DECIMALS: u8 = 10;

    /// Integer percentage, `0..=100`.
    pub const PERCENT: Self = Self {
        min: 0.0,
        max: 100.0,
        decimals: 0,
    };

    /// Desktop text-scaling factor, `0.5..=3.0` with two decimals.
    pub const TEXT_SCALING: Self = Self {
        min: 0.5,
        max: 3.0,
        decimals: 2,
    };

    /// Creates a new range.
    ///
    /// A degenerate range (`min == max`) is accepted; every position maps
    /// to its single value.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::NonFinite` if a bound is NaN or infinite,
    /// `ValueError::InvalidRange` if `min > max`, and
    /// `ValueError::TooManyDecimals` above [`Self::MAX_DECIMALS`].
    pub fn new(min: f64, max: f64, decimals: u8) -> Result<Self, ValueError> {
        if !min.is_finite() || !max.is_finite() {
            return Err(ValueError::NonFinite);
        }
        if min > max {
            return Err(ValueError::InvalidRange { min, max });
        }
        if decimals > Self::MAX_DECIMALS {
            return Err(ValueError::TooManyDecimals(decimals));
        }
        Ok(Self { min, max, decimals })
    }

    /// Returns the lower bound.
    #[must_use]
    pub const fn min(&self) -> f64 {
        self.min
    }

    /// Returns the upper bound.
    #[must_use]
    pub const fn max(&self) -> f64 {
        self.max
    }

    /// Returns the number of decimals values are rounded to.
    #[must_use]
    pub const fn decimals(&self) -> u8 {
        self.decimals
    }

    /// Half a unit in the last displayed decimal place.
    ///
    /// Two values closer than this render identically and are considered
    /// equal.
    #[must_use]
    pub fn tolerance(&self) -> f64 {
        10f64.powi(-i32::from(self.decimals)) / 2.0
    }

    /// Returns `true` if `value` lies within the range.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }

    /// Clamps `value` into the range. NaN maps to `min`.
    #[must_use]
    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            return self.min;
        }
        value.clamp(self.min, self.max)
    }

    /// Rounds `value` to this range's precision.
    #[must_use]
    pub fn round(&self, value: f64) -> f64 {
        convert::round_to(value, self.decimals)
    }

    /// Returns `true` if the two values differ by less than [`Self::tolerance`].
    #[must_use]
    pub fn approx_eq(&self, a: f64, b: f64) -> bool {
        (a - b).abs() < self.tolerance()
    }
}

impl Default for ValueRange {
    fn default() -> Self {
        Self::PERCENT
    }
}

impl fmt::Display for ValueRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = usize::from(self.decimals);
        write!(f, "[{:.d$}, {:.d$}]", self.min, self.max)
    }
}
