// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Conversions between slider positions and domain values.
//!
//! These are total functions over finite inputs: out-of-range positions are
//! clamped, and a degenerate range (`min == max`) maps every value to
//! position `0`.
//!
//! # Examples
//!
//! ```
//! use ddc_brightness::convert::{to_position, to_value};
//!
//! assert_eq!(to_position(75.0, 0.0, 100.0), 0.75);
//! assert_eq!(to_value(0.5, 0.0, 100.0, 0), 50.0);
//! assert_eq!(to_value(0.5, 0.5, 3.0, 2), 1.75);
//! ```

/// Maps a domain value to a slider position in `[0, 1]`.
///
/// Computes `(value - min) / (max - min)`, clamped. Returns `0` when the
/// range is empty or the value is NaN.
#[must_use]
pub fn to_position(value: f64, min: f64, max: f64) -> f64 {
    let span = max - min;
    if span <= 0.0 || !span.is_finite() {
        return 0.0;
    }
    let position = (value - min) / span;
    if position.is_nan() {
        return 0.0;
    }
    position.clamp(0.0, 1.0)
}

/// Maps a slider position to a domain value rounded to `decimals`.
///
/// Computes `position * (max - min) + min` after clamping the position to
/// `[0, 1]`.
#[must_use]
pub fn to_value(position: f64, min: f64, max: f64, decimals: u8) -> f64 {
    let position = if position.is_nan() {
        0.0
    } else {
        position.clamp(0.0, 1.0)
    };
    round_to(position * (max - min) + min, decimals)
}

/// Rounds `value` half away from zero to `decimals` places.
#[must_use]
pub fn round_to(value: f64, decimals: u8) -> f64 {
    if decimals == 0 {
        return value.round();
    }
    let factor = 10f64.powi(i32::from(decimals));
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_of_bounds() {
        assert_eq!(to_position(0.0, 0.0, 100.0), 0.0);
        assert_eq!(to_position(100.0, 0.0, 100.0), 1.0);
        assert_eq!(to_position(0.5, 0.5, 3.0), 0.0);
        assert_eq!(to_position(3.0, 0.5, 3.0), 1.0);
    }

    #[test]
    fn position_is_clamped() {
        assert_eq!(to_position(150.0, 0.0, 100.0), 1.0);
        assert_eq!(to_position(-20.0, 0.0, 100.0), 0.0);
        assert_eq!(to_position(f64::NAN, 0.0, 100.0), 0.0);
    }

    #[test]
    fn degenerate_range_maps_to_zero() {
        assert_eq!(to_position(5.0, 5.0, 5.0), 0.0);
        assert_eq!(to_value(0.7, 5.0, 5.0, 0), 5.0);
    }

    #[test]
    fn value_is_clamped_and_rounded() {
        assert_eq!(to_value(1.5, 0.0, 100.0, 0), 100.0);
        assert_eq!(to_value(-1.0, 0.0, 100.0, 0), 0.0);
        assert_eq!(to_value(0.333, 0.0, 100.0, 0), 33.0);
        assert_eq!(to_value(0.333, 0.0, 100.0, 1), 33.3);
    }

    #[test]
    fn round_trip_within_tolerance() {
        let cases: [(f64, f64, u8); 3] = [(0.0, 100.0, 0), (0.5, 3.0, 2), (-10.0, 10.0, 1)];
        for (min, max, decimals) in cases {
            let tolerance = 10f64.powi(-i32::from(decimals)) / 2.0;
            let steps = 37;
            for i in 0..=steps {
                let v = round_to(min + (max - min) * f64::from(i) / f64::from(steps), decimals);
                let back = to_value(to_position(v, min, max), min, max, decimals);
                assert!(
                    (back - v).abs() < tolerance,
                    "{v} -> {back} in [{min}, {max}] at {decimals} decimals"
                );
            }
        }
    }

    #[test]
    fn round_to_half_away_from_zero() {
        assert_eq!(round_to(2.5, 0), 3.0);
        assert_eq!(round_to(-2.5, 0), -3.0);
        assert_eq!(round_to(1.234, 2), 1.23);
    }
}
