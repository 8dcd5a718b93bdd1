// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for brightness control.
//!
//! Each type keeps its invariant from construction onwards, so code that
//! receives one never has to re-validate it.
//!
//! # Types
//!
//! - [`ValueRange`] - Bounds and display precision of a brightness domain
//! - [`BrightnessValue`] - A value guaranteed to lie within its range
//! - [`SliderPosition`] - Normalized slider position in `[0, 1]`

mod brightness;
mod position;
mod range;

pub use brightness::BrightnessValue;
pub use position::SliderPosition;
pub use range::ValueRange;
