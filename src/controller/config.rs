// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Controller configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::device::ToolConfig;
use crate::error::{Error, ParseError, ValueError};
use crate::normalize::ValueNormalizer;
use crate::settings::{BRIGHTNESS_KEY, TEXT_SCALING_FACTOR_KEY};
use crate::types::ValueRange;

/// Configuration for a [`BrightnessController`](super::BrightnessController).
///
/// Missing fields take their defaults when deserializing, which are those
/// of [`ControllerConfig::percentage`].
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use ddc_brightness::controller::ControllerConfig;
///
/// let config = ControllerConfig::from_json(r#"{"default_value": 60, "debounce_ms": 300}"#).unwrap();
/// assert_eq!(config.default_value, 60.0);
/// assert_eq!(config.debounce(), Duration::from_millis(300));
///
/// let scaling = ControllerConfig::text_scaling();
/// assert_eq!(scaling.settings_key, "text-scaling-factor");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Lower bound of the value range.
    pub min: f64,
    /// Upper bound of the value range.
    pub max: f64,
    /// Decimals values are rounded to.
    pub decimals: u8,
    /// Value restored by reset.
    pub default_value: f64,
    /// Debounce window for slider movement, in milliseconds.
    pub debounce_ms: u64,
    /// Settings key the value is persisted to and observed on.
    pub settings_key: String,
    /// Monitor-control tool settings.
    pub tool: ToolConfig,
}

impl ControllerConfig {
    /// Default debounce window.
    pub const DEFAULT_DEBOUNCE_MS: u64 = 600;

    /// Integer percentage 0-100 with default 75, stored under `brightness`.
    #[must_use]
    pub fn percentage() -> Self {
        Self {
            min: ValueRange::PERCENT.min(),
            max: ValueRange::PERCENT.max(),
            decimals: ValueRange::PERCENT.decimals(),
            default_value: 75.0,
            debounce_ms: Self::DEFAULT_DEBOUNCE_MS,
            settings_key: BRIGHTNESS_KEY.to_string(),
            tool: ToolConfig::default(),
        }
    }

    /// Text-scaling factor 0.5-3.0 with default 1.0, stored under
    /// `text-scaling-factor`.
    #[must_use]
    pub fn text_scaling() -> Self {
        Self {
            min: ValueRange::TEXT_SCALING.min(),
            max: ValueRange::TEXT_SCALING.max(),
            decimals: ValueRange::TEXT_SCALING.decimals(),
            default_value: 1.0,
            settings_key: TEXT_SCALING_FACTOR_KEY.to_string(),
            ..Self::percentage()
        }
    }

    /// Parses and validates a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns `Error::Parse` for malformed JSON and `Error::Value` if the
    /// configuration fails [`validate`](Self::validate).
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let config: Self = serde_json::from_str(json).map_err(ParseError::from)?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes the configuration to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Json` if serialization fails.
    pub fn to_json(&self) -> Result<String, ParseError> {
        serde_json::to_string_pretty(self).map_err(ParseError::from)
    }

    /// Checks that the range is valid and contains the default.
    ///
    /// # Errors
    ///
    /// Returns the `ValueError` describing the first problem found.
    pub fn validate(&self) -> Result<(), ValueError> {
        self.normalizer().map(|_| ())
    }

    /// Returns the value range.
    ///
    /// # Errors
    ///
    /// Returns `ValueError` if the bounds or decimals are invalid.
    pub fn range(&self) -> Result<ValueRange, ValueError> {
        ValueRange::new(self.min, self.max, self.decimals)
    }

    /// Returns a normalizer for this range and default.
    ///
    /// # Errors
    ///
    /// Returns `ValueError` if the range is invalid or excludes the default.
    pub fn normalizer(&self) -> Result<ValueNormalizer, ValueError> {
        ValueNormalizer::new(self.range()?, self.default_value)
    }

    /// Returns the debounce window.
    #[must_use]
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Sets the value range.
    #[must_use]
    pub fn with_range(mut self, min: f64, max: f64, decimals: u8) -> Self {
        self.min = min;
        self.max = max;
        self.decimals = decimals;
        self
    }

    /// Sets the reset value.
    #[must_use]
    pub fn with_default_value(mut self, value: f64) -> Self {
        self.default_value = value;
        self
    }

    /// Sets the debounce window.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce_ms = debounce.as_millis() as u64;
        self
    }

    /// Sets the settings key.
    #[must_use]
    pub fn with_settings_key(mut self, key: impl Into<String>) -> Self {
        self.settings_key = key.into();
        self
    }

    /// Sets the tool configuration.
    #[must_use]
    pub fn with_tool(mut self, tool: ToolConfig) -> Self {
        self.tool = tool;
        self
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self::percentage()
    }
}
