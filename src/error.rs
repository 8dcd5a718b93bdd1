// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the brightness library.
//!
//! None of these errors is fatal to the host: text parse failures discard the
//! update, enumeration failures degrade to an empty device set, and apply
//! failures are reported per device.

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// Error occurred while parsing user input or configuration.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// An external command failed.
    #[error("command error: {0}")]
    Command(#[from] CommandError),

    /// The settings store rejected an operation.
    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),
}

/// Errors related to value validation and constraints.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValueError {
    /// The bounds of a range are not ordered.
    #[error("invalid range: min {min} is greater than max {max}")]
    InvalidRange {
        /// Lower bound.
        min: f64,
        /// Upper bound.
        max: f64,
    },

    /// A value or bound was NaN or infinite.
    #[error("value is not finite")]
    NonFinite,

    /// A numeric value is outside the allowed range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: f64,
        /// Maximum allowed value.
        max: f64,
        /// The actual value that was provided.
        actual: f64,
    },

    /// More decimal places were requested than an `f64` can carry.
    #[error("{0} decimal places exceeds the supported maximum")]
    TooManyDecimals(u8),
}

/// Errors related to parsing text input and configuration documents.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The input text was empty.
    #[error("input is empty")]
    Empty,

    /// The input text is not a numeric literal.
    #[error("not a number: {0:?}")]
    InvalidNumber(String),

    /// The input text parsed to NaN or infinity.
    #[error("not a finite number: {0:?}")]
    NonFinite(String),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors from running an external monitor-control command.
///
/// Cloneable so per-device outcomes can be broadcast to subscribers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// The process could not be started.
    #[error("failed to spawn {program}: {message}")]
    Spawn {
        /// The program that was executed.
        program: String,
        /// The underlying I/O error message.
        message: String,
    },

    /// The process ran but exited unsuccessfully.
    #[error("{program} exited with status {code:?}: {stderr}")]
    Failed {
        /// The program that was executed.
        program: String,
        /// Exit code, `None` if the process was killed by a signal.
        code: Option<i32>,
        /// Captured standard error, trimmed.
        stderr: String,
    },

    /// The process did not finish within its time budget.
    #[error("{program} timed out after {millis} ms")]
    Timeout {
        /// The program that was executed.
        program: String,
        /// The timeout that elapsed.
        millis: u64,
    },
}

/// Errors reported by a settings store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SettingsError {
    /// The key is not known to the store.
    #[error("unknown settings key: {0}")]
    UnknownKey(String),

    /// The store refused the write.
    #[error("write rejected: {0}")]
    Rejected(String),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_error_display() {
        let err = ValueError::OutOfRange {
            min: 0.0,
            max: 100.0,
            actual: 150.0,
        };
        assert_eq!(err.to_string(), "value 150 is out of range [0, 100]");
    }

    #[test]
    fn error_from_value_error() {
        let err: Error = ValueError::NonFinite.into();
        assert!(matches!(err, Error::Value(ValueError::NonFinite)));
    }

    #[test]
    fn parse_error_display() {
        let err = ParseError::InvalidNumber("abc".to_string());
        assert_eq!(err.to_string(), "not a number: \"abc\"");
    }

    #[test]
    fn command_error_display() {
        let err = CommandError::Failed {
            program: "ddcutil".to_string(),
            code: Some(1),
            stderr: "No monitor detected".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "ddcutil exited with status Some(1): No monitor detected"
        );

        let err = CommandError::Timeout {
            program: "ddccontrol".to_string(),
            millis: 5000,
        };
        assert_eq!(err.to_string(), "ddccontrol timed out after 5000 ms");
    }

    #[test]
    fn settings_error_converts() {
        let err: Error = SettingsError::UnknownKey("contrast".to_string()).into();
        assert_eq!(
            err.to_string(),
            "settings error: unknown settings key: contrast"
        );
    }
}
