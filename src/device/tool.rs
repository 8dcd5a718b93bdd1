// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Monitor-control tools and the command lines they take.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::Device;
use super::runner::Invocation;
use crate::types::BrightnessValue;

/// VCP feature code of the brightness register.
pub const BRIGHTNESS_VCP_CODE: u8 = 0x10;

/// Command-line tool used to talk DDC/CI to monitors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// `ddcutil`; devices are display numbers.
    #[default]
    Ddcutil,
    /// `ddccontrol`; devices are `dev:/dev/i2c-N` handles.
    Ddccontrol,
}

impl Tool {
    /// Returns the executable name.
    #[must_use]
    pub const fn program(&self) -> &'static str {
        match self {
            Self::Ddcutil => "ddcutil",
            Self::Ddccontrol => "ddccontrol",
        }
    }

    /// Arguments that list attached monitors.
    fn enumerate_args(self) -> Vec<String> {
        match self {
            Self::Ddcutil => vec!["detect".into(), "--terse".into()],
            Self::Ddccontrol => vec!["-p".into()],
        }
    }

    /// Arguments that write `level` to the brightness register of `device`.
    fn apply_args(self, device: &Device, level: u16) -> Vec<String> {
        let code = format!("{BRIGHTNESS_VCP_CODE:#04x}");
        match self {
            Self::Ddcutil => vec![
                "--display".into(),
                device.id().to_string(),
                "setvcp".into(),
                code,
                level.to_string(),
            ],
            Self::Ddccontrol => vec![
                "-r".into(),
                code,
                "-w".into(),
                level.to_string(),
                device.id().to_string(),
            ],
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program())
    }
}

impl FromStr for Tool {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ddcutil" => Ok(Self::Ddcutil),
            "ddccontrol" => Ok(Self::Ddccontrol),
            other => Err(format!("unknown tool: {other}")),
        }
    }
}

/// How device commands are built and bounded.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use ddc_brightness::device::{Tool, ToolConfig};
///
/// let config = ToolConfig::new(Tool::Ddccontrol)
///     .with_sudo(true)
///     .with_apply_timeout(Duration::from_secs(2));
///
/// assert_eq!(config.enumerate_invocation().to_string(), "sudo ddccontrol -p");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    /// The tool to drive.
    pub backend: Tool,
    /// Run the tool through `sudo`.
    pub use_sudo: bool,
    /// Override for the tool's executable path.
    pub program: Option<String>,
    /// Time budget for device enumeration, in milliseconds.
    pub enumerate_timeout_ms: u64,
    /// Time budget for one device apply, in milliseconds.
    pub apply_timeout_ms: u64,
}

impl ToolConfig {
    /// Default enumeration timeout.
    pub const DEFAULT_ENUMERATE_TIMEOUT: Duration = Duration::from_secs(5);
    /// Default per-device apply timeout.
    pub const DEFAULT_APPLY_TIMEOUT: Duration = Duration::from_secs(5);

    /// Creates a configuration for `backend` with default timeouts.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn new(backend: Tool) -> Self {
        Self {
            backend,
            use_sudo: false,
            program: None,
            enumerate_timeout_ms: Self::DEFAULT_ENUMERATE_TIMEOUT.as_millis() as u64,
            apply_timeout_ms: Self::DEFAULT_APPLY_TIMEOUT.as_millis() as u64,
        }
    }

    /// Enables or disables the `sudo` prefix.
    #[must_use]
    pub fn with_sudo(mut self, use_sudo: bool) -> Self {
        self.use_sudo = use_sudo;
        self
    }

    /// Overrides the executable path.
    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = Some(program.into());
        self
    }

    /// Sets the enumeration timeout.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn with_enumerate_timeout(mut self, timeout: Duration) -> Self {
        self.enumerate_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Sets the per-device apply timeout.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn with_apply_timeout(mut self, timeout: Duration) -> Self {
        self.apply_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Returns the enumeration timeout.
    #[must_use]
    pub fn enumerate_timeout(&self) -> Duration {
        Duration::from_millis(self.enumerate_timeout_ms)
    }

    /// Returns the per-device apply timeout.
    #[must_use]
    pub fn apply_timeout(&self) -> Duration {
        Duration::from_millis(self.apply_timeout_ms)
    }

    /// Returns the command that lists attached monitors.
    #[must_use]
    pub fn enumerate_invocation(&self) -> Invocation {
        self.invocation(self.backend.enumerate_args())
    }

    /// Returns the command that writes `value` to `device`.
    #[must_use]
    pub fn apply_invocation(&self, device: &Device, value: &BrightnessValue) -> Invocation {
        self.invocation(self.backend.apply_args(device, value.register_level()))
    }

    fn invocation(&self, args: Vec<String>) -> Invocation {
        let program = self
            .program
            .clone()
            .unwrap_or_else(|| self.backend.program().to_string());
        if self.use_sudo {
            Invocation::new("sudo").arg(program).args(args)
        } else {
            Invocation::new(program).args(args)
        }
    }
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self::new(Tool::default())
    }
}
