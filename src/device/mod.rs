// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Monitor enumeration and brightness application through external tools.
//!
//! [`DeviceApplier`] wraps a [`CommandRunner`] and a [`ToolConfig`]:
//!
//! - [`DeviceApplier::list_devices`] runs the tool's enumeration command and
//!   parses its output. Failures degrade to an empty device list.
//! - [`DeviceApplier::apply_all`] writes one value to every device, one task
//!   per device, each bounded by the apply timeout. A failing device never
//!   prevents the others from being written.
//!
//! # Examples
//!
//! ```no_run
//! use ddc_brightness::device::{DeviceApplier, TokioCommandRunner, Tool, ToolConfig};
//! use ddc_brightness::types::{BrightnessValue, ValueRange};
//!
//! # async fn example() -> ddc_brightness::Result<()> {
//! let applier = DeviceApplier::new(TokioCommandRunner::new(), ToolConfig::new(Tool::Ddcutil));
//!
//! let devices = applier.list_devices().await;
//! let value = BrightnessValue::new(60.0, ValueRange::PERCENT)?;
//! let report = applier.apply_all(&devices, value).await;
//!
//! for outcome in report.failures() {
//!     eprintln!("{}: {:?}", outcome.device, outcome.result);
//! }
//! # Ok(())
//! # }
//! ```

mod discovery;
mod runner;
mod tool;

pub use discovery::{parse_ddccontrol_probe, parse_ddcutil_detect, parse_devices};
pub use runner::{CommandOutput, CommandRunner, Invocation, TokioCommandRunner};
pub use tool::{BRIGHTNESS_VCP_CODE, Tool, ToolConfig};

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;

use crate::error::CommandError;
use crate::types::BrightnessValue;

/// A monitor reachable through the configured tool.
///
/// The identifier is opaque: a display number for `ddcutil`, a device
/// handle for `ddccontrol`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Device {
    id: String,
    label: Option<String>,
}

impl Device {
    /// Creates a device with the given identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: None,
        }
    }

    /// Sets a human-readable label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub(crate) fn set_label(&mut self, label: &str) {
        self.label = Some(label.to_string());
    }

    /// Returns the identifier passed to the tool.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the monitor label reported during enumeration.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            Some(label) => write!(f, "{} ({label})", self.id),
            None => f.write_str(&self.id),
        }
    }
}

/// Result of applying a value to one device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceOutcome {
    /// The device the command targeted.
    pub device: Device,
    /// `Ok` if the tool exited successfully.
    pub result: Result<(), CommandError>,
}

impl DeviceOutcome {
    /// Returns `true` if the apply succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Per-device outcomes of one apply, in device order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ApplyReport {
    outcomes: Vec<DeviceOutcome>,
}

impl ApplyReport {
    /// Returns every outcome.
    #[must_use]
    pub fn outcomes(&self) -> &[DeviceOutcome] {
        &self.outcomes
    }

    /// Returns the outcomes that failed.
    pub fn failures(&self) -> impl Iterator<Item = &DeviceOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    /// Returns the number of devices written successfully.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    /// Returns the number of devices that failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    /// Returns `true` if no device failed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    /// Returns `true` if no device was targeted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// Enumerates monitors and writes brightness values to them.
#[derive(Debug)]
pub struct DeviceApplier<R> {
    runner: Arc<R>,
    config: ToolConfig,
}

impl<R: CommandRunner> DeviceApplier<R> {
    /// Creates an applier driving `config.backend` through `runner`.
    #[must_use]
    pub fn new(runner: R, config: ToolConfig) -> Self {
        Self::with_shared_runner(Arc::new(runner), config)
    }

    /// Creates an applier sharing an existing runner.
    #[must_use]
    pub fn with_shared_runner(runner: Arc<R>, config: ToolConfig) -> Self {
        Self { runner, config }
    }

    /// Returns the tool configuration.
    #[must_use]
    pub fn config(&self) -> &ToolConfig {
        &self.config
    }

    /// Returns the underlying runner.
    #[must_use]
    pub fn runner(&self) -> &Arc<R> {
        &self.runner
    }

    /// Lists attached monitors.
    ///
    /// Any failure (spawn error, non-zero exit, timeout) is logged and
    /// yields an empty list.
    pub async fn list_devices(&self) -> Vec<Device> {
        match self.try_list_devices().await {
            Ok(devices) => devices,
            Err(e) => {
                tracing::warn!(error = %e, "Device enumeration failed, assuming no devices");
                Vec::new()
            }
        }
    }

    /// Lists attached monitors, reporting enumeration failures.
    ///
    /// # Errors
    ///
    /// Returns `CommandError` if the enumeration command cannot be spawned,
    /// exits unsuccessfully, or exceeds the enumeration timeout.
    pub async fn try_list_devices(&self) -> Result<Vec<Device>, CommandError> {
        let invocation = self.config.enumerate_invocation();
        let output = run_bounded(
            self.runner.as_ref(),
            invocation,
            self.config.enumerate_timeout(),
        )
        .await?;
        let devices = parse_devices(self.config.backend, &output.stdout);
        tracing::debug!(count = devices.len(), tool = %self.config.backend, "Enumerated devices");
        Ok(devices)
    }

    /// Writes `value` to a single device.
    ///
    /// # Errors
    ///
    /// Returns `CommandError` if the command cannot be spawned, exits
    /// unsuccessfully, or exceeds the apply timeout.
    pub async fn apply(&self, device: &Device, value: BrightnessValue) -> Result<(), CommandError> {
        let invocation = self.config.apply_invocation(device, &value);
        run_bounded(self.runner.as_ref(), invocation, self.config.apply_timeout()).await?;
        Ok(())
    }

    /// Writes `value` to every device concurrently.
    ///
    /// Each device gets its own task and timeout; the report lists outcomes
    /// in the order of `devices`.
    pub async fn apply_all(&self, devices: &[Device], value: BrightnessValue) -> ApplyReport {
        let timeout = self.config.apply_timeout();
        let mut tasks = JoinSet::new();

        for (index, device) in devices.iter().enumerate() {
            let runner = Arc::clone(&self.runner);
            let invocation = self.config.apply_invocation(device, &value);
            tasks.spawn(async move {
                let result = run_bounded(runner.as_ref(), invocation, timeout)
                    .await
                    .map(|_| ());
                (index, result)
            });
        }

        let mut results: Vec<Option<Result<(), CommandError>>> = vec![None; devices.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => results[index] = Some(result),
                Err(e) => tracing::warn!(error = %e, "Apply task did not complete"),
            }
        }

        let outcomes = devices
            .iter()
            .zip(results)
            .map(|(device, result)| {
                let result = result.unwrap_or_else(|| {
                    Err(CommandError::Spawn {
                        program: self.config.backend.program().to_string(),
                        message: "apply task aborted".to_string(),
                    })
                });
                match &result {
                    Ok(()) => tracing::info!(device = %device, value = %value, "Applied brightness"),
                    Err(e) => tracing::warn!(device = %device, error = %e, "Failed to apply brightness"),
                }
                DeviceOutcome {
                    device: device.clone(),
                    result,
                }
            })
            .collect();

        ApplyReport { outcomes }
    }
}

/// Runs `invocation` with a time budget and maps a non-zero exit to an error.
async fn run_bounded<R: CommandRunner>(
    runner: &R,
    invocation: Invocation,
    timeout: Duration,
) -> Result<CommandOutput, CommandError> {
    let program = invocation.program().to_string();
    match tokio::time::timeout(timeout, runner.run(invocation)).await {
        Ok(output) => output?.into_result(&program),
        Err(_) => Err(CommandError::Timeout {
            program,
            millis: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ValueRange;
    use parking_lot::Mutex;

    /// Replies from a script keyed by the last argument of the invocation.
    #[derive(Default)]
    struct ScriptedRunner {
        calls: Mutex<Vec<Invocation>>,
        enumerate: Option<CommandOutput>,
        failing: Vec<String>,
        hanging: Vec<String>,
    }

    impl CommandRunner for ScriptedRunner {
        async fn run(&self, invocation: Invocation) -> Result<CommandOutput, CommandError> {
            self.calls.lock().push(invocation.clone());
            let args = invocation.arguments();
            if args.first().is_some_and(|a| a == "detect") {
                return self.enumerate.clone().ok_or_else(|| CommandError::Spawn {
                    program: invocation.program().to_string(),
                    message: "not found".to_string(),
                });
            }
            let device = args.get(1).cloned().unwrap_or_default();
            if self.hanging.contains(&device) {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
            if self.failing.contains(&device) {
                return Ok(CommandOutput::failure(1, "DDC communication failed"));
            }
            Ok(CommandOutput::success(""))
        }
    }

    fn percent(raw: f64) -> BrightnessValue {
        BrightnessValue::new(raw, ValueRange::PERCENT).unwrap()
    }

    fn devices(ids: &[&str]) -> Vec<Device> {
        ids.iter().map(|id| Device::new(*id)).collect()
    }

    #[tokio::test]
    async fn list_devices_parses_output() {
        let runner = ScriptedRunner {
            enumerate: Some(CommandOutput::success("Display 1\n\nDisplay 2\n")),
            ..Default::default()
        };
        let applier = DeviceApplier::new(runner, ToolConfig::new(Tool::Ddcutil));
        let listed = applier.list_devices().await;
        assert_eq!(listed, devices(&["1", "2"]));
    }

    #[tokio::test]
    async fn list_devices_degrades_on_spawn_failure() {
        let applier = DeviceApplier::new(ScriptedRunner::default(), ToolConfig::default());
        assert!(applier.list_devices().await.is_empty());
        assert!(matches!(
            applier.try_list_devices().await,
            Err(CommandError::Spawn { .. })
        ));
    }

    #[tokio::test]
    async fn list_devices_degrades_on_failed_exit() {
        let runner = ScriptedRunner {
            enumerate: Some(CommandOutput::failure(1, "permission denied")),
            ..Default::default()
        };
        let applier = DeviceApplier::new(runner, ToolConfig::default());
        assert!(applier.list_devices().await.is_empty());
    }

    #[tokio::test]
    async fn failing_device_does_not_block_others() {
        let runner = ScriptedRunner {
            failing: vec!["2".to_string()],
            ..Default::default()
        };
        let applier = DeviceApplier::new(runner, ToolConfig::default());
        let report = applier
            .apply_all(&devices(&["1", "2", "3"]), percent(50.0))
            .await;

        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed(), 1);
        assert!(!report.is_success());
        let failed: Vec<_> = report.failures().map(|o| o.device.id()).collect();
        assert_eq!(failed, vec!["2"]);

        let mut targeted: Vec<String> = applier
            .runner()
            .calls
            .lock()
            .iter()
            .map(|inv| inv.arguments()[1].clone())
            .collect();
        targeted.sort();
        assert_eq!(targeted, vec!["1", "2", "3"]);
    }

    #[tokio::test(start_paused = true)]
    async fn hanging_device_times_out() {
        let runner = ScriptedRunner {
            hanging: vec!["1".to_string()],
            ..Default::default()
        };
        let config = ToolConfig::default().with_apply_timeout(Duration::from_millis(200));
        let applier = DeviceApplier::new(runner, config);

        let report = applier.apply_all(&devices(&["1", "2"]), percent(10.0)).await;

        assert_eq!(
            report.outcomes()[0].result,
            Err(CommandError::Timeout {
                program: "ddcutil".to_string(),
                millis: 200
            })
        );
        assert!(report.outcomes()[1].is_success());
    }

    #[tokio::test]
    async fn apply_all_with_no_devices_is_empty() {
        let applier = DeviceApplier::new(ScriptedRunner::default(), ToolConfig::default());
        let report = applier.apply_all(&[], percent(10.0)).await;
        assert!(report.is_empty());
        assert!(report.is_success());
    }

    #[tokio::test]
    async fn apply_single_device() {
        let applier = DeviceApplier::new(ScriptedRunner::default(), ToolConfig::default());
        applier.apply(&Device::new("1"), percent(75.0)).await.unwrap();
        let calls = applier.runner().calls.lock();
        assert_eq!(calls[0].to_string(), "ddcutil --display 1 setvcp 0x10 75");
    }

    #[test]
    fn device_display() {
        assert_eq!(Device::new("1").to_string(), "1");
        assert_eq!(
            Device::new("1").with_label("Dell").to_string(),
            "1 (Dell)"
        );
    }
}
