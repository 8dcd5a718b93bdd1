// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Command-line front end: list monitors or set their brightness.
//!
//! ```text
//! ddc-brightness [--tool ddcutil|ddccontrol] [--sudo] [--timeout MS] [--list] [VALUE]
//! ```
//!
//! Logging is controlled by `RUST_LOG` (default `warn`).

use std::process::ExitCode;
use std::time::Duration;

use ddc_brightness::device::{ApplyReport, DeviceApplier, TokioCommandRunner, Tool, ToolConfig};
use ddc_brightness::normalize::{RawInput, ValueNormalizer};
use ddc_brightness::types::{BrightnessValue, ValueRange};
use tracing_subscriber::EnvFilter;

const HELP: &str = "\
Set external monitor brightness over DDC/CI

USAGE:
  ddc-brightness [OPTIONS] [VALUE]

ARGS:
  VALUE               Brightness percentage (0-100), applied to every monitor

OPTIONS:
  --tool NAME         ddcutil (default) or ddccontrol
  --sudo              Run the tool through sudo
  --timeout MS        Per-command timeout in milliseconds (default 5000)
  --list              List detected monitors
  -h, --help          Print this help
";

/// Some monitor could not be listed or written.
const EXIT_FAILURE: u8 = 1;
/// Bad arguments or an unparsable value.
const EXIT_USAGE: u8 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Args {
    tool: Tool,
    sudo: bool,
    timeout: Option<u64>,
    list: bool,
    value: Option<String>,
}

impl Args {
    fn tool_config(&self) -> ToolConfig {
        let config = ToolConfig::new(self.tool).with_sudo(self.sudo);
        match self.timeout {
            Some(ms) => {
                let timeout = Duration::from_millis(ms);
                config
                    .with_enumerate_timeout(timeout)
                    .with_apply_timeout(timeout)
            }
            None => config,
        }
    }

    /// Devices are printed for `--list` and when no value is given.
    fn lists_devices(&self) -> bool {
        self.list || self.value.is_none()
    }
}

/// Returns `None` when help was requested.
fn parse_args(mut pargs: pico_args::Arguments) -> Result<Option<Args>, pico_args::Error> {
    if pargs.contains(["-h", "--help"]) {
        return Ok(None);
    }
    let args = Args {
        tool: pargs.opt_value_from_str("--tool")?.unwrap_or_default(),
        sudo: pargs.contains("--sudo"),
        timeout: pargs.opt_value_from_str("--timeout")?,
        list: pargs.contains("--list"),
        value: pargs.opt_free_from_str()?,
    };
    let rest = pargs.finish();
    if !rest.is_empty() {
        tracing::warn!(?rest, "Ignoring unexpected arguments");
    }
    Ok(Some(args))
}

/// Parses a percentage, clamping it into 0-100.
fn parse_level(text: &str) -> ddc_brightness::Result<BrightnessValue> {
    let range = ValueRange::PERCENT;
    let normalizer = ValueNormalizer::new(range, range.max())?;
    Ok(normalizer.normalize(RawInput::Text(text))?)
}

fn exit_status(report: &ApplyReport) -> u8 {
    if report.is_success() { 0 } else { EXIT_FAILURE }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    let args = match parse_args(pico_args::Arguments::from_env()) {
        Ok(Some(args)) => args,
        Ok(None) => {
            print!("{HELP}");
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("error: {e}\n\n{HELP}");
            return ExitCode::from(EXIT_USAGE);
        }
    };

    let value = match args.value.as_deref().map(parse_level).transpose() {
        Ok(value) => value,
        Err(e) => {
            eprintln!("error: invalid brightness: {e}");
            return ExitCode::from(EXIT_USAGE);
        }
    };

    let applier = DeviceApplier::new(TokioCommandRunner::new(), args.tool_config());
    let devices = match applier.try_list_devices().await {
        Ok(devices) => devices,
        Err(e) => {
            eprintln!("error: could not list monitors: {e}");
            return ExitCode::from(EXIT_FAILURE);
        }
    };

    if args.lists_devices() {
        if devices.is_empty() {
            println!("No monitors detected");
        }
        for device in &devices {
            println!("{device}");
        }
    }

    let Some(value) = value else {
        return ExitCode::SUCCESS;
    };

    let report = applier.apply_all(&devices, value).await;
    for outcome in report.outcomes() {
        match &outcome.result {
            Ok(()) => println!("{}: {value}", outcome.device),
            Err(e) => eprintln!("{}: {e}", outcome.device),
        }
    }
    ExitCode::from(exit_status(&report))
}

#[cfg(test)]
mod tests {
    use std::ffi::OsString;

    use ddc_brightness::device::{CommandOutput, CommandRunner, Device, Invocation};
    use ddc_brightness::error::CommandError;

    use super::*;

    fn args(list: &[&str]) -> Result<Option<Args>, pico_args::Error> {
        parse_args(pico_args::Arguments::from_vec(
            list.iter().map(|arg| OsString::from(*arg)).collect(),
        ))
    }

    #[test]
    fn defaults_list_devices() {
        let parsed = args(&[]).unwrap().unwrap();
        assert_eq!(
            parsed,
            Args {
                tool: Tool::Ddcutil,
                sudo: false,
                timeout: None,
                list: false,
                value: None,
            }
        );
        assert!(parsed.lists_devices());
        assert_eq!(parsed.tool_config(), ToolConfig::default());
    }

    #[test]
    fn options_and_value() {
        let parsed = args(&["--tool", "ddccontrol", "--sudo", "--timeout", "250", "40"])
            .unwrap()
            .unwrap();
        assert_eq!(parsed.tool, Tool::Ddccontrol);
        assert_eq!(parsed.value.as_deref(), Some("40"));
        assert!(!parsed.lists_devices());

        let config = parsed.tool_config();
        assert!(config.use_sudo);
        assert_eq!(config.apply_timeout(), Duration::from_millis(250));
        assert_eq!(config.enumerate_timeout(), Duration::from_millis(250));
    }

    #[test]
    fn list_with_value_prints_and_applies() {
        let parsed = args(&["--list", "70"]).unwrap().unwrap();
        assert!(parsed.lists_devices());
        assert_eq!(parsed.value.as_deref(), Some("70"));
    }

    #[test]
    fn help_short_circuits() {
        assert!(args(&["--tool", "ddccontrol", "-h"]).unwrap().is_none());
        assert!(args(&["--help"]).unwrap().is_none());
    }

    #[test]
    fn bad_option_values_are_errors() {
        assert!(args(&["--tool", "xrandr"]).is_err());
        assert!(args(&["--timeout", "soon"]).is_err());
    }

    #[test]
    fn level_is_clamped_percentage() {
        assert_eq!(parse_level("150").unwrap().value(), 100.0);
        assert_eq!(parse_level(" 42.4 ").unwrap().value(), 42.0);
        assert!(parse_level("bright").is_err());
        assert!(parse_level("").is_err());
    }

    struct FailingOn(&'static str);

    impl CommandRunner for FailingOn {
        async fn run(&self, invocation: Invocation) -> Result<CommandOutput, CommandError> {
            if invocation.arguments().iter().any(|a| a == self.0) {
                Ok(CommandOutput::failure(1, "DDC communication failed"))
            } else {
                Ok(CommandOutput::success(""))
            }
        }
    }

    #[tokio::test]
    async fn exit_status_reflects_device_failures() {
        assert_eq!(exit_status(&ApplyReport::default()), 0);

        let devices = [Device::new("1"), Device::new("2")];
        let value = parse_level("60").unwrap();

        let all_ok = DeviceApplier::new(FailingOn("9"), ToolConfig::default())
            .apply_all(&devices, value)
            .await;
        assert_eq!(exit_status(&all_ok), 0);

        let one_failed = DeviceApplier::new(FailingOn("2"), ToolConfig::default())
            .apply_all(&devices, value)
            .await;
        assert_eq!(exit_status(&one_failed), EXIT_FAILURE);
    }
}
