// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parsers for the device listings printed by monitor-control tools.
//!
//! Both tools print human-oriented text; the parsers only rely on a few
//! line markers and ignore everything else.

use std::sync::LazyLock;

use regex::Regex;

use super::{Device, Tool};

/// `Display 1` block header of `ddcutil detect --terse`.
static DDCUTIL_DISPLAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Display\s+(\d+)\s*$").expect("static regex is valid")
});

/// Any other unindented line ends the current block (e.g. `Invalid display`).
static DDCUTIL_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\S").expect("static regex is valid"));

static DDCUTIL_MONITOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s+Monitor:\s*(.+?)\s*$").expect("static regex is valid")
});

/// ` - Device: dev:/dev/i2c-4` line of `ddccontrol -p`.
static DDCCONTROL_DEVICE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*-?\s*device:\s*(\S+)").expect("static regex is valid")
});

static DDCCONTROL_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*Monitor Name:\s*(.+?)\s*$").expect("static regex is valid")
});

/// Parses the enumeration output of `tool`.
#[must_use]
pub fn parse_devices(tool: Tool, output: &str) -> Vec<Device> {
    match tool {
        Tool::Ddcutil => parse_ddcutil_detect(output),
        Tool::Ddccontrol => parse_ddccontrol_probe(output),
    }
}

/// Parses `ddcutil detect --terse` into one device per valid display.
///
/// # Examples
///
/// ```
/// use ddc_brightness::device::parse_ddcutil_detect;
///
/// let out = "Display 1\n   I2C bus:  /dev/i2c-4\n   Monitor:  DEL:DELL U2415:ABC\n";
/// let devices = parse_ddcutil_detect(out);
/// assert_eq!(devices.len(), 1);
/// assert_eq!(devices[0].id(), "1");
/// assert_eq!(devices[0].label(), Some("DEL:DELL U2415:ABC"));
/// ```
#[must_use]
pub fn parse_ddcutil_detect(output: &str) -> Vec<Device> {
    let mut devices = Vec::new();
    let mut current: Option<Device> = None;

    for line in output.lines() {
        if let Some(caps) = DDCUTIL_DISPLAY.captures(line) {
            devices.extend(current.take());
            current = Some(Device::new(&caps[1]));
            continue;
        }
        if DDCUTIL_BLOCK.is_match(line) {
            devices.extend(current.take());
            continue;
        }
        if let (Some(device), Some(caps)) = (current.as_mut(), DDCUTIL_MONITOR.captures(line)) {
            device.set_label(&caps[1]);
        }
    }
    devices.extend(current);
    devices
}

/// Parses `ddccontrol -p` into one device per `Device:` line.
///
/// # Examples
///
/// ```
/// use ddc_brightness::device::parse_ddccontrol_probe;
///
/// let out = "Detected monitors :\n - Device: dev:/dev/i2c-4\n   Monitor Name: Dell U2415\n";
/// let devices = parse_ddccontrol_probe(out);
/// assert_eq!(devices[0].id(), "dev:/dev/i2c-4");
/// assert_eq!(devices[0].label(), Some("Dell U2415"));
/// ```
#[must_use]
pub fn parse_ddccontrol_probe(output: &str) -> Vec<Device> {
    let mut devices: Vec<Device> = Vec::new();

    for line in output.lines() {
        if let Some(caps) = DDCCONTROL_DEVICE.captures(line) {
            let id = &caps[1];
            if !devices.iter().any(|d| d.id() == id) {
                devices.push(Device::new(id));
            }
            continue;
        }
        if let (Some(device), Some(caps)) = (devices.last_mut(), DDCCONTROL_NAME.captures(line)) {
            if device.label().is_none() {
                device.set_label(&caps[1]);
            }
        }
    }
    devices
}
