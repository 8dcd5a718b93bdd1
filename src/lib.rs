// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `ddc_brightness` - debounced brightness control for external monitors.
//!
//! The crate holds the logic behind a desktop brightness slider: turning
//! slider positions and typed text into validated values, coalescing rapid
//! changes, persisting the result to a settings store, and writing it to
//! every monitor through `ddcutil` or `ddccontrol`.
//!
//! # Components
//!
//! - [`convert`]: slider position <-> domain value
//! - [`normalize`]: raw input -> clamped, rounded [`BrightnessValue`]
//! - [`debounce`]: one pending apply at a time, committed early on demand
//! - [`device`]: device enumeration and per-device apply with timeouts
//! - [`settings`]: injected key-value store with change notification
//! - [`controller`]: the facade a panel widget talks to
//!
//! GUI toolkits are not part of the crate: an adapter implements
//! [`controller::PanelView`] and forwards [`controller::UiEvent`]s.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use ddc_brightness::controller::{BrightnessController, ControllerConfig, UiEvent};
//! use ddc_brightness::device::{TokioCommandRunner, Tool, ToolConfig};
//! use ddc_brightness::settings::MemorySettings;
//!
//! #[tokio::main]
//! async fn main() -> ddc_brightness::Result<()> {
//!     let config = ControllerConfig::percentage()
//!         .with_tool(ToolConfig::new(Tool::Ddcutil).with_sudo(true));
//!
//!     let controller = BrightnessController::new(
//!         config,
//!         TokioCommandRunner::new(),
//!         Arc::new(MemorySettings::new()),
//!     )
//!     .await?;
//!
//!     controller.handle(UiEvent::TextCommitted("60".to_string()));
//!     println!("{}", controller.view().display_text);
//!     Ok(())
//! }
//! ```

pub mod controller;
pub mod convert;
pub mod debounce;
pub mod device;
pub mod error;
pub mod event;
pub mod normalize;
pub mod notify;
pub mod settings;
pub mod subscription;
pub mod types;

pub use controller::{BrightnessController, ControllerConfig, UiEvent, ViewState};
pub use debounce::DebouncedApplier;
pub use device::{
    ApplyReport, CommandRunner, Device, DeviceApplier, TokioCommandRunner, Tool, ToolConfig,
};
pub use error::{CommandError, Error, ParseError, Result, SettingsError, ValueError};
pub use normalize::{RawInput, ValueNormalizer};
pub use settings::{MemorySettings, SettingsStore};
pub use types::{BrightnessValue, SliderPosition, ValueRange};
