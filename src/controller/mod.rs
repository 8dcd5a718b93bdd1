// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Brightness controller tying normalization, debouncing, persistence, and
//! device application together.
//!
//! A panel widget feeds [`UiEvent`]s (or calls the `on_*` methods) and
//! renders the [`ViewState`] published through [`BrightnessController::subscribe_view`].
//!
//! ```text
//! UI event -> ValueNormalizer -> DebouncedApplier -> persist + DeviceApplier
//!                  |                                         |
//!                  +------------> ViewState <----------------+
//! ```
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use ddc_brightness::controller::{BrightnessController, ControllerConfig};
//! use ddc_brightness::device::TokioCommandRunner;
//! use ddc_brightness::settings::MemorySettings;
//!
//! #[tokio::main]
//! async fn main() -> ddc_brightness::Result<()> {
//!     let settings = Arc::new(MemorySettings::new());
//!     let controller = BrightnessController::new(
//!         ControllerConfig::percentage(),
//!         TokioCommandRunner::new(),
//!         settings,
//!     )
//!     .await?;
//!
//!     let mut events = controller.subscribe();
//!
//!     // Dragging the slider is debounced...
//!     controller.on_slider_changed(0.4);
//!     controller.on_slider_changed(0.5);
//!     // ...releasing it applies immediately.
//!     controller.on_slider_drag_end(0.5);
//!
//!     while let Ok(event) = events.recv().await {
//!         if event.is_applied() {
//!             break;
//!         }
//!     }
//!     Ok(())
//! }
//! ```

mod config;
mod view;

pub use config::ControllerConfig;
pub use view::{PanelView, UiEvent, ViewState, drive_view};

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};
use tokio::sync::{broadcast, watch};

use crate::debounce::DebouncedApplier;
use crate::device::{ApplyReport, CommandRunner, Device, DeviceApplier};
use crate::error::{Error, ParseError};
use crate::event::{BrightnessEvent, EventBus, Origin};
use crate::normalize::{RawInput, ValueNormalizer};
use crate::notify::{LogNotifier, Notifier};
use crate::settings::SettingsStore;
use crate::subscription::SubscriptionId;
use crate::types::{BrightnessValue, SliderPosition};

/// Writes awaiting their change notification. Older entries are dropped
/// once the limit is reached.
const MAX_PENDING_ECHOES: usize = 16;

/// Title of failure notifications.
const NOTIFICATION_TITLE: &str = "Brightness";

/// Mutable controller state guarded by one lock.
#[derive(Debug)]
struct ControlState {
    current: BrightnessValue,
    /// Values this controller wrote and has not yet seen echoed back.
    echoes: VecDeque<f64>,
}

impl ControlState {
    fn expect_echo(&mut self, raw: f64) {
        if self.echoes.len() == MAX_PENDING_ECHOES {
            self.echoes.pop_front();
        }
        self.echoes.push_back(raw);
    }

    /// Consumes a matching expected echo. Returns `true` if one was found.
    fn take_echo(&mut self, raw: f64, normalizer: &ValueNormalizer) -> bool {
        let range = normalizer.range();
        match self.echoes.iter().position(|&e| range.approx_eq(e, raw)) {
            Some(index) => {
                self.echoes.remove(index);
                true
            }
            None => false,
        }
    }
}

struct Shared<R> {
    normalizer: ValueNormalizer,
    settings_key: String,
    settings: Arc<dyn SettingsStore>,
    applier: DeviceApplier<R>,
    devices: RwLock<Vec<Device>>,
    state: Mutex<ControlState>,
    debouncer: DebouncedApplier,
    events: EventBus,
    view: watch::Sender<ViewState>,
    notifier: RwLock<Arc<dyn Notifier>>,
    /// Newest value not yet handed to a device write.
    unwritten: Mutex<Option<BrightnessValue>>,
    /// Held for the duration of a device write.
    writing: tokio::sync::Mutex<()>,
}

impl<R: CommandRunner> Shared<R> {
    fn set_current(&self, value: BrightnessValue, origin: Origin) {
        self.state.lock().current = value;
        self.view.send_replace(ViewState::of(value, &self.normalizer));
        self.events
            .publish(BrightnessEvent::ValueChanged { value, origin });
    }

    /// Persists `value` and writes it to every device in the background.
    ///
    /// Device writes never overlap. A write requested while another is in
    /// flight waits for it and then writes the newest requested value, so
    /// the devices always end on the last value applied.
    fn apply(self: Arc<Self>, value: BrightnessValue) {
        self.persist(value);
        *self.unwritten.lock() = Some(value);

        tokio::spawn(async move {
            let _writing = self.writing.lock().await;
            let next = self.unwritten.lock().take();
            let Some(value) = next else {
                tracing::trace!("Newer value already written");
                return;
            };
            let devices = self.devices.read().clone();
            tracing::debug!(value = %value, devices = devices.len(), "Applying brightness");

            let report = self.applier.apply_all(&devices, value).await;
            self.report_failures(&report);
            self.events
                .publish(BrightnessEvent::Applied { value, report });
        });
    }

    fn persist(&self, value: BrightnessValue) {
        let range = self.normalizer.range();
        if self
            .settings
            .get(&self.settings_key)
            .is_some_and(|stored| range.approx_eq(stored, value.value()))
        {
            tracing::trace!(value = %value, "Setting already holds value");
            return;
        }
        // Record the echo before writing: stores may notify synchronously.
        self.state.lock().expect_echo(value.value());
        if let Err(e) = self.settings.set(&self.settings_key, value.value()) {
            self.state.lock().take_echo(value.value(), &self.normalizer);
            tracing::warn!(key = %self.settings_key, error = %e, "Failed to persist brightness");
        }
    }

    fn report_failures(&self, report: &ApplyReport) {
        if report.is_success() {
            return;
        }
        let failed: Vec<String> = report.failures().map(|o| o.device.to_string()).collect();
        let body = format!(
            "Could not set brightness on {} of {} displays: {}",
            report.failed(),
            report.outcomes().len(),
            failed.join(", ")
        );
        let notifier = Arc::clone(&self.notifier.read());
        notifier.notify(NOTIFICATION_TITLE, &body);
    }

    /// Handles a change notification from the settings store.
    fn on_setting_notified(&self, raw: f64) {
        if self.state.lock().take_echo(raw, &self.normalizer) {
            tracing::trace!(value = raw, "Ignoring echo of own settings write");
            return;
        }
        self.external_change(raw);
    }

    fn external_change(&self, raw: f64) -> BrightnessValue {
        let value = BrightnessValue::clamped(raw, self.normalizer.range());
        if let Some(superseded) = self.debouncer.cancel() {
            tracing::debug!(superseded = %superseded, value = %value, "External change cancelled pending apply");
        }
        tracing::debug!(value = %value, "Resyncing to external setting");
        self.set_current(value, Origin::External);
        value
    }
}

/// Keeps a brightness value, its UI state, the settings store, and the
/// attached monitors consistent.
///
/// All event methods must be called from within a Tokio runtime: they arm
/// timers and spawn device writes.
///
/// # Feedback loops
///
/// Every value the controller persists is remembered until the store
/// echoes it back; echoes are swallowed. Any other change notification for
/// the configured key is treated as an external change: the UI resyncs,
/// a pending debounced apply is cancelled, and nothing is written to the
/// devices.
pub struct BrightnessController<R: CommandRunner> {
    shared: Arc<Shared<R>>,
    subscription: SubscriptionId,
}

impl<R: CommandRunner> BrightnessController<R> {
    /// Creates a controller, enumerating devices once through `runner`.
    ///
    /// The initial value is read from `settings` (clamped into range), or
    /// the configured default when the key is unset.
    ///
    /// # Errors
    ///
    /// Returns `Error::Value` if the configuration is invalid. Enumeration
    /// failures are not errors; the controller starts with no devices.
    pub async fn new(
        config: ControllerConfig,
        runner: R,
        settings: Arc<dyn SettingsStore>,
    ) -> Result<Self, Error> {
        config.validate()?;
        let applier = DeviceApplier::new(runner, config.tool.clone());
        let devices = applier.list_devices().await;
        Self::with_devices(&config, applier, settings, devices)
    }

    /// Creates a controller for an already known device list.
    ///
    /// # Errors
    ///
    /// Returns `Error::Value` if the configuration is invalid.
    pub fn with_devices(
        config: &ControllerConfig,
        applier: DeviceApplier<R>,
        settings: Arc<dyn SettingsStore>,
        devices: Vec<Device>,
    ) -> Result<Self, Error> {
        let normalizer = config.normalizer()?;
        let settings_key = config.settings_key.clone();
        let current = settings
            .get(&settings_key)
            .map_or(normalizer.default_value(), |raw| {
                BrightnessValue::clamped(raw, normalizer.range())
            });
        let (view, _) = watch::channel(ViewState::of(current, &normalizer));
        let interval = config.debounce();

        tracing::debug!(
            key = %settings_key,
            value = %current,
            devices = devices.len(),
            "Creating brightness controller"
        );

        let shared = Arc::new_cyclic(|weak: &Weak<Shared<R>>| {
            let weak = weak.clone();
            Shared {
                normalizer,
                settings_key,
                settings: Arc::clone(&settings),
                applier,
                devices: RwLock::new(devices),
                state: Mutex::new(ControlState {
                    current,
                    echoes: VecDeque::new(),
                }),
                debouncer: DebouncedApplier::new(interval, move |value| {
                    if let Some(shared) = weak.upgrade() {
                        shared.apply(value);
                    }
                }),
                events: EventBus::new(),
                view,
                notifier: RwLock::new(Arc::new(LogNotifier)),
                unwritten: Mutex::new(None),
                writing: tokio::sync::Mutex::new(()),
            }
        });

        let weak = Arc::downgrade(&shared);
        let key = shared.settings_key.clone();
        let subscription = settings.subscribe(Arc::new(move |changed: &str, raw: f64| {
            if changed != key {
                return;
            }
            if let Some(shared) = weak.upgrade() {
                shared.on_setting_notified(raw);
            }
        }));

        Ok(Self {
            shared,
            subscription,
        })
    }

    /// Routes failure notifications to `notifier`.
    #[must_use]
    pub fn with_notifier(self, notifier: impl Notifier + 'static) -> Self {
        *self.shared.notifier.write() = Arc::new(notifier);
        self
    }

    // =========================================================================
    // UI events
    // =========================================================================

    /// Dispatches a UI event to the matching handler.
    ///
    /// Malformed text is discarded; the view is re-published unchanged so
    /// the entry can show the last good value again.
    pub fn handle(&self, event: UiEvent) {
        match event {
            UiEvent::TextCommitted(text) => {
                let _ = self.on_text_committed(&text);
            }
            UiEvent::SliderChanged(position) => {
                self.on_slider_changed(position);
            }
            UiEvent::SliderDragEnd(position) => {
                self.on_slider_drag_end(position);
            }
            UiEvent::ResetRequested => {
                self.on_reset_requested();
            }
            UiEvent::ExternalSettingChanged(raw) => {
                self.on_external_setting_changed(raw);
            }
        }
    }

    /// Applies typed text immediately.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if the text is not a finite number. Nothing is
    /// scheduled and the current value is kept.
    pub fn on_text_committed(&self, text: &str) -> Result<BrightnessValue, ParseError> {
        let value = match self.shared.normalizer.normalize(RawInput::Text(text)) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!(input = text, error = %e, "Discarding malformed brightness text");
                self.shared.view.send_modify(|_| {});
                return Err(e);
            }
        };
        self.shared.set_current(value, Origin::User);
        self.shared.debouncer.commit_now(value);
        Ok(value)
    }

    /// Schedules the value at `position`; bursts are coalesced.
    pub fn on_slider_changed(&self, position: f64) -> BrightnessValue {
        let value = self.shared.normalizer.from_slider(SliderPosition::new(position));
        self.shared.set_current(value, Origin::User);
        self.shared.debouncer.request_apply(value);
        value
    }

    /// Applies the value at `position` immediately, replacing any pending
    /// apply.
    pub fn on_slider_drag_end(&self, position: f64) -> BrightnessValue {
        let value = self.shared.normalizer.from_slider(SliderPosition::new(position));
        self.shared.set_current(value, Origin::User);
        self.shared.debouncer.commit_now(value);
        value
    }

    /// Restores and applies the default value.
    pub fn on_reset_requested(&self) -> BrightnessValue {
        let value = self.shared.normalizer.default_value();
        self.shared.set_current(value, Origin::User);
        self.shared.debouncer.commit_now(value);
        value
    }

    /// Resyncs the UI to a value changed outside this controller.
    ///
    /// Cancels any pending apply and does not write to the devices.
    pub fn on_external_setting_changed(&self, raw: f64) -> BrightnessValue {
        self.shared.external_change(raw)
    }

    // =========================================================================
    // Devices
    // =========================================================================

    /// Re-enumerates devices and returns how many were found.
    pub async fn refresh_devices(&self) -> usize {
        let devices = self.shared.applier.list_devices().await;
        let count = devices.len();
        *self.shared.devices.write() = devices;
        self.shared
            .events
            .publish(BrightnessEvent::DevicesRefreshed { count });
        count
    }

    /// Returns the devices values are applied to.
    #[must_use]
    pub fn devices(&self) -> Vec<Device> {
        self.shared.devices.read().clone()
    }

    // =========================================================================
    // State
    // =========================================================================

    /// Returns the current value.
    #[must_use]
    pub fn current(&self) -> BrightnessValue {
        self.shared.state.lock().current
    }

    /// Returns the current view state.
    #[must_use]
    pub fn view(&self) -> ViewState {
        self.shared.view.borrow().clone()
    }

    /// Returns a receiver that observes every view change.
    #[must_use]
    pub fn subscribe_view(&self) -> watch::Receiver<ViewState> {
        self.shared.view.subscribe()
    }

    /// Subscribes to controller events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<BrightnessEvent> {
        self.shared.events.subscribe()
    }

    /// Returns `true` while a debounced apply is waiting.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.shared.debouncer.is_pending()
    }

    /// Returns the normalizer.
    #[must_use]
    pub fn normalizer(&self) -> &ValueNormalizer {
        &self.shared.normalizer
    }

    /// Returns the observed settings key.
    #[must_use]
    pub fn settings_key(&self) -> &str {
        &self.shared.settings_key
    }
}

impl<R: CommandRunner> Drop for BrightnessController<R> {
    fn drop(&mut self) {
        self.shared.settings.unsubscribe(self.subscription);
        self.shared.debouncer.cancel();
    }
}

impl<R: CommandRunner> fmt::Debug for BrightnessController<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BrightnessController")
            .field("settings_key", &self.shared.settings_key)
            .field("current", &self.current())
            .field("devices", &self.shared.devices.read().len())
            .field("pending", &self.is_pending())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::device::{CommandOutput, Invocation, ToolConfig};
    use crate::error::CommandError;
    use crate::settings::{BRIGHTNESS_KEY, MemorySettings};

    #[derive(Default)]
    struct NullRunner;

    impl CommandRunner for NullRunner {
        async fn run(&self, _invocation: Invocation) -> Result<CommandOutput, CommandError> {
            Ok(CommandOutput::success(""))
        }
    }

    fn controller(settings: Arc<MemorySettings>) -> BrightnessController<NullRunner> {
        BrightnessController::with_devices(
            &ControllerConfig::percentage(),
            DeviceApplier::new(NullRunner, ToolConfig::default()),
            settings,
            vec![Device::new("1")],
        )
        .unwrap()
    }

    #[tokio::test]
    async fn starts_from_stored_value() {
        let settings = Arc::new(MemorySettings::new().with_value(BRIGHTNESS_KEY, 40.0));
        let c = controller(settings);
        assert_eq!(c.current().value(), 40.0);
        assert_eq!(c.view().display_text, "40");
        assert!(c.view().reset_enabled);
    }

    #[tokio::test]
    async fn starts_from_default_and_clamps_stored_value() {
        let c = controller(Arc::new(MemorySettings::new()));
        assert_eq!(c.current().value(), 75.0);
        assert!(!c.view().reset_enabled);

        let settings = Arc::new(MemorySettings::new().with_value(BRIGHTNESS_KEY, 180.0));
        assert_eq!(controller(settings).current().value(), 100.0);
    }

    #[tokio::test(start_paused = true)]
    async fn own_write_is_not_treated_as_external() {
        let settings = Arc::new(MemorySettings::new());
        let c = controller(Arc::clone(&settings));
        let mut events = c.subscribe();

        c.on_slider_drag_end(0.3);
        assert_eq!(settings.get(BRIGHTNESS_KEY), Some(30.0));

        tokio::time::sleep(Duration::from_millis(10)).await;
        let mut origins = Vec::new();
        while let Ok(event) = events.try_recv() {
            if let BrightnessEvent::ValueChanged { origin, .. } = event {
                origins.push(origin);
            }
        }
        assert_eq!(origins, vec![Origin::User]);
    }

    #[tokio::test(start_paused = true)]
    async fn foreign_write_resyncs_without_apply() {
        let settings = Arc::new(MemorySettings::new());
        let c = controller(Arc::clone(&settings));
        let mut events = c.subscribe();

        c.on_slider_changed(0.1);
        assert!(c.is_pending());

        settings.set(BRIGHTNESS_KEY, 55.0).unwrap();
        assert!(!c.is_pending());
        assert_eq!(c.current().value(), 55.0);
        assert_eq!(c.view().display_text, "55");

        tokio::time::sleep(Duration::from_secs(2)).await;
        while let Ok(event) = events.try_recv() {
            assert!(!event.is_applied(), "unexpected {event:?}");
        }
    }

    #[tokio::test]
    async fn other_keys_are_ignored() {
        let settings = Arc::new(MemorySettings::new());
        let c = controller(Arc::clone(&settings));
        settings.set("contrast", 10.0).unwrap();
        assert_eq!(c.current().value(), 75.0);
    }

    #[tokio::test]
    async fn drop_unsubscribes() {
        let settings = Arc::new(MemorySettings::new());
        let c = controller(Arc::clone(&settings));
        assert_eq!(settings.subscriber_count(), 1);
        drop(c);
        assert_eq!(settings.subscriber_count(), 0);
    }

    #[test]
    fn echo_queue_is_bounded() {
        let normalizer = ValueNormalizer::new(crate::types::ValueRange::PERCENT, 75.0).unwrap();
        let mut state = ControlState {
            current: normalizer.default_value(),
            echoes: VecDeque::new(),
        };
        for raw in 0..40 {
            state.expect_echo(f64::from(raw));
        }
        assert_eq!(state.echoes.len(), MAX_PENDING_ECHOES);
        assert!(!state.take_echo(0.0, &normalizer));
        assert!(state.take_echo(39.0, &normalizer));
    }
}
