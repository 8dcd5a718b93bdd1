// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! What a panel widget draws, and the events it feeds back.

use tokio::sync::watch;

use crate::normalize::ValueNormalizer;
use crate::types::{BrightnessValue, SliderPosition};

/// Everything a panel widget needs to draw the current value.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    /// Slider knob position.
    pub position: SliderPosition,
    /// Text for the entry, formatted at the range's precision.
    pub display_text: String,
    /// Whether the reset action differs from the current value.
    pub reset_enabled: bool,
}

impl ViewState {
    pub(crate) fn of(value: BrightnessValue, normalizer: &ValueNormalizer) -> Self {
        Self {
            position: value.position(),
            display_text: value.to_string(),
            reset_enabled: !normalizer.is_default(value.value()),
        }
    }
}

/// Input from a panel widget, already stripped of toolkit types.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// The entry was activated or lost focus with this text.
    TextCommitted(String),
    /// The slider moved to this position.
    SliderChanged(f64),
    /// The user released the slider at this position.
    SliderDragEnd(f64),
    /// The reset menu item was activated.
    ResetRequested,
    /// The observed setting changed outside this controller.
    ExternalSettingChanged(f64),
}

/// A toolkit widget that renders [`ViewState`].
///
/// Adapters implement this and translate their toolkit's signals into
/// [`UiEvent`]s for [`BrightnessController::handle`](super::BrightnessController::handle).
pub trait PanelView: Send + Sync {
    /// Redraws the slider, entry, and reset item.
    fn render(&self, state: &ViewState);
}

/// Renders the current state, then every change until the controller is
/// dropped.
pub async fn drive_view<V: PanelView + ?Sized>(view: &V, mut states: watch::Receiver<ViewState>) {
    loop {
        // Clone first so a render that calls back into the controller
        // never runs under the channel's read lock.
        let state = states.borrow_and_update().clone();
        view.render(&state);
        if states.changed().await.is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ValueRange;

    #[test]
    fn view_of_default_disables_reset() {
        let normalizer = ValueNormalizer::new(ValueRange::PERCENT, 75.0).unwrap();
        let view = ViewState::of(normalizer.default_value(), &normalizer);
        assert_eq!(view.display_text, "75");
        assert_eq!(view.position, SliderPosition::new(0.75));
        assert!(!view.reset_enabled);
    }

    #[test]
    fn view_of_other_value_enables_reset() {
        let normalizer = ValueNormalizer::new(ValueRange::TEXT_SCALING, 1.0).unwrap();
        let value = BrightnessValue::new(1.25, ValueRange::TEXT_SCALING).unwrap();
        let view = ViewState::of(value, &normalizer);
        assert_eq!(view.display_text, "1.25");
        assert!(view.reset_enabled);
    }
}
