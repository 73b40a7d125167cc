//! Event payloads delivered to the page controller.
//!
//! # Design
//! - Carry only the fields the handlers read, so browser events and scripted
//!   scenario steps map onto the same types.
//! - Timer work is named by [`PageTask`] rather than boxed closures so a
//!   virtual clock can queue and replay it.

use serde::{Deserialize, Serialize};

/// Mouse button reported with a click, following the DOM `MouseEvent.button` numbering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerButton {
    /// Main button, usually the left one.
    #[default]
    Primary,
    /// Wheel or middle button.
    Auxiliary,
    /// Secondary button, usually the right one.
    Secondary,
    /// Any other button (back/forward and beyond).
    Other,
}

impl PointerButton {
    /// Map the raw DOM button code.
    #[must_use]
    pub const fn from_code(code: i16) -> Self {
        match code {
            0 => Self::Primary,
            1 => Self::Auxiliary,
            2 => Self::Secondary,
            _ => Self::Other,
        }
    }
}

/// Click details relevant to navigation-aware handlers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClickEvent {
    /// Button that triggered the click.
    pub button: PointerButton,
    /// Whether the control key was held.
    pub ctrl_key: bool,
    /// Whether the meta (command/windows) key was held.
    pub meta_key: bool,
}

impl ClickEvent {
    /// Plain primary-button click with no modifiers.
    #[must_use]
    pub const fn primary() -> Self {
        Self {
            button: PointerButton::Primary,
            ctrl_key: false,
            meta_key: false,
        }
    }

    /// True when the browser will open the target somewhere other than the current tab.
    #[must_use]
    pub const fn opens_elsewhere(&self) -> bool {
        self.ctrl_key || self.meta_key || !matches!(self.button, PointerButton::Primary)
    }
}

/// Payload of the window `pageshow` event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageShowEvent {
    /// Set when the page was restored from the back/forward cache.
    pub persisted: bool,
}

/// Deferred work queued on the scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageTask {
    /// Fade out the flash message, if one is on the page.
    FadeFlash,
    /// Detach the flash message faded by [`PageTask::FadeFlash`].
    RemoveFlash,
}
