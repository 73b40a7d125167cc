//! Page interaction configuration.
//!
//! # Design
//! - Defaults reproduce the markup contract served by the site templates.
//! - Every field can be overridden from JSON so templates that rename a class
//!   do not need a rebuild.
//! - Validation rejects values that would make a behavior silently match nothing.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Selector for the server-rendered flash message.
pub const FLASH_SELECTOR: &str = ".flash-message";
/// Selector for mood buttons.
pub const MOOD_SELECTOR: &str = ".mood-btn";
/// Selector for anchors that navigate to a playlist.
pub const PLAYLIST_LINK_SELECTOR: &str = "a[href*='playlist']";
/// Identifier of the optional theme toggle control.
pub const THEME_TOGGLE_ID: &str = "theme-toggle";
/// Marker added to the body once the document is interactive.
pub const FADE_IN_CLASS: &str = "fade-in";
/// Marker carried by the selected mood button.
pub const SELECTED_MOOD_CLASS: &str = "active-mood";
/// Marker added to the body while the dark theme is active.
pub const DARK_MODE_CLASS: &str = "dark-mode";
/// Identifier of the loading indicator.
pub const LOADER_ID: &str = "loading";
/// Class of the spinner nested in the loading indicator.
pub const SPINNER_CLASS: &str = "loading-spinner";
/// Text shown under the spinner.
pub const LOADER_MESSAGE: &str = "Fetching your playlist...";
/// Storage key holding the theme preference.
pub const THEME_STORAGE_KEY: &str = "theme";
/// Delay before the flash message starts fading.
pub const FLASH_DELAY_MS: u32 = 3_000;
/// Delay between the fade and the removal of the flash message.
pub const FLASH_FADE_MS: u32 = 500;

/// Selectors, markers, and timings used by the page controller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    /// Selector of the flash message to dismiss.
    pub flash_selector: String,
    /// Selector of the mutually exclusive mood buttons.
    pub mood_selector: String,
    /// Selector of playlist navigation links.
    pub playlist_link_selector: String,
    /// Identifier of the theme toggle control.
    pub theme_toggle_id: String,
    /// Class applied to the body when the page fades in.
    pub fade_in_class: String,
    /// Class marking the selected mood button.
    pub selected_mood_class: String,
    /// Class applied to the body in dark mode.
    pub dark_mode_class: String,
    /// Identifier given to the loading indicator.
    pub loader_id: String,
    /// Class of the spinner inside the loading indicator.
    pub spinner_class: String,
    /// Message rendered inside the loading indicator.
    pub loader_message: String,
    /// Storage key for the theme preference.
    pub theme_storage_key: String,
    /// Milliseconds after activation before the flash message fades.
    pub flash_delay_ms: u32,
    /// Milliseconds between fading and removing the flash message.
    pub flash_fade_ms: u32,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            flash_selector: FLASH_SELECTOR.to_string(),
            mood_selector: MOOD_SELECTOR.to_string(),
            playlist_link_selector: PLAYLIST_LINK_SELECTOR.to_string(),
            theme_toggle_id: THEME_TOGGLE_ID.to_string(),
            fade_in_class: FADE_IN_CLASS.to_string(),
            selected_mood_class: SELECTED_MOOD_CLASS.to_string(),
            dark_mode_class: DARK_MODE_CLASS.to_string(),
            loader_id: LOADER_ID.to_string(),
            spinner_class: SPINNER_CLASS.to_string(),
            loader_message: LOADER_MESSAGE.to_string(),
            theme_storage_key: THEME_STORAGE_KEY.to_string(),
            flash_delay_ms: FLASH_DELAY_MS,
            flash_fade_ms: FLASH_FADE_MS,
        }
    }
}

impl PageConfig {
    /// Decode a JSON override and validate it.
    ///
    /// Fields missing from the payload keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and the validation
    /// errors documented on [`PageConfig::validate`].
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(raw).map_err(|source| ConfigError::Parse { source })?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every selector, marker, and key is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyField`] when a string field is blank and
    /// [`ConfigError::ZeroDelay`] when the dismiss delay is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields: [(&'static str, &str); 10] = [
            ("flash_selector", &self.flash_selector),
            ("mood_selector", &self.mood_selector),
            ("playlist_link_selector", &self.playlist_link_selector),
            ("theme_toggle_id", &self.theme_toggle_id),
            ("fade_in_class", &self.fade_in_class),
            ("selected_mood_class", &self.selected_mood_class),
            ("dark_mode_class", &self.dark_mode_class),
            ("loader_id", &self.loader_id),
            ("spinner_class", &self.spinner_class),
            ("theme_storage_key", &self.theme_storage_key),
        ];
        if let Some(&(field, _)) = fields.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(ConfigError::EmptyField { field });
        }
        if self.flash_delay_ms == 0 {
            return Err(ConfigError::ZeroDelay {
                field: "flash_delay_ms",
            });
        }
        Ok(())
    }

    /// Delay before the flash message fades.
    #[must_use]
    pub fn flash_delay(&self) -> Duration {
        Duration::from_millis(u64::from(self.flash_delay_ms))
    }

    /// Delay between fading and removing the flash message.
    #[must_use]
    pub fn flash_fade(&self) -> Duration {
        Duration::from_millis(u64::from(self.flash_fade_ms))
    }
}
