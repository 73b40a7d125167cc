//! Light/dark theme preference persisted by the theme toggle.

use serde::{Deserialize, Serialize};

/// Light or dark theme preference.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    /// Light theme mode (the default when nothing is stored).
    #[default]
    Light,
    /// Dark theme mode.
    Dark,
}

impl ThemeMode {
    /// String identifier written to storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// Interpret a stored preference.
    ///
    /// Only the literal `"dark"` selects the dark theme; anything else,
    /// including a missing value, falls back to light.
    #[must_use]
    pub fn from_stored(value: Option<&str>) -> Self {
        match value {
            Some("dark") => Self::Dark,
            _ => Self::Light,
        }
    }

    /// Mode that matches whether the dark marker is present on the page.
    #[must_use]
    pub const fn from_marker(dark_marker_present: bool) -> Self {
        if dark_marker_present {
            Self::Dark
        } else {
            Self::Light
        }
    }
}
