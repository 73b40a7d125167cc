//! Error types for page configuration, storage, and scenario replay.

use thiserror::Error;

/// Errors raised while loading or validating a [`crate::config::PageConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A selector, identifier, class name, or key was empty.
    #[error("configuration field must not be empty")]
    EmptyField {
        /// Name of the offending field.
        field: &'static str,
    },
    /// A delay that must elapse before work runs was zero.
    #[error("configuration delay must be greater than zero")]
    ZeroDelay {
        /// Name of the offending field.
        field: &'static str,
    },
    /// The JSON payload could not be decoded.
    #[error("failed to parse configuration")]
    Parse {
        /// Underlying serde error.
        #[source]
        source: serde_json::Error,
    },
}

/// Errors raised by [`crate::core::storage::KeyValueStore`] implementations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StorageError {
    /// The backing store rejected a write (quota exceeded, private browsing, ...).
    #[error("storage write rejected")]
    Write {
        /// Key being written.
        key: String,
        /// Backend-provided detail.
        detail: String,
    },
}

/// Errors raised while replaying a scripted page session.
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// The scenario document could not be decoded.
    #[error("failed to parse scenario")]
    Parse {
        /// Underlying serde error.
        #[source]
        source: serde_json::Error,
    },
    /// The scenario carried an invalid configuration override.
    #[error("scenario configuration is invalid")]
    Config {
        /// Validation failure.
        #[source]
        source: ConfigError,
    },
    /// A selector used to render fixture markup is not a plain `.class` selector.
    #[error("fixture markup cannot be rendered for selector")]
    FixtureSelector {
        /// Configuration field holding the selector.
        field: &'static str,
        /// Selector as configured.
        selector: String,
    },
    /// A step referenced a fixture element that does not exist.
    #[error("scenario step references a missing element")]
    UnknownNode {
        /// Fixture collection that was indexed.
        kind: &'static str,
        /// Index requested by the step.
        index: usize,
    },
}

impl From<ConfigError> for ScenarioError {
    fn from(source: ConfigError) -> Self {
        Self::Config { source }
    }
}
