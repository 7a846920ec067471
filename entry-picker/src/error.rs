//! Error types for the entry picker

use thiserror::Error;

/// Result type for picker operations
pub type Result<T> = std::result::Result<T, PickerError>;

/// Errors that can occur while configuring or running a picker session
#[derive(Debug, Error)]
pub enum PickerError {
    /// A required instance parameter is absent or empty
    #[error("{parameter} parameter is required for this dropdown")]
    MissingParameter { parameter: String },

    /// Configuration sources could not be merged or extracted
    #[error("configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    /// The entry source failed
    #[error("fetch failed: {message}")]
    Fetch { message: String },

    /// The entry source did not answer in time
    #[error("fetch timed out after {elapsed_ms}ms")]
    FetchTimeout { elapsed_ms: u64 },

    /// The field store rejected a write
    #[error("field store error: {message}")]
    Store { message: String },

    /// `start` was called on a session that already started
    #[error("session already started")]
    AlreadyStarted,

    /// The session has been stopped
    #[error("session stopped")]
    Stopped,

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PickerError {
    /// Create a missing parameter error
    pub fn missing_parameter(parameter: impl Into<String>) -> Self {
        Self::MissingParameter {
            parameter: parameter.into(),
        }
    }

    /// Create a fetch error
    pub fn fetch(message: impl Into<String>) -> Self {
        Self::Fetch {
            message: message.into(),
        }
    }

    /// Create a field store error
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    /// Whether this error should abort mounting the picker
    pub fn is_fatal_config(&self) -> bool {
        matches!(self, Self::MissingParameter { .. } | Self::Config(_))
    }
}

impl From<figment::Error> for PickerError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}
