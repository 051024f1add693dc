//! Error types for guide operations.

use crate::providers::ProviderError;

/// Result type for guide operations
pub type GuideResult<T> = Result<T, GuideError>;

/// Error type for guide operations
#[derive(Debug, thiserror::Error)]
pub enum GuideError {
    /// A schedule or reservation provider rejected a fetch.
    /// The previous grid, if any, is left intact.
    #[error("Fetch failure: {source}")]
    FetchFailure {
        #[source]
        source: ProviderError,
    },

    /// The requested window is malformed, or layout was requested before any
    /// window was set.
    #[error("Invalid window: {message}")]
    InvalidWindow { message: String },

    /// Configuration file or value error.
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl GuideError {
    /// Create an invalid window error.
    pub fn invalid_window(message: impl Into<String>) -> Self {
        Self::InvalidWindow {
            message: message.into(),
        }
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn is_fetch_failure(&self) -> bool {
        matches!(self, Self::FetchFailure { .. })
    }
}

impl From<ProviderError> for GuideError {
    fn from(source: ProviderError) -> Self {
        GuideError::FetchFailure { source }
    }
}
