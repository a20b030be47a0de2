//! Error types for `scriptgate`

use thiserror::Error;

/// Main error type for `scriptgate` operations
#[derive(Error, Debug)]
pub enum TrackingError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Provider has no entry in the `providers` mapping
    #[error("Provider \"{0}\" is not present in the providers configuration")]
    ProviderNotConfigured(String),

    /// A required provider key is missing or null
    #[error("Config value \"{key}\" is not set or is null. Skipping provider \"{provider}\"")]
    ConfigurationInvalid { provider: String, key: String },

    /// Configured provider with no implementation
    #[error("Unknown tracking provider: {0}")]
    UnknownProvider(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Upstream request could not be completed
    #[error("Upstream fetch of {url} failed: {reason}")]
    Upstream { url: String, reason: String },

    /// Upstream answered with a non-success status
    #[error("Upstream fetch of {url} returned status {status}")]
    UpstreamStatus { url: String, status: u16 },

    /// Upstream request timed out
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Template error
    #[error("Template error: {0}")]
    Template(String),

    /// Operation not valid in the current state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl TrackingError {
    /// Whether this error came from talking to the upstream script host.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            TrackingError::Upstream { .. }
                | TrackingError::UpstreamStatus { .. }
                | TrackingError::Timeout(_)
        )
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, TrackingError>;

impl From<serde_yaml_ng::Error> for TrackingError {
    fn from(err: serde_yaml_ng::Error) -> Self {
        TrackingError::Serialization(err.to_string())
    }
}

impl From<url::ParseError> for TrackingError {
    fn from(err: url::ParseError) -> Self {
        TrackingError::Config(format!("invalid URL: {err}"))
    }
}
