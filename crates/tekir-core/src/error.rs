//! Error types for Tekir chat routing.

use thiserror::Error;

/// Result type alias using Tekir's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for routing and inference operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A resolved model identifier has no entry in the active binding table.
    ///
    /// This is a deployment defect, never a per-request condition.
    #[error("Model not bound: {0}")]
    UnboundModel(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Inference/generation failed
    #[error("Inference error: {0}")]
    Inference(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Authentication with the upstream backend failed
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

impl Error {
    /// Whether this error indicates a broken deployment rather than a failed call.
    pub fn is_configuration_defect(&self) -> bool {
        matches!(self, Error::UnboundModel(_) | Error::Config(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}
