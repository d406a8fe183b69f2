//! Upstream error classification for OpenAI-compatible routers.
//!
//! OpenRouter reports failures with a numeric `code` in the error body,
//! which can differ from the HTTP status: errors raised after a stream has
//! started arrive inside a `200` response. OpenAI itself sends a string
//! `type`/`code` instead. Classification checks the string kind first, then
//! the body's numeric code, then the HTTP status.

use tekir_core::Error;

use super::types::OpenAIError;

/// What went wrong upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamErrorKind {
    /// Malformed request or unsupported parameter (400).
    InvalidRequest,
    /// Missing, invalid or disabled API key (401).
    Unauthorized,
    /// Account is out of credits (402).
    InsufficientCredits,
    /// Input was flagged by the router's moderation (403).
    Moderated,
    /// Unknown upstream slug (404, `model_not_found`).
    ModelNotFound,
    /// Upstream did not answer in time (408).
    Timeout,
    /// Prompt exceeds the model's context window.
    ContextLengthExceeded,
    /// Rate limited (429).
    RateLimited,
    /// Model is down or no provider can serve the request (5xx).
    ProviderUnavailable,
    Unknown,
}

impl UpstreamErrorKind {
    /// Classify an error body received with HTTP `status`.
    pub fn classify(status: u16, error: &OpenAIError) -> Self {
        for kind in error.kinds() {
            match kind {
                "model_not_found" => return Self::ModelNotFound,
                "insufficient_quota" => return Self::InsufficientCredits,
                k if k.contains("context_length") => return Self::ContextLengthExceeded,
                _ => {}
            }
        }

        Self::from_code(error.numeric_code().unwrap_or(status))
    }

    /// Classify a bare HTTP status or OpenRouter numeric code.
    pub fn from_code(code: u16) -> Self {
        match code {
            400 => Self::InvalidRequest,
            401 => Self::Unauthorized,
            402 => Self::InsufficientCredits,
            403 => Self::Moderated,
            404 => Self::ModelNotFound,
            408 => Self::Timeout,
            413 => Self::ContextLengthExceeded,
            429 => Self::RateLimited,
            500..=599 => Self::ProviderUnavailable,
            _ => Self::Unknown,
        }
    }

    /// Whether the same request could succeed later.
    ///
    /// Informational only: nothing in this crate retries.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited | Self::Timeout | Self::ProviderUnavailable
        )
    }
}

/// Convert a classified upstream failure to a Tekir [`Error`].
///
/// Failures that only a deployment change can fix (bad key, unknown slug)
/// become configuration defects.
pub fn to_tekir_error(kind: UpstreamErrorKind, message: &str) -> Error {
    match kind {
        UpstreamErrorKind::Unauthorized => {
            Error::Unauthorized(format!("Authentication failed: {}", message))
        }
        UpstreamErrorKind::ModelNotFound => Error::Config(format!("Model not found: {}", message)),
        UpstreamErrorKind::InsufficientCredits => {
            Error::Inference(format!("Insufficient credits: {}", message))
        }
        UpstreamErrorKind::Moderated => {
            Error::Inference(format!("Flagged by moderation: {}", message))
        }
        UpstreamErrorKind::InvalidRequest => {
            Error::Inference(format!("Invalid request: {}", message))
        }
        UpstreamErrorKind::Timeout => Error::Inference(format!("Upstream timeout: {}", message)),
        UpstreamErrorKind::ContextLengthExceeded => {
            Error::Inference(format!("Context too long: {}", message))
        }
        UpstreamErrorKind::RateLimited => {
            Error::Inference(format!("Rate limit exceeded: {}", message))
        }
        UpstreamErrorKind::ProviderUnavailable => {
            Error::Inference(format!("Provider unavailable: {}", message))
        }
        UpstreamErrorKind::Unknown => Error::Inference(message.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(json: &str) -> OpenAIError {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_openrouter_numeric_codes() {
        let cases = [
            (401, UpstreamErrorKind::Unauthorized),
            (402, UpstreamErrorKind::InsufficientCredits),
            (403, UpstreamErrorKind::Moderated),
            (408, UpstreamErrorKind::Timeout),
            (429, UpstreamErrorKind::RateLimited),
            (502, UpstreamErrorKind::ProviderUnavailable),
            (503, UpstreamErrorKind::ProviderUnavailable),
        ];
        for (code, expected) in cases {
            let error = body(&format!(r#"{{"message":"m","code":{}}}"#, code));
            assert_eq!(UpstreamErrorKind::classify(code, &error), expected, "{code}");
        }
    }

    #[test]
    fn test_body_code_wins_over_status() {
        // Mid-stream failures arrive with a 200 status
        let error = body(r#"{"message":"Provider overloaded","code":502}"#);
        assert_eq!(
            UpstreamErrorKind::classify(200, &error),
            UpstreamErrorKind::ProviderUnavailable
        );
    }

    #[test]
    fn test_status_used_without_body_code() {
        let error = body(r#"{"message":"not found"}"#);
        assert_eq!(
            UpstreamErrorKind::classify(404, &error),
            UpstreamErrorKind::ModelNotFound
        );
    }

    #[test]
    fn test_openai_string_kinds() {
        let error = body(r#"{"message":"m","type":"invalid_request_error","code":"model_not_found"}"#);
        assert_eq!(
            UpstreamErrorKind::classify(400, &error),
            UpstreamErrorKind::ModelNotFound
        );

        let error = body(r#"{"message":"m","type":"invalid_request_error"}"#);
        assert_eq!(
            UpstreamErrorKind::classify(400, &error),
            UpstreamErrorKind::InvalidRequest
        );

        let error = body(r#"{"message":"m","type":"context_length_exceeded"}"#);
        assert_eq!(
            UpstreamErrorKind::classify(400, &error),
            UpstreamErrorKind::ContextLengthExceeded
        );

        let error = body(r#"{"message":"m","type":"insufficient_quota"}"#);
        assert_eq!(
            UpstreamErrorKind::classify(429, &error),
            UpstreamErrorKind::InsufficientCredits
        );
    }

    #[test]
    fn test_unrecognized_code() {
        assert_eq!(UpstreamErrorKind::from_code(418), UpstreamErrorKind::Unknown);
        assert_eq!(UpstreamErrorKind::from_code(200), UpstreamErrorKind::Unknown);
    }

    #[test]
    fn test_retryable() {
        assert!(UpstreamErrorKind::RateLimited.is_retryable());
        assert!(UpstreamErrorKind::Timeout.is_retryable());
        assert!(UpstreamErrorKind::ProviderUnavailable.is_retryable());
        assert!(!UpstreamErrorKind::InsufficientCredits.is_retryable());
        assert!(!UpstreamErrorKind::Moderated.is_retryable());
        assert!(!UpstreamErrorKind::ModelNotFound.is_retryable());
    }

    #[test]
    fn test_to_tekir_error_auth() {
        let err = to_tekir_error(UpstreamErrorKind::Unauthorized, "Invalid key");
        assert!(matches!(err, Error::Unauthorized(_)));
        assert!(err.to_string().contains("Authentication failed"));
    }

    #[test]
    fn test_to_tekir_error_model_not_found_is_config() {
        let err = to_tekir_error(UpstreamErrorKind::ModelNotFound, "deepseek/deepseek-r2");
        assert!(err.is_configuration_defect());
    }

    #[test]
    fn test_to_tekir_error_credits() {
        let err = to_tekir_error(UpstreamErrorKind::InsufficientCredits, "top up");
        assert!(matches!(err, Error::Inference(_)));
        assert!(err.to_string().contains("Insufficient credits"));
    }
}
