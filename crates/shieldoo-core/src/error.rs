//! Error types for Shieldoo operations.
//!
//! A single error enum covers configuration, validation, transport, API and
//! decoding failures. Every variant carries owned strings so errors can be
//! cloned into host diagnostics without holding on to transport internals.

use thiserror::Error;
use tracing::{debug, error};

/// Main error type for Shieldoo operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Provider configuration is missing or invalid
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Endpoint could not be parsed as a URL
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// A resource field failed local validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Network or connection failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Request timed out at the transport level
    #[error("Timeout: {0}")]
    Timeout(String),

    /// The API answered with a non-success status
    #[error("API error {status}: {body}")]
    Api {
        /// Status line text (e.g. `500 Internal Server Error`)
        status: String,
        /// Raw response body
        body: String,
    },

    /// Response body did not match the expected JSON shape
    #[error("Failed to decode API response: {0}")]
    Decode(String),

    /// The requested entity does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Signing the request token failed
    #[error("Failed to sign request token: {0}")]
    Token(String),
}

/// Specialized result type for Shieldoo operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns the error code for this error type.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ConfigError(_) => "CONFIG_ERROR",
            Self::InvalidEndpoint(_) => "INVALID_ENDPOINT",
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::Transport(_) => "TRANSPORT_ERROR",
            Self::Timeout(_) => "TIMEOUT",
            Self::Api { .. } => "API_ERROR",
            Self::Decode(_) => "DECODE_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Token(_) => "TOKEN_ERROR",
        }
    }

    /// Returns true if this error should be logged as a serious error.
    #[must_use]
    pub const fn should_log(&self) -> bool {
        matches!(
            self,
            Self::ConfigError(_)
                | Self::Transport(_)
                | Self::Api { .. }
                | Self::Decode(_)
                | Self::Token(_)
        )
    }

    /// Returns true when the error means the remote entity is absent.
    ///
    /// Covers both the explicit [`Error::NotFound`] variant and an API error
    /// whose status line is a 404.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::Api { status, .. } => status.starts_with("404"),
            _ => false,
        }
    }

    /// Log the error against the operation that produced it and return it.
    ///
    /// Serious errors (see [`Error::should_log`]) are logged at `error`,
    /// everything else at `debug`.
    #[must_use]
    pub fn traced(self, operation: &str) -> Self {
        if self.should_log() {
            error!(operation, code = self.error_code(), error = %self, "Shieldoo operation failed");
        } else {
            debug!(operation, code = self.error_code(), error = %self, "Shieldoo operation failed");
        }
        self
    }
}

// Conversions from external error types
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidEndpoint(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::ConfigError(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for Error {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        Self::Token(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            Error::ConfigError("test".to_string()).error_code(),
            "CONFIG_ERROR"
        );
        assert_eq!(
            Error::InvalidEndpoint("test".to_string()).error_code(),
            "INVALID_ENDPOINT"
        );
        assert_eq!(
            Error::ValidationError("test".to_string()).error_code(),
            "VALIDATION_ERROR"
        );
        assert_eq!(
            Error::Transport("test".to_string()).error_code(),
            "TRANSPORT_ERROR"
        );
        assert_eq!(Error::Timeout("test".to_string()).error_code(), "TIMEOUT");
        assert_eq!(
            Error::Api {
                status: "500 Internal Server Error".to_string(),
                body: "boom".to_string()
            }
            .error_code(),
            "API_ERROR"
        );
        assert_eq!(Error::Decode("test".to_string()).error_code(), "DECODE_ERROR");
        assert_eq!(
            Error::NotFound("test".to_string()).error_code(),
            "NOT_FOUND"
        );
        assert_eq!(Error::Token("test".to_string()).error_code(), "TOKEN_ERROR");
    }

    #[test]
    fn test_error_display() {
        let err = Error::ValidationError("invalid protocol: http".to_string());
        assert_eq!(err.to_string(), "Validation error: invalid protocol: http");

        let err = Error::Api {
            status: "403 Forbidden".to_string(),
            body: "bad token".to_string(),
        };
        assert_eq!(err.to_string(), "API error 403 Forbidden: bad token");
    }

    #[test]
    fn test_should_log() {
        assert!(Error::ConfigError("test".to_string()).should_log());
        assert!(Error::Transport("test".to_string()).should_log());
        assert!(Error::Decode("test".to_string()).should_log());

        assert!(!Error::NotFound("test".to_string()).should_log());
        assert!(!Error::ValidationError("test".to_string()).should_log());
    }

    #[test]
    fn test_is_not_found() {
        assert!(Error::NotFound("fw".to_string()).is_not_found());
        assert!(Error::Api {
            status: "404 Not Found".to_string(),
            body: String::new()
        }
        .is_not_found());
        assert!(!Error::Api {
            status: "400 Bad Request".to_string(),
            body: String::new()
        }
        .is_not_found());
        assert!(!Error::Transport("refused".to_string()).is_not_found());
    }

    #[test]
    fn test_from_url_parse_error() {
        let err = url::Url::parse("not a url").unwrap_err();
        let shieldoo_err: Error = err.into();
        assert!(matches!(shieldoo_err, Error::InvalidEndpoint(_)));
    }

    #[test]
    fn test_from_serde_json_error() {
        let err = serde_json::from_str::<serde_json::Value>("{invalid json}").unwrap_err();
        let shieldoo_err: Error = err.into();
        assert!(matches!(shieldoo_err, Error::Decode(_)));
        assert_eq!(shieldoo_err.error_code(), "DECODE_ERROR");
    }

    #[test]
    fn test_error_clone() {
        let err = Error::NotFound("test".to_string());
        let cloned = err.clone();
        assert_eq!(err, cloned);
    }
}
