//! Error types for the HTTP naming client.
//!
//! This module provides [`HttpNamingError`] and its mapping to the
//! transport-agnostic [`NamingError`] returned through the
//! [`NamingService`](fogbase_naming::NamingService) trait.
//!
//! # Status Mapping
//!
//! | Response | [`NamingError`] |
//! |----------|-----------------|
//! | 404 | `NotFound` |
//! | 408 | `Timeout` |
//! | other 4xx | `Rejected` |
//! | 5xx and anything else that is not 2xx | `Internal` |

use fogbase_naming::NamingError;
use reqwest::StatusCode;
use thiserror::Error;

/// Result type alias for HTTP naming client operations.
pub type Result<T> = std::result::Result<T, HttpNamingError>;

/// Errors specific to the HTTP naming client.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HttpNamingError {
    /// Invalid client configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The request could not be sent or the response could not be read.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The naming service answered with a non-success status.
    #[error("Unexpected status {status} from {path}: {body}")]
    Status {
        /// The response status.
        status: StatusCode,
        /// Path of the request URL.
        path: String,
        /// Response body, possibly empty.
        body: String,
    },

    /// A success response carried a body that could not be decoded.
    #[error("Failed to decode response: {message}")]
    Decode {
        /// Description of what was being decoded.
        message: String,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

impl HttpNamingError {
    /// Returns the response status if the service answered at all.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Request(err) => err.status(),
            _ => None,
        }
    }
}

impl From<HttpNamingError> for NamingError {
    fn from(err: HttpNamingError) -> Self {
        match err {
            HttpNamingError::Config(message) => NamingError::internal(format!("Config: {message}")),
            HttpNamingError::Request(source) => request_error_to_naming_error(source),
            HttpNamingError::Status { status, path, body } => {
                status_to_naming_error(status, &path, body)
            },
            HttpNamingError::Decode { message, source } => {
                NamingError::serialization_with_source(message, source)
            },
        }
    }
}

fn request_error_to_naming_error(err: reqwest::Error) -> NamingError {
    if err.is_timeout() {
        tracing::warn!(error = %err, "Naming service request timed out");
        NamingError::timeout()
    } else if err.is_connect() {
        NamingError::connection_with_source("Cannot reach naming service", err)
    } else if err.is_decode() || err.is_body() {
        NamingError::serialization_with_source("Cannot read naming service response", err)
    } else if err.is_builder() {
        NamingError::internal_with_source("Cannot build naming service request", err)
    } else {
        NamingError::connection_with_source("Naming service request failed", err)
    }
}

fn status_to_naming_error(status: StatusCode, path: &str, body: String) -> NamingError {
    let reason = if body.is_empty() {
        status.canonical_reason().unwrap_or("no reason given").to_owned()
    } else {
        body
    };

    match status {
        StatusCode::NOT_FOUND => NamingError::not_found(path),
        StatusCode::REQUEST_TIMEOUT => NamingError::timeout(),
        s if s.is_client_error() => NamingError::rejected(reason),
        s => NamingError::internal(format!("HTTP {}: {reason}", s.as_u16())),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn status_error(status: StatusCode, body: &str) -> NamingError {
        HttpNamingError::Status {
            status,
            path: "/jersey/keygroups/a/b/c".into(),
            body: body.into(),
        }
        .into()
    }

    #[test]
    fn test_not_found_status_mapping() {
        let err = status_error(StatusCode::NOT_FOUND, "Keygroup does not exist");
        assert!(matches!(err, NamingError::NotFound { ref entity } if entity == "/jersey/keygroups/a/b/c"));
    }

    #[test]
    fn test_client_error_status_mapping() {
        let err = status_error(StatusCode::BAD_REQUEST, "Body is not a client id");
        assert!(matches!(err, NamingError::Rejected { ref reason } if reason == "Body is not a client id"));
    }

    #[test]
    fn test_client_error_without_body_uses_canonical_reason() {
        let err = status_error(StatusCode::CONFLICT, "");
        assert!(matches!(err, NamingError::Rejected { ref reason } if reason == "Conflict"));
    }

    #[test]
    fn test_request_timeout_status_mapping() {
        assert!(matches!(status_error(StatusCode::REQUEST_TIMEOUT, ""), NamingError::Timeout));
    }

    #[test]
    fn test_server_error_status_mapping() {
        let err = status_error(StatusCode::INTERNAL_SERVER_ERROR, "boom");
        assert!(matches!(err, NamingError::Internal { .. }));
        assert!(err.to_string().contains("HTTP 500: boom"));
    }

    #[test]
    fn test_decode_error_mapping() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: NamingError =
            HttpNamingError::Decode { message: "keygroup config".into(), source }.into();

        assert!(matches!(err, NamingError::Serialization { .. }));
    }

    #[test]
    fn test_config_error_mapping() {
        let err: NamingError = HttpNamingError::Config("missing base_url".into()).into();
        assert!(matches!(err, NamingError::Internal { .. }));
    }

    #[test]
    fn test_status_accessor() {
        let err = HttpNamingError::Status {
            status: StatusCode::BAD_GATEWAY,
            path: "/".into(),
            body: String::new(),
        };
        assert_eq!(err.status(), Some(StatusCode::BAD_GATEWAY));
        assert_eq!(HttpNamingError::Config("x".into()).status(), None);
    }
}
