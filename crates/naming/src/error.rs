//! Naming-service error types and result alias.
//!
//! Every [`NamingService`](crate::NamingService) implementation maps its
//! transport-specific failures to [`NamingError`], so that callers can react
//! to a failed call without knowing whether it travelled over HTTP or stayed
//! in process.
//!
//! # Error Types
//!
//! - [`NamingError::NotFound`] - The addressed keygroup, node or client does not exist
//! - [`NamingError::Rejected`] - The naming service refused the request
//! - [`NamingError::Connection`] - Network or connection-related failures
//! - [`NamingError::Serialization`] - Request or response encoding failures
//! - [`NamingError::Internal`] - Service-side failures that fit no other category
//! - [`NamingError::Timeout`] - Call exceeded its time limit
//!
//! # Example
//!
//! ```
//! use fogbase_naming::{NamingError, NamingResult};
//!
//! fn lookup(keygroup: &str) -> NamingResult<()> {
//!     Err(NamingError::not_found(keygroup))
//! }
//!
//! assert!(matches!(lookup("app/tenant/group"), Err(NamingError::NotFound { .. })));
//! ```

use std::sync::Arc;

use thiserror::Error;

/// A boxed error type for source chain tracking.
pub type BoxError = Arc<dyn std::error::Error + Send + Sync>;

/// Result type alias for naming-service calls.
pub type NamingResult<T> = Result<T, NamingError>;

/// Errors that can occur while talking to the naming service.
///
/// Errors preserve their source chain via the `#[source]` attribute. Sources
/// are reference-counted, so errors are cheap to clone into reports.
///
/// # Non-exhaustive
///
/// New variants may be added in future minor releases without a
/// semver-breaking change. Downstream match expressions must include a
/// wildcard arm (`_ =>`).
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum NamingError {
    /// The addressed entity does not exist at the naming service.
    #[error("Not found: {entity}")]
    NotFound {
        /// Identifier of the missing entity.
        entity: String,
    },

    /// The naming service understood the request but refused it.
    ///
    /// Typical causes are creating a keygroup that already exists or
    /// referencing a node or client that was never registered.
    #[error("Rejected by naming service: {reason}")]
    Rejected {
        /// Reason reported by the service.
        reason: String,
    },

    /// Connection or network error.
    #[error("Connection error: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
        /// The underlying error that caused this connection failure.
        #[source]
        source: Option<BoxError>,
    },

    /// A request body could not be encoded or a response body could not be decoded.
    #[error("Serialization error: {message}")]
    Serialization {
        /// Description of the serialization error.
        message: String,
        /// The underlying error that caused serialization to fail.
        #[source]
        source: Option<BoxError>,
    },

    /// Internal naming-service error.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
        /// The underlying error that caused this internal failure.
        #[source]
        source: Option<BoxError>,
    },

    /// The call exceeded its time limit.
    #[error("Operation timeout")]
    Timeout,
}

impl NamingError {
    /// Creates a new `NotFound` error for the given entity.
    #[must_use]
    pub fn not_found(entity: impl Into<String>) -> Self {
        Self::NotFound { entity: entity.into() }
    }

    /// Creates a new `Rejected` error with the given reason.
    #[must_use]
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected { reason: reason.into() }
    }

    /// Creates a new `Connection` error with the given message.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection { message: message.into(), source: None }
    }

    /// Creates a new `Connection` error with a message and source error.
    #[must_use]
    pub fn connection_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Connection { message: message.into(), source: Some(Arc::new(source)) }
    }

    /// Creates a new `Serialization` error with the given message.
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization { message: message.into(), source: None }
    }

    /// Creates a new `Serialization` error with a message and source error.
    #[must_use]
    pub fn serialization_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Serialization { message: message.into(), source: Some(Arc::new(source)) }
    }

    /// Creates a new `Internal` error with the given message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into(), source: None }
    }

    /// Creates a new `Internal` error with a message and source error.
    #[must_use]
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Internal { message: message.into(), source: Some(Arc::new(source)) }
    }

    /// Creates a new `Timeout` error.
    #[must_use]
    pub fn timeout() -> Self {
        Self::Timeout
    }

    /// Returns `true` if the failure is likely to go away on its own.
    ///
    /// Connection failures and timeouts are transient; a rejection or a
    /// malformed response will fail the same way when repeated.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Connection { .. } | Self::Timeout)
    }
}
