//! Errors that abort a membership operation.
//!
//! Only three conditions stop an operation as a whole: an invalid keygroup
//! identifier, a missing keygroup on removal, and a failed fetch or
//! provisioning call. A failed add or delete of a single member is not an
//! error at this level; it is reported as
//! [`MemberStatus::Failed`](crate::MemberStatus::Failed) and the remaining
//! members are still reconciled.

use std::fmt;

use fogbase_naming::{KeygroupId, KeygroupIdError, NamingError};
use thiserror::Error;

/// Result type alias for membership operations.
pub type Result<T> = std::result::Result<T, MembershipError>;

/// The naming-service step that failed before reconciliation started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Reading the keygroup configuration.
    Fetch,
    /// Creating the missing keygroup.
    Provision,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch => f.write_str("fetch"),
            Self::Provision => f.write_str("provision"),
        }
    }
}

/// Operation-fatal membership errors.
///
/// # Non-exhaustive
///
/// New variants may be added in future minor releases without a
/// semver-breaking change. Downstream match expressions must include a
/// wildcard arm (`_ =>`).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MembershipError {
    /// The keygroup identifier was malformed. No call was made.
    #[error("Invalid keygroup id '{raw}': {source}")]
    InvalidIdentifier {
        /// The rejected input.
        raw: String,
        /// Why it was rejected.
        #[source]
        source: KeygroupIdError,
    },

    /// Members were to be removed from a keygroup that does not exist.
    #[error("Keygroup {keygroup} does not exist")]
    KeygroupNotFound {
        /// The missing keygroup.
        keygroup: KeygroupId,
    },

    /// Fetching or creating the keygroup failed. No member was touched.
    #[error("Failed to {phase} keygroup {keygroup}: {source}")]
    Transport {
        /// The keygroup being worked on.
        keygroup: KeygroupId,
        /// The failed step.
        phase: Phase,
        /// The naming-service error.
        #[source]
        source: NamingError,
    },
}

impl MembershipError {
    /// Returns `true` if repeating the operation may succeed.
    ///
    /// Only transport failures whose cause is transient qualify.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport { source, .. } => source.is_transient(),
            _ => false,
        }
    }
}
