//! Keygroup identifier validation.

use fogbase_naming::KeygroupId;

use crate::error::{MembershipError, Result};

/// Parses untrusted input into a [`KeygroupId`].
///
/// Invalid input is logged at `warn` level and returned as
/// [`MembershipError::InvalidIdentifier`].
///
/// # Errors
///
/// Returns [`MembershipError::InvalidIdentifier`] unless `raw` has the form
/// `app/tenant/group` with non-empty segments of `[A-Za-z0-9._-]` other than
/// `.` and `..`.
pub fn parse_keygroup_id(raw: &str) -> Result<KeygroupId> {
    raw.parse().map_err(|source| {
        tracing::warn!(keygroup = raw, error = %source, "Invalid keygroup id");
        MembershipError::InvalidIdentifier { raw: raw.to_owned(), source }
    })
}
