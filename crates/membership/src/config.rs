//! Configuration for membership operations.

use std::fmt;

use fogbase_naming::EncryptionAlgorithm;
use serde::{Deserialize, Serialize};

/// Placeholder secret given to keygroups created on demand.
pub const DEFAULT_SECRET: &str = "passw";

/// Settings for [`KeygroupMembership`](crate::KeygroupMembership).
///
/// The secret is redacted from the `Debug` output.
///
/// # Example
///
/// ```
/// use fogbase_membership::MembershipConfig;
/// use fogbase_naming::EncryptionAlgorithm;
///
/// let config = MembershipConfig::builder().default_secret("k3ygr0up").deduplicate_members(true).build();
///
/// assert_eq!(config.default_algorithm, EncryptionAlgorithm::Aes);
/// assert!(!format!("{config:?}").contains("k3ygr0up"));
/// ```
#[derive(Clone, PartialEq, Eq, bon::Builder, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MembershipConfig {
    /// Encryption secret of keygroups created by `add_members`.
    #[serde(default = "default_secret")]
    #[builder(into, default = default_secret())]
    pub default_secret: String,

    /// Encryption algorithm of keygroups created by `add_members`.
    #[serde(default)]
    #[builder(default)]
    pub default_algorithm: EncryptionAlgorithm,

    /// Drop repeated identifiers within a category, keeping the first
    /// occurrence. When off, every occurrence is judged against the same
    /// snapshot, so a repeated absent member is added once per occurrence.
    #[serde(default)]
    #[builder(default)]
    pub deduplicate_members: bool,
}

fn default_secret() -> String {
    DEFAULT_SECRET.to_owned()
}

impl Default for MembershipConfig {
    fn default() -> Self {
        Self {
            default_secret: default_secret(),
            default_algorithm: EncryptionAlgorithm::default(),
            deduplicate_members: false,
        }
    }
}

impl fmt::Debug for MembershipConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MembershipConfig")
            .field("default_secret", &"<redacted>")
            .field("default_algorithm", &self.default_algorithm)
            .field("deduplicate_members", &self.deduplicate_members)
            .finish()
    }
}
