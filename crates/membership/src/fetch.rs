//! Keygroup state fetching.

use fogbase_naming::{KeygroupConfig, KeygroupId, NamingService};

use crate::error::{MembershipError, Phase, Result};

/// Reads the authoritative configuration of `keygroup`.
///
/// Performs exactly one naming-service read and caches nothing. A missing
/// keygroup is `Ok(None)`, not an error.
///
/// # Errors
///
/// Returns [`MembershipError::Transport`] with [`Phase::Fetch`] if the read
/// fails.
#[tracing::instrument(skip(service), fields(keygroup = %keygroup))]
pub async fn fetch_keygroup<N>(service: &N, keygroup: &KeygroupId) -> Result<Option<KeygroupConfig>>
where
    N: NamingService + ?Sized,
{
    match service.get_keygroup_config(keygroup).await {
        Ok(config) => {
            tracing::debug!(exists = config.is_some(), "Fetched keygroup configuration");
            Ok(config)
        },
        Err(source) => {
            tracing::warn!(error = %source, "Failed to fetch keygroup configuration");
            Err(MembershipError::Transport { keygroup: keygroup.clone(), phase: Phase::Fetch, source })
        },
    }
}
