//! Creation of missing keygroups.

use fogbase_naming::{KeygroupConfig, KeygroupId, NamingService};

use crate::{
    config::MembershipConfig,
    error::{MembershipError, Phase, Result},
};

/// Creates `keygroup` with the configured default secret and algorithm and
/// no members.
///
/// Issues exactly one create call and does not check whether the keygroup
/// exists; callers provision only after a fetch reported it missing. The
/// returned configuration is the one that was sent, which is the snapshot
/// reconciliation proceeds from.
///
/// # Errors
///
/// Returns [`MembershipError::Transport`] with [`Phase::Provision`] if the
/// create call fails.
#[tracing::instrument(skip(service, config), fields(keygroup = %keygroup))]
pub async fn provision_keygroup<N>(
    service: &N,
    keygroup: &KeygroupId,
    config: &MembershipConfig,
) -> Result<KeygroupConfig>
where
    N: NamingService + ?Sized,
{
    let keygroup_config = KeygroupConfig::new(
        keygroup.clone(),
        config.default_secret.clone(),
        config.default_algorithm,
    );

    match service.create_keygroup(&keygroup_config).await {
        Ok(()) => {
            tracing::info!(algorithm = %config.default_algorithm, "Created keygroup");
            Ok(keygroup_config)
        },
        Err(source) => {
            tracing::warn!(error = %source, "Failed to create keygroup");
            Err(MembershipError::Transport {
                keygroup: keygroup.clone(),
                phase: Phase::Provision,
                source,
            })
        },
    }
}
