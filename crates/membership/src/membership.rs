//! The public membership operations.

use fogbase_naming::{ClientId, KeygroupConfig, KeygroupId, NamingService, NodeId, TimeToLive};

use crate::{
    config::MembershipConfig,
    error::{MembershipError, Result},
    fetch::fetch_keygroup,
    identifier::parse_keygroup_id,
    member::{Direction, Member},
    provision::provision_keygroup,
    reconcile::{deduplicate, reconcile},
    report::{MemberOutcome, MembershipReport},
};

/// Members to add to a keygroup.
///
/// Every list is optional and defaults to empty.
///
/// # Example
///
/// ```
/// use fogbase_membership::MemberAdditions;
/// use fogbase_naming::TimeToLive;
///
/// let additions = MemberAdditions::builder()
///     .replica_nodes(vec!["N2".into()])
///     .lease(TimeToLive::Seconds(120))
///     .build();
///
/// assert!(additions.clients.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, bon::Builder)]
pub struct MemberAdditions {
    /// Clients to authorize.
    #[builder(default)]
    pub clients: Vec<ClientId>,
    /// Nodes to add as replicas.
    #[builder(default)]
    pub replica_nodes: Vec<NodeId>,
    /// Lease of the added replica nodes (default: unbounded).
    #[builder(default)]
    pub lease: TimeToLive,
    /// Nodes to add as triggers.
    #[builder(default)]
    pub trigger_nodes: Vec<NodeId>,
}

impl MemberAdditions {
    /// Returns `true` if no member is requested.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty() && self.replica_nodes.is_empty() && self.trigger_nodes.is_empty()
    }

    fn members(&self) -> [Vec<Member>; 3] {
        [
            self.clients.iter().cloned().map(Member::Client).collect(),
            self.replica_nodes.iter().cloned().map(Member::ReplicaNode).collect(),
            self.trigger_nodes.iter().cloned().map(Member::TriggerNode).collect(),
        ]
    }
}

/// Members to remove from a keygroup.
///
/// Every list is optional and defaults to empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, bon::Builder)]
pub struct MemberRemovals {
    /// Clients to revoke.
    #[builder(default)]
    pub clients: Vec<ClientId>,
    /// Nodes to remove from replica membership.
    #[builder(default)]
    pub replica_nodes: Vec<NodeId>,
    /// Nodes to remove from trigger membership.
    #[builder(default)]
    pub trigger_nodes: Vec<NodeId>,
}

impl MemberRemovals {
    /// Returns `true` if no member is requested.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty() && self.replica_nodes.is_empty() && self.trigger_nodes.is_empty()
    }

    fn members(&self) -> [Vec<Member>; 3] {
        [
            self.clients.iter().cloned().map(Member::Client).collect(),
            self.replica_nodes.iter().cloned().map(Member::ReplicaNode).collect(),
            self.trigger_nodes.iter().cloned().map(Member::TriggerNode).collect(),
        ]
    }
}

/// Reconciles requested keygroup membership against a naming service.
///
/// Both operations validate the keygroup id, fetch the keygroup once and
/// then reconcile clients, replica nodes and trigger nodes in that order.
/// They are idempotent: repeating a call reports every member as skipped
/// and makes no further changes.
///
/// # Example
///
/// ```
/// use fogbase_membership::{KeygroupMembership, MemberAdditions, MemberRemovals};
/// use fogbase_naming::{MemoryNamingService, NodeConfig, NodeId, NodeRegistry, TimeToLive};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let service = MemoryNamingService::new();
///     service.create_node_config(&NodeConfig::new(NodeId::new("N2"))).await?;
///     let membership = KeygroupMembership::new(service);
///
///     let additions = MemberAdditions::builder()
///         .replica_nodes(vec!["N2".into()])
///         .lease(TimeToLive::Seconds(120))
///         .build();
///     let report = membership.add_members("a/b/c", &additions).await?;
///     assert!(report.created);
///     assert_eq!(report.applied().count(), 1);
///
///     let removals = MemberRemovals::builder().replica_nodes(vec!["N2".into()]).build();
///     let report = membership.remove_members("a/b/c", &removals).await?;
///     assert_eq!(report.applied().count(), 1);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct KeygroupMembership<N> {
    service: N,
    config: MembershipConfig,
}

impl<N: NamingService> KeygroupMembership<N> {
    /// Creates a reconciler with the default configuration.
    #[must_use]
    pub fn new(service: N) -> Self {
        Self::with_config(service, MembershipConfig::default())
    }

    /// Creates a reconciler with the given configuration.
    #[must_use]
    pub fn with_config(service: N, config: MembershipConfig) -> Self {
        Self { service, config }
    }

    /// Returns the naming service.
    #[must_use]
    pub fn service(&self) -> &N {
        &self.service
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &MembershipConfig {
        &self.config
    }

    /// Adds members to the keygroup `raw_keygroup`, creating the keygroup
    /// first if it does not exist.
    ///
    /// # Errors
    ///
    /// - [`MembershipError::InvalidIdentifier`] if `raw_keygroup` is malformed
    /// - [`MembershipError::Transport`] if the keygroup cannot be fetched or created
    ///
    /// Failures of individual members are reported in the returned
    /// [`MembershipReport`].
    #[tracing::instrument(skip(self, raw_keygroup, additions), fields(keygroup = raw_keygroup))]
    pub async fn add_members(
        &self,
        raw_keygroup: &str,
        additions: &MemberAdditions,
    ) -> Result<MembershipReport> {
        let keygroup = parse_keygroup_id(raw_keygroup)?;

        let (snapshot, created) = match fetch_keygroup(&self.service, &keygroup).await? {
            Some(snapshot) => (snapshot, false),
            None => (provision_keygroup(&self.service, &keygroup, &self.config).await?, true),
        };

        let outcomes =
            self.reconcile_all(&snapshot, Direction::Add, additions.members(), additions.lease).await;
        Ok(self.finish(keygroup, created, outcomes))
    }

    /// Removes members from the keygroup `raw_keygroup`.
    ///
    /// # Errors
    ///
    /// - [`MembershipError::InvalidIdentifier`] if `raw_keygroup` is malformed
    /// - [`MembershipError::KeygroupNotFound`] if the keygroup does not exist
    /// - [`MembershipError::Transport`] if the keygroup cannot be fetched
    ///
    /// Failures of individual members are reported in the returned
    /// [`MembershipReport`].
    #[tracing::instrument(skip(self, raw_keygroup, removals), fields(keygroup = raw_keygroup))]
    pub async fn remove_members(
        &self,
        raw_keygroup: &str,
        removals: &MemberRemovals,
    ) -> Result<MembershipReport> {
        let keygroup = parse_keygroup_id(raw_keygroup)?;

        let Some(snapshot) = fetch_keygroup(&self.service, &keygroup).await? else {
            tracing::warn!("Keygroup does not exist, nothing to remove");
            return Err(MembershipError::KeygroupNotFound { keygroup });
        };

        let outcomes = self
            .reconcile_all(&snapshot, Direction::Remove, removals.members(), TimeToLive::Unbounded)
            .await;
        Ok(self.finish(keygroup, false, outcomes))
    }

    async fn reconcile_all(
        &self,
        snapshot: &KeygroupConfig,
        direction: Direction,
        categories: [Vec<Member>; 3],
        lease: TimeToLive,
    ) -> Vec<MemberOutcome> {
        let mut outcomes = Vec::new();
        for members in categories {
            if members.is_empty() {
                continue;
            }
            let members =
                if self.config.deduplicate_members { deduplicate(members) } else { members };
            outcomes.extend(reconcile(&self.service, snapshot, direction, &members, lease).await);
        }
        outcomes
    }

    fn finish(
        &self,
        keygroup: KeygroupId,
        created: bool,
        outcomes: Vec<MemberOutcome>,
    ) -> MembershipReport {
        let report = MembershipReport { keygroup, created, outcomes };
        tracing::info!(
            created,
            applied = report.applied().count(),
            skipped = report.skipped().count(),
            failed = report.failures().count(),
            "Membership reconciled"
        );
        report
    }
}
