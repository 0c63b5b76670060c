//! Membership reconciliation.
//!
//! Reconciliation happens in two steps. [`plan`] decides, without any I/O,
//! which requested members need a naming-service call: an add is needed
//! only for a member absent from the snapshot, a remove only for one that
//! is present. [`reconcile`] then issues one call per planned change.
//!
//! All decisions are made against the single snapshot taken at the start of
//! the operation. Members added or removed along the way do not update it,
//! so a member requested twice is judged twice against the same state.
//! Another writer changing the keygroup concurrently is not detected; the
//! result is best-effort against a point-in-time view.

use std::collections::HashSet;

use fogbase_naming::{
    KeygroupConfig, NamingResult, NamingService, ReplicaNodeConfig, TimeToLive, TriggerNodeConfig,
};

use crate::{
    member::{Direction, Member},
    report::{MemberOutcome, MemberStatus},
};

/// Planned handling of one member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// A naming-service call is needed.
    Apply,
    /// The snapshot already matches the request.
    Skip,
}

/// Classifies every member of `members` against `snapshot`, preserving
/// input order.
#[must_use]
pub fn plan<'a>(
    snapshot: &KeygroupConfig,
    direction: Direction,
    members: &'a [Member],
) -> Vec<(&'a Member, Action)> {
    members
        .iter()
        .map(|member| {
            let present = member.is_member_of(snapshot);
            let action = match (direction, present) {
                (Direction::Add, false) | (Direction::Remove, true) => Action::Apply,
                (Direction::Add, true) | (Direction::Remove, false) => Action::Skip,
            };
            (member, action)
        })
        .collect()
}

/// Drops repeated members, keeping the first occurrence.
#[must_use]
pub fn deduplicate(members: Vec<Member>) -> Vec<Member> {
    let mut seen = HashSet::new();
    members.into_iter().filter(|member| seen.insert(member.clone())).collect()
}

/// Applies `members` to the keygroup in `snapshot`.
///
/// Replica nodes that are added get `lease`; it is ignored otherwise. A
/// failed call is logged and recorded as [`MemberStatus::Failed`]; the
/// remaining members are still processed and nothing is retried.
#[tracing::instrument(
    skip(service, snapshot, members, lease),
    fields(keygroup = %snapshot.keygroup_id(), members = members.len())
)]
pub async fn reconcile<N>(
    service: &N,
    snapshot: &KeygroupConfig,
    direction: Direction,
    members: &[Member],
    lease: TimeToLive,
) -> Vec<MemberOutcome>
where
    N: NamingService + ?Sized,
{
    let mut outcomes = Vec::with_capacity(members.len());

    for (member, action) in plan(snapshot, direction, members) {
        let status = match action {
            Action::Skip => {
                let status = match direction {
                    Direction::Add => MemberStatus::AlreadyMember,
                    Direction::Remove => MemberStatus::NotMember,
                };
                tracing::info!(member = %member, ?status, "Membership unchanged");
                status
            },
            Action::Apply => match apply(service, snapshot, direction, member, lease).await {
                Ok(()) => {
                    tracing::info!(member = %member, "Membership changed");
                    MemberStatus::Applied
                },
                Err(error) => {
                    tracing::warn!(member = %member, error = %error, "Membership change failed");
                    MemberStatus::Failed(error)
                },
            },
        };

        outcomes.push(MemberOutcome { member: member.clone(), direction, status });
    }

    outcomes
}

async fn apply<N>(
    service: &N,
    snapshot: &KeygroupConfig,
    direction: Direction,
    member: &Member,
    lease: TimeToLive,
) -> NamingResult<()>
where
    N: NamingService + ?Sized,
{
    let keygroup = snapshot.keygroup_id();
    tracing::debug!(member = %member, %direction, "Calling naming service");

    match (direction, member) {
        (Direction::Add, Member::Client(client)) => service.add_client(keygroup, client).await,
        (Direction::Add, Member::ReplicaNode(node)) => {
            let replica = ReplicaNodeConfig::new(node.clone(), lease);
            service.add_replica_node(keygroup, &replica).await
        },
        (Direction::Add, Member::TriggerNode(node)) => {
            service.add_trigger_node(keygroup, &TriggerNodeConfig::new(node.clone())).await
        },
        (Direction::Remove, Member::Client(client)) => {
            service.delete_client(keygroup, client).await
        },
        (Direction::Remove, Member::ReplicaNode(node) | Member::TriggerNode(node)) => {
            service.delete_node(keygroup, node).await
        },
    }
}
