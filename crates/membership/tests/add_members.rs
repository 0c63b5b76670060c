//! Integration tests for `KeygroupMembership::add_members`.

#![allow(clippy::expect_used, clippy::panic, clippy::unwrap_used)]

use fogbase_membership::{
    KeygroupMembership, MemberAdditions, MemberCategory, MemberStatus, MembershipConfig,
    MembershipError, Phase,
};
use fogbase_naming::{
    ClientId, MemoryNamingService, NamingCall, NodeId, ReplicaNodeConfig, TimeToLive,
    testutil::{FailingNamingService, NamingOperation, empty_keygroup, keygroup_id, registered_service},
};

fn additions() -> MemberAdditions {
    MemberAdditions::builder()
        .clients(vec!["C1".into()])
        .replica_nodes(vec!["N1".into(), "N2".into()])
        .trigger_nodes(vec!["N3".into()])
        .build()
}

async fn service() -> MemoryNamingService {
    registered_service(&["N1", "N2", "N3"], &["C1", "C2"]).await
}

#[tokio::test]
async fn missing_keygroup_is_created_before_any_mutation() {
    let service = service().await;
    let membership = KeygroupMembership::new(service.clone());

    let report = membership.add_members("a/b/c", &additions()).await.unwrap();

    assert!(report.created);
    assert!(report.is_clean());
    assert_eq!(report.applied().count(), 4);

    let calls = service.calls();
    assert_eq!(calls[0], NamingCall::GetKeygroupConfig(keygroup_id("a/b/c")));
    assert_eq!(calls[1], NamingCall::CreateKeygroup(keygroup_id("a/b/c")));
    assert_eq!(calls.iter().filter(|c| matches!(c, NamingCall::CreateKeygroup(_))).count(), 1);
    assert_eq!(calls.len(), 6);
}

#[tokio::test]
async fn created_keygroup_starts_empty_with_default_security() {
    let service = service().await;
    let membership = KeygroupMembership::new(service.clone());

    membership.add_members("a/b/c", &MemberAdditions::default()).await.unwrap();

    let config = service.keygroup(&keygroup_id("a/b/c")).expect("keygroup was created");
    assert!(config.has_no_members());
    assert_eq!(config.encryption_secret(), "passw");
    assert_eq!(service.mutation_calls(), vec![NamingCall::CreateKeygroup(keygroup_id("a/b/c"))]);
}

#[tokio::test]
async fn second_identical_call_is_a_no_op() {
    let service = service().await;
    let membership = KeygroupMembership::new(service.clone());
    membership.add_members("a/b/c", &additions()).await.unwrap();
    service.clear_calls();

    let report = membership.add_members("a/b/c", &additions()).await.unwrap();

    assert!(!report.created);
    assert_eq!(report.skipped().count(), 4);
    assert!(report.outcomes.iter().all(|o| matches!(o.status, MemberStatus::AlreadyMember)));
    assert!(service.mutation_calls().is_empty());
    assert_eq!(service.calls(), vec![NamingCall::GetKeygroupConfig(keygroup_id("a/b/c"))]);
}

#[tokio::test]
async fn present_members_are_never_add_targets() {
    let service = service().await;
    let mut existing = empty_keygroup("a/b/c");
    existing.insert_client(ClientId::new("C1"));
    existing.insert_replica_node(ReplicaNodeConfig::new(NodeId::new("N1"), TimeToLive::Seconds(5)));
    service.insert_keygroup(existing);
    let membership = KeygroupMembership::new(service.clone());

    let report = membership.add_members("a/b/c", &additions()).await.unwrap();

    assert_eq!(report.skipped().count(), 2);
    assert_eq!(
        service.mutation_calls(),
        vec![
            NamingCall::AddReplicaNode(
                keygroup_id("a/b/c"),
                ReplicaNodeConfig::new(NodeId::new("N2"), TimeToLive::Unbounded)
            ),
            NamingCall::AddTriggerNode(keygroup_id("a/b/c"), NodeId::new("N3")),
        ]
    );
    // An existing replica keeps its lease; adds never update it.
    let config = service.keygroup(&keygroup_id("a/b/c")).unwrap();
    assert_eq!(config.replica_node(&NodeId::new("N1")).unwrap().time_to_live, TimeToLive::Seconds(5));
}

#[tokio::test]
async fn lease_is_applied_to_added_replicas() {
    let service = service().await;
    let membership = KeygroupMembership::new(service.clone());
    let additions = MemberAdditions::builder()
        .replica_nodes(vec!["N2".into()])
        .lease(TimeToLive::Seconds(120))
        .build();

    membership.add_members("a/b/c", &additions).await.unwrap();

    let config = service.keygroup(&keygroup_id("a/b/c")).unwrap();
    assert_eq!(config.replica_node(&NodeId::new("N2")).unwrap().time_to_live, TimeToLive::Seconds(120));
}

#[tokio::test]
async fn omitted_lease_means_no_expiry() {
    let service = service().await;
    let membership = KeygroupMembership::new(service.clone());
    let additions = MemberAdditions::builder().replica_nodes(vec!["N2".into()]).build();

    membership.add_members("a/b/c", &additions).await.unwrap();

    let config = service.keygroup(&keygroup_id("a/b/c")).unwrap();
    assert_eq!(config.replica_node(&NodeId::new("N2")).unwrap().time_to_live, TimeToLive::Unbounded);
}

#[tokio::test]
async fn invalid_identifier_makes_no_calls() {
    let service = service().await;
    let membership = KeygroupMembership::new(service.clone());

    for raw in ["", "a/b", "a/b/c/d", "a//c", "a/b c/d"] {
        let result = membership.add_members(raw, &additions()).await;
        assert!(
            matches!(result, Err(MembershipError::InvalidIdentifier { .. })),
            "{raw:?} should be rejected, got {result:?}"
        );
    }
    assert!(service.calls().is_empty());
}

#[tokio::test]
async fn fetch_failure_aborts_without_mutations() {
    let service = FailingNamingService::new(service().await);
    service.fail(NamingOperation::GetKeygroupConfig);
    let membership = KeygroupMembership::new(service.clone());

    let result = membership.add_members("a/b/c", &additions()).await;

    assert!(matches!(result, Err(MembershipError::Transport { phase: Phase::Fetch, .. })));
    assert!(service.inner().calls().is_empty());
}

#[tokio::test]
async fn provision_failure_aborts_without_mutations() {
    let service = FailingNamingService::new(service().await);
    service.fail(NamingOperation::CreateKeygroup);
    let membership = KeygroupMembership::new(service.clone());

    let result = membership.add_members("a/b/c", &additions()).await;

    match result {
        Err(err @ MembershipError::Transport { phase: Phase::Provision, .. }) => {
            assert!(err.is_transient());
        },
        other => panic!("expected provision failure, got {other:?}"),
    }
    assert!(service.inner().mutation_calls().is_empty());
}

#[tokio::test]
async fn member_failure_does_not_block_siblings_or_categories() {
    let service = FailingNamingService::new(service().await);
    service.fail_for(NamingOperation::AddReplicaNode, "N1");
    let membership = KeygroupMembership::new(service.clone());

    let report = membership.add_members("a/b/c", &additions()).await.unwrap();

    assert!(!report.is_clean());
    let failed: Vec<&str> = report.failures().map(|o| o.member.id()).collect();
    assert_eq!(failed, vec!["N1"]);
    assert_eq!(report.applied().count(), 3);

    let config = service.inner().keygroup(&keygroup_id("a/b/c")).unwrap();
    assert!(config.contains_client(&ClientId::new("C1")));
    assert!(!config.contains_replica_node(&NodeId::new("N1")));
    assert!(config.contains_replica_node(&NodeId::new("N2")));
    assert!(config.contains_trigger_node(&NodeId::new("N3")));
}

#[tokio::test]
async fn unregistered_member_is_reported_as_failed() {
    let service = service().await;
    let membership = KeygroupMembership::new(service.clone());
    let additions = MemberAdditions::builder().clients(vec!["C9".into(), "C2".into()]).build();

    let report = membership.add_members("a/b/c", &additions).await.unwrap();

    assert!(matches!(report.outcomes[0].status, MemberStatus::Failed(_)));
    assert!(matches!(report.outcomes[1].status, MemberStatus::Applied));
}

#[tokio::test]
async fn outcomes_follow_category_then_input_order() {
    let service = service().await;
    let membership = KeygroupMembership::new(service.clone());
    let additions = MemberAdditions::builder()
        .trigger_nodes(vec!["N3".into()])
        .clients(vec!["C2".into(), "C1".into()])
        .replica_nodes(vec!["N2".into()])
        .build();

    let report = membership.add_members("a/b/c", &additions).await.unwrap();

    let order: Vec<(MemberCategory, &str)> =
        report.outcomes.iter().map(|o| (o.category(), o.member.id())).collect();
    assert_eq!(
        order,
        vec![
            (MemberCategory::Client, "C2"),
            (MemberCategory::Client, "C1"),
            (MemberCategory::ReplicaNode, "N2"),
            (MemberCategory::TriggerNode, "N3"),
        ]
    );
}

#[tokio::test]
async fn duplicates_are_judged_against_the_snapshot_by_default() {
    let service = service().await;
    let membership = KeygroupMembership::new(service.clone());
    let additions = MemberAdditions::builder().clients(vec!["C1".into(), "C1".into()]).build();

    let report = membership.add_members("a/b/c", &additions).await.unwrap();

    assert_eq!(report.applied().count(), 2);
    let adds = service
        .mutation_calls()
        .into_iter()
        .filter(|c| matches!(c, NamingCall::AddClient(..)))
        .count();
    assert_eq!(adds, 2);
    assert_eq!(service.keygroup(&keygroup_id("a/b/c")).unwrap().clients().count(), 1);
}

#[tokio::test]
async fn duplicates_collapse_when_deduplication_is_enabled() {
    let service = service().await;
    let config = MembershipConfig::builder().deduplicate_members(true).build();
    let membership = KeygroupMembership::with_config(service.clone(), config);
    let additions = MemberAdditions::builder().clients(vec!["C1".into(), "C1".into()]).build();

    let report = membership.add_members("a/b/c", &additions).await.unwrap();

    assert_eq!(report.outcomes.len(), 1);
    assert_eq!(
        service.mutation_calls(),
        vec![
            NamingCall::CreateKeygroup(keygroup_id("a/b/c")),
            NamingCall::AddClient(keygroup_id("a/b/c"), ClientId::new("C1")),
        ]
    );
}

#[tokio::test]
async fn configured_defaults_are_used_for_new_keygroups() {
    let service = service().await;
    let config = MembershipConfig::builder().default_secret("k3ygr0up").build();
    let membership = KeygroupMembership::with_config(service.clone(), config);

    membership.add_members("a/b/c", &MemberAdditions::default()).await.unwrap();

    assert_eq!(service.keygroup(&keygroup_id("a/b/c")).unwrap().encryption_secret(), "k3ygr0up");
}
