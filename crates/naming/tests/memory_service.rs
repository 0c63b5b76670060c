//! Integration tests for `MemoryNamingService` through the public trait
//! surface: membership lifecycle, journal contents and concurrent use from
//! cloned handles.

#![allow(clippy::expect_used, clippy::panic, clippy::unwrap_used)]

use fogbase_naming::{
    ClientId, MemoryNamingService, NamingCall, NamingService, NodeId,
    ReplicaNodeConfig, TimeToLive, TriggerNodeConfig, assert_naming_not_found, assert_naming_ok,
    assert_naming_rejected,
    testutil::{empty_keygroup, keygroup_id, registered_service},
};

#[tokio::test]
async fn keygroup_lifecycle_is_journaled_in_order() {
    let service = registered_service(&["N1", "N2"], &["C1"]).await;
    let kg = keygroup_id("a/b/c");

    assert!(assert_naming_ok!(service.get_keygroup_config(&kg).await).is_none());
    assert_naming_ok!(service.create_keygroup(&empty_keygroup("a/b/c")).await);
    assert_naming_ok!(service.add_client(&kg, &ClientId::new("C1")).await);
    assert_naming_ok!(
        service
            .add_replica_node(&kg, &ReplicaNodeConfig::new(NodeId::new("N2"), TimeToLive::Seconds(120)))
            .await
    );
    assert_naming_ok!(service.add_trigger_node(&kg, &TriggerNodeConfig::new(NodeId::new("N1"))).await);

    assert_eq!(
        service.calls(),
        vec![
            NamingCall::GetKeygroupConfig(kg.clone()),
            NamingCall::CreateKeygroup(kg.clone()),
            NamingCall::AddClient(kg.clone(), ClientId::new("C1")),
            NamingCall::AddReplicaNode(
                kg.clone(),
                ReplicaNodeConfig::new(NodeId::new("N2"), TimeToLive::Seconds(120))
            ),
            NamingCall::AddTriggerNode(kg.clone(), NodeId::new("N1")),
        ]
    );

    let config = assert_naming_ok!(service.get_keygroup_config(&kg).await).expect("keygroup exists");
    assert!(config.contains_client(&ClientId::new("C1")));
    assert!(config.contains_replica_node(&NodeId::new("N2")));
    assert!(config.contains_trigger_node(&NodeId::new("N1")));
}

#[tokio::test]
async fn snapshot_is_detached_from_service_state() {
    let service = registered_service(&[], &["C1"]).await;
    service.insert_keygroup(empty_keygroup("a/b/c"));
    let kg = keygroup_id("a/b/c");

    let before = service.get_keygroup_config(&kg).await.unwrap().unwrap();
    service.add_client(&kg, &ClientId::new("C1")).await.unwrap();

    assert!(!before.contains_client(&ClientId::new("C1")));
    assert!(service.keygroup(&kg).unwrap().contains_client(&ClientId::new("C1")));
}

#[tokio::test]
async fn service_rules_are_enforced() {
    let service = registered_service(&["N1"], &[]).await;
    let kg = keygroup_id("a/b/c");

    assert_naming_not_found!(service.add_trigger_node(&kg, &TriggerNodeConfig::new(NodeId::new("N1"))).await);

    service.create_keygroup(&empty_keygroup("a/b/c")).await.unwrap();
    assert_naming_rejected!(service.create_keygroup(&empty_keygroup("a/b/c")).await);
    assert_naming_rejected!(service.add_client(&kg, &ClientId::new("C1")).await);
}

#[tokio::test]
async fn concurrent_adds_from_clones_all_land() {
    let nodes: Vec<String> = (0..16).map(|i| format!("N{i}")).collect();
    let node_refs: Vec<&str> = nodes.iter().map(String::as_str).collect();
    let service = registered_service(&node_refs, &[]).await;
    service.insert_keygroup(empty_keygroup("a/b/c"));

    let mut handles = Vec::new();
    for node in nodes.clone() {
        let service: MemoryNamingService = service.clone();
        handles.push(tokio::spawn(async move {
            let replica = ReplicaNodeConfig::new(NodeId::new(node), TimeToLive::Unbounded);
            service.add_replica_node(&keygroup_id("a/b/c"), &replica).await
        }));
    }
    for handle in handles {
        handle.await.expect("task panicked").expect("add_replica_node failed");
    }

    let config = service.keygroup(&keygroup_id("a/b/c")).unwrap();
    assert_eq!(config.replica_nodes().count(), nodes.len());
    assert_eq!(service.mutation_calls().len(), nodes.len());
}
