//! In-memory naming service implementation.
//!
//! This module provides [`MemoryNamingService`], an in-process implementation
//! of [`NamingService`] and [`NodeRegistry`] suitable for testing and local
//! development.
//!
//! # Behavior
//!
//! The in-memory service follows the rules of the real naming service:
//!
//! - Creating a keygroup that already exists is rejected
//! - Nodes and clients must be registered before they can join a keygroup
//! - Adding a member that is already present succeeds (a replica's lease is replaced)
//! - Deleting a member that is not present succeeds without effect
//! - [`delete_node`](NamingService::delete_node) removes the node from replica *and* trigger
//!   membership
//!
//! Every trait call is appended to a journal of [`NamingCall`]s, so tests can
//! assert exactly which requests reached the service.
//!
//! # Example
//!
//! ```
//! use fogbase_naming::{
//!     EncryptionAlgorithm, KeygroupConfig, MemoryNamingService, NamingService,
//!     NodeConfig, NodeId, NodeRegistry, ReplicaNodeConfig, TimeToLive,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = MemoryNamingService::new();
//!     service.create_node_config(&NodeConfig::new(NodeId::new("N1"))).await?;
//!
//!     let id = "app/tenant/group".parse()?;
//!     service.create_keygroup(&KeygroupConfig::new(id, "secret", EncryptionAlgorithm::Aes)).await?;
//!
//!     let id = "app/tenant/group".parse()?;
//!     let replica = ReplicaNodeConfig::new(NodeId::new("N1"), TimeToLive::Seconds(60));
//!     service.add_replica_node(&id, &replica).await?;
//!
//!     assert!(service.keygroup(&id).is_some_and(|c| c.contains_replica_node(&NodeId::new("N1"))));
//!     assert_eq!(service.mutation_calls().len(), 2);
//!     Ok(())
//! }
//! ```

use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::{
    error::{NamingError, NamingResult},
    model::{ClientConfig, KeygroupConfig, NodeConfig, ReplicaNodeConfig, TriggerNodeConfig},
    service::{NamingService, NodeRegistry},
    types::{ClientId, KeygroupId, NodeId},
};

/// One request received by a [`MemoryNamingService`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum NamingCall {
    /// [`NamingService::get_keygroup_config`].
    GetKeygroupConfig(KeygroupId),
    /// [`NamingService::create_keygroup`].
    CreateKeygroup(KeygroupId),
    /// [`NamingService::add_client`].
    AddClient(KeygroupId, ClientId),
    /// [`NamingService::delete_client`].
    DeleteClient(KeygroupId, ClientId),
    /// [`NamingService::add_replica_node`].
    AddReplicaNode(KeygroupId, ReplicaNodeConfig),
    /// [`NamingService::add_trigger_node`].
    AddTriggerNode(KeygroupId, NodeId),
    /// [`NamingService::delete_node`].
    DeleteNode(KeygroupId, NodeId),
    /// [`NodeRegistry::create_node_config`].
    CreateNodeConfig(NodeId),
    /// [`NodeRegistry::create_client_config`].
    CreateClientConfig(ClientId),
}

impl NamingCall {
    /// Returns `true` for calls that change keygroup membership or create a
    /// keygroup. Reads and registrations are not mutations.
    #[must_use]
    pub fn is_keygroup_mutation(&self) -> bool {
        !matches!(
            self,
            Self::GetKeygroupConfig(_) | Self::CreateNodeConfig(_) | Self::CreateClientConfig(_)
        )
    }
}

#[derive(Default)]
struct State {
    keygroups: BTreeMap<KeygroupId, KeygroupConfig>,
    nodes: BTreeMap<NodeId, NodeConfig>,
    clients: BTreeMap<ClientId, ClientConfig>,
    calls: Vec<NamingCall>,
}

impl State {
    fn keygroup_mut(&mut self, keygroup: &KeygroupId) -> NamingResult<&mut KeygroupConfig> {
        self.keygroups.get_mut(keygroup).ok_or_else(|| NamingError::not_found(keygroup.to_string()))
    }

    fn require_node(&self, node: &NodeId) -> NamingResult<()> {
        if self.nodes.contains_key(node) {
            Ok(())
        } else {
            Err(NamingError::rejected(format!("node {node} is not registered")))
        }
    }

    fn require_client(&self, client: &ClientId) -> NamingResult<()> {
        if self.clients.contains_key(client) {
            Ok(())
        } else {
            Err(NamingError::rejected(format!("client {client} is not registered")))
        }
    }
}

/// In-memory naming service.
///
/// # Cloning
///
/// `MemoryNamingService` is cheaply cloneable via [`Arc`]. All clones share
/// the same keygroups, registrations and call journal.
#[derive(Clone, Default)]
pub struct MemoryNamingService {
    state: Arc<Mutex<State>>,
}

impl std::fmt::Debug for MemoryNamingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("MemoryNamingService")
            .field("keygroups", &state.keygroups.len())
            .field("nodes", &state.nodes.len())
            .field("clients", &state.clients.len())
            .field("calls", &state.calls.len())
            .finish()
    }
}

impl MemoryNamingService {
    /// Creates an empty naming service.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the stored configuration of `keygroup`.
    ///
    /// Not journaled.
    #[must_use]
    pub fn keygroup(&self, keygroup: &KeygroupId) -> Option<KeygroupConfig> {
        self.state.lock().keygroups.get(keygroup).cloned()
    }

    /// Stores `config` directly, replacing any existing keygroup with the
    /// same id. Not journaled; meant for seeding test fixtures.
    pub fn insert_keygroup(&self, config: KeygroupConfig) {
        self.state.lock().keygroups.insert(config.keygroup_id().clone(), config);
    }

    /// Returns `true` if `node` is registered.
    #[must_use]
    pub fn is_node_registered(&self, node: &NodeId) -> bool {
        self.state.lock().nodes.contains_key(node)
    }

    /// Returns `true` if `client` is registered.
    #[must_use]
    pub fn is_client_registered(&self, client: &ClientId) -> bool {
        self.state.lock().clients.contains_key(client)
    }

    /// Returns every call received so far, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<NamingCall> {
        self.state.lock().calls.clone()
    }

    /// Returns the calls that created a keygroup or changed its membership.
    #[must_use]
    pub fn mutation_calls(&self) -> Vec<NamingCall> {
        self.state.lock().calls.iter().filter(|c| c.is_keygroup_mutation()).cloned().collect()
    }

    /// Empties the call journal.
    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }
}

#[async_trait]
impl NamingService for MemoryNamingService {
    #[tracing::instrument(skip(self), fields(keygroup = %keygroup))]
    async fn get_keygroup_config(
        &self,
        keygroup: &KeygroupId,
    ) -> NamingResult<Option<KeygroupConfig>> {
        let mut state = self.state.lock();
        state.calls.push(NamingCall::GetKeygroupConfig(keygroup.clone()));
        Ok(state.keygroups.get(keygroup).cloned())
    }

    #[tracing::instrument(skip(self, config), fields(keygroup = %config.keygroup_id()))]
    async fn create_keygroup(&self, config: &KeygroupConfig) -> NamingResult<()> {
        let mut state = self.state.lock();
        let id = config.keygroup_id().clone();
        state.calls.push(NamingCall::CreateKeygroup(id.clone()));

        if state.keygroups.contains_key(&id) {
            return Err(NamingError::rejected(format!("keygroup {id} already exists")));
        }
        state.keygroups.insert(id, config.clone());
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(keygroup = %keygroup, client = %client))]
    async fn add_client(&self, keygroup: &KeygroupId, client: &ClientId) -> NamingResult<()> {
        let mut state = self.state.lock();
        state.calls.push(NamingCall::AddClient(keygroup.clone(), client.clone()));

        state.require_client(client)?;
        state.keygroup_mut(keygroup)?.insert_client(client.clone());
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(keygroup = %keygroup, client = %client))]
    async fn delete_client(&self, keygroup: &KeygroupId, client: &ClientId) -> NamingResult<()> {
        let mut state = self.state.lock();
        state.calls.push(NamingCall::DeleteClient(keygroup.clone(), client.clone()));

        state.keygroup_mut(keygroup)?.remove_client(client);
        Ok(())
    }

    #[tracing::instrument(skip(self, replica), fields(keygroup = %keygroup, node = %replica.node_id))]
    async fn add_replica_node(
        &self,
        keygroup: &KeygroupId,
        replica: &ReplicaNodeConfig,
    ) -> NamingResult<()> {
        let mut state = self.state.lock();
        state.calls.push(NamingCall::AddReplicaNode(keygroup.clone(), replica.clone()));

        state.require_node(&replica.node_id)?;
        state.keygroup_mut(keygroup)?.insert_replica_node(replica.clone());
        Ok(())
    }

    #[tracing::instrument(skip(self, trigger), fields(keygroup = %keygroup, node = %trigger.node_id))]
    async fn add_trigger_node(
        &self,
        keygroup: &KeygroupId,
        trigger: &TriggerNodeConfig,
    ) -> NamingResult<()> {
        let mut state = self.state.lock();
        state.calls.push(NamingCall::AddTriggerNode(keygroup.clone(), trigger.node_id.clone()));

        state.require_node(&trigger.node_id)?;
        state.keygroup_mut(keygroup)?.insert_trigger_node(trigger.clone());
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(keygroup = %keygroup, node = %node))]
    async fn delete_node(&self, keygroup: &KeygroupId, node: &NodeId) -> NamingResult<()> {
        let mut state = self.state.lock();
        state.calls.push(NamingCall::DeleteNode(keygroup.clone(), node.clone()));

        state.keygroup_mut(keygroup)?.remove_node(node);
        Ok(())
    }
}

#[async_trait]
impl NodeRegistry for MemoryNamingService {
    #[tracing::instrument(skip(self, node), fields(node = %node.node_id))]
    async fn create_node_config(&self, node: &NodeConfig) -> NamingResult<()> {
        let mut state = self.state.lock();
        state.calls.push(NamingCall::CreateNodeConfig(node.node_id.clone()));

        if state.nodes.contains_key(&node.node_id) {
            return Err(NamingError::rejected(format!("node {} already exists", node.node_id)));
        }
        state.nodes.insert(node.node_id.clone(), node.clone());
        Ok(())
    }

    #[tracing::instrument(skip(self, client), fields(client = %client.client_id))]
    async fn create_client_config(&self, client: &ClientConfig) -> NamingResult<()> {
        let mut state = self.state.lock();
        state.calls.push(NamingCall::CreateClientConfig(client.client_id.clone()));

        if state.clients.contains_key(&client.client_id) {
            return Err(NamingError::rejected(format!(
                "client {} already exists",
                client.client_id
            )));
        }
        state.clients.insert(client.client_id.clone(), client.clone());
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::types::{EncryptionAlgorithm, TimeToLive};

    fn id(raw: &str) -> KeygroupId {
        raw.parse().expect("valid keygroup id")
    }

    async fn service_with_keygroup() -> MemoryNamingService {
        let service = MemoryNamingService::new();
        service.create_node_config(&NodeConfig::new(NodeId::new("N1"))).await.unwrap();
        service.create_client_config(&ClientConfig::new(ClientId::new("C1"))).await.unwrap();
        service
            .create_keygroup(&KeygroupConfig::new(id("a/b/c"), "passw", EncryptionAlgorithm::Aes))
            .await
            .unwrap();
        service.clear_calls();
        service
    }

    #[tokio::test]
    async fn test_get_missing_keygroup_returns_none() {
        let service = MemoryNamingService::new();
        assert!(service.get_keygroup_config(&id("a/b/c")).await.unwrap().is_none());
        assert_eq!(service.calls(), vec![NamingCall::GetKeygroupConfig(id("a/b/c"))]);
    }

    #[tokio::test]
    async fn test_create_existing_keygroup_is_rejected() {
        let service = service_with_keygroup().await;
        let result = service
            .create_keygroup(&KeygroupConfig::new(id("a/b/c"), "other", EncryptionAlgorithm::Aes))
            .await;

        assert!(matches!(result, Err(NamingError::Rejected { .. })));
        assert_eq!(service.keygroup(&id("a/b/c")).unwrap().encryption_secret(), "passw");
    }

    #[tokio::test]
    async fn test_add_unregistered_node_is_rejected() {
        let service = service_with_keygroup().await;
        let replica = ReplicaNodeConfig::new(NodeId::new("N9"), TimeToLive::Unbounded);

        let result = service.add_replica_node(&id("a/b/c"), &replica).await;
        assert!(matches!(result, Err(NamingError::Rejected { .. })));

        let result = service.add_trigger_node(&id("a/b/c"), &TriggerNodeConfig::new(NodeId::new("N9"))).await;
        assert!(matches!(result, Err(NamingError::Rejected { .. })));
    }

    #[tokio::test]
    async fn test_add_unregistered_client_is_rejected() {
        let service = service_with_keygroup().await;
        let result = service.add_client(&id("a/b/c"), &ClientId::new("C9")).await;
        assert!(matches!(result, Err(NamingError::Rejected { .. })));
    }

    #[tokio::test]
    async fn test_mutation_on_missing_keygroup_is_not_found() {
        let service = service_with_keygroup().await;
        let result = service.add_client(&id("x/y/z"), &ClientId::new("C1")).await;
        assert!(matches!(result, Err(NamingError::NotFound { .. })));

        let result = service.delete_node(&id("x/y/z"), &NodeId::new("N1")).await;
        assert!(matches!(result, Err(NamingError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_add_then_delete_members() {
        let service = service_with_keygroup().await;
        let kg = id("a/b/c");
        let node = NodeId::new("N1");

        service.add_client(&kg, &ClientId::new("C1")).await.unwrap();
        service.add_replica_node(&kg, &ReplicaNodeConfig::new(node.clone(), TimeToLive::Seconds(120))).await.unwrap();
        service.add_trigger_node(&kg, &TriggerNodeConfig::new(node.clone())).await.unwrap();

        let config = service.keygroup(&kg).unwrap();
        assert!(config.contains_client(&ClientId::new("C1")));
        assert_eq!(config.replica_node(&node).unwrap().time_to_live, TimeToLive::Seconds(120));
        assert!(config.contains_trigger_node(&node));

        service.delete_client(&kg, &ClientId::new("C1")).await.unwrap();
        service.delete_node(&kg, &node).await.unwrap();

        assert!(service.keygroup(&kg).unwrap().has_no_members());
        assert_eq!(service.mutation_calls().len(), 5);
    }

    #[tokio::test]
    async fn test_delete_of_non_member_is_noop() {
        let service = service_with_keygroup().await;
        let kg = id("a/b/c");

        service.delete_client(&kg, &ClientId::new("C1")).await.unwrap();
        service.delete_node(&kg, &NodeId::new("N1")).await.unwrap();

        assert!(service.keygroup(&kg).unwrap().has_no_members());
    }

    #[tokio::test]
    async fn test_duplicate_registration_is_rejected() {
        let service = MemoryNamingService::new();
        service.create_node_config(&NodeConfig::new(NodeId::new("N1"))).await.unwrap();

        let result = service.create_node_config(&NodeConfig::new(NodeId::new("N1"))).await;
        assert!(matches!(result, Err(NamingError::Rejected { .. })));
        assert!(service.is_node_registered(&NodeId::new("N1")));
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let service = service_with_keygroup().await;
        let clone = service.clone();

        clone.add_client(&id("a/b/c"), &ClientId::new("C1")).await.unwrap();

        assert!(service.keygroup(&id("a/b/c")).unwrap().contains_client(&ClientId::new("C1")));
        assert_eq!(service.calls().len(), 1);
    }

    #[test]
    fn test_journal_classification() {
        assert!(!NamingCall::GetKeygroupConfig(id("a/b/c")).is_keygroup_mutation());
        assert!(!NamingCall::CreateNodeConfig(NodeId::new("N1")).is_keygroup_mutation());
        assert!(NamingCall::CreateKeygroup(id("a/b/c")).is_keygroup_mutation());
        assert!(NamingCall::DeleteNode(id("a/b/c"), NodeId::new("N1")).is_keygroup_mutation());
    }
}
