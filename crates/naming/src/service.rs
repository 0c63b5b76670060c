//! Naming-service trait definitions.
//!
//! [`NamingService`] is the set of keygroup operations a client may ask the
//! naming service to perform. [`NodeRegistry`] covers registration of nodes
//! and clients, which has to happen before either can be referenced by a
//! keygroup.
//!
//! # Implementing a Naming Service
//!
//! 1. Implement [`NamingService`] (and [`NodeRegistry`] if registration is supported)
//! 2. Map transport-specific errors to [`NamingError`](crate::NamingError)
//! 3. Report a missing keygroup on reads as `Ok(None)`, not as an error
//!
//! See [`MemoryNamingService`](crate::MemoryNamingService) for a reference
//! implementation.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    error::NamingResult,
    model::{ClientConfig, KeygroupConfig, NodeConfig, ReplicaNodeConfig, TriggerNodeConfig},
    types::{ClientId, KeygroupId, NodeId},
};

/// Keygroup operations of the naming service.
///
/// Every method performs exactly one call to the service. Mutations return
/// `Ok(())` once the service acknowledged the request.
///
/// | Method | Description |
/// |--------|-------------|
/// | [`get_keygroup_config`](NamingService::get_keygroup_config) | Read a keygroup's configuration |
/// | [`create_keygroup`](NamingService::create_keygroup) | Create a keygroup |
/// | [`add_client`](NamingService::add_client) | Authorize a client |
/// | [`delete_client`](NamingService::delete_client) | Revoke a client |
/// | [`add_replica_node`](NamingService::add_replica_node) | Add a replica node with a lease |
/// | [`add_trigger_node`](NamingService::add_trigger_node) | Add a trigger node |
/// | [`delete_node`](NamingService::delete_node) | Remove a replica or trigger node |
#[async_trait]
pub trait NamingService: Send + Sync {
    /// Reads the configuration of a keygroup.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(config))` if the keygroup exists
    /// - `Ok(None)` if it does not
    /// - `Err(...)` on transport or service failures
    async fn get_keygroup_config(
        &self,
        keygroup: &KeygroupId,
    ) -> NamingResult<Option<KeygroupConfig>>;

    /// Creates a keygroup from the given configuration.
    ///
    /// What happens when the keygroup already exists is up to the service;
    /// callers are expected to read first.
    async fn create_keygroup(&self, config: &KeygroupConfig) -> NamingResult<()>;

    /// Authorizes a client on a keygroup.
    async fn add_client(&self, keygroup: &KeygroupId, client: &ClientId) -> NamingResult<()>;

    /// Revokes a client's authorization on a keygroup.
    async fn delete_client(&self, keygroup: &KeygroupId, client: &ClientId) -> NamingResult<()>;

    /// Adds a replica node to a keygroup.
    async fn add_replica_node(
        &self,
        keygroup: &KeygroupId,
        replica: &ReplicaNodeConfig,
    ) -> NamingResult<()>;

    /// Adds a trigger node to a keygroup.
    async fn add_trigger_node(
        &self,
        keygroup: &KeygroupId,
        trigger: &TriggerNodeConfig,
    ) -> NamingResult<()>;

    /// Removes a node from a keygroup.
    ///
    /// There is a single delete for both node roles; the service decides
    /// which membership the node loses.
    async fn delete_node(&self, keygroup: &KeygroupId, node: &NodeId) -> NamingResult<()>;
}

/// Registration of nodes and clients at the naming service.
#[async_trait]
pub trait NodeRegistry: Send + Sync {
    /// Registers a node.
    async fn create_node_config(&self, node: &NodeConfig) -> NamingResult<()>;

    /// Registers a client.
    async fn create_client_config(&self, client: &ClientConfig) -> NamingResult<()>;
}

#[async_trait]
impl<T: NamingService + ?Sized> NamingService for Arc<T> {
    async fn get_keygroup_config(
        &self,
        keygroup: &KeygroupId,
    ) -> NamingResult<Option<KeygroupConfig>> {
        (**self).get_keygroup_config(keygroup).await
    }

    async fn create_keygroup(&self, config: &KeygroupConfig) -> NamingResult<()> {
        (**self).create_keygroup(config).await
    }

    async fn add_client(&self, keygroup: &KeygroupId, client: &ClientId) -> NamingResult<()> {
        (**self).add_client(keygroup, client).await
    }

    async fn delete_client(&self, keygroup: &KeygroupId, client: &ClientId) -> NamingResult<()> {
        (**self).delete_client(keygroup, client).await
    }

    async fn add_replica_node(
        &self,
        keygroup: &KeygroupId,
        replica: &ReplicaNodeConfig,
    ) -> NamingResult<()> {
        (**self).add_replica_node(keygroup, replica).await
    }

    async fn add_trigger_node(
        &self,
        keygroup: &KeygroupId,
        trigger: &TriggerNodeConfig,
    ) -> NamingResult<()> {
        (**self).add_trigger_node(keygroup, trigger).await
    }

    async fn delete_node(&self, keygroup: &KeygroupId, node: &NodeId) -> NamingResult<()> {
        (**self).delete_node(keygroup, node).await
    }
}
