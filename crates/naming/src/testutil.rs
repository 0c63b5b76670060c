//! Shared test utilities for naming-service clients.
//!
//! This module provides fixtures for building a populated
//! [`MemoryNamingService`], a [`FailingNamingService`] wrapper for failure
//! injection, and assertion macros on [`NamingResult`] values. It is
//! feature-gated behind `testutil` to prevent leaking into production builds.
//!
//! # Usage
//!
//! In integration tests, enable the feature in `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! fogbase-naming = { path = "../naming", features = ["testutil"] }
//! ```
//!
//! Then import helpers:
//!
//! ```no_run
//! // Requires the `testutil` feature to be enabled.
//! use fogbase_naming::testutil::{FailingNamingService, keygroup_id, registered_service};
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::{
    error::{NamingError, NamingResult},
    memory::MemoryNamingService,
    model::{ClientConfig, KeygroupConfig, NodeConfig, ReplicaNodeConfig, TriggerNodeConfig},
    service::{NamingService, NodeRegistry},
    types::{ClientId, EncryptionAlgorithm, KeygroupId, NodeId},
};

/// Parses a keygroup identifier.
///
/// # Panics
///
/// Panics if `raw` is not a valid `app/tenant/group` identifier.
#[must_use]
pub fn keygroup_id(raw: &str) -> KeygroupId {
    raw.parse().expect("invalid keygroup id in test fixture")
}

/// Creates a keygroup configuration with empty membership and the
/// placeholder secret `"passw"`.
#[must_use]
pub fn empty_keygroup(raw: &str) -> KeygroupConfig {
    KeygroupConfig::new(keygroup_id(raw), "passw", EncryptionAlgorithm::Aes)
}

/// Create a [`MemoryNamingService`] with the given nodes and clients
/// registered.
///
/// The call journal is cleared afterwards, so it only reflects calls made
/// by the test itself.
///
/// # Panics
///
/// Panics if a registration fails, which happens for duplicate identifiers.
pub async fn registered_service(nodes: &[&str], clients: &[&str]) -> MemoryNamingService {
    let service = MemoryNamingService::new();
    for node in nodes {
        service
            .create_node_config(&NodeConfig::new(NodeId::new(*node)))
            .await
            .expect("node registration failed");
    }
    for client in clients {
        service
            .create_client_config(&ClientConfig::new(ClientId::new(*client)))
            .await
            .expect("client registration failed");
    }
    service.clear_calls();
    service
}

/// The keygroup operations of [`NamingService`], used to select which calls
/// a [`FailingNamingService`] fails.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NamingOperation {
    /// [`NamingService::get_keygroup_config`].
    GetKeygroupConfig,
    /// [`NamingService::create_keygroup`].
    CreateKeygroup,
    /// [`NamingService::add_client`].
    AddClient,
    /// [`NamingService::delete_client`].
    DeleteClient,
    /// [`NamingService::add_replica_node`].
    AddReplicaNode,
    /// [`NamingService::add_trigger_node`].
    AddTriggerNode,
    /// [`NamingService::delete_node`].
    DeleteNode,
}

#[derive(Clone, Debug)]
struct FailureRule {
    operation: NamingOperation,
    member: Option<String>,
    remaining: Option<usize>,
}

/// A wrapper around [`MemoryNamingService`] that fails selected calls with
/// [`NamingError::Connection`].
///
/// A rule matches an operation, optionally restricted to one member
/// identifier, and fires either on every matching call or a fixed number of
/// times. Calls that fail never reach the inner service, so they are absent
/// from its journal.
///
/// Cloning shares the rules and the inner service.
#[derive(Clone, Debug, Default)]
pub struct FailingNamingService {
    inner: MemoryNamingService,
    rules: Arc<Mutex<Vec<FailureRule>>>,
}

impl FailingNamingService {
    /// Wraps `inner` without any failure rules.
    #[must_use]
    pub fn new(inner: MemoryNamingService) -> Self {
        Self { inner, rules: Arc::default() }
    }

    /// Returns the wrapped service.
    #[must_use]
    pub fn inner(&self) -> &MemoryNamingService {
        &self.inner
    }

    /// Fails every call of `operation`.
    pub fn fail(&self, operation: NamingOperation) -> &Self {
        self.rules.lock().push(FailureRule { operation, member: None, remaining: None });
        self
    }

    /// Fails every call of `operation` that targets `member`.
    pub fn fail_for(&self, operation: NamingOperation, member: impl Into<String>) -> &Self {
        self.rules.lock().push(FailureRule {
            operation,
            member: Some(member.into()),
            remaining: None,
        });
        self
    }

    /// Fails the next `times` calls of `operation`.
    pub fn fail_times(&self, operation: NamingOperation, times: usize) -> &Self {
        self.rules.lock().push(FailureRule { operation, member: None, remaining: Some(times) });
        self
    }

    fn check(&self, operation: NamingOperation, member: Option<&str>) -> NamingResult<()> {
        let mut rules = self.rules.lock();
        let hit = rules.iter_mut().find(|rule| {
            rule.operation == operation
                && rule.remaining != Some(0)
                && match (&rule.member, member) {
                    (None, _) => true,
                    (Some(expected), Some(actual)) => expected == actual,
                    (Some(_), None) => false,
                }
        });

        match hit {
            Some(rule) => {
                if let Some(remaining) = rule.remaining.as_mut() {
                    *remaining -= 1;
                }
                Err(NamingError::connection(format!("simulated {operation:?} failure")))
            },
            None => Ok(()),
        }
    }
}

#[async_trait]
impl NamingService for FailingNamingService {
    async fn get_keygroup_config(
        &self,
        keygroup: &KeygroupId,
    ) -> NamingResult<Option<KeygroupConfig>> {
        self.check(NamingOperation::GetKeygroupConfig, None)?;
        self.inner.get_keygroup_config(keygroup).await
    }

    async fn create_keygroup(&self, config: &KeygroupConfig) -> NamingResult<()> {
        self.check(NamingOperation::CreateKeygroup, None)?;
        self.inner.create_keygroup(config).await
    }

    async fn add_client(&self, keygroup: &KeygroupId, client: &ClientId) -> NamingResult<()> {
        self.check(NamingOperation::AddClient, Some(client.as_str()))?;
        self.inner.add_client(keygroup, client).await
    }

    async fn delete_client(&self, keygroup: &KeygroupId, client: &ClientId) -> NamingResult<()> {
        self.check(NamingOperation::DeleteClient, Some(client.as_str()))?;
        self.inner.delete_client(keygroup, client).await
    }

    async fn add_replica_node(
        &self,
        keygroup: &KeygroupId,
        replica: &ReplicaNodeConfig,
    ) -> NamingResult<()> {
        self.check(NamingOperation::AddReplicaNode, Some(replica.node_id.as_str()))?;
        self.inner.add_replica_node(keygroup, replica).await
    }

    async fn add_trigger_node(
        &self,
        keygroup: &KeygroupId,
        trigger: &TriggerNodeConfig,
    ) -> NamingResult<()> {
        self.check(NamingOperation::AddTriggerNode, Some(trigger.node_id.as_str()))?;
        self.inner.add_trigger_node(keygroup, trigger).await
    }

    async fn delete_node(&self, keygroup: &KeygroupId, node: &NodeId) -> NamingResult<()> {
        self.check(NamingOperation::DeleteNode, Some(node.as_str()))?;
        self.inner.delete_node(keygroup, node).await
    }
}

/// Assert that a [`NamingResult`] is `Ok`.
///
/// Returns the inner value on success, panics with a descriptive message
/// on failure.
///
/// # Examples
///
/// ```no_run
/// // Requires the `testutil` feature to be enabled.
/// use fogbase_naming::{NamingResult, assert_naming_ok};
///
/// let result: NamingResult<i32> = Ok(42);
/// let value = assert_naming_ok!(result);
/// assert_eq!(value, 42);
/// ```
#[macro_export]
macro_rules! assert_naming_ok {
    ($result:expr) => {
        match $result {
            Ok(val) => val,
            Err(e) => panic!("expected Ok, got NamingError: {e:?}"),
        }
    };
    ($result:expr, $msg:expr) => {
        match $result {
            Ok(val) => val,
            Err(e) => panic!("{}: expected Ok, got NamingError: {e:?}", $msg),
        }
    };
}

/// Assert that a [`NamingResult`] is a [`NamingError::NotFound`].
#[macro_export]
macro_rules! assert_naming_not_found {
    ($result:expr) => {
        assert!(
            matches!($result, Err($crate::error::NamingError::NotFound { .. })),
            "expected NamingError::NotFound, got: {:?}",
            $result,
        );
    };
}

/// Assert that a [`NamingResult`] is a [`NamingError::Rejected`].
#[macro_export]
macro_rules! assert_naming_rejected {
    ($result:expr) => {
        assert!(
            matches!($result, Err($crate::error::NamingError::Rejected { .. })),
            "expected NamingError::Rejected, got: {:?}",
            $result,
        );
    };
}
