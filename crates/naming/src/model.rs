//! Configuration records held by the naming service.
//!
//! [`KeygroupConfig`] is the authoritative aggregate for one keygroup. The
//! naming service owns it; clients only ever see a point-in-time copy.
//! [`NodeConfig`] and [`ClientConfig`] are the registration records a node
//! or client must have before it can be referenced by a keygroup.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

use serde::{Deserialize, Serialize};

use crate::types::{ClientId, EncryptionAlgorithm, KeygroupId, NodeId, TimeToLive};

/// Membership record of a replica node: the node and its lease.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReplicaNodeConfig {
    /// The replicating node.
    #[serde(rename = "nodeID")]
    pub node_id: NodeId,
    /// Lease after which the node stops replicating the keygroup.
    #[serde(rename = "timeToLive", default)]
    pub time_to_live: TimeToLive,
}

impl ReplicaNodeConfig {
    /// Creates a replica membership record.
    #[must_use]
    pub fn new(node_id: NodeId, time_to_live: TimeToLive) -> Self {
        Self { node_id, time_to_live }
    }
}

/// Membership record of a trigger node.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TriggerNodeConfig {
    /// The notified node.
    #[serde(rename = "nodeID")]
    pub node_id: NodeId,
}

impl TriggerNodeConfig {
    /// Creates a trigger membership record.
    #[must_use]
    pub fn new(node_id: NodeId) -> Self {
        Self { node_id }
    }
}

/// Authoritative configuration of one keygroup.
///
/// Member collections have set semantics keyed by identifier: a client,
/// replica node or trigger node appears at most once, even though the wire
/// representation is list-shaped. Adding a replica node that is already
/// present replaces its lease.
///
/// The encryption secret is redacted from the `Debug` output.
///
/// # Example
///
/// ```
/// use fogbase_naming::{
///     ClientId, EncryptionAlgorithm, KeygroupConfig, NodeId, ReplicaNodeConfig, TimeToLive,
/// };
///
/// let mut config = KeygroupConfig::new("a/b/c".parse()?, "secret", EncryptionAlgorithm::Aes);
/// assert!(config.has_no_members());
///
/// assert!(config.insert_client(ClientId::new("C1")));
/// assert!(!config.insert_client(ClientId::new("C1")));
/// config.insert_replica_node(ReplicaNodeConfig::new(NodeId::new("N1"), TimeToLive::Seconds(60)));
///
/// assert!(config.contains_client(&ClientId::new("C1")));
/// assert!(config.contains_replica_node(&NodeId::new("N1")));
/// assert!(!config.contains_trigger_node(&NodeId::new("N1")));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "KeygroupConfigWire", into = "KeygroupConfigWire")]
pub struct KeygroupConfig {
    keygroup_id: KeygroupId,
    encryption_secret: String,
    encryption_algorithm: EncryptionAlgorithm,
    clients: BTreeSet<ClientId>,
    replica_nodes: BTreeMap<NodeId, TimeToLive>,
    trigger_nodes: BTreeSet<NodeId>,
}

impl KeygroupConfig {
    /// Creates a configuration with empty membership.
    #[must_use]
    pub fn new(
        keygroup_id: KeygroupId,
        encryption_secret: impl Into<String>,
        encryption_algorithm: EncryptionAlgorithm,
    ) -> Self {
        Self {
            keygroup_id,
            encryption_secret: encryption_secret.into(),
            encryption_algorithm,
            clients: BTreeSet::new(),
            replica_nodes: BTreeMap::new(),
            trigger_nodes: BTreeSet::new(),
        }
    }

    /// Returns the keygroup identifier.
    #[must_use]
    pub fn keygroup_id(&self) -> &KeygroupId {
        &self.keygroup_id
    }

    /// Returns the shared encryption secret.
    #[must_use]
    pub fn encryption_secret(&self) -> &str {
        &self.encryption_secret
    }

    /// Returns the encryption algorithm.
    #[must_use]
    pub fn encryption_algorithm(&self) -> EncryptionAlgorithm {
        self.encryption_algorithm
    }

    /// Returns `true` if no client, replica node or trigger node is a member.
    #[must_use]
    pub fn has_no_members(&self) -> bool {
        self.clients.is_empty() && self.replica_nodes.is_empty() && self.trigger_nodes.is_empty()
    }

    /// Iterates over the authorized clients in identifier order.
    pub fn clients(&self) -> impl Iterator<Item = &ClientId> {
        self.clients.iter()
    }

    /// Iterates over the replica memberships in identifier order.
    pub fn replica_nodes(&self) -> impl Iterator<Item = ReplicaNodeConfig> + '_ {
        self.replica_nodes.iter().map(|(node, ttl)| ReplicaNodeConfig::new(node.clone(), *ttl))
    }

    /// Iterates over the trigger memberships in identifier order.
    pub fn trigger_nodes(&self) -> impl Iterator<Item = TriggerNodeConfig> + '_ {
        self.trigger_nodes.iter().cloned().map(TriggerNodeConfig::new)
    }

    /// Returns `true` if the client is authorized on this keygroup.
    #[must_use]
    pub fn contains_client(&self, client: &ClientId) -> bool {
        self.clients.contains(client)
    }

    /// Returns `true` if the node replicates this keygroup.
    #[must_use]
    pub fn contains_replica_node(&self, node: &NodeId) -> bool {
        self.replica_nodes.contains_key(node)
    }

    /// Returns `true` if the node is notified about changes of this keygroup.
    #[must_use]
    pub fn contains_trigger_node(&self, node: &NodeId) -> bool {
        self.trigger_nodes.contains(node)
    }

    /// Returns the replica membership of `node`, if any.
    #[must_use]
    pub fn replica_node(&self, node: &NodeId) -> Option<ReplicaNodeConfig> {
        self.replica_nodes.get(node).map(|ttl| ReplicaNodeConfig::new(node.clone(), *ttl))
    }

    /// Adds a client. Returns `false` if it was already a member.
    pub fn insert_client(&mut self, client: ClientId) -> bool {
        self.clients.insert(client)
    }

    /// Removes a client. Returns `false` if it was not a member.
    pub fn remove_client(&mut self, client: &ClientId) -> bool {
        self.clients.remove(client)
    }

    /// Adds or replaces a replica membership. Returns `false` if the node
    /// was already a replica (its lease is replaced regardless).
    pub fn insert_replica_node(&mut self, replica: ReplicaNodeConfig) -> bool {
        self.replica_nodes.insert(replica.node_id, replica.time_to_live).is_none()
    }

    /// Adds a trigger membership. Returns `false` if it was already present.
    pub fn insert_trigger_node(&mut self, trigger: TriggerNodeConfig) -> bool {
        self.trigger_nodes.insert(trigger.node_id)
    }

    /// Removes `node` from replica and trigger membership.
    ///
    /// Returns `true` if the node was a member in either role.
    pub fn remove_node(&mut self, node: &NodeId) -> bool {
        let replica = self.replica_nodes.remove(node).is_some();
        let trigger = self.trigger_nodes.remove(node);
        replica || trigger
    }
}

impl fmt::Debug for KeygroupConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeygroupConfig")
            .field("keygroup_id", &self.keygroup_id)
            .field("encryption_secret", &"<redacted>")
            .field("encryption_algorithm", &self.encryption_algorithm)
            .field("clients", &self.clients)
            .field("replica_nodes", &self.replica_nodes)
            .field("trigger_nodes", &self.trigger_nodes)
            .finish()
    }
}

/// List-shaped wire form of [`KeygroupConfig`].
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeygroupConfigWire {
    #[serde(rename = "keygroupID")]
    keygroup_id: KeygroupId,
    encryption_secret: String,
    encryption_algorithm: EncryptionAlgorithm,
    #[serde(default)]
    clients: Vec<ClientId>,
    #[serde(default)]
    replica_nodes: Vec<ReplicaNodeConfig>,
    #[serde(default)]
    trigger_nodes: Vec<TriggerNodeConfig>,
}

impl From<KeygroupConfigWire> for KeygroupConfig {
    fn from(wire: KeygroupConfigWire) -> Self {
        let mut config =
            Self::new(wire.keygroup_id, wire.encryption_secret, wire.encryption_algorithm);
        config.clients.extend(wire.clients);
        for replica in wire.replica_nodes {
            config.insert_replica_node(replica);
        }
        config.trigger_nodes.extend(wire.trigger_nodes.into_iter().map(|t| t.node_id));
        config
    }
}

impl From<KeygroupConfig> for KeygroupConfigWire {
    fn from(config: KeygroupConfig) -> Self {
        Self {
            replica_nodes: config.replica_nodes().collect(),
            trigger_nodes: config.trigger_nodes().collect(),
            clients: config.clients.into_iter().collect(),
            keygroup_id: config.keygroup_id,
            encryption_secret: config.encryption_secret,
            encryption_algorithm: config.encryption_algorithm,
        }
    }
}

/// Registration record of a node.
///
/// Only the identifier matters for keygroup membership; the remaining
/// fields describe how other nodes reach this one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeConfig {
    /// Node identifier.
    #[serde(rename = "nodeID")]
    pub node_id: NodeId,
    /// Public key used to encrypt messages sent to the node.
    #[serde(default)]
    pub public_key: Option<String>,
    /// Algorithm of [`public_key`](Self::public_key).
    #[serde(default = "asymmetric_default")]
    pub encryption_algorithm: EncryptionAlgorithm,
    /// Addresses of the machines that make up the node.
    #[serde(default)]
    pub machines: Vec<String>,
    /// Port on which the node publishes data records.
    #[serde(default)]
    pub publisher_port: u16,
    /// Port on which the node accepts direct messages.
    #[serde(default)]
    pub message_port: u16,
    /// Port of the node's REST interface.
    #[serde(default)]
    pub rest_port: u16,
    /// Free-form location of the node.
    #[serde(default)]
    pub location: Option<String>,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
}

impl NodeConfig {
    /// Creates a registration record with only the identifier set.
    #[must_use]
    pub fn new(node_id: NodeId) -> Self {
        Self {
            node_id,
            public_key: None,
            encryption_algorithm: EncryptionAlgorithm::Rsa,
            machines: Vec::new(),
            publisher_port: 0,
            message_port: 0,
            rest_port: 0,
            location: None,
            description: None,
        }
    }
}

/// Registration record of a client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    /// Client identifier.
    #[serde(rename = "clientID")]
    pub client_id: ClientId,
    /// Public key of the client.
    #[serde(default)]
    pub public_key: Option<String>,
    /// Algorithm of [`public_key`](Self::public_key).
    #[serde(default = "asymmetric_default")]
    pub encryption_algorithm: EncryptionAlgorithm,
}

impl ClientConfig {
    /// Creates a registration record with only the identifier set.
    #[must_use]
    pub fn new(client_id: ClientId) -> Self {
        Self { client_id, public_key: None, encryption_algorithm: EncryptionAlgorithm::Rsa }
    }
}

fn asymmetric_default() -> EncryptionAlgorithm {
    EncryptionAlgorithm::Rsa
}
