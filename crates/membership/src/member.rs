//! Members of a keygroup and the direction of a change.

use std::fmt;

use fogbase_naming::{ClientId, KeygroupConfig, NodeId};

/// The three membership facets of a keygroup, in reconciliation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MemberCategory {
    /// Clients authorized to use the keygroup.
    Client,
    /// Nodes storing the keygroup's data.
    ReplicaNode,
    /// Nodes notified about changes.
    TriggerNode,
}

impl fmt::Display for MemberCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Client => f.write_str("client"),
            Self::ReplicaNode => f.write_str("replica node"),
            Self::TriggerNode => f.write_str("trigger node"),
        }
    }
}

/// One client or node in one membership role.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Member {
    /// A client.
    Client(ClientId),
    /// A node in replica role.
    ReplicaNode(NodeId),
    /// A node in trigger role.
    TriggerNode(NodeId),
}

impl Member {
    /// Returns the category this member belongs to.
    #[must_use]
    pub fn category(&self) -> MemberCategory {
        match self {
            Self::Client(_) => MemberCategory::Client,
            Self::ReplicaNode(_) => MemberCategory::ReplicaNode,
            Self::TriggerNode(_) => MemberCategory::TriggerNode,
        }
    }

    /// Returns the client or node identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Client(client) => client.as_str(),
            Self::ReplicaNode(node) | Self::TriggerNode(node) => node.as_str(),
        }
    }

    /// Returns `true` if `config` lists this member in its role.
    #[must_use]
    pub fn is_member_of(&self, config: &KeygroupConfig) -> bool {
        match self {
            Self::Client(client) => config.contains_client(client),
            Self::ReplicaNode(node) => config.contains_replica_node(node),
            Self::TriggerNode(node) => config.contains_trigger_node(node),
        }
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.category(), self.id())
    }
}

/// Whether members are being added or removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Make the members part of the keygroup.
    Add,
    /// Take the members out of the keygroup.
    Remove,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add => f.write_str("add"),
            Self::Remove => f.write_str("remove"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use fogbase_naming::{EncryptionAlgorithm, ReplicaNodeConfig, TimeToLive};

    use super::*;

    #[test]
    fn test_membership_is_per_role() {
        let mut config =
            KeygroupConfig::new("a/b/c".parse().unwrap(), "passw", EncryptionAlgorithm::Aes);
        config.insert_replica_node(ReplicaNodeConfig::new(NodeId::new("N1"), TimeToLive::Unbounded));

        assert!(Member::ReplicaNode(NodeId::new("N1")).is_member_of(&config));
        assert!(!Member::TriggerNode(NodeId::new("N1")).is_member_of(&config));
        assert!(!Member::Client(ClientId::new("N1")).is_member_of(&config));
    }

    #[test]
    fn test_display() {
        assert_eq!(Member::Client(ClientId::new("C1")).to_string(), "client C1");
        assert_eq!(Member::ReplicaNode(NodeId::new("N2")).to_string(), "replica node N2");
        assert_eq!(Member::TriggerNode(NodeId::new("N3")).to_string(), "trigger node N3");
    }

    #[test]
    fn test_category_order() {
        assert!(MemberCategory::Client < MemberCategory::ReplicaNode);
        assert!(MemberCategory::ReplicaNode < MemberCategory::TriggerNode);
    }
}
