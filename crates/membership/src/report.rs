//! Per-member results of a membership operation.

use fogbase_naming::{KeygroupId, NamingError};

use crate::member::{Direction, Member, MemberCategory};

/// What happened to one requested member.
#[derive(Debug, Clone)]
pub enum MemberStatus {
    /// The naming service acknowledged the add or delete.
    Applied,
    /// Add skipped: the member was already present.
    AlreadyMember,
    /// Remove skipped: the member was not present.
    NotMember,
    /// The add or delete call failed. Other members were still processed.
    Failed(NamingError),
}

impl MemberStatus {
    /// Returns `true` for [`AlreadyMember`](Self::AlreadyMember) and
    /// [`NotMember`](Self::NotMember).
    #[must_use]
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::AlreadyMember | Self::NotMember)
    }
}

/// Result for one requested member.
#[derive(Debug, Clone)]
pub struct MemberOutcome {
    /// The member as requested.
    pub member: Member,
    /// Whether it was to be added or removed.
    pub direction: Direction,
    /// What happened.
    pub status: MemberStatus,
}

impl MemberOutcome {
    /// Returns the member's category.
    #[must_use]
    pub fn category(&self) -> MemberCategory {
        self.member.category()
    }
}

/// Result of [`add_members`](crate::KeygroupMembership::add_members) or
/// [`remove_members`](crate::KeygroupMembership::remove_members).
///
/// Outcomes are ordered by category (clients, replica nodes, trigger nodes)
/// and by input order within a category.
#[derive(Debug, Clone)]
pub struct MembershipReport {
    /// The keygroup that was reconciled.
    pub keygroup: KeygroupId,
    /// `true` if the keygroup was created by this operation.
    pub created: bool,
    /// One entry per requested member.
    pub outcomes: Vec<MemberOutcome>,
}

impl MembershipReport {
    /// Outcomes whose change was applied.
    pub fn applied(&self) -> impl Iterator<Item = &MemberOutcome> {
        self.outcomes.iter().filter(|o| matches!(o.status, MemberStatus::Applied))
    }

    /// Outcomes that needed no change.
    pub fn skipped(&self) -> impl Iterator<Item = &MemberOutcome> {
        self.outcomes.iter().filter(|o| o.status.is_skipped())
    }

    /// Outcomes whose naming-service call failed.
    pub fn failures(&self) -> impl Iterator<Item = &MemberOutcome> {
        self.outcomes.iter().filter(|o| matches!(o.status, MemberStatus::Failed(_)))
    }

    /// Outcomes of one category.
    pub fn category(&self, category: MemberCategory) -> impl Iterator<Item = &MemberOutcome> {
        self.outcomes.iter().filter(move |o| o.category() == category)
    }

    /// Returns `true` if no member failed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures().next().is_none()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use fogbase_naming::{ClientId, NodeId};

    use super::*;

    fn outcome(member: Member, status: MemberStatus) -> MemberOutcome {
        MemberOutcome { member, direction: Direction::Add, status }
    }

    #[test]
    fn test_report_partitions_outcomes() {
        let report = MembershipReport {
            keygroup: "a/b/c".parse().unwrap(),
            created: false,
            outcomes: vec![
                outcome(Member::Client(ClientId::new("C1")), MemberStatus::Applied),
                outcome(Member::Client(ClientId::new("C2")), MemberStatus::AlreadyMember),
                outcome(
                    Member::ReplicaNode(NodeId::new("N1")),
                    MemberStatus::Failed(NamingError::timeout()),
                ),
                outcome(Member::TriggerNode(NodeId::new("N1")), MemberStatus::Applied),
            ],
        };

        assert_eq!(report.applied().count(), 2);
        assert_eq!(report.skipped().count(), 1);
        assert_eq!(report.failures().count(), 1);
        assert_eq!(report.category(MemberCategory::Client).count(), 2);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_empty_report_is_clean() {
        let report =
            MembershipReport { keygroup: "a/b/c".parse().unwrap(), created: true, outcomes: vec![] };
        assert!(report.is_clean());
    }
}
