// crates/bitpool-core/src/traits.rs

use std::collections::{BTreeSet, HashSet};

use crate::identity::{MemberId, MemberRoster};

/// Source of the currently eligible member set.
///
/// Supplied by the caller (ledger, group registry). Consulted when a request
/// is opened and on every vote cast.
pub trait MembershipProvider {
    /// Whether `member` may currently vote or request withdrawals.
    fn is_member(&self, member: &MemberId) -> bool;

    /// Number of currently eligible members.
    fn member_count(&self) -> usize;
}

impl MembershipProvider for HashSet<MemberId> {
    fn is_member(&self, member: &MemberId) -> bool {
        self.contains(member)
    }

    fn member_count(&self) -> usize {
        self.len()
    }
}

impl MembershipProvider for BTreeSet<MemberId> {
    fn is_member(&self, member: &MemberId) -> bool {
        self.contains(member)
    }

    fn member_count(&self) -> usize {
        self.len()
    }
}

impl MembershipProvider for MemberRoster {
    fn is_member(&self, member: &MemberId) -> bool {
        self.contains(member)
    }

    fn member_count(&self) -> usize {
        self.len()
    }
}
