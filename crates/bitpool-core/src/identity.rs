// crates/bitpool-core/src/identity.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

/// Identifier of a withdrawal request (UUID v7 for time-ordering).
pub type RequestId = Uuid;

/// Opaque identity of a pool member (e.g. "Alice M.").
///
/// The engine only compares identities; how they are issued and
/// authenticated is the membership provider's concern.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(String);

impl MemberId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MemberId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for MemberId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An ordered roster of eligible members.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRoster {
    members: BTreeSet<MemberId>,
}

impl MemberRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a member. Returns `false` if already present.
    pub fn add(&mut self, member: MemberId) -> bool {
        self.members.insert(member)
    }

    /// Remove a member. Returns `false` if absent.
    pub fn remove(&mut self, member: &MemberId) -> bool {
        self.members.remove(member)
    }

    pub fn contains(&self, member: &MemberId) -> bool {
        self.members.contains(member)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MemberId> {
        self.members.iter()
    }
}

impl<M: Into<MemberId>> FromIterator<M> for MemberRoster {
    fn from_iter<I: IntoIterator<Item = M>>(iter: I) -> Self {
        Self {
            members: iter.into_iter().map(Into::into).collect(),
        }
    }
}
