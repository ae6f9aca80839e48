//! Channel permission overwrites.

use serde::Deserialize;

use super::flexible_u64;

/// Whether an overwrite targets a role or a single member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "RawOverwriteKind")]
pub enum OverwriteKind {
    /// The target id is a role id.
    Role,
    /// The target id is a user id.
    Member,
}

// Older API versions send "role"/"member", newer ones 0/1.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawOverwriteKind {
    Int(u8),
    Str(String),
}

impl TryFrom<RawOverwriteKind> for OverwriteKind {
    type Error = String;

    fn try_from(raw: RawOverwriteKind) -> Result<Self, Self::Error> {
        match raw {
            RawOverwriteKind::Int(0) => Ok(Self::Role),
            RawOverwriteKind::Int(1) => Ok(Self::Member),
            RawOverwriteKind::Str(s) if s == "role" => Ok(Self::Role),
            RawOverwriteKind::Str(s) if s == "member" => Ok(Self::Member),
            RawOverwriteKind::Int(other) => Err(format!("unknown overwrite type {other}")),
            RawOverwriteKind::Str(other) => Err(format!("unknown overwrite type {other:?}")),
        }
    }
}

/// Explicit allow/deny bits for one role or member on one channel.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PermissionOverwrite {
    /// Target role or user id.
    pub id: String,
    /// Target kind.
    #[serde(rename = "type")]
    pub kind: OverwriteKind,
    /// Allowed permission bits.
    #[serde(default, deserialize_with = "flexible_u64::deserialize")]
    pub allow: u64,
    /// Denied permission bits.
    #[serde(default, deserialize_with = "flexible_u64::deserialize")]
    pub deny: u64,
}

impl PermissionOverwrite {
    /// Applies this overwrite to a base permission set.
    pub fn apply(&self, permissions: u64) -> u64 {
        (permissions & !self.deny) | self.allow
    }
}
