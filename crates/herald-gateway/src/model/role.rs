//! Guild roles.

use serde::Deserialize;

use super::flexible_u64;

/// A guild role.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Role {
    /// Role id.
    pub id: String,
    /// Role name.
    pub name: String,
    /// RGB colour, `0` for none.
    #[serde(default)]
    pub color: u32,
    /// Whether members are listed separately.
    #[serde(default)]
    pub hoist: bool,
    /// Sort position.
    #[serde(default)]
    pub position: i32,
    /// Permission bitset.
    #[serde(default, deserialize_with = "flexible_u64::deserialize")]
    pub permissions: u64,
    /// Whether an integration manages this role.
    #[serde(default)]
    pub managed: bool,
    /// Whether the role can be mentioned.
    #[serde(default)]
    pub mentionable: bool,
}

impl Role {
    /// Returns the mention markup for this role.
    pub fn mention(&self) -> String {
        format!("<@&{}>", self.id)
    }
}
