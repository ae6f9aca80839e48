//! Users.

use serde::Deserialize;

/// A user account.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct User {
    /// User id.
    pub id: String,
    /// Account name, not unique.
    pub username: String,
    /// Four-digit tag, `"0"` for accounts without one.
    #[serde(default)]
    pub discriminator: String,
    /// Avatar hash.
    #[serde(default)]
    pub avatar: Option<String>,
    /// Whether this is a bot account.
    #[serde(default)]
    pub bot: bool,
}

impl User {
    /// Returns `username#discriminator`, or just the username when there is
    /// no discriminator.
    pub fn tag(&self) -> String {
        match self.discriminator.as_str() {
            "" | "0" => self.username.clone(),
            discriminator => format!("{}#{}", self.username, discriminator),
        }
    }

    /// Returns the mention markup for this user.
    pub fn mention(&self) -> String {
        format!("<@{}>", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tag() {
        let user: User =
            serde_json::from_value(json!({ "id": "1", "username": "nelly", "discriminator": "1337" }))
                .unwrap();
        assert_eq!(user.tag(), "nelly#1337");
        assert_eq!(user.mention(), "<@1>");

        let user: User = serde_json::from_value(json!({ "id": "2", "username": "new" })).unwrap();
        assert_eq!(user.tag(), "new");
        assert!(!user.bot);
    }
}
