//! Inbound gateway payloads.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DispatchError, DispatchResult};

/// One inbound unit from the transport: an event tag plus an opaque body.
///
/// Field names follow the wire frame (`t` for the tag, `d` for the body), so a
/// raw dispatch frame deserializes directly; any other frame fields are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    /// Event-type tag, e.g. `GUILD_CREATE`. Absent for non-dispatch frames.
    #[serde(rename = "t", default)]
    pub kind: Option<String>,
    /// Event body.
    #[serde(rename = "d", default)]
    pub body: Value,
}

impl Payload {
    /// Creates a tagged payload.
    pub fn new(kind: impl Into<String>, body: Value) -> Self {
        Self {
            kind: Some(kind.into()),
            body,
        }
    }

    /// Creates a payload without an event tag.
    pub fn untagged(body: Value) -> Self {
        Self { kind: None, body }
    }

    /// Parses a raw gateway frame.
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }

    /// Returns the event tag, if any.
    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    /// Decodes the body into the wire schema `T`.
    pub fn parse_body<T: DeserializeOwned>(&self) -> DispatchResult<T> {
        T::deserialize(&self.body)
            .map_err(|e| DispatchError::malformed(self.kind().unwrap_or("untagged"), e))
    }

    /// Returns `true` if the body has `field` set to something other than `null`.
    pub fn has_field(&self, field: &str) -> bool {
        self.body.get(field).is_some_and(|value| !value.is_null())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Body {
        id: String,
    }

    #[test]
    fn test_from_json_frame() {
        let payload = Payload::from_json(r#"{"op":0,"s":42,"t":"READY","d":{"v":8}}"#).unwrap();
        assert_eq!(payload.kind(), Some("READY"));
        assert_eq!(payload.body, json!({ "v": 8 }));
    }

    #[test]
    fn test_from_json_without_tag() {
        let payload = Payload::from_json(r#"{"op":11}"#).unwrap();
        assert_eq!(payload.kind(), None);
        assert!(payload.body.is_null());
    }

    #[test]
    fn test_parse_body() {
        let payload = Payload::new("GUILD_DELETE", json!({ "id": "1" }));
        let body: Body = payload.parse_body().unwrap();
        assert_eq!(body.id, "1");

        let bad = Payload::new("GUILD_DELETE", json!({ "id": 1 }));
        let err = bad.parse_body::<Body>().unwrap_err();
        assert!(err.to_string().starts_with("malformed GUILD_DELETE payload"));
    }

    #[test]
    fn test_has_field() {
        let payload = Payload::new("MESSAGE_UPDATE", json!({ "author": null, "id": "1" }));
        assert!(payload.has_field("id"));
        assert!(!payload.has_field("author"));
        assert!(!payload.has_field("content"));
    }
}
