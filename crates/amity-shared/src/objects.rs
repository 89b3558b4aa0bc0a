//! The generic object envelope exchanged with a store.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{Actor, ChannelName, ObjectUrl};

/// An object as returned by discovery.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredObject {
    /// Author of the object (the session actor that put it).
    pub actor: Actor,
    /// Application-defined payload.
    pub value: Value,
    /// Channels the object is discoverable in.
    pub channels: Vec<ChannelName>,
    /// Stable reference, kept across replacements.
    pub url: ObjectUrl,
}

impl StoredObject {
    /// Whether the object is listed in any of `channels`.
    pub fn in_any(&self, channels: &[ChannelName]) -> bool {
        self.channels.iter().any(|c| channels.contains(c))
    }
}

/// An object handed to `put`. With `url` set the existing object is replaced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PutObject {
    pub value: Value,
    pub channels: Vec<ChannelName>,
    pub url: Option<ObjectUrl>,
}

impl PutObject {
    pub fn new(value: Value, channels: Vec<ChannelName>) -> Self {
        Self {
            value,
            channels,
            url: None,
        }
    }

    /// Build a replacement for `existing` carrying a new value.
    pub fn replacing(existing: &StoredObject, value: Value) -> Self {
        Self {
            value,
            channels: existing.channels.clone(),
            url: Some(existing.url.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn replacing_keeps_url_and_channels() {
        let existing = StoredObject {
            actor: Actor::from("alice"),
            value: json!({"content": "hi"}),
            channels: vec![ChannelName::from("alice--bob")],
            url: ObjectUrl::from("amity:object:1"),
        };

        let put = PutObject::replacing(&existing, json!({"content": "hello"}));
        assert_eq!(put.url, Some(existing.url.clone()));
        assert_eq!(put.channels, existing.channels);
        assert_eq!(put.value["content"], "hello");
    }

    #[test]
    fn in_any_matches_shared_channel() {
        let obj = StoredObject {
            actor: Actor::from("alice"),
            value: json!({}),
            channels: vec![ChannelName::from("alice"), ChannelName::from("bob")],
            url: ObjectUrl::from("amity:object:2"),
        };
        assert!(obj.in_any(&[ChannelName::from("bob")]));
        assert!(!obj.in_any(&[ChannelName::from("carol")]));
        assert!(!obj.in_any(&[]));
    }
}
