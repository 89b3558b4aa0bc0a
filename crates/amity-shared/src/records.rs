//! Typed payloads carried in the `value` of stored objects.
//!
//! Every payload knows the discovery schema that selects it, and decoding
//! checks that schema before handing the value to serde, so a value that
//! would not have been discovered is never accepted as a record.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::constants::{ACTIVITY_FRIEND, ACTIVITY_FRIEND_CANCEL};
use crate::error::RecordError;
use crate::schema::Schema;
use crate::types::Actor;

/// A payload type with a canonical discovery schema.
pub trait Record: Serialize + DeserializeOwned {
    /// Short name used in error messages and logs.
    const KIND: &'static str;

    /// JSON Schema document selecting values of this kind.
    fn schema_document() -> Value;

    fn schema() -> Result<Schema, RecordError> {
        Schema::compile(Self::schema_document())
    }

    fn from_value(value: &Value) -> Result<Self, RecordError> {
        if !Self::schema()?.matches(value) {
            return Err(RecordError::SchemaMismatch(Self::KIND));
        }
        Ok(serde_json::from_value(value.clone())?)
    }

    fn to_value(&self) -> Result<Value, RecordError> {
        Ok(serde_json::to_value(self)?)
    }
}

// ---------------------------------------------------------------------------
// Friend
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FriendActivity {
    /// Request, or acceptance when mirroring an incoming request.
    Friend,
    /// Revocation of the same author's assertion towards the same target.
    FriendCancel,
}

/// Directed relationship assertion `author -> target`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FriendValue {
    pub activity: FriendActivity,
    pub target: Actor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<i64>,
}

impl FriendValue {
    pub fn new(activity: FriendActivity, target: Actor, published: i64) -> Self {
        Self {
            activity,
            target,
            published: Some(published),
        }
    }
}

impl Record for FriendValue {
    const KIND: &'static str = "friend";

    fn schema_document() -> Value {
        json!({
            "type": "object",
            "required": ["activity", "target"],
            "properties": {
                "activity": { "enum": [ACTIVITY_FRIEND, ACTIVITY_FRIEND_CANCEL] },
                "target": { "type": "string" },
                "published": { "type": "integer" }
            }
        })
    }
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MessageValue {
    pub content: String,
    /// Send time; an edit leaves it unchanged.
    pub published: i64,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub edited: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited_at: Option<i64>,
}

impl MessageValue {
    pub fn new(content: impl Into<String>, published: i64) -> Self {
        Self {
            content: content.into(),
            published,
            edited: false,
            edited_at: None,
        }
    }
}

impl Record for MessageValue {
    const KIND: &'static str = "message";

    fn schema_document() -> Value {
        json!({
            "type": "object",
            "required": ["content", "published"],
            "properties": {
                "content": { "type": "string" },
                "published": { "type": "integer" },
                "edited": { "type": "boolean" },
                "editedAt": { "type": "integer" }
            }
        })
    }
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProfileValue {
    pub describes: Actor,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub pronouns: String,
    #[serde(default)]
    pub bio: String,
    /// Url of the profile picture object, or empty.
    #[serde(default)]
    pub icon: String,
    pub published: i64,
}

impl ProfileValue {
    /// Profile synthesized for an actor that has never published one.
    pub fn default_for(actor: &Actor, published: i64) -> Self {
        Self {
            describes: actor.clone(),
            name: actor.trailing_segment().to_string(),
            pronouns: String::new(),
            bio: String::new(),
            icon: String::new(),
            published,
        }
    }
}

impl Record for ProfileValue {
    const KIND: &'static str = "profile";

    fn schema_document() -> Value {
        json!({
            "type": "object",
            "required": ["describes", "published"],
            "properties": {
                "describes": { "type": "string" },
                "published": { "type": "integer" },
                "name": { "type": "string" },
                "pronouns": { "type": "string" },
                "bio": { "type": "string" },
                "icon": { "type": "string" }
            }
        })
    }
}

// ---------------------------------------------------------------------------
// Mood
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MoodValue {
    pub emoji: String,
    pub timestamp: i64,
}

impl Record for MoodValue {
    const KIND: &'static str = "mood";

    fn schema_document() -> Value {
        json!({
            "type": "object",
            "required": ["emoji", "timestamp"],
            "properties": {
                "emoji": { "type": "string" },
                "timestamp": { "type": "integer" }
            }
        })
    }
}

// ---------------------------------------------------------------------------
// File (profile pictures)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FileData {
    pub name: String,
    pub mime_type: String,
    /// Standard base64 of the file bytes.
    pub data: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileValue {
    pub file: FileData,
    pub published: i64,
}

impl Record for FileValue {
    const KIND: &'static str = "file";

    fn schema_document() -> Value {
        json!({
            "type": "object",
            "required": ["file", "published"],
            "properties": {
                "file": {
                    "type": "object",
                    "required": ["name", "mimeType", "data"],
                    "properties": {
                        "name": { "type": "string" },
                        "mimeType": { "type": "string" },
                        "data": { "type": "string" }
                    }
                },
                "published": { "type": "integer" }
            }
        })
    }
}
