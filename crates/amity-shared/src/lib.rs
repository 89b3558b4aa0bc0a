//! Types shared by every Amity crate: identifiers, the object envelope,
//! record payloads and the schema filter used by discovery.

pub mod constants;
pub mod error;
pub mod objects;
pub mod records;
pub mod schema;
pub mod types;

pub use error::RecordError;
pub use objects::{PutObject, StoredObject};
pub use records::{
    FileData, FileValue, FriendActivity, FriendValue, MessageValue, MoodValue, ProfileValue,
    Record,
};
pub use schema::Schema;
pub use types::{now_millis, Actor, ChannelName, ObjectUrl, Session};
