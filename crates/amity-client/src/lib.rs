//! # amity-client
//!
//! Session-scoped orchestration for Amity: friend requests and their
//! derived views, direct messages, profiles and mood status, all expressed
//! as reads and writes against an [`ObjectStore`](amity_store::ObjectStore).
//!
//! Derived state is never tracked implicitly. Every command that changes the
//! store finishes by re-scanning what it touched, and the views in
//! [`SessionState`] are recomputed from the scan.

pub mod channel;
pub mod client;
pub mod commands;
pub mod error;
pub mod relationships;
pub mod state;

pub use channel::conversation_channel;
pub use client::Client;
pub use commands::messaging::Message;
pub use commands::profile::{PeerCard, Picture, Profile, ProfileField};
pub use error::{ClientError, Result};
pub use relationships::{derive_views, FriendRecord, FriendViews, Relationship};
pub use state::SessionState;
