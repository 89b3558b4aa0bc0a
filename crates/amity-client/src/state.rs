//! Per-session client state.
//!
//! [`SessionState`] replaces a global reactive UI object: it holds the
//! session, the raw relationship records from the last scan with the views
//! derived from them, the selected conversation and the edit buffers.

use amity_shared::{Actor, ChannelName, Session, StoredObject};

use crate::commands::profile::ProfileDraft;
use crate::relationships::{FriendRecord, FriendViews};

#[derive(Debug, Default)]
pub struct SessionState {
    /// `None` until login and after logout.
    pub session: Option<Session>,

    /// Relationship records seen by the last friend scan.
    pub friend_records: Vec<FriendRecord>,

    /// Views derived from `friend_records`.
    pub friends: FriendViews,

    /// Peer whose conversation is open.
    pub selected_peer: Option<Actor>,

    /// Conversation channel shared with `selected_peer`.
    pub selected_channel: Option<ChannelName>,

    /// Message being composed, or the replacement text while editing.
    pub draft: String,

    /// Message currently being edited.
    pub editing: Option<StoredObject>,

    /// Editable copy of the user's own profile.
    pub profile: ProfileDraft,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn actor(&self) -> Option<&Actor> {
        self.session.as_ref().map(|s| &s.actor)
    }

    /// Drop the edit buffer and the draft.
    pub fn clear_edit(&mut self) {
        self.editing = None;
        self.draft.clear();
    }
}
