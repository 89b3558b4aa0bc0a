use amity_shared::{
    now_millis, Actor, MessageValue, ObjectUrl, PutObject, Record, StoredObject,
};
use futures::StreamExt;
use tracing::{debug, info};

use crate::channel::conversation_channel;
use crate::client::Client;
use crate::error::{ClientError, Result};

/// A discovered chat message.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub object: StoredObject,
    pub value: MessageValue,
}

impl Message {
    pub fn parse(object: StoredObject) -> Option<Self> {
        match MessageValue::from_value(&object.value) {
            Ok(value) => Some(Self { object, value }),
            Err(e) => {
                debug!(url = %object.url, error = %e, "skipping malformed message");
                None
            }
        }
    }

    pub fn sender(&self) -> &Actor {
        &self.object.actor
    }

    pub fn url(&self) -> &ObjectUrl {
        &self.object.url
    }
}

impl Client {
    /// Open the conversation with `peer`. Any draft or edit in progress is
    /// discarded.
    pub fn select_peer(&mut self, peer: &Actor) -> Result<()> {
        let Some(session) = self.require_session("select peer") else {
            return Ok(());
        };
        if peer.as_str().trim().is_empty() {
            return Err(ClientError::InvalidInput("peer id is empty".into()));
        }

        self.state.selected_channel = Some(conversation_channel(&session.actor, peer));
        self.state.selected_peer = Some(peer.clone());
        self.state.clear_edit();
        Ok(())
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.state.draft = text.into();
    }

    /// Post the draft to the open conversation. A blank draft sends nothing.
    pub async fn send_message(&mut self) -> Result<Option<ObjectUrl>> {
        let Some(session) = self.require_session("send message") else {
            return Ok(None);
        };
        let channel = self
            .state
            .selected_channel
            .clone()
            .ok_or(ClientError::NoConversation)?;
        if self.state.draft.trim().is_empty() {
            return Ok(None);
        }

        let value = MessageValue::new(self.state.draft.clone(), now_millis()).to_value()?;
        let url = self
            .store
            .put(PutObject::new(value, vec![channel.clone()]), &session)
            .await?;

        self.state.draft.clear();
        info!(url = %url, channel = %channel, "message sent");
        Ok(Some(url))
    }

    /// Messages of the open conversation ordered by send time.
    pub async fn list_messages(&self) -> Result<Vec<Message>> {
        let channel = self
            .state
            .selected_channel
            .clone()
            .ok_or(ClientError::NoConversation)?;

        let mut stream = self.store.discover(&[channel], &MessageValue::schema()?);
        let mut messages = Vec::new();
        while let Some(object) = stream.next().await {
            if let Some(message) = Message::parse(object?) {
                messages.push(message);
            }
        }

        messages.sort_by(|a, b| {
            a.value
                .published
                .cmp(&b.value.published)
                .then_with(|| a.object.url.cmp(&b.object.url))
        });
        Ok(messages)
    }

    /// Look up a message of the open conversation by url. Messages posted
    /// elsewhere are rejected.
    pub async fn find_message(&self, url: &ObjectUrl) -> Result<Message> {
        let channel = self
            .state
            .selected_channel
            .clone()
            .ok_or(ClientError::NoConversation)?;

        let object = self.store.get(url).await?;
        if !object.in_any(&[channel]) {
            return Err(ClientError::InvalidInput(format!(
                "{url} is not part of this conversation"
            )));
        }
        let value = MessageValue::from_value(&object.value)?;
        Ok(Message { object, value })
    }

    /// Load `message` into the edit buffer; the draft becomes its content.
    pub fn start_edit(&mut self, message: &Message) {
        self.state.editing = Some(message.object.clone());
        self.state.draft = message.value.content.clone();
    }

    pub fn cancel_edit(&mut self) {
        self.state.clear_edit();
    }

    /// Replace the message in the edit buffer with the trimmed draft, marking
    /// it edited. Url and `published` are preserved. Returns `None` when there
    /// is nothing to update.
    pub async fn update_message(&mut self) -> Result<Option<ObjectUrl>> {
        let Some(session) = self.require_session("update message") else {
            return Ok(None);
        };
        let content = self.state.draft.trim().to_string();
        let Some(original) = self.state.editing.clone() else {
            return Ok(None);
        };
        if content.is_empty() {
            return Ok(None);
        }

        let mut value = MessageValue::from_value(&original.value)?;
        value.content = content;
        value.edited = true;
        value.edited_at = Some(now_millis());

        let url = self
            .store
            .put(PutObject::replacing(&original, value.to_value()?), &session)
            .await?;

        self.state.clear_edit();
        info!(url = %url, "message edited");
        Ok(Some(url))
    }

    /// Delete `message`; the edit buffer is cleared when it holds the same
    /// message.
    pub async fn delete_message(&mut self, message: &Message) -> Result<()> {
        let Some(session) = self.require_session("delete message") else {
            return Ok(());
        };

        self.store.delete(&message.object, &session).await?;

        let was_editing = self
            .state
            .editing
            .as_ref()
            .is_some_and(|o| o.url == message.object.url);
        if was_editing {
            self.cancel_edit();
        }

        info!(url = %message.object.url, "message deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use amity_store::MemoryStore;

    use super::*;

    async fn chatting() -> (Client, Client) {
        let store = Arc::new(MemoryStore::new());
        let mut alice = Client::new(store.clone());
        let mut bob = Client::new(store);
        alice.login(&Actor::from("alice")).await.unwrap();
        bob.login(&Actor::from("bob")).await.unwrap();
        alice.select_peer(&Actor::from("bob")).unwrap();
        bob.select_peer(&Actor::from("alice")).unwrap();
        (alice, bob)
    }

    #[tokio::test]
    async fn peer_sees_sent_message() {
        let (mut alice, bob) = chatting().await;
        alice.set_draft("hi");
        let url = alice.send_message().await.unwrap().expect("sent");
        assert!(alice.state().draft.is_empty());

        let seen = bob.list_messages().await.unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].value.content, "hi");
        assert_eq!(seen[0].sender(), &Actor::from("alice"));
        assert_eq!(seen[0].url(), &url);
    }

    #[tokio::test]
    async fn blank_draft_is_not_sent() {
        let (mut alice, bob) = chatting().await;
        alice.set_draft("   ");
        assert_eq!(alice.send_message().await.unwrap(), None);
        assert!(bob.list_messages().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn sending_needs_a_conversation() {
        let store = Arc::new(MemoryStore::new());
        let mut alice = Client::new(store);
        alice.login(&Actor::from("alice")).await.unwrap();
        alice.set_draft("hello?");
        assert!(matches!(
            alice.send_message().await,
            Err(ClientError::NoConversation)
        ));
    }

    #[tokio::test]
    async fn edit_preserves_identity() {
        let (mut alice, bob) = chatting().await;
        alice.set_draft("helo");
        let url = alice.send_message().await.unwrap().unwrap();

        let original = alice.find_message(&url).await.unwrap();
        alice.start_edit(&original);
        assert_eq!(alice.state().draft, "helo");
        alice.set_draft("  hello ");
        assert_eq!(alice.update_message().await.unwrap(), Some(url.clone()));
        assert!(alice.state().editing.is_none());

        let seen = bob.list_messages().await.unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].url(), &url);
        assert_eq!(seen[0].value.content, "hello");
        assert!(seen[0].value.edited);
        assert!(seen[0].value.edited_at.is_some());
        assert_eq!(seen[0].value.published, original.value.published);
    }

    #[tokio::test]
    async fn deleting_the_edited_message_clears_buffer() {
        let (mut alice, bob) = chatting().await;
        alice.set_draft("oops");
        let url = alice.send_message().await.unwrap().unwrap();
        let msg = alice.find_message(&url).await.unwrap();

        alice.start_edit(&msg);
        alice.delete_message(&msg).await.unwrap();

        assert!(alice.state().editing.is_none());
        assert!(alice.state().draft.is_empty());
        assert!(bob.list_messages().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn deleting_another_message_keeps_buffer() {
        let (mut alice, _bob) = chatting().await;
        alice.set_draft("one");
        let one = alice.send_message().await.unwrap().unwrap();
        alice.set_draft("two");
        let two = alice.send_message().await.unwrap().unwrap();

        let first = alice.find_message(&one).await.unwrap();
        let second = alice.find_message(&two).await.unwrap();
        alice.start_edit(&first);
        alice.delete_message(&second).await.unwrap();

        assert_eq!(alice.state().editing.as_ref().map(|o| &o.url), Some(&one));
    }

    #[tokio::test]
    async fn peer_cannot_delete_my_message() {
        let (mut alice, mut bob) = chatting().await;
        alice.set_draft("mine");
        let url = alice.send_message().await.unwrap().unwrap();
        let msg = bob.find_message(&url).await.unwrap();

        assert!(matches!(
            bob.delete_message(&msg).await,
            Err(ClientError::Store(_))
        ));
    }

    #[tokio::test]
    async fn messages_from_other_conversations_are_not_found() {
        let (mut alice, _bob) = chatting().await;
        alice.set_draft("for bob");
        let url = alice.send_message().await.unwrap().unwrap();

        alice.select_peer(&Actor::from("carol")).unwrap();
        assert!(matches!(
            alice.find_message(&url).await,
            Err(ClientError::InvalidInput(_))
        ));

        alice.select_peer(&Actor::from("bob")).unwrap();
        assert_eq!(alice.find_message(&url).await.unwrap().url(), &url);
    }

    #[tokio::test]
    async fn selecting_peer_resets_edit_state() {
        let (mut alice, _bob) = chatting().await;
        alice.set_draft("draft");
        alice.select_peer(&Actor::from("carol")).unwrap();
        assert!(alice.state().draft.is_empty());
        assert_eq!(
            alice.state().selected_channel.as_ref().map(|c| c.as_str()),
            Some("alice--carol")
        );
    }
}
