use std::collections::BTreeMap;

use amity_shared::{now_millis, Actor, MoodValue, ObjectUrl, PutObject, Record};
use futures::StreamExt;
use tracing::{debug, info};

use crate::client::Client;
use crate::error::{ClientError, Result};

/// Current mood per actor: the record with the greatest `timestamp`, the
/// first one seen on a tie.
pub fn latest_moods(
    records: impl IntoIterator<Item = (Actor, MoodValue)>,
) -> BTreeMap<Actor, MoodValue> {
    let mut current: BTreeMap<Actor, MoodValue> = BTreeMap::new();
    for (actor, mood) in records {
        match current.get(&actor) {
            Some(seen) if mood.timestamp <= seen.timestamp => {}
            _ => {
                current.insert(actor, mood);
            }
        }
    }
    current
}

impl Client {
    /// Publish a mood emoji in the open conversation.
    pub async fn set_mood(&mut self, emoji: &str) -> Result<Option<ObjectUrl>> {
        let Some(session) = self.require_session("set mood") else {
            return Ok(None);
        };
        let channel = self
            .state
            .selected_channel
            .clone()
            .ok_or(ClientError::NoConversation)?;
        let emoji = emoji.trim();
        if emoji.is_empty() {
            return Err(ClientError::InvalidInput("mood emoji is empty".into()));
        }

        let value = MoodValue {
            emoji: emoji.to_string(),
            timestamp: now_millis(),
        };
        let url = self
            .store
            .put(PutObject::new(value.to_value()?, vec![channel.clone()]), &session)
            .await?;

        info!(channel = %channel, emoji, "mood set");
        Ok(Some(url))
    }

    /// Current mood of each participant of the open conversation.
    pub async fn current_moods(&self) -> Result<BTreeMap<Actor, MoodValue>> {
        let channel = self
            .state
            .selected_channel
            .clone()
            .ok_or(ClientError::NoConversation)?;

        let mut stream = self.store.discover(&[channel], &MoodValue::schema()?);
        let mut records = Vec::new();
        while let Some(object) = stream.next().await {
            let object = object?;
            match MoodValue::from_value(&object.value) {
                Ok(mood) => records.push((object.actor, mood)),
                Err(e) => debug!(url = %object.url, error = %e, "skipping malformed mood"),
            }
        }
        Ok(latest_moods(records))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use amity_store::MemoryStore;

    use super::*;

    fn mood(emoji: &str, timestamp: i64) -> MoodValue {
        MoodValue {
            emoji: emoji.to_string(),
            timestamp,
        }
    }

    #[test]
    fn newest_timestamp_wins_regardless_of_order() {
        let a = Actor::from("alice");
        let current = latest_moods(vec![
            (a.clone(), mood("😀", 3)),
            (a.clone(), mood("😴", 1)),
            (Actor::from("bob"), mood("🤔", 2)),
        ]);
        assert_eq!(current[&a].emoji, "😀");
        assert_eq!(current[&Actor::from("bob")].emoji, "🤔");
    }

    #[test]
    fn tie_keeps_first_seen() {
        let a = Actor::from("alice");
        let current = latest_moods(vec![(a.clone(), mood("1", 5)), (a.clone(), mood("2", 5))]);
        assert_eq!(current[&a].emoji, "1");
    }

    #[tokio::test]
    async fn moods_are_scoped_to_conversation() {
        let store = Arc::new(MemoryStore::new());
        let mut alice = Client::new(store.clone());
        let mut bob = Client::new(store.clone());
        let mut carol = Client::new(store);
        alice.login(&Actor::from("alice")).await.unwrap();
        bob.login(&Actor::from("bob")).await.unwrap();
        carol.login(&Actor::from("carol")).await.unwrap();

        alice.select_peer(&Actor::from("bob")).unwrap();
        bob.select_peer(&Actor::from("alice")).unwrap();
        carol.select_peer(&Actor::from("alice")).unwrap();

        alice.set_mood("☀️").await.unwrap();
        let seen = bob.current_moods().await.unwrap();
        assert_eq!(seen[&Actor::from("alice")].emoji, "☀️");
        assert!(carol.current_moods().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_emoji_is_rejected() {
        let store = Arc::new(MemoryStore::new());
        let mut alice = Client::new(store);
        alice.login(&Actor::from("alice")).await.unwrap();
        alice.select_peer(&Actor::from("bob")).unwrap();
        assert!(matches!(
            alice.set_mood(" ").await,
            Err(ClientError::InvalidInput(_))
        ));
    }
}
