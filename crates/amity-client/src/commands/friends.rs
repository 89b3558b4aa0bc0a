use amity_shared::{
    now_millis, Actor, ChannelName, FriendActivity, FriendValue, PutObject, Record, Session,
};
use futures::StreamExt;
use tracing::{info, warn};

use crate::client::Client;
use crate::error::{ClientError, Result};
use crate::relationships::{derive_views, is_live_edge, FriendRecord};

impl Client {
    /// Re-scan relationship records in the actor's channel and re-derive the
    /// friend views. Without a session the views are emptied.
    pub async fn refresh_friends(&mut self) -> Result<()> {
        let Some(me) = self.state.actor().cloned() else {
            self.state.friend_records.clear();
            self.state.friends = Default::default();
            return Ok(());
        };

        let mut stream = self
            .store
            .discover(&[ChannelName::from(&me)], &FriendValue::schema()?);

        let mut records = Vec::new();
        while let Some(object) = stream.next().await {
            if let Some(record) = FriendRecord::parse(object?) {
                records.push(record);
            }
        }

        self.state.friends = derive_views(Some(&me), &records);
        self.state.friend_records = records;
        Ok(())
    }

    /// Send a friend request, or accept one when the peer already asked.
    /// Any earlier cancellation of mine towards `target` is withdrawn first.
    pub async fn add_friend(&mut self, target: &Actor) -> Result<()> {
        let Some(session) = self.require_session("add friend") else {
            return Ok(());
        };
        validate_target(&session, target)?;
        self.refresh_friends().await?;

        let my_cancels: Vec<_> = self
            .state
            .friend_records
            .iter()
            .filter(|r| r.is(&session.actor, target, FriendActivity::FriendCancel))
            .map(|r| r.object.clone())
            .collect();
        for object in &my_cancels {
            self.store.delete(object, &session).await?;
        }
        if !my_cancels.is_empty() {
            self.refresh_friends().await?;
        }

        if is_live_edge(&self.state.friend_records, &session.actor, target) {
            info!(target = %target, "friend request already active");
        } else {
            self.put_activity(&session, FriendActivity::Friend, target).await?;
            info!(target = %target, "friend request sent");
        }

        self.refresh_friends().await
    }

    /// Accept an incoming request by mirroring the sender's edge.
    pub async fn accept_request(&mut self, peer: &Actor) -> Result<()> {
        if !self.state.friends.incoming.contains(peer) {
            warn!(peer = %peer, "accepting a peer that has no pending request");
        }
        self.add_friend(peer).await
    }

    /// Hide an incoming request. The sender's record is left in place.
    pub async fn reject_request(&mut self, peer: &Actor) -> Result<()> {
        let Some(session) = self.require_session("reject request") else {
            return Ok(());
        };
        validate_target(&session, peer)?;

        self.ensure_cancelled(&session, peer).await?;
        info!(peer = %peer, "friend request rejected");
        self.refresh_friends().await
    }

    /// Withdraw a request I sent. My `friend` record stays; the cancellation
    /// supersedes it.
    pub async fn cancel_request(&mut self, target: &Actor) -> Result<()> {
        let Some(session) = self.require_session("cancel request") else {
            return Ok(());
        };
        validate_target(&session, target)?;

        self.ensure_cancelled(&session, target).await?;
        info!(target = %target, "friend request cancelled");
        self.refresh_friends().await
    }

    /// End a friendship: delete my `friend` records for `peer`, then record a
    /// cancellation. The two writes are independent; if the second fails the
    /// friendship is left half-removed and a partial failure is returned.
    pub async fn remove_friend(&mut self, peer: &Actor) -> Result<()> {
        let Some(session) = self.require_session("remove friend") else {
            return Ok(());
        };
        validate_target(&session, peer)?;
        self.refresh_friends().await?;

        let mine: Vec<_> = self
            .state
            .friend_records
            .iter()
            .filter(|r| r.is(&session.actor, peer, FriendActivity::Friend))
            .map(|r| r.object.clone())
            .collect();
        for object in &mine {
            self.store.delete(object, &session).await?;
        }

        if let Err(e) = self.ensure_cancelled(&session, peer).await {
            let source = match e {
                ClientError::Store(source) => source,
                other => return Err(other),
            };
            warn!(peer = %peer, error = %source, "friend removal left half-done");
            self.refresh_friends().await?;
            return Err(ClientError::PartialFailure {
                completed: "friend record deleted",
                source,
            });
        }

        info!(peer = %peer, removed = mine.len(), "friend removed");
        self.refresh_friends().await
    }

    async fn ensure_cancelled(&self, session: &Session, target: &Actor) -> Result<()> {
        let already = self
            .state
            .friend_records
            .iter()
            .any(|r| r.is(&session.actor, target, FriendActivity::FriendCancel));
        if already {
            return Ok(());
        }
        self.put_activity(session, FriendActivity::FriendCancel, target).await
    }

    async fn put_activity(
        &self,
        session: &Session,
        activity: FriendActivity,
        target: &Actor,
    ) -> Result<()> {
        let value = FriendValue::new(activity, target.clone(), now_millis()).to_value()?;
        let channels = vec![ChannelName::from(&session.actor), ChannelName::from(target)];
        self.store.put(PutObject::new(value, channels), session).await?;
        Ok(())
    }
}

fn validate_target(session: &Session, target: &Actor) -> Result<()> {
    if target.as_str().trim().is_empty() {
        return Err(ClientError::InvalidInput("peer id is empty".into()));
    }
    if *target == session.actor {
        return Err(ClientError::InvalidInput("cannot befriend yourself".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use amity_store::{MemoryStore, ObjectStore};

    use super::*;
    use crate::relationships::Relationship;

    async fn pair() -> (Arc<MemoryStore>, Client, Client) {
        let store = Arc::new(MemoryStore::new());
        let mut alice = Client::new(store.clone());
        let mut bob = Client::new(store.clone());
        alice.login(&Actor::from("alice")).await.unwrap();
        bob.login(&Actor::from("bob")).await.unwrap();
        (store, alice, bob)
    }

    fn rel(client: &Client, peer: &str) -> Relationship {
        client.state().friends.relationship_with(&Actor::from(peer))
    }

    #[tokio::test]
    async fn request_accept_scenario() {
        let (_store, mut alice, mut bob) = pair().await;

        alice.add_friend(&Actor::from("bob")).await.unwrap();
        bob.refresh_friends().await.unwrap();
        assert_eq!(rel(&alice, "bob"), Relationship::Outgoing);
        assert_eq!(rel(&bob, "alice"), Relationship::Incoming);

        bob.accept_request(&Actor::from("alice")).await.unwrap();
        alice.refresh_friends().await.unwrap();
        assert_eq!(rel(&alice, "bob"), Relationship::Mutual);
        assert_eq!(rel(&bob, "alice"), Relationship::Mutual);
        assert!(alice.state().friends.incoming.is_empty());
        assert!(bob.state().friends.outgoing.is_empty());
    }

    #[tokio::test]
    async fn repeated_request_writes_once() {
        let (store, mut alice, _bob) = pair().await;
        let before = store.len().unwrap();

        alice.add_friend(&Actor::from("bob")).await.unwrap();
        alice.add_friend(&Actor::from("bob")).await.unwrap();
        assert_eq!(store.len().unwrap(), before + 1);
    }

    #[tokio::test]
    async fn cancel_keeps_friend_record() {
        let (store, mut alice, mut bob) = pair().await;
        alice.add_friend(&Actor::from("bob")).await.unwrap();
        alice.cancel_request(&Actor::from("bob")).await.unwrap();
        bob.refresh_friends().await.unwrap();

        assert_eq!(rel(&alice, "bob"), Relationship::None);
        assert_eq!(rel(&bob, "alice"), Relationship::None);

        let friend_objects: Vec<_> = store
            .discover(&[ChannelName::from("alice")], &FriendValue::schema().unwrap())
            .collect()
            .await;
        assert_eq!(friend_objects.len(), 2);
    }

    #[tokio::test]
    async fn request_again_after_cancel() {
        let (_store, mut alice, mut bob) = pair().await;
        alice.add_friend(&Actor::from("bob")).await.unwrap();
        alice.cancel_request(&Actor::from("bob")).await.unwrap();
        alice.add_friend(&Actor::from("bob")).await.unwrap();
        bob.refresh_friends().await.unwrap();

        assert_eq!(rel(&alice, "bob"), Relationship::Outgoing);
        assert_eq!(rel(&bob, "alice"), Relationship::Incoming);
    }

    #[tokio::test]
    async fn reject_hides_request_only_for_rejecter() {
        let (_store, mut alice, mut bob) = pair().await;
        alice.add_friend(&Actor::from("bob")).await.unwrap();
        bob.refresh_friends().await.unwrap();
        bob.reject_request(&Actor::from("alice")).await.unwrap();
        alice.refresh_friends().await.unwrap();

        assert_eq!(rel(&bob, "alice"), Relationship::None);
        assert_eq!(rel(&alice, "bob"), Relationship::Outgoing);

        // Changing one's mind later still works.
        bob.accept_request(&Actor::from("alice")).await.unwrap();
        assert_eq!(rel(&bob, "alice"), Relationship::Mutual);
    }

    #[tokio::test]
    async fn removal_scenario_from_either_side() {
        for remover in ["alice", "bob"] {
            let (_store, mut alice, mut bob) = pair().await;
            alice.add_friend(&Actor::from("bob")).await.unwrap();
            bob.add_friend(&Actor::from("alice")).await.unwrap();

            if remover == "alice" {
                alice.remove_friend(&Actor::from("bob")).await.unwrap();
            } else {
                bob.remove_friend(&Actor::from("alice")).await.unwrap();
            }
            alice.refresh_friends().await.unwrap();
            bob.refresh_friends().await.unwrap();

            assert!(alice.state().friends.accepted.is_empty(), "{remover} removed");
            assert!(bob.state().friends.accepted.is_empty(), "{remover} removed");
        }
    }

    #[tokio::test]
    async fn actions_without_session_are_noops() {
        let store = Arc::new(MemoryStore::new());
        let mut client = Client::new(store.clone());

        client.add_friend(&Actor::from("bob")).await.unwrap();
        client.remove_friend(&Actor::from("bob")).await.unwrap();
        client.refresh_friends().await.unwrap();

        assert!(store.is_empty().unwrap());
        assert_eq!(client.state().friends, Default::default());
    }

    #[tokio::test]
    async fn self_and_empty_targets_are_rejected() {
        let (_store, mut alice, _bob) = pair().await;
        assert!(matches!(
            alice.add_friend(&Actor::from("alice")).await,
            Err(ClientError::InvalidInput(_))
        ));
        assert!(matches!(
            alice.add_friend(&Actor::from("  ")).await,
            Err(ClientError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn expired_session_surfaces_store_error() {
        let (store, mut alice, _bob) = pair().await;
        let session = alice.state().session.clone().unwrap();
        store.logout(&session).await.unwrap();

        assert!(matches!(
            alice.add_friend(&Actor::from("bob")).await,
            Err(ClientError::Store(_))
        ));
    }
}
