//! Profiles: resolution of the latest record, lazy creation on first login,
//! saving (optionally with a picture) and peer display cards.
//!
//! Profile records are never deleted. Each save adds a record with a newer
//! `published`, and readers pick the maximum.

use amity_shared::constants::PROFILE_CHANNEL;
use amity_shared::{
    now_millis, Actor, ChannelName, FileData, FileValue, ObjectUrl, ProfileValue, PutObject,
    Record, Session, StoredObject,
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use futures::StreamExt;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::client::Client;
use crate::error::{ClientError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub object: StoredObject,
    pub value: ProfileValue,
}

/// Picture bytes plus the metadata stored alongside them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Picture {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Editable copy of the user's own profile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileDraft {
    pub name: String,
    pub pronouns: String,
    pub bio: String,
    /// Url of the current picture object, or empty.
    pub icon: String,
    /// Picture chosen but not uploaded yet.
    pub pending_picture: Option<Picture>,
    /// `published` of the record the draft was last loaded from or saved as.
    pub published: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileField {
    Name,
    Pronouns,
    Bio,
}

/// What a peer list shows for one actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeerCard {
    pub id: Actor,
    pub name: String,
    pub icon: Option<ObjectUrl>,
}

/// The profile with the greatest `published`. On equal timestamps the one
/// encountered first wins.
pub fn resolve_latest(profiles: impl IntoIterator<Item = Profile>) -> Option<Profile> {
    let mut best: Option<Profile> = None;
    for profile in profiles {
        match &best {
            Some(b) if profile.value.published <= b.value.published => {}
            _ => best = Some(profile),
        }
    }
    best
}

impl Client {
    async fn discover_profiles(&self, actor: &Actor) -> Result<Vec<Profile>> {
        let mut stream = self
            .store
            .discover(&[ChannelName::from(actor)], &ProfileValue::schema()?);

        let mut profiles = Vec::new();
        while let Some(object) = stream.next().await {
            let object = object?;
            match ProfileValue::from_value(&object.value) {
                Ok(value) if value.describes == *actor && object.actor == *actor => {
                    profiles.push(Profile { object, value })
                }
                Ok(_) => debug!(
                    url = %object.url,
                    author = %object.actor,
                    "skipping profile not authored by its subject"
                ),
                Err(e) => debug!(url = %object.url, error = %e, "skipping malformed profile"),
            }
        }
        Ok(profiles)
    }

    /// Latest profile of any actor, without creating one.
    pub async fn profile_of(&self, actor: &Actor) -> Result<Option<ProfileValue>> {
        let profiles = self.discover_profiles(actor).await?;
        Ok(resolve_latest(profiles).map(|p| p.value))
    }

    /// Load the user's own profile into the draft. When none exists a default
    /// one is synthesized and persisted.
    pub async fn load_profile(&mut self) -> Result<Option<ProfileValue>> {
        let Some(session) = self.require_session("load profile") else {
            return Ok(None);
        };

        let profiles = self.discover_profiles(&session.actor).await?;
        let value = match resolve_latest(profiles) {
            Some(latest) => latest.value,
            None => {
                let value = ProfileValue::default_for(&session.actor, now_millis());
                self.put_profile(&session, &value).await?;
                info!(actor = %session.actor, name = %value.name, "created default profile");
                value
            }
        };

        let draft = &mut self.state.profile;
        draft.name = value.name.clone();
        draft.pronouns = value.pronouns.clone();
        draft.bio = value.bio.clone();
        draft.icon = value.icon.clone();
        draft.pending_picture = None;
        draft.published = value.published;
        Ok(Some(value))
    }

    pub fn set_profile_picture(&mut self, picture: Picture) {
        self.state.profile.pending_picture = Some(picture);
    }

    pub fn remove_profile_picture(&mut self) {
        self.state.profile.pending_picture = None;
        self.state.profile.icon.clear();
    }

    /// Change one field and save the whole profile, as every edit does.
    pub async fn set_profile_field(
        &mut self,
        field: ProfileField,
        value: impl Into<String>,
    ) -> Result<Option<ObjectUrl>> {
        let value = value.into();
        let draft = &mut self.state.profile;
        match field {
            ProfileField::Name => draft.name = value,
            ProfileField::Pronouns => draft.pronouns = value,
            ProfileField::Bio => draft.bio = value,
        }
        self.save_profile().await
    }

    /// Publish the draft as a new profile record. A pending picture is
    /// uploaded first and its url becomes the icon; it leaves the draft only
    /// once the upload succeeded. If the profile write then fails, the picture
    /// stays uploaded and a partial failure is returned.
    pub async fn save_profile(&mut self) -> Result<Option<ObjectUrl>> {
        let Some(session) = self.require_session("save profile") else {
            return Ok(None);
        };

        let uploaded = match self.state.profile.pending_picture.clone() {
            Some(picture) => {
                let url = self.upload_picture(&session, &picture).await?;
                self.state.profile.pending_picture = None;
                self.state.profile.icon = url.to_string();
                true
            }
            None => false,
        };

        // Saves within one millisecond must still order after each other.
        let draft = &self.state.profile;
        let value = ProfileValue {
            describes: session.actor.clone(),
            name: draft.name.clone(),
            pronouns: draft.pronouns.clone(),
            bio: draft.bio.clone(),
            icon: draft.icon.clone(),
            published: now_millis().max(draft.published.saturating_add(1)),
        };

        match self.put_profile(&session, &value).await {
            Ok(url) => {
                self.state.profile.published = value.published;
                info!(url = %url, "profile saved");
                Ok(Some(url))
            }
            Err(ClientError::Store(source)) if uploaded => {
                warn!(error = %source, "picture uploaded but profile not saved");
                Err(ClientError::PartialFailure {
                    completed: "profile picture uploaded",
                    source,
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Fetch and decode a picture object referenced by a profile icon.
    pub async fn load_picture(&self, url: &ObjectUrl) -> Result<Picture> {
        let object = self.store.get(url).await?;
        let file = FileValue::from_value(&object.value)?.file;
        Ok(Picture {
            bytes: STANDARD.decode(file.data.as_bytes())?,
            name: file.name,
            mime_type: file.mime_type,
        })
    }

    /// Display cards for `peers`: profile name and icon when a profile
    /// exists, the bare id otherwise.
    pub async fn describe_peers(&self, peers: &[Actor]) -> Result<Vec<PeerCard>> {
        let mut cards = Vec::with_capacity(peers.len());
        for peer in peers {
            let card = match self.profile_of(peer).await? {
                Some(p) => PeerCard {
                    id: peer.clone(),
                    name: if p.name.is_empty() { peer.to_string() } else { p.name },
                    icon: (!p.icon.is_empty()).then(|| ObjectUrl(p.icon)),
                },
                None => PeerCard {
                    id: peer.clone(),
                    name: peer.to_string(),
                    icon: None,
                },
            };
            cards.push(card);
        }
        Ok(cards)
    }

    async fn put_profile(&self, session: &Session, value: &ProfileValue) -> Result<ObjectUrl> {
        let channels = vec![
            ChannelName::from(PROFILE_CHANNEL),
            ChannelName::from(&session.actor),
        ];
        Ok(self
            .store
            .put(PutObject::new(value.to_value()?, channels), session)
            .await?)
    }

    async fn upload_picture(&self, session: &Session, picture: &Picture) -> Result<ObjectUrl> {
        let value = FileValue {
            file: FileData {
                name: picture.name.clone(),
                mime_type: picture.mime_type.clone(),
                data: STANDARD.encode(&picture.bytes),
            },
            published: now_millis(),
        };
        let url = self
            .store
            .put(PutObject::new(value.to_value()?, Vec::new()), session)
            .await?;
        debug!(url = %url, size = picture.bytes.len(), "picture uploaded");
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use amity_store::{MemoryStore, ObjectStore};

    use super::*;

    fn profile(name: &str, published: i64) -> Profile {
        let value = ProfileValue {
            name: name.to_string(),
            ..ProfileValue::default_for(&Actor::from("alice"), published)
        };
        Profile {
            object: StoredObject {
                actor: Actor::from("alice"),
                value: value.to_value().unwrap(),
                channels: vec![ChannelName::from("alice")],
                url: ObjectUrl::generate(),
            },
            value,
        }
    }

    async fn own_profile_count(store: &MemoryStore, actor: &str) -> usize {
        store
            .discover(&[ChannelName::from(actor)], &ProfileValue::schema().unwrap())
            .collect::<Vec<_>>()
            .await
            .len()
    }

    #[test]
    fn latest_by_published_wins() {
        let latest = resolve_latest(vec![profile("old", 1), profile("new", 3), profile("mid", 2)]);
        assert_eq!(latest.unwrap().value.name, "new");
    }

    #[test]
    fn equal_published_keeps_first() {
        let latest = resolve_latest(vec![profile("first", 5), profile("second", 5)]);
        assert_eq!(latest.unwrap().value.name, "first");
        assert!(resolve_latest(Vec::new()).is_none());
    }

    #[tokio::test]
    async fn first_login_creates_exactly_one_default_profile() {
        let store = Arc::new(MemoryStore::new());
        let actor = Actor::from("https://id.example/users/alice");

        let mut client = Client::new(store.clone());
        client.login(&actor).await.unwrap();
        assert_eq!(client.state().profile.name, "alice");
        assert_eq!(own_profile_count(&store, actor.as_str()).await, 1);

        // A later login finds it and writes nothing.
        let mut again = Client::new(store.clone());
        again.login(&actor).await.unwrap();
        assert_eq!(own_profile_count(&store, actor.as_str()).await, 1);

        let broadcast = store
            .discover(&[ChannelName::from(PROFILE_CHANNEL)], &ProfileValue::schema().unwrap())
            .collect::<Vec<_>>()
            .await;
        assert_eq!(broadcast.len(), 1);
    }

    #[tokio::test]
    async fn every_field_edit_saves_full_profile() {
        let store = Arc::new(MemoryStore::new());
        let mut client = Client::new(store.clone());
        client.login(&Actor::from("alice")).await.unwrap();

        client.set_profile_field(ProfileField::Name, "Al").await.unwrap();
        client.set_profile_field(ProfileField::Pronouns, "she/her").await.unwrap();
        client.set_profile_field(ProfileField::Bio, "hello").await.unwrap();
        assert_eq!(own_profile_count(&store, "alice").await, 4);

        let latest = client.profile_of(&Actor::from("alice")).await.unwrap().unwrap();
        assert_eq!(latest.name, "Al");
        assert_eq!(latest.pronouns, "she/her");
        assert_eq!(latest.bio, "hello");
    }

    #[tokio::test]
    async fn picture_is_uploaded_before_profile() {
        let store = Arc::new(MemoryStore::new());
        let mut client = Client::new(store.clone());
        client.login(&Actor::from("alice")).await.unwrap();

        client.set_profile_picture(Picture {
            name: "me.png".into(),
            mime_type: "image/png".into(),
            bytes: vec![0x89, b'P', b'N', b'G'],
        });
        client.save_profile().await.unwrap();
        assert!(client.state().profile.pending_picture.is_none());

        let icon = client
            .profile_of(&Actor::from("alice"))
            .await
            .unwrap()
            .unwrap()
            .icon;
        assert!(!icon.is_empty());

        let picture = client.load_picture(&ObjectUrl(icon)).await.unwrap();
        assert_eq!(picture.bytes, vec![0x89, b'P', b'N', b'G']);
        assert_eq!(picture.mime_type, "image/png");

        client.remove_profile_picture();
        client.save_profile().await.unwrap();
        let after = client.profile_of(&Actor::from("alice")).await.unwrap().unwrap();
        assert_eq!(after.icon, "");
    }

    #[tokio::test]
    async fn peer_cards_fall_back_to_id() {
        let store = Arc::new(MemoryStore::new());
        let mut alice = Client::new(store.clone());
        alice.login(&Actor::from("https://id.example/alice")).await.unwrap();
        alice.set_profile_field(ProfileField::Name, "Alice A.").await.unwrap();

        let bob = Client::new(store);
        let cards = bob
            .describe_peers(&[Actor::from("https://id.example/alice"), Actor::from("ghost")])
            .await
            .unwrap();
        assert_eq!(cards[0].name, "Alice A.");
        assert_eq!(cards[1].name, "ghost");
        assert!(cards[1].icon.is_none());
    }

    #[tokio::test]
    async fn profiles_describing_someone_else_are_ignored() {
        let store = Arc::new(MemoryStore::new());
        let mut mallory = Client::new(store.clone());
        mallory.login(&Actor::from("mallory")).await.unwrap();

        let session = mallory.state().session.clone().unwrap();
        let forged = ProfileValue {
            name: "Not Alice".into(),
            ..ProfileValue::default_for(&Actor::from("bob"), i64::MAX)
        };
        store
            .put(
                PutObject::new(forged.to_value().unwrap(), vec![ChannelName::from("mallory")]),
                &session,
            )
            .await
            .unwrap();

        let own = mallory.profile_of(&Actor::from("mallory")).await.unwrap().unwrap();
        assert_eq!(own.name, "mallory");
    }

    #[tokio::test]
    async fn profiles_authored_by_someone_else_are_ignored() {
        let store = Arc::new(MemoryStore::new());
        let mut mallory = Client::new(store.clone());
        mallory.login(&Actor::from("mallory")).await.unwrap();

        let session = mallory.state().session.clone().unwrap();
        let forged = ProfileValue {
            name: "Impostor".into(),
            ..ProfileValue::default_for(&Actor::from("bob"), i64::MAX)
        };
        store
            .put(
                PutObject::new(
                    forged.to_value().unwrap(),
                    vec![ChannelName::from(PROFILE_CHANNEL), ChannelName::from("bob")],
                ),
                &session,
            )
            .await
            .unwrap();

        let mut bob = Client::new(store.clone());
        bob.login(&Actor::from("bob")).await.unwrap();
        assert_eq!(bob.state().profile.name, "bob");

        bob.set_profile_field(ProfileField::Name, "Bob Real").await.unwrap();
        let resolved = bob.profile_of(&Actor::from("bob")).await.unwrap().unwrap();
        assert_eq!(resolved.name, "Bob Real");

        let cards = mallory.describe_peers(&[Actor::from("bob")]).await.unwrap();
        assert_eq!(cards[0].name, "Bob Real");
    }

    #[tokio::test]
    async fn failed_upload_keeps_pending_picture() {
        let store = Arc::new(MemoryStore::new());
        let mut client = Client::new(store.clone());
        client.login(&Actor::from("alice")).await.unwrap();

        let picture = Picture {
            name: "me.png".into(),
            mime_type: "image/png".into(),
            bytes: vec![1, 2, 3],
        };
        client.set_profile_picture(picture.clone());

        let session = client.state().session.clone().unwrap();
        store.logout(&session).await.unwrap();

        assert!(matches!(
            client.save_profile().await,
            Err(ClientError::Store(_))
        ));
        assert_eq!(client.state().profile.pending_picture, Some(picture));
        assert_eq!(client.state().profile.icon, "");
    }

    #[tokio::test]
    async fn no_session_saves_nothing() {
        let store = Arc::new(MemoryStore::new());
        let mut client = Client::new(store.clone());
        assert_eq!(client.save_profile().await.unwrap(), None);
        assert_eq!(client.load_profile().await.unwrap(), None);
        assert!(store.is_empty().unwrap());
    }
}
