//! In-process object store.
//!
//! Objects live in a `Vec` in insertion order (a replacement keeps its slot),
//! sessions in a map keyed by session id. Discovery snapshots the matching
//! objects under the lock, so a scan never observes a half-applied write.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use amity_shared::{Actor, ChannelName, ObjectUrl, PutObject, Schema, Session, StoredObject};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use tracing::debug;
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::store::{ObjectStore, ObjectStream};

#[derive(Debug, Default)]
struct Inner {
    objects: Vec<StoredObject>,
    sessions: HashMap<Uuid, Actor>,
}

impl Inner {
    fn check_session(&self, session: &Session) -> Result<()> {
        match self.sessions.get(&session.id) {
            Some(actor) if *actor == session.actor => Ok(()),
            _ => Err(StoreError::InvalidSession),
        }
    }

    fn position_owned_by(&self, url: &ObjectUrl, actor: &Actor) -> Result<usize> {
        let idx = self
            .objects
            .iter()
            .position(|o| o.url == *url)
            .ok_or_else(|| StoreError::NotFound(url.clone()))?;

        let owner = &self.objects[idx].actor;
        if owner != actor {
            return Err(StoreError::Unauthorized {
                actor: actor.clone(),
                owner: owner.clone(),
            });
        }
        Ok(idx)
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner.lock().map_err(|_| StoreError::LockPoisoned)
    }

    /// Number of objects currently stored.
    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.objects.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    fn discover(&self, channels: &[ChannelName], schema: &Schema) -> ObjectStream {
        let inner = match self.lock() {
            Ok(inner) => inner,
            Err(e) => return stream::once(async move { Err(e) }).boxed(),
        };

        let found: Vec<StoredObject> = inner
            .objects
            .iter()
            .filter(|o| o.in_any(channels) && schema.matches(&o.value))
            .cloned()
            .collect();

        debug!(channels = channels.len(), found = found.len(), "discover");
        stream::iter(found.into_iter().map(Ok)).boxed()
    }

    async fn get(&self, url: &ObjectUrl) -> Result<StoredObject> {
        let inner = self.lock()?;
        inner
            .objects
            .iter()
            .find(|o| o.url == *url)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(url.clone()))
    }

    async fn put(&self, object: PutObject, session: &Session) -> Result<ObjectUrl> {
        let mut inner = self.lock()?;
        inner.check_session(session)?;

        match object.url {
            Some(url) => {
                let idx = inner.position_owned_by(&url, &session.actor)?;
                let existing = &mut inner.objects[idx];
                existing.value = object.value;
                existing.channels = object.channels;
                debug!(url = %url, "replaced object");
                Ok(url)
            }
            None => {
                let url = ObjectUrl::generate();
                inner.objects.push(StoredObject {
                    actor: session.actor.clone(),
                    value: object.value,
                    channels: object.channels,
                    url: url.clone(),
                });
                debug!(url = %url, actor = %session.actor, "created object");
                Ok(url)
            }
        }
    }

    async fn delete(&self, object: &StoredObject, session: &Session) -> Result<()> {
        let mut inner = self.lock()?;
        inner.check_session(session)?;

        let idx = inner.position_owned_by(&object.url, &session.actor)?;
        inner.objects.remove(idx);
        debug!(url = %object.url, "deleted object");
        Ok(())
    }

    async fn login(&self, actor: &Actor) -> Result<Session> {
        let session = Session::new(actor.clone());
        self.lock()?.sessions.insert(session.id, actor.clone());
        debug!(actor = %actor, "session opened");
        Ok(session)
    }

    async fn logout(&self, session: &Session) -> Result<()> {
        let mut inner = self.lock()?;
        inner.check_session(session)?;
        inner.sessions.remove(&session.id);
        debug!(actor = %session.actor, "session closed");
        Ok(())
    }
}
