//! The object store contract every backend implements.

use amity_shared::{Actor, ChannelName, ObjectUrl, PutObject, Schema, Session, StoredObject};
use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::error::Result;

/// Asynchronous sequence of discovered objects. Order is backend-defined and
/// must not be assumed chronological.
pub type ObjectStream = BoxStream<'static, Result<StoredObject>>;

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// All objects listed in at least one of `channels` whose value matches
    /// `schema`.
    fn discover(&self, channels: &[ChannelName], schema: &Schema) -> ObjectStream;

    /// Fetch a single object by url.
    async fn get(&self, url: &ObjectUrl) -> Result<StoredObject>;

    /// Create an object authored by the session actor, or replace the value
    /// and channels of an existing one when `object.url` is set.
    async fn put(&self, object: PutObject, session: &Session) -> Result<ObjectUrl>;

    /// Remove an object. Only its author may delete it.
    async fn delete(&self, object: &StoredObject, session: &Session) -> Result<()>;

    async fn login(&self, actor: &Actor) -> Result<Session>;

    async fn logout(&self, session: &Session) -> Result<()>;
}
