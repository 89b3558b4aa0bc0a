use amity_shared::{Actor, ChannelName, ObjectUrl, PutObject, Schema, Session, StoredObject};
use async_trait::async_trait;
use chrono::Utc;
use futures::stream::{self, StreamExt};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use uuid::Uuid;

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::store::{ObjectStore, ObjectStream};

impl Database {
    /// Objects listed in any of `channels` whose value matches `schema`, in
    /// insertion order.
    pub fn find_objects(&self, channels: &[ChannelName], schema: &Schema) -> Result<Vec<StoredObject>> {
        if channels.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.conn()?;
        let placeholders = vec!["?"; channels.len()].join(", ");
        let sql = format!(
            "SELECT DISTINCT o.url, o.actor, o.value, o.rowid
             FROM objects o
             JOIN object_channels c ON c.url = o.url
             WHERE c.channel IN ({placeholders})
             ORDER BY o.rowid"
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(channels.iter().map(|c| c.as_str())), |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut objects = Vec::new();
        for row in rows {
            let (url, actor, value_json) = row?;
            let value: serde_json::Value = serde_json::from_str(&value_json)?;
            if !schema.matches(&value) {
                continue;
            }
            let url = ObjectUrl(url);
            objects.push(StoredObject {
                channels: load_channels(&conn, &url)?,
                actor: Actor(actor),
                value,
                url,
            });
        }
        Ok(objects)
    }

    pub fn get_object(&self, url: &ObjectUrl) -> Result<StoredObject> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                "SELECT actor, value FROM objects WHERE url = ?1",
                params![url.as_str()],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;

        let (actor, value_json) = row.ok_or_else(|| StoreError::NotFound(url.clone()))?;
        Ok(StoredObject {
            actor: Actor(actor),
            value: serde_json::from_str(&value_json)?,
            channels: load_channels(&conn, url)?,
            url: url.clone(),
        })
    }

    pub fn insert_object(&self, object: &PutObject, author: &Actor) -> Result<ObjectUrl> {
        let url = ObjectUrl::generate();
        let now = Utc::now().to_rfc3339();
        let value_json = serde_json::to_string(&object.value)?;

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO objects (url, actor, value, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)",
            params![url.as_str(), author.as_str(), value_json, now],
        )?;
        store_channels(&tx, &url, &object.channels)?;
        tx.commit()?;

        tracing::debug!(url = %url, actor = %author, "inserted object");
        Ok(url)
    }

    pub fn replace_object(&self, url: &ObjectUrl, object: &PutObject, author: &Actor) -> Result<()> {
        let value_json = serde_json::to_string(&object.value)?;

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        check_owner(&tx, url, author)?;
        tx.execute(
            "UPDATE objects SET value = ?1, updated_at = ?2 WHERE url = ?3",
            params![value_json, Utc::now().to_rfc3339(), url.as_str()],
        )?;
        tx.execute("DELETE FROM object_channels WHERE url = ?1", params![url.as_str()])?;
        store_channels(&tx, url, &object.channels)?;
        tx.commit()?;

        tracing::debug!(url = %url, "replaced object");
        Ok(())
    }

    pub fn delete_object(&self, url: &ObjectUrl, author: &Actor) -> Result<()> {
        let conn = self.conn()?;
        check_owner(&conn, url, author)?;
        conn.execute("DELETE FROM objects WHERE url = ?1", params![url.as_str()])?;

        tracing::debug!(url = %url, "deleted object");
        Ok(())
    }

    pub fn insert_session(&self, session: &Session) -> Result<()> {
        self.conn()?.execute(
            "INSERT INTO sessions (id, actor, created_at) VALUES (?1, ?2, ?3)",
            params![
                session.id.to_string(),
                session.actor.as_str(),
                Utc::now().to_rfc3339()
            ],
        )?;
        Ok(())
    }

    pub fn delete_session(&self, id: Uuid) -> Result<bool> {
        let affected = self
            .conn()?
            .execute("DELETE FROM sessions WHERE id = ?1", params![id.to_string()])?;
        Ok(affected > 0)
    }

    pub fn check_session(&self, session: &Session) -> Result<()> {
        let actor: Option<String> = self
            .conn()?
            .query_row(
                "SELECT actor FROM sessions WHERE id = ?1",
                params![session.id.to_string()],
                |row| row.get(0),
            )
            .optional()?;

        match actor {
            Some(a) if a == session.actor.as_str() => Ok(()),
            _ => Err(StoreError::InvalidSession),
        }
    }
}

fn load_channels(conn: &Connection, url: &ObjectUrl) -> Result<Vec<ChannelName>> {
    let mut stmt =
        conn.prepare("SELECT channel FROM object_channels WHERE url = ?1 ORDER BY rowid")?;
    let rows = stmt.query_map(params![url.as_str()], |row| row.get::<_, String>(0))?;

    let mut channels = Vec::new();
    for row in rows {
        channels.push(ChannelName(row?));
    }
    Ok(channels)
}

fn store_channels(conn: &Connection, url: &ObjectUrl, channels: &[ChannelName]) -> Result<()> {
    let mut stmt =
        conn.prepare("INSERT OR IGNORE INTO object_channels (url, channel) VALUES (?1, ?2)")?;
    for channel in channels {
        stmt.execute(params![url.as_str(), channel.as_str()])?;
    }
    Ok(())
}

fn check_owner(conn: &Connection, url: &ObjectUrl, actor: &Actor) -> Result<()> {
    let owner: Option<String> = conn
        .query_row(
            "SELECT actor FROM objects WHERE url = ?1",
            params![url.as_str()],
            |row| row.get(0),
        )
        .optional()?;

    match owner {
        None => Err(StoreError::NotFound(url.clone())),
        Some(owner) if owner != actor.as_str() => Err(StoreError::Unauthorized {
            actor: actor.clone(),
            owner: Actor(owner),
        }),
        Some(_) => Ok(()),
    }
}

#[async_trait]
impl ObjectStore for Database {
    fn discover(&self, channels: &[ChannelName], schema: &Schema) -> ObjectStream {
        match self.find_objects(channels, schema) {
            Ok(found) => stream::iter(found.into_iter().map(Ok)).boxed(),
            Err(e) => stream::once(async move { Err(e) }).boxed(),
        }
    }

    async fn get(&self, url: &ObjectUrl) -> Result<StoredObject> {
        self.get_object(url)
    }

    async fn put(&self, object: PutObject, session: &Session) -> Result<ObjectUrl> {
        self.check_session(session)?;
        match &object.url {
            Some(url) => {
                self.replace_object(url, &object, &session.actor)?;
                Ok(url.clone())
            }
            None => self.insert_object(&object, &session.actor),
        }
    }

    async fn delete(&self, object: &StoredObject, session: &Session) -> Result<()> {
        self.check_session(session)?;
        self.delete_object(&object.url, &session.actor)
    }

    async fn login(&self, actor: &Actor) -> Result<Session> {
        let session = Session::new(actor.clone());
        self.insert_session(&session)?;
        tracing::info!(actor = %actor, "session opened");
        Ok(session)
    }

    async fn logout(&self, session: &Session) -> Result<()> {
        self.check_session(session)?;
        self.delete_session(session.id)?;
        tracing::info!(actor = %session.actor, "session closed");
        Ok(())
    }
}
