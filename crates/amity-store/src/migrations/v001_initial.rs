//! v001 -- Initial schema creation.
//!
//! Creates `objects`, the `object_channels` join table and `sessions`.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Objects (rowid order = insertion order, kept across replacement)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS objects (
    url        TEXT PRIMARY KEY NOT NULL,
    actor      TEXT NOT NULL,
    value      TEXT NOT NULL,               -- JSON
    created_at TEXT NOT NULL,               -- RFC-3339
    updated_at TEXT NOT NULL
);

-- ----------------------------------------------------------------
-- Channel membership
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS object_channels (
    url     TEXT NOT NULL REFERENCES objects(url) ON DELETE CASCADE,
    channel TEXT NOT NULL,
    PRIMARY KEY (url, channel)
);

CREATE INDEX IF NOT EXISTS idx_object_channels_channel
    ON object_channels(channel);

-- ----------------------------------------------------------------
-- Sessions
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS sessions (
    id         TEXT PRIMARY KEY NOT NULL,   -- UUID v4
    actor      TEXT NOT NULL,
    created_at TEXT NOT NULL
);
"#;

/// Apply the initial schema.
pub fn up(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(UP_SQL)
}
