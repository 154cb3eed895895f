//! v001 -- Initial schema creation.
//!
//! Creates the `users` and `messages` tables in their original shape.
//! `users.about` and `messages.kind` arrive in v002.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Users
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS users (
    id     TEXT PRIMARY KEY,              -- participant id (phone number)
    name   TEXT,
    avatar TEXT                           -- URL or data-URI
);

-- ----------------------------------------------------------------
-- Messages (one flat log for every conversation)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS messages (
    id          TEXT PRIMARY KEY,
    sender_id   TEXT,
    receiver_id TEXT,
    body        TEXT,                     -- "enc::..." or legacy plaintext
    timestamp   INTEGER,                  -- milliseconds since the Unix epoch
    status      TEXT
);

CREATE INDEX IF NOT EXISTS idx_messages_sender_ts
    ON messages(sender_id, timestamp);

CREATE INDEX IF NOT EXISTS idx_messages_receiver_ts
    ON messages(receiver_id, timestamp);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
