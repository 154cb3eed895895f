//! v002 -- `users.about` and `messages.kind`.

use rusqlite::Connection;

use super::add_column_if_missing;

pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    add_column_if_missing(conn, "users", "about TEXT")?;
    add_column_if_missing(conn, "messages", "kind TEXT DEFAULT 'text'")
}
