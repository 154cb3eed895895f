use mugiwara_shared::{DeliveryStatus, MessageKind};
use rusqlite::params;

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::MessageRow;

const MESSAGE_COLUMNS: &str = "id, sender_id, receiver_id, body, kind, timestamp, status";

impl Database {
    pub fn insert_message(&self, message: &MessageRow) -> Result<()> {
        self.conn().execute(
            "INSERT INTO messages (id, sender_id, receiver_id, body, kind, timestamp, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                message.id,
                message.sender_id.as_str(),
                message.receiver_id.as_str(),
                message.body,
                message.kind.as_str(),
                message.timestamp,
                message.status.as_str(),
            ],
        )?;
        Ok(())
    }

    /// Every row `participant` sent or received, newest first.
    pub fn get_messages_for_participant(&self, participant: &str) -> Result<Vec<MessageRow>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {MESSAGE_COLUMNS}
             FROM messages
             WHERE sender_id = ?1 OR receiver_id = ?1
             ORDER BY timestamp DESC"
        ))?;

        let rows = stmt.query_map(params![participant], row_to_message)?;

        let mut messages = Vec::new();
        for row in rows {
            messages.push(row?);
        }
        Ok(messages)
    }

    /// Every row exchanged between `a` and `b` in either direction, oldest first.
    pub fn get_messages_between(&self, a: &str, b: &str) -> Result<Vec<MessageRow>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {MESSAGE_COLUMNS}
             FROM messages
             WHERE (sender_id = ?1 AND receiver_id = ?2)
                OR (sender_id = ?2 AND receiver_id = ?1)
             ORDER BY timestamp ASC"
        ))?;

        let rows = stmt.query_map(params![a, b], row_to_message)?;

        let mut messages = Vec::new();
        for row in rows {
            messages.push(row?);
        }
        Ok(messages)
    }

    pub fn get_message_by_id(&self, id: &str) -> Result<MessageRow> {
        self.conn()
            .query_row(
                &format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = ?1"),
                params![id],
                row_to_message,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
                other => StoreError::Sqlite(other),
            })
    }
}

// Legacy rows may carry NULL in any column but the id.
fn row_to_message(row: &rusqlite::Row<'_>) -> rusqlite::Result<MessageRow> {
    let id: String = row.get(0)?;
    let sender: Option<String> = row.get(1)?;
    let receiver: Option<String> = row.get(2)?;
    let body: Option<String> = row.get(3)?;
    let kind: Option<String> = row.get(4)?;
    let timestamp: Option<i64> = row.get(5)?;
    let status: Option<String> = row.get(6)?;

    Ok(MessageRow {
        id,
        sender_id: sender.unwrap_or_default().into(),
        receiver_id: receiver.unwrap_or_default().into(),
        body: body.unwrap_or_default(),
        kind: MessageKind::from_column(kind.as_deref()),
        timestamp: timestamp.unwrap_or_default(),
        status: DeliveryStatus::from_column(status.as_deref()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, from: &str, to: &str, ts: i64) -> MessageRow {
        MessageRow {
            id: id.into(),
            sender_id: from.into(),
            receiver_id: to.into(),
            body: format!("body-{id}"),
            kind: MessageKind::Text,
            timestamp: ts,
            status: DeliveryStatus::Sent,
        }
    }

    fn seeded() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.insert_message(&row("1", "luffy", "zoro", 1)).unwrap();
        db.insert_message(&row("2", "zoro", "luffy", 3)).unwrap();
        db.insert_message(&row("3", "luffy", "nami", 2)).unwrap();
        db.insert_message(&row("4", "nami", "sanji", 4)).unwrap();
        db
    }

    #[test]
    fn participant_rows_newest_first() {
        let db = seeded();
        let ids: Vec<_> = db
            .get_messages_for_participant("luffy")
            .unwrap()
            .into_iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(ids, vec!["2", "3", "1"]);
    }

    #[test]
    fn pair_rows_oldest_first_both_directions() {
        let db = seeded();
        let ids: Vec<_> = db
            .get_messages_between("zoro", "luffy")
            .unwrap()
            .into_iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn get_by_id_and_not_found() {
        let db = seeded();
        assert_eq!(db.get_message_by_id("3").unwrap(), row("3", "luffy", "nami", 2));
        assert!(matches!(db.get_message_by_id("99"), Err(StoreError::NotFound)));
    }

    #[test]
    fn legacy_row_defaults() {
        let db = Database::open_in_memory().unwrap();
        db.conn()
            .execute(
                "INSERT INTO messages (id, sender_id, receiver_id, body, kind, timestamp)
                 VALUES ('old', 'luffy', 'zoro', 'meat!', NULL, 5)",
                [],
            )
            .unwrap();
        let m = db.get_message_by_id("old").unwrap();
        assert_eq!(m.kind, MessageKind::Text);
        assert_eq!(m.status, DeliveryStatus::Sent);
        assert_eq!(m.body, "meat!");
    }

    #[test]
    fn kind_round_trips() {
        let db = Database::open_in_memory().unwrap();
        let mut r = row("v", "luffy", "usopp", 1);
        r.kind = MessageKind::Audio;
        db.insert_message(&r).unwrap();
        assert_eq!(db.get_message_by_id("v").unwrap().kind, MessageKind::Audio);
    }
}
