//! The row-store seam the conversation layer is written against.
//!
//! [`SqliteStore`] is the production implementation. Anything else that can
//! answer these point and range queries (a remote SQL client, a test double)
//! plugs in the same way.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::{MessageRow, User};

pub trait RowStore: Send + Sync {
    /// Create tables and add missing columns. Idempotent.
    fn initialize_schema(&self) -> Result<()>;

    fn find_user(&self, id: &str) -> Result<Option<User>>;

    fn insert_user(&self, user: &User) -> Result<()>;

    /// Returns `true` if a row was updated.
    fn update_user(&self, user: &User) -> Result<bool>;

    /// Rows sent or received by `participant`, newest first.
    fn messages_for_participant(&self, participant: &str) -> Result<Vec<MessageRow>>;

    /// Rows between `a` and `b` in either direction, oldest first.
    fn messages_between(&self, a: &str, b: &str) -> Result<Vec<MessageRow>>;

    fn insert_message(&self, message: &MessageRow) -> Result<()>;
}

/// [`Database`] behind a mutex so it can be shared across threads.
pub struct SqliteStore {
    db: Mutex<Database>,
}

impl SqliteStore {
    pub fn new(db: Database) -> Self {
        Self { db: Mutex::new(db) }
    }

    pub fn open_at(path: &Path) -> Result<Self> {
        Ok(Self::new(Database::open_at(path)?))
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::new(Database::open_in_memory()?))
    }

    fn db(&self) -> Result<MutexGuard<'_, Database>> {
        self.db.lock().map_err(|_| StoreError::LockPoisoned)
    }
}

impl RowStore for SqliteStore {
    fn initialize_schema(&self) -> Result<()> {
        self.db()?.initialize_schema()
    }

    fn find_user(&self, id: &str) -> Result<Option<User>> {
        self.db()?.get_user(id)
    }

    fn insert_user(&self, user: &User) -> Result<()> {
        self.db()?.insert_user(user)
    }

    fn update_user(&self, user: &User) -> Result<bool> {
        self.db()?.update_user(user)
    }

    fn messages_for_participant(&self, participant: &str) -> Result<Vec<MessageRow>> {
        self.db()?.get_messages_for_participant(participant)
    }

    fn messages_between(&self, a: &str, b: &str) -> Result<Vec<MessageRow>> {
        self.db()?.get_messages_between(a, b)
    }

    fn insert_message(&self, message: &MessageRow) -> Result<()> {
        self.db()?.insert_message(message)
    }
}
