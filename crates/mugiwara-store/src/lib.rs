//! # mugiwara-store
//!
//! SQLite row store for Mugiwara Chat.
//!
//! Two relations: `users` (participant id -> profile) and `messages`, a flat
//! log of every message across every conversation. Message bodies are stored
//! exactly as the codec produced them; this crate never looks inside them.
//! The conversation layer talks to the store through the [`RowStore`] trait.

pub mod database;
pub mod messages;
pub mod migrations;
pub mod models;
pub mod row_store;
pub mod users;

mod error;

pub use database::Database;
pub use error::{Result, StoreError};
pub use models::*;
pub use row_store::{RowStore, SqliteStore};
