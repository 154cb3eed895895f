//! Conversation list, message threads and sending.
//!
//! Every body is decrypted on the way out of the store and encrypted on the
//! way in. The public operations never fail: a broken or missing store reads
//! as empty, a send always returns its optimistic record, and an unreadable
//! body shows the sentinel text. The `try_*` variants expose the errors.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, TimeZone, Utc};
use serde::Serialize;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use mugiwara_shared::{DeliveryStatus, MessageCodec, MessageKind, ParticipantId};
use mugiwara_store::{MessageRow, RowStore, SqliteStore};

use crate::config::{ClientConfig, DEFAULT_CONVERSATIONS_POLL, DEFAULT_THREAD_POLL};
use crate::error::{ClientError, Result};
use crate::refresh::{PollHandle, Poller};
use crate::session::Session;

/// A decrypted message, ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub sender_id: ParticipantId,
    pub receiver_id: ParticipantId,
    /// Plaintext, a data-URI for media, or the unreadable-message sentinel.
    pub text: String,
    pub kind: MessageKind,
    pub timestamp: i64,
    pub status: DeliveryStatus,
    pub is_self: bool,
}

/// One entry of the conversation list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub peer_id: ParticipantId,
    pub display_name: String,
    pub avatar: String,
    pub about: String,
    /// Decrypted text of the latest message, or a label for media.
    pub last_message: String,
    pub timestamp: i64,
    /// Local wall-clock time of the latest message, `HH:MM`.
    pub last_message_time: String,
    pub unread_count: u32,
}

/// Conversation store adapter.
#[derive(Clone)]
pub struct ChatService {
    store: Option<Arc<dyn RowStore>>,
    codec: Arc<MessageCodec>,
    session_path: Option<PathBuf>,
    conversations_poll: Duration,
    thread_poll: Duration,
}

impl ChatService {
    pub fn new(store: Option<Arc<dyn RowStore>>, codec: MessageCodec) -> Self {
        Self {
            store,
            codec: Arc::new(codec),
            session_path: None,
            conversations_poll: DEFAULT_CONVERSATIONS_POLL,
            thread_poll: DEFAULT_THREAD_POLL,
        }
    }

    /// Open the configured store.  If it cannot be opened the service runs
    /// local-only rather than failing.
    pub fn from_config(config: &ClientConfig) -> Self {
        let store: Option<Arc<dyn RowStore>> = match &config.database_path {
            Some(path) => match SqliteStore::open_at(path) {
                Ok(store) => Some(Arc::new(store)),
                Err(e) => {
                    error!(path = %path.display(), error = %e, "Failed to open message store, running local-only");
                    None
                }
            },
            None => {
                warn!("No message store configured, running local-only");
                None
            }
        };

        let mut service = Self::new(store, MessageCodec::new(config.app_secret()));
        service.session_path = config.session_path.clone();
        service.with_poll_intervals(
            config.conversations_poll_interval,
            config.thread_poll_interval,
        )
    }

    pub fn with_session_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_path = Some(path.into());
        self
    }

    /// Intervals used by [`watch_conversations`](Self::watch_conversations)
    /// and [`watch_thread`](Self::watch_thread).
    pub fn with_poll_intervals(mut self, conversations: Duration, thread: Duration) -> Self {
        self.conversations_poll = conversations;
        self.thread_poll = thread;
        self
    }

    pub fn poll_intervals(&self) -> (Duration, Duration) {
        (self.conversations_poll, self.thread_poll)
    }

    pub fn is_configured(&self) -> bool {
        self.store.is_some()
    }

    pub fn codec(&self) -> &MessageCodec {
        &self.codec
    }

    pub(crate) fn session_path(&self) -> Option<&PathBuf> {
        self.session_path.as_ref()
    }

    pub(crate) fn store(&self) -> Result<&Arc<dyn RowStore>> {
        self.store.as_ref().ok_or(ClientError::StoreUnavailable)
    }

    // ------------------------------------------------------------------
    // Conversation list
    // ------------------------------------------------------------------

    /// One summary per peer, most recent conversation first.
    pub fn list_conversations(&self, session: &Session) -> Vec<Conversation> {
        self.try_list_conversations(session)
            .unwrap_or_else(|e| degrade(e, "Fetch conversations failed"))
    }

    pub fn try_list_conversations(&self, session: &Session) -> Result<Vec<Conversation>> {
        let store = self.store()?;
        let me = session.id();
        let rows = store.messages_for_participant(me.as_str())?;

        let mut seen = HashSet::new();
        let mut conversations = Vec::new();

        // Rows arrive newest first: the first row per peer is its latest.
        for row in &rows {
            let peer = row.peer_of(me);
            if !seen.insert(peer.clone()) {
                continue;
            }
            conversations.push(self.summarize(store.as_ref(), me, peer, row));
        }

        debug!(rows = rows.len(), conversations = conversations.len(), "conversations folded");
        Ok(conversations)
    }

    fn summarize(
        &self,
        store: &dyn RowStore,
        me: &ParticipantId,
        peer: &ParticipantId,
        latest: &MessageRow,
    ) -> Conversation {
        let profile = match store.find_user(peer.as_str()) {
            Ok(profile) => profile,
            Err(e) => {
                warn!(peer = %peer, error = %e, "Failed to fetch user details");
                None
            }
        };

        let (display_name, avatar, about) = match profile {
            Some(user) => (user.display_name, user.avatar, user.about.unwrap_or_default()),
            None => (peer.to_string(), default_peer_avatar(peer), String::new()),
        };

        let last_message = match latest.kind.preview_label() {
            Some(label) => label.to_string(),
            None => self.codec.decode(&latest.body, me.as_str(), peer.as_str()),
        };

        Conversation {
            peer_id: peer.clone(),
            display_name,
            avatar,
            about,
            last_message,
            timestamp: latest.timestamp,
            last_message_time: clock_label(latest.timestamp),
            unread_count: 0,
        }
    }

    // ------------------------------------------------------------------
    // Thread
    // ------------------------------------------------------------------

    /// Every message between the session user and `peer`, oldest first.
    pub fn list_messages(&self, session: &Session, peer: &ParticipantId) -> Vec<Message> {
        self.try_list_messages(session, peer)
            .unwrap_or_else(|e| degrade(e, "Get messages failed"))
    }

    pub fn try_list_messages(&self, session: &Session, peer: &ParticipantId) -> Result<Vec<Message>> {
        let store = self.store()?;
        let me = session.id();
        let rows = store.messages_between(me.as_str(), peer.as_str())?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let text = self.codec.decode(&row.body, me.as_str(), peer.as_str());
                Message {
                    is_self: &row.sender_id == me,
                    id: row.id,
                    sender_id: row.sender_id,
                    receiver_id: row.receiver_id,
                    text,
                    kind: row.kind,
                    timestamp: row.timestamp,
                    status: row.status,
                }
            })
            .collect())
    }

    // ------------------------------------------------------------------
    // Send
    // ------------------------------------------------------------------

    /// Encrypt and persist `content`, returning the plaintext record at once.
    ///
    /// The record comes back whether or not the write succeeds; failures are
    /// logged only.
    pub fn send(
        &self,
        session: &Session,
        peer: &ParticipantId,
        content: &str,
        kind: MessageKind,
    ) -> Message {
        let me = session.id();
        let body = self.codec.encode(content, me.as_str(), peer.as_str());

        let message = Message {
            id: Uuid::new_v4().to_string(),
            sender_id: me.clone(),
            receiver_id: peer.clone(),
            text: content.to_string(),
            kind,
            timestamp: Utc::now().timestamp_millis(),
            status: DeliveryStatus::Sent,
            is_self: true,
        };

        let row = MessageRow {
            id: message.id.clone(),
            sender_id: message.sender_id.clone(),
            receiver_id: message.receiver_id.clone(),
            body,
            kind: message.kind.clone(),
            timestamp: message.timestamp,
            status: message.status,
        };

        match self
            .store()
            .and_then(|store| store.insert_message(&row).map_err(ClientError::from))
        {
            Ok(()) => info!(msg_id = %message.id, peer = %peer, kind = %message.kind, "Message sent"),
            Err(ClientError::StoreUnavailable) => {
                debug!(msg_id = %message.id, "No store configured, message kept locally")
            }
            Err(e) => error!(msg_id = %message.id, peer = %peer, error = %e, "Send failed"),
        }

        message
    }

    // ------------------------------------------------------------------
    // Scheduled refresh
    // ------------------------------------------------------------------

    /// Re-fetch the conversation list on the conversations interval until
    /// the handle is cancelled or dropped.
    pub fn watch_conversations(&self, session: &Session) -> PollHandle<Vec<Conversation>> {
        let service = self.clone();
        let session = session.clone();
        Poller::spawn(self.conversations_poll, move || {
            service.list_conversations(&session)
        })
    }

    /// Re-fetch the thread with `peer` on the thread interval.
    pub fn watch_thread(&self, session: &Session, peer: &ParticipantId) -> PollHandle<Vec<Message>> {
        let service = self.clone();
        let session = session.clone();
        let peer = peer.clone();
        Poller::spawn(self.thread_poll, move || service.list_messages(&session, &peer))
    }
}

fn degrade<T>(e: ClientError, context: &str) -> Vec<T> {
    match e {
        ClientError::StoreUnavailable => debug!("{context}: no store configured"),
        other => error!(error = %other, "{context}"),
    }
    Vec::new()
}

fn default_peer_avatar(peer: &ParticipantId) -> String {
    format!("https://ui-avatars.com/api/?name={peer}")
}

fn clock_label(timestamp_ms: i64) -> String {
    Local
        .timestamp_millis_opt(timestamp_ms)
        .single()
        .map(|t| t.format("%H:%M").to_string())
        .unwrap_or_default()
}
