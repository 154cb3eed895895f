//! Login, profile lookup and profile edits.
//!
//! Like the conversation calls, these degrade instead of failing: with no
//! store, or a broken one, login still yields a usable session and edits
//! still apply locally.

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use mugiwara_shared::constants::APP_NAME;
use mugiwara_shared::ParticipantId;
use mugiwara_store::User;

use crate::conversations::ChatService;
use crate::error::Result;
use crate::session::Session;

const FALLBACK_ABOUT: &str = "Ahoy!";

/// Fields a user can edit.  `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub avatar: Option<String>,
    pub about: Option<String>,
}

impl ChatService {
    /// Log in as `id`, registering a new profile on first sight.
    pub fn login_or_register(&self, id: &ParticipantId, name: &str) -> Session {
        let fallback = default_user(id, name);

        let user = match self.try_login_or_register(id, fallback.clone()) {
            Ok(user) => user,
            Err(e) => {
                warn!(user = %id, error = %e, "Login against store failed, using local profile");
                fallback
            }
        };

        let session = Session::new(user);
        self.remember(&session);
        info!(user = %id, "Logged in");
        session
    }

    fn try_login_or_register(&self, id: &ParticipantId, fallback: User) -> Result<User> {
        let store = self.store()?;
        store.initialize_schema()?;

        if let Some(mut existing) = store.find_user(id.as_str())? {
            if existing.about.as_deref().map_or(true, str::is_empty) {
                existing.about = Some(FALLBACK_ABOUT.to_string());
            }
            debug!(user = %id, "existing profile");
            return Ok(existing);
        }

        store.insert_user(&fallback)?;
        info!(user = %id, "Registered new profile");
        Ok(fallback)
    }

    /// Session saved by an earlier login, if a session file is configured.
    pub fn restore_session(&self) -> Option<Session> {
        let path = self.session_path()?;
        match Session::load(path) {
            Ok(session) => session,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring unreadable session file");
                None
            }
        }
    }

    pub fn logout(&self, session: Session) {
        if let Some(path) = self.session_path() {
            if let Err(e) = Session::forget(path) {
                warn!(path = %path.display(), error = %e, "Failed to remove session file");
            }
        }
        info!(user = %session.id(), "Logged out");
    }

    /// Exact-id lookup, e.g. to start a conversation with a new contact.
    pub fn search_user(&self, id: &ParticipantId) -> Option<User> {
        let store = self.store().ok()?;
        match store.find_user(id.as_str()) {
            Ok(user) => user,
            Err(e) => {
                warn!(user = %id, error = %e, "User search failed");
                None
            }
        }
    }

    /// Apply `update` to the session and push it to the store best-effort.
    pub fn update_profile(&self, session: &mut Session, update: ProfileUpdate) {
        {
            let user = session.user_mut();
            if let Some(name) = update.display_name {
                user.display_name = name;
            }
            if let Some(avatar) = update.avatar {
                user.avatar = avatar;
            }
            if let Some(about) = update.about {
                user.about = Some(about);
            }
        }
        self.remember(session);

        if let Ok(store) = self.store() {
            match store.update_user(session.user()) {
                Ok(true) => debug!(user = %session.id(), "profile synced"),
                Ok(false) => warn!(user = %session.id(), "Profile update matched no stored user"),
                Err(e) => error!(user = %session.id(), error = %e, "Failed to sync profile update"),
            }
        }
    }

    fn remember(&self, session: &Session) {
        if let Some(path) = self.session_path() {
            if let Err(e) = session.save(path) {
                warn!(path = %path.display(), error = %e, "Failed to save session");
            }
        }
    }
}

fn default_user(id: &ParticipantId, name: &str) -> User {
    User {
        id: id.clone(),
        display_name: name.to_string(),
        avatar: format!(
            "https://ui-avatars.com/api/?name={}&background=random",
            encode_uri_component(name)
        ),
        about: Some(format!("Hey there! I am using {APP_NAME}.")),
    }
}

// Same unreserved set as JavaScript's encodeURIComponent.
fn encode_uri_component(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => out.push(byte as char),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}
