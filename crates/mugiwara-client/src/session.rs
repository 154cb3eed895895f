//! The logged-in user, passed explicitly to every conversation call.

use std::path::Path;

use mugiwara_shared::ParticipantId;
use mugiwara_store::User;
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    user: User,
}

impl Session {
    pub fn new(user: User) -> Self {
        Self { user }
    }

    pub fn id(&self) -> &ParticipantId {
        &self.user.id
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub(crate) fn user_mut(&mut self) -> &mut User {
        &mut self.user
    }

    /// Write the session as JSON, replacing any previous file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_vec_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Restore a saved session.  A missing file means nobody is logged in.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let session: Self = serde_json::from_slice(&bytes)?;
        if session.user.id.as_str().is_empty() {
            return Err(ClientError::Session(format!(
                "{} has no participant id",
                path.display()
            )));
        }
        Ok(Some(session))
    }

    /// Remove a saved session.  Succeeds if there was none.
    pub fn forget(path: &Path) -> Result<()> {
        match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new(User {
            id: "+15550001".into(),
            display_name: "Luffy".into(),
            avatar: "https://example.test/luffy.png".into(),
            about: Some("King of the Pirates".into()),
        })
    }

    #[test]
    fn save_load_forget() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("session.json");

        session().save(&path).unwrap();
        assert_eq!(Session::load(&path).unwrap(), Some(session()));

        Session::forget(&path).unwrap();
        assert_eq!(Session::load(&path).unwrap(), None);
        Session::forget(&path).unwrap();
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, b"{ not json").unwrap();
        assert!(matches!(Session::load(&path), Err(ClientError::Json(_))));
    }

    #[test]
    fn blank_id_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let mut blank = session();
        blank.user_mut().id = "".into();
        blank.save(&path).unwrap();
        assert!(matches!(Session::load(&path), Err(ClientError::Session(_))));
    }
}
