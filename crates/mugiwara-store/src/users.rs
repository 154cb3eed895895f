//! CRUD operations for [`User`] records.

use rusqlite::{params, OptionalExtension};

use crate::database::Database;
use crate::error::Result;
use crate::models::User;

impl Database {
    /// Look up a user by participant id.
    pub fn get_user(&self, id: &str) -> Result<Option<User>> {
        let user = self
            .conn()
            .query_row(
                "SELECT id, name, avatar, about FROM users WHERE id = ?1",
                params![id],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    /// Insert a new user.
    pub fn insert_user(&self, user: &User) -> Result<()> {
        self.conn().execute(
            "INSERT INTO users (id, name, avatar, about) VALUES (?1, ?2, ?3, ?4)",
            params![
                user.id.as_str(),
                user.display_name,
                user.avatar,
                user.about,
            ],
        )?;
        Ok(())
    }

    /// Overwrite name, avatar and about.  Returns `true` if the user existed.
    pub fn update_user(&self, user: &User) -> Result<bool> {
        let affected = self.conn().execute(
            "UPDATE users SET name = ?1, avatar = ?2, about = ?3 WHERE id = ?4",
            params![
                user.display_name,
                user.avatar,
                user.about.as_deref().unwrap_or(""),
                user.id.as_str(),
            ],
        )?;
        Ok(affected > 0)
    }
}

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    let id: String = row.get(0)?;
    let name: Option<String> = row.get(1)?;
    let avatar: Option<String> = row.get(2)?;
    let about: Option<String> = row.get(3)?;

    Ok(User {
        display_name: name.unwrap_or_else(|| id.clone()),
        id: id.into(),
        avatar: avatar.unwrap_or_default(),
        about,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nami() -> User {
        User {
            id: "+15550003".into(),
            display_name: "Nami".into(),
            avatar: "https://example.test/nami.png".into(),
            about: Some("You owe me 100,000 berries.".into()),
        }
    }

    #[test]
    fn insert_then_get() {
        let db = Database::open_in_memory().unwrap();
        db.insert_user(&nami()).unwrap();
        assert_eq!(db.get_user("+15550003").unwrap(), Some(nami()));
    }

    #[test]
    fn missing_user_is_none() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.get_user("+10000000").unwrap(), None);
    }

    #[test]
    fn duplicate_insert_fails() {
        let db = Database::open_in_memory().unwrap();
        db.insert_user(&nami()).unwrap();
        assert!(db.insert_user(&nami()).is_err());
    }

    #[test]
    fn update_overwrites_profile() {
        let db = Database::open_in_memory().unwrap();
        db.insert_user(&nami()).unwrap();

        let mut updated = nami();
        updated.display_name = "Cat Burglar".into();
        updated.about = None;
        assert!(db.update_user(&updated).unwrap());

        let stored = db.get_user("+15550003").unwrap().unwrap();
        assert_eq!(stored.display_name, "Cat Burglar");
        assert_eq!(stored.about.as_deref(), Some(""));
    }

    #[test]
    fn update_unknown_user_reports_false() {
        let db = Database::open_in_memory().unwrap();
        assert!(!db.update_user(&nami()).unwrap());
    }

    #[test]
    fn legacy_row_with_nulls() {
        let db = Database::open_in_memory().unwrap();
        db.conn()
            .execute("INSERT INTO users (id) VALUES ('+15550009')", [])
            .unwrap();
        let user = db.get_user("+15550009").unwrap().unwrap();
        assert_eq!(user.display_name, "+15550009");
        assert_eq!(user.avatar, "");
        assert_eq!(user.about, None);
    }
}
