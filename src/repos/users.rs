use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::db::datalink::DataLink;
use crate::db::row::{to_timestamp, ProcParams, ProcRow};
use crate::error::RepositoryError;
use crate::models::User;

#[derive(Clone)]
pub struct UsersRepository {
    link: Arc<DataLink>,
}

impl UsersRepository {
    pub fn new(link: Arc<DataLink>) -> Self {
        Self { link }
    }

    pub fn get_all_users(&self) -> Result<Vec<User>, RepositoryError> {
        let rows = self
            .link
            .execute_reader("GetAllUsers", &ProcParams::new())
            .map_err(|e| RepositoryError::wrap("Database error while retrieving users.", e))?;
        Ok(rows.iter().filter_map(map_user).collect())
    }

    pub async fn get_all_users_async(&self) -> Result<Vec<User>, RepositoryError> {
        let rows = self
            .link
            .execute_reader_async("GetAllUsers", ProcParams::new())
            .await
            .map_err(|e| RepositoryError::wrap("Database error while retrieving users.", e))?;
        Ok(rows.iter().filter_map(map_user).collect())
    }

    pub fn get_user_by_id(&self, user_id: i64) -> Result<Option<User>, RepositoryError> {
        let rows = self
            .link
            .execute_reader("GetUserById", &ProcParams::new().add("user_id", user_id))
            .map_err(|e| RepositoryError::wrap("Database error while retrieving user.", e))?;
        Ok(rows.iter().find_map(map_user))
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let rows = self
            .link
            .execute_reader(
                "GetUserByEmail",
                &ProcParams::new().add("email", email.to_string()),
            )
            .map_err(|e| RepositoryError::wrap("Database error while retrieving user.", e))?;
        Ok(rows.iter().find_map(map_user))
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let rows = self
            .link
            .execute_reader(
                "GetUserByUsername",
                &ProcParams::new().add("username", username.to_string()),
            )
            .map_err(|e| RepositoryError::wrap("Database error while retrieving user.", e))?;
        Ok(rows.iter().find_map(map_user))
    }

    /// Login lookup: the identifier may be either the email or the username.
    pub fn get_user_by_email_or_username(
        &self,
        identifier: &str,
    ) -> Result<Option<User>, RepositoryError> {
        let rows = self
            .link
            .execute_reader(
                "GetUserByEmailOrUsername",
                &ProcParams::new().add("identifier", identifier.to_string()),
            )
            .map_err(|e| RepositoryError::wrap("Database error while retrieving user.", e))?;
        Ok(rows.iter().find_map(map_user))
    }

    pub fn create_user(
        &self,
        username: &str,
        email: &str,
        hashed_password: &str,
        developer: bool,
    ) -> Result<User, RepositoryError> {
        let params = ProcParams::new()
            .add("username", username.to_string())
            .add("email", email.to_string())
            .add("hashed_password", hashed_password.to_string())
            .add("developer", developer)
            .add_datetime("created_at", Utc::now());
        let rows = self
            .link
            .execute_reader("CreateUser", &params)
            .map_err(|e| RepositoryError::wrap("Database error while creating user.", e))?;
        rows.iter()
            .find_map(map_user)
            .ok_or_else(|| RepositoryError::new("Failed to create user."))
    }

    pub fn update_last_login(
        &self,
        user_id: i64,
        when: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let params = ProcParams::new()
            .add("user_id", user_id)
            .add("last_login", to_timestamp(when));
        self.link
            .execute_non_query("UpdateLastLogin", &params)
            .map_err(|e| RepositoryError::wrap("Database error while updating last login.", e))?;
        Ok(())
    }

    pub fn update_profile(
        &self,
        user_id: i64,
        profile_picture: Option<String>,
        bio: Option<String>,
    ) -> Result<(), RepositoryError> {
        let params = ProcParams::new()
            .add("user_id", user_id)
            .add("profile_picture", profile_picture)
            .add("bio", bio);
        self.link
            .execute_non_query("UpdateUserProfile", &params)
            .map_err(|e| RepositoryError::wrap("Database error while updating profile.", e))?;
        Ok(())
    }

    pub fn update_password(
        &self,
        user_id: i64,
        hashed_password: &str,
    ) -> Result<(), RepositoryError> {
        let params = ProcParams::new()
            .add("user_id", user_id)
            .add("hashed_password", hashed_password.to_string());
        self.link
            .execute_non_query("UpdateUserPassword", &params)
            .map_err(|e| RepositoryError::wrap("Database error while updating password.", e))?;
        Ok(())
    }
}

/// Rows missing id, username, or email map to `None` instead of erroring;
/// nullable columns become `None` fields.
pub(crate) fn map_user(row: &ProcRow) -> Option<User> {
    Some(User {
        id: row.i64("user_id")?,
        username: row.text("username")?.to_string(),
        email: row.text("email")?.to_string(),
        hashed_password: row.text("hashed_password").unwrap_or_default().to_string(),
        developer: row.bool("developer").unwrap_or(false),
        created_at: row.datetime("created_at").unwrap_or(DateTime::UNIX_EPOCH),
        last_login: row.datetime("last_login"),
        profile_picture: row.text("profile_picture").map(str::to_string),
        bio: row.text("bio").map(str::to_string),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use rusqlite::types::Value;

    fn repo() -> UsersRepository {
        let pool = db::create_test_pool();
        db::run_migrations(&pool).unwrap();
        UsersRepository::new(Arc::new(DataLink::new(pool)))
    }

    #[test]
    fn create_and_fetch_user() {
        let repo = repo();
        let user = repo.create_user("alice", "alice@example.com", "hash", false).unwrap();
        assert!(user.id > 0);
        assert_eq!(user.username, "alice");
        assert!(user.last_login.is_none());

        let by_email = repo.get_user_by_email("alice@example.com").unwrap().unwrap();
        assert_eq!(by_email.id, user.id);
        let by_identifier = repo.get_user_by_email_or_username("alice").unwrap().unwrap();
        assert_eq!(by_identifier.id, user.id);
    }

    #[test]
    fn missing_user_is_none() {
        let repo = repo();
        assert!(repo.get_user_by_id(999).unwrap().is_none());
    }

    #[test]
    fn duplicate_email_is_a_repository_error() {
        let repo = repo();
        repo.create_user("alice", "a@example.com", "h", false).unwrap();
        let err = repo.create_user("bob", "a@example.com", "h", false).unwrap_err();
        assert_eq!(err.to_string(), "Database error while creating user.");
    }

    #[test]
    fn last_login_updates() {
        let repo = repo();
        let user = repo.create_user("alice", "a@example.com", "h", false).unwrap();
        let when = Utc::now();
        repo.update_last_login(user.id, when).unwrap();
        let reloaded = repo.get_user_by_id(user.id).unwrap().unwrap();
        assert_eq!(
            reloaded.last_login.unwrap().timestamp_micros(),
            when.timestamp_micros()
        );
    }

    #[test]
    fn profile_fields_are_nullable() {
        let repo = repo();
        let user = repo.create_user("alice", "a@example.com", "h", false).unwrap();
        repo.update_profile(user.id, Some("pic.png".into()), None).unwrap();
        let reloaded = repo.get_user_by_id(user.id).unwrap().unwrap();
        assert_eq!(reloaded.profile_picture.as_deref(), Some("pic.png"));
        assert!(reloaded.bio.is_none());
    }

    #[test]
    fn mapper_drops_rows_missing_required_columns() {
        let row = ProcRow::new(vec![
            ("user_id".into(), Value::Integer(1)),
            ("username".into(), Value::Null),
            ("email".into(), Value::Text("a@b.c".into())),
        ]);
        assert!(map_user(&row).is_none());
    }

    #[tokio::test]
    async fn async_listing_matches_sync() {
        let repo = repo();
        repo.create_user("alice", "a@example.com", "h", false).unwrap();
        let sync_users = repo.get_all_users().unwrap();
        let async_users = repo.get_all_users_async().await.unwrap();
        assert_eq!(sync_users.len(), async_users.len());
    }
}
