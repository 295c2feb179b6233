use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::db::datalink::DataLink;
use crate::db::row::{to_timestamp, ProcParams, ProcRow};
use crate::error::RepositoryError;
use crate::models::Session;

#[derive(Clone)]
pub struct SessionsRepository {
    link: Arc<DataLink>,
}

impl SessionsRepository {
    pub fn new(link: Arc<DataLink>) -> Self {
        Self { link }
    }

    /// Insert one session row for the user. Callers wanting the
    /// one-active-session invariant delete prior rows first.
    pub fn create(&self, user_id: i64, lifetime: Duration) -> Result<Session, RepositoryError> {
        let now = Utc::now();
        let session = Session {
            id: uuid::Uuid::now_v7().to_string(),
            user_id,
            created_at: now,
            expires_at: now + lifetime,
        };
        let params = ProcParams::new()
            .add("session_id", session.id.clone())
            .add("user_id", user_id)
            .add("created_at", to_timestamp(session.created_at))
            .add("expires_at", to_timestamp(session.expires_at));
        self.link
            .execute_non_query("CreateSession", &params)
            .map_err(|e| RepositoryError::wrap("Database error while creating session.", e))?;
        Ok(session)
    }

    pub fn get_by_id(&self, session_id: &str) -> Result<Option<Session>, RepositoryError> {
        let rows = self
            .link
            .execute_reader(
                "GetSessionById",
                &ProcParams::new().add("session_id", session_id.to_string()),
            )
            .map_err(|e| RepositoryError::wrap("Database error while retrieving session.", e))?;
        Ok(rows.iter().find_map(map_session))
    }

    pub fn delete(&self, session_id: &str) -> Result<(), RepositoryError> {
        self.link
            .execute_non_query(
                "DeleteSession",
                &ProcParams::new().add("session_id", session_id.to_string()),
            )
            .map_err(|e| RepositoryError::wrap("Database error while deleting session.", e))?;
        Ok(())
    }

    pub fn delete_all_for_user(&self, user_id: i64) -> Result<usize, RepositoryError> {
        self.link
            .execute_non_query(
                "DeleteSessionsForUser",
                &ProcParams::new().add("user_id", user_id),
            )
            .map_err(|e| RepositoryError::wrap("Database error while deleting sessions.", e))
    }

    /// Sweep every session past its expiry; returns the number removed.
    pub fn delete_expired(&self) -> Result<usize, RepositoryError> {
        self.link
            .execute_non_query(
                "DeleteExpiredSessions",
                &ProcParams::new().add_datetime("now", Utc::now()),
            )
            .map_err(|e| {
                RepositoryError::wrap("Database error while cleaning up sessions.", e)
            })
    }

    pub async fn delete_expired_async(&self) -> Result<usize, RepositoryError> {
        self.link
            .execute_non_query_async(
                "DeleteExpiredSessions",
                ProcParams::new().add_datetime("now", Utc::now()),
            )
            .await
            .map_err(|e| {
                RepositoryError::wrap("Database error while cleaning up sessions.", e)
            })
    }
}

fn map_session(row: &ProcRow) -> Option<Session> {
    Some(Session {
        id: row.text("session_id")?.to_string(),
        user_id: row.i64("user_id")?,
        created_at: row.datetime("created_at")?,
        expires_at: row.datetime("expires_at")?,
    })
}
