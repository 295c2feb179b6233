//! Session lifecycle plus the process-wide "current session" mirror.
//!
//! The mirror is an explicit, mutex-guarded `SessionContext` owned by
//! `AppState` and injected where needed, not a static singleton. Other
//! services resolve "who is logged in" from it without re-querying.

use std::sync::Mutex;
use std::sync::PoisonError;

use chrono::{Duration, Utc};

use crate::error::ServiceError;
use crate::models::{Session, User};
use crate::repos::{SessionsRepository, UsersRepository};

#[derive(Default)]
pub struct SessionContext {
    current: Mutex<Option<Session>>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, session: Session) {
        *self.lock() = Some(session);
    }

    pub fn clear(&self) {
        *self.lock() = None;
    }

    pub fn current(&self) -> Option<Session> {
        self.lock().clone()
    }

    /// The logged-in user's id, if any session is mirrored.
    pub fn user_id(&self) -> Option<i64> {
        self.lock().as_ref().map(|session| session.user_id)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Session>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Clone)]
pub struct SessionService {
    sessions: SessionsRepository,
    users: UsersRepository,
    context: std::sync::Arc<SessionContext>,
    lifetime: Duration,
}

impl SessionService {
    pub fn new(
        sessions: SessionsRepository,
        users: UsersRepository,
        context: std::sync::Arc<SessionContext>,
        lifetime: Duration,
    ) -> Self {
        Self {
            sessions,
            users,
            context,
            lifetime,
        }
    }

    /// One active session per user: all prior rows are deleted before the new
    /// one is inserted and mirrored.
    pub fn create_new_session(&self, user: &User) -> Result<Session, ServiceError> {
        self.sessions
            .delete_all_for_user(user.id)
            .map_err(|e| ServiceError::internal("Failed to clear previous sessions.", e))?;
        let session = self
            .sessions
            .create(user.id, self.lifetime)
            .map_err(|e| ServiceError::internal("Failed to create session.", e))?;
        self.context.set(session.clone());
        tracing::debug!(user_id = user.id, session_id = %session.id, "session created");
        Ok(session)
    }

    /// The mirrored session's user, or `None` when no session is mirrored or
    /// it has expired (in which case the stale row is deleted and the mirror
    /// cleared).
    pub fn get_current_user(&self) -> Result<Option<User>, ServiceError> {
        let Some(session) = self.context.current() else {
            return Ok(None);
        };
        if session.is_expired(Utc::now()) {
            self.sessions
                .delete(&session.id)
                .map_err(|e| ServiceError::internal("Failed to delete stale session.", e))?;
            self.context.clear();
            return Ok(None);
        }
        self.users
            .get_user_by_id(session.user_id)
            .map_err(|e| ServiceError::internal("Failed to load current user.", e))
    }

    /// Restore a persisted session into the mirror, e.g. on app restart.
    /// Expired rows are deleted instead of restored.
    pub fn load_session(&self, session_id: &str) -> Result<Option<Session>, ServiceError> {
        let Some(session) = self
            .sessions
            .get_by_id(session_id)
            .map_err(|e| ServiceError::internal("Failed to load session.", e))?
        else {
            return Ok(None);
        };
        if session.is_expired(Utc::now()) {
            self.sessions
                .delete(&session.id)
                .map_err(|e| ServiceError::internal("Failed to delete stale session.", e))?;
            return Ok(None);
        }
        self.context.set(session.clone());
        Ok(Some(session))
    }

    /// Log out: delete the mirrored session's row and clear the mirror.
    pub fn end_session(&self) -> Result<(), ServiceError> {
        if let Some(session) = self.context.current() {
            self.sessions
                .delete(&session.id)
                .map_err(|e| ServiceError::internal("Failed to delete session.", e))?;
        }
        self.context.clear();
        Ok(())
    }

    /// Sweep every expired session row; clears the mirror too when the
    /// current session itself expired.
    pub fn cleanup_expired_sessions(&self) -> Result<usize, ServiceError> {
        let removed = self
            .sessions
            .delete_expired()
            .map_err(|e| ServiceError::internal("Failed to clean up sessions.", e))?;
        self.clear_mirror_if_expired();
        Ok(removed)
    }

    pub async fn cleanup_expired_sessions_async(&self) -> Result<usize, ServiceError> {
        let removed = self
            .sessions
            .delete_expired_async()
            .await
            .map_err(|e| ServiceError::internal("Failed to clean up sessions.", e))?;
        self.clear_mirror_if_expired();
        Ok(removed)
    }

    fn clear_mirror_if_expired(&self) {
        if let Some(session) = self.context.current() {
            if session.is_expired(Utc::now()) {
                self.context.clear();
            }
        }
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::db::datalink::DataLink;
    use std::sync::Arc;

    fn setup() -> (SessionService, User) {
        let pool = db::create_test_pool();
        db::run_migrations(&pool).unwrap();
        let link = Arc::new(DataLink::new(pool));
        let users = UsersRepository::new(link.clone());
        let user = users
            .create_user("alice", "a@example.com", "h", false)
            .unwrap();
        let service = SessionService::new(
            SessionsRepository::new(link),
            users,
            Arc::new(SessionContext::new()),
            Duration::hours(2),
        );
        (service, user)
    }

    #[test]
    fn login_replaces_previous_session() {
        let (service, user) = setup();
        let first = service.create_new_session(&user).unwrap();
        let second = service.create_new_session(&user).unwrap();
        assert_ne!(first.id, second.id);
        // Only the second row survives.
        assert!(service.load_session(&first.id).unwrap().is_none());
        assert!(service.load_session(&second.id).unwrap().is_some());
    }

    #[test]
    fn current_user_tracks_the_mirror() {
        let (service, user) = setup();
        assert!(service.get_current_user().unwrap().is_none());
        service.create_new_session(&user).unwrap();
        let current = service.get_current_user().unwrap().unwrap();
        assert_eq!(current.id, user.id);
        service.end_session().unwrap();
        assert!(service.get_current_user().unwrap().is_none());
    }

    #[test]
    fn expired_mirror_is_cleared_and_row_deleted() {
        let (service, user) = setup();
        let session = service.create_new_session(&user).unwrap();
        // Force expiry in the mirror.
        service.context().set(Session {
            expires_at: Utc::now() - Duration::seconds(1),
            ..session.clone()
        });
        assert!(service.get_current_user().unwrap().is_none());
        assert!(service.context().current().is_none());
        assert!(service.load_session(&session.id).unwrap().is_none());
    }

    #[test]
    fn cleanup_clears_expired_mirror() {
        let (service, user) = setup();
        let session = service.create_new_session(&user).unwrap();
        service.context().set(Session {
            expires_at: Utc::now() - Duration::seconds(1),
            ..session
        });
        service.cleanup_expired_sessions().unwrap();
        assert!(service.context().current().is_none());
    }
}
