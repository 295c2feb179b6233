use chrono::Utc;

use crate::error::ServiceError;
use crate::models::User;
use crate::repos::{UsersRepository, WalletRepository};
use crate::services::session::SessionService;

#[derive(Clone)]
pub struct UserService {
    users: UsersRepository,
    wallet: WalletRepository,
    sessions: SessionService,
    bcrypt_cost: u32,
}

impl UserService {
    pub fn new(
        users: UsersRepository,
        wallet: WalletRepository,
        sessions: SessionService,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            users,
            wallet,
            sessions,
            bcrypt_cost,
        }
    }

    /// Uniqueness check used at registration. Email collisions win over
    /// username collisions when both apply.
    pub fn validate_user_and_email(&self, email: &str, username: &str) -> Result<(), ServiceError> {
        let by_email = self
            .users
            .get_user_by_email(email)
            .map_err(|e| ServiceError::internal("Failed to validate email.", e))?;
        if by_email.is_some() {
            return Err(ServiceError::EmailAlreadyExists(email.to_string()));
        }
        let by_username = self
            .users
            .get_user_by_username(username)
            .map_err(|e| ServiceError::internal("Failed to validate username.", e))?;
        if by_username.is_some() {
            return Err(ServiceError::UsernameAlreadyTaken(username.to_string()));
        }
        Ok(())
    }

    /// Register a new account. The wallet is created alongside the user.
    pub fn create_user(
        &self,
        username: &str,
        email: &str,
        password: &str,
        developer: bool,
    ) -> Result<User, ServiceError> {
        validate_username(username)?;
        validate_email(email)?;
        validate_password(password)?;
        self.validate_user_and_email(email, username)?;

        let hashed = bcrypt::hash(password, self.bcrypt_cost).map_err(ServiceError::PasswordHash)?;
        let user = self
            .users
            .create_user(username, email, &hashed, developer)
            .map_err(|e| ServiceError::internal("Failed to create user.", e))?;
        self.wallet
            .create_for_user(user.id)
            .map_err(|e| ServiceError::internal("Failed to create wallet.", e))?;
        tracing::info!(user_id = user.id, username, "user registered");
        Ok(user)
    }

    /// Credential check by email or username. Wrong credentials are `None`,
    /// not an error; a successful login stamps last_login and opens a fresh
    /// session.
    pub fn login(&self, identifier: &str, password: &str) -> Result<Option<User>, ServiceError> {
        let Some(user) = self
            .users
            .get_user_by_email_or_username(identifier)
            .map_err(|e| ServiceError::internal("Failed to look up user.", e))?
        else {
            return Ok(None);
        };

        let matches =
            bcrypt::verify(password, &user.hashed_password).map_err(ServiceError::PasswordHash)?;
        if !matches {
            return Ok(None);
        }

        self.users
            .update_last_login(user.id, Utc::now())
            .map_err(|e| ServiceError::internal("Failed to record login.", e))?;
        self.sessions.create_new_session(&user)?;
        Ok(Some(user))
    }

    pub fn logout(&self) -> Result<(), ServiceError> {
        self.sessions.end_session()
    }

    pub fn get_all_users(&self) -> Result<Vec<User>, ServiceError> {
        self.users
            .get_all_users()
            .map_err(|e| ServiceError::internal("Failed to retrieve users.", e))
    }

    pub fn get_user_by_id(&self, user_id: i64) -> Result<Option<User>, ServiceError> {
        self.users
            .get_user_by_id(user_id)
            .map_err(|e| ServiceError::internal("Failed to retrieve user.", e))
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<User>, ServiceError> {
        self.users
            .get_user_by_username(username)
            .map_err(|e| ServiceError::internal("Failed to retrieve user.", e))
    }

    pub fn update_profile(
        &self,
        user_id: i64,
        profile_picture: Option<String>,
        bio: Option<String>,
    ) -> Result<(), ServiceError> {
        self.users
            .update_profile(user_id, profile_picture, bio)
            .map_err(|e| ServiceError::internal("Failed to update profile.", e))
    }
}

fn validate_username(username: &str) -> Result<(), ServiceError> {
    if username.trim().len() < 3 {
        return Err(ServiceError::Validation(
            "Username must be at least 3 characters long.".into(),
        ));
    }
    Ok(())
}

pub(crate) fn validate_email(email: &str) -> Result<(), ServiceError> {
    let well_formed = email.contains('@') && email.rsplit('@').next().is_some_and(|d| d.contains('.'));
    if !well_formed {
        return Err(ServiceError::Validation("Invalid email address.".into()));
    }
    Ok(())
}

pub(crate) fn validate_password(password: &str) -> Result<(), ServiceError> {
    if password.len() < 8 {
        return Err(ServiceError::Validation(
            "Password must be at least 8 characters long.".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validation_requires_domain_dot() {
        assert!(validate_email("alice@example.com").is_ok());
        assert!(validate_email("alice@example").is_err());
        assert!(validate_email("alice.example.com").is_err());
    }

    #[test]
    fn password_minimum_length() {
        assert!(validate_password("longenough").is_ok());
        assert!(validate_password("short").is_err());
    }

    #[test]
    fn username_minimum_length() {
        assert!(validate_username("bob").is_ok());
        assert!(validate_username("  b ").is_err());
    }
}
