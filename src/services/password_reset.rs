//! Password recovery via short-lived six-digit codes. Code delivery is the
//! caller's concern; `send_reset_code` returns the generated code.

use chrono::{Duration, Utc};
use rand::Rng;

use crate::error::ServiceError;
use crate::repos::{PasswordResetRepository, UsersRepository};
use crate::services::users::{validate_email, validate_password};

#[derive(Clone)]
pub struct PasswordResetService {
    codes: PasswordResetRepository,
    users: UsersRepository,
    bcrypt_cost: u32,
    code_lifetime_minutes: i64,
}

impl PasswordResetService {
    pub fn new(
        codes: PasswordResetRepository,
        users: UsersRepository,
        bcrypt_cost: u32,
        code_lifetime_minutes: i64,
    ) -> Self {
        Self {
            codes,
            users,
            bcrypt_cost,
            code_lifetime_minutes,
        }
    }

    /// Generate and store a fresh code for the account behind `email`,
    /// replacing any previous code.
    pub fn send_reset_code(&self, email: &str) -> Result<String, ServiceError> {
        validate_email(email)?;
        let user = self
            .users
            .get_user_by_email(email)
            .map_err(|e| ServiceError::internal("Failed to look up account.", e))?
            .ok_or_else(|| {
                ServiceError::Validation("No account found with this email address.".into())
            })?;

        let code = format!("{:06}", rand::thread_rng().gen_range(100000..=999999));
        let expires = Utc::now() + Duration::minutes(self.code_lifetime_minutes);
        self.codes
            .store_code(user.id, &code, expires)
            .map_err(|e| ServiceError::internal("Failed to store reset code.", e))?;
        tracing::info!(user_id = user.id, "password reset code issued");
        Ok(code)
    }

    /// True only for a well-formed, matching, unused, unexpired code.
    pub fn verify_reset_code(&self, email: &str, code: &str) -> Result<bool, ServiceError> {
        if !is_code_format(code) {
            return Ok(false);
        }
        self.codes
            .verify_code(email, code)
            .map_err(|e| ServiceError::internal("Failed to verify reset code.", e))
    }

    /// Consume the code and rewrite the account password. Returns `false`
    /// when the code does not verify.
    pub fn reset_password(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> Result<bool, ServiceError> {
        validate_password(new_password)?;
        if !is_code_format(code) {
            return Ok(false);
        }
        let hashed =
            bcrypt::hash(new_password, self.bcrypt_cost).map_err(ServiceError::PasswordHash)?;
        self.codes
            .reset_password(email, code, &hashed)
            .map_err(|e| ServiceError::internal("Failed to reset password.", e))
    }

    pub fn cleanup_expired(&self) -> Result<usize, ServiceError> {
        self.codes
            .cleanup_expired()
            .map_err(|e| ServiceError::internal("Failed to clean up reset codes.", e))
    }
}

fn is_code_format(code: &str) -> bool {
    code.len() == 6 && code.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::db::datalink::DataLink;
    use std::sync::Arc;

    fn setup() -> (PasswordResetService, UsersRepository) {
        let pool = db::create_test_pool();
        db::run_migrations(&pool).unwrap();
        let link = Arc::new(DataLink::new(pool));
        let users = UsersRepository::new(link.clone());
        users
            .create_user(
                "alice",
                "alice@example.com",
                &bcrypt::hash("old-password", 4).unwrap(),
                false,
            )
            .unwrap();
        let service = PasswordResetService::new(
            PasswordResetRepository::new(link),
            users.clone(),
            4,
            15,
        );
        (service, users)
    }

    #[test]
    fn issued_code_is_six_digits_and_verifies() {
        let (service, _) = setup();
        let code = service.send_reset_code("alice@example.com").unwrap();
        assert!(is_code_format(&code));
        assert!(service
            .verify_reset_code("alice@example.com", &code)
            .unwrap());
    }

    #[test]
    fn unknown_email_is_a_validation_error() {
        let (service, _) = setup();
        let err = service.send_reset_code("nobody@example.com").unwrap_err();
        assert!(matches!(err, ServiceError::Validation(m)
            if m == "No account found with this email address."));
    }

    #[test]
    fn malformed_code_never_verifies() {
        let (service, _) = setup();
        service.send_reset_code("alice@example.com").unwrap();
        assert!(!service
            .verify_reset_code("alice@example.com", "12345")
            .unwrap());
        assert!(!service
            .verify_reset_code("alice@example.com", "abc123")
            .unwrap());
    }

    #[test]
    fn reset_rewrites_password_once() {
        let (service, users) = setup();
        let code = service.send_reset_code("alice@example.com").unwrap();
        assert!(service
            .reset_password("alice@example.com", &code, "new-password")
            .unwrap());

        let user = users
            .get_user_by_email("alice@example.com")
            .unwrap()
            .unwrap();
        assert!(bcrypt::verify("new-password", &user.hashed_password).unwrap());

        assert!(!service
            .reset_password("alice@example.com", &code, "another-pass")
            .unwrap());
    }

    #[test]
    fn weak_replacement_password_is_rejected() {
        let (service, _) = setup();
        let code = service.send_reset_code("alice@example.com").unwrap();
        let err = service
            .reset_password("alice@example.com", &code, "short")
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }
}
