use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::db::datalink::DataLink;
use crate::db::row::{to_timestamp, ProcParams, ProcRow};
use crate::error::RepositoryError;

/// Stored reset-code state joined back through the owning user's email.
#[derive(Debug, Clone)]
pub struct ResetCodeData {
    pub user_id: i64,
    pub expiration_time: DateTime<Utc>,
    pub used: bool,
}

#[derive(Clone)]
pub struct PasswordResetRepository {
    link: Arc<DataLink>,
}

impl PasswordResetRepository {
    pub fn new(link: Arc<DataLink>) -> Self {
        Self { link }
    }

    /// At most one active code per user: prior codes are deleted before the
    /// new one is stored.
    pub fn store_code(
        &self,
        user_id: i64,
        code: &str,
        expiration_time: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        self.link
            .execute_non_query(
                "DeleteResetCodesForUser",
                &ProcParams::new().add("user_id", user_id),
            )
            .map_err(|e| {
                RepositoryError::wrap("Database error while clearing old reset codes.", e)
            })?;

        let params = ProcParams::new()
            .add("user_id", user_id)
            .add("reset_code", code.to_string())
            .add("expiration_time", to_timestamp(expiration_time));
        self.link
            .execute_non_query("StorePasswordResetCode", &params)
            .map_err(|e| RepositoryError::wrap("Database error while storing reset code.", e))?;
        Ok(())
    }

    pub fn get_code_data(
        &self,
        email: &str,
        code: &str,
    ) -> Result<Option<ResetCodeData>, RepositoryError> {
        let params = ProcParams::new()
            .add("email", email.to_string())
            .add("reset_code", code.to_string());
        let rows = self
            .link
            .execute_reader("GetResetCodeData", &params)
            .map_err(|e| {
                RepositoryError::wrap("Database error while retrieving reset code.", e)
            })?;
        Ok(rows.first().and_then(map_code_data))
    }

    /// A code verifies only when it matches exactly, is unused, and has not
    /// expired.
    pub fn verify_code(&self, email: &str, code: &str) -> Result<bool, RepositoryError> {
        Ok(self
            .get_code_data(email, code)?
            .map(|data| !data.used && data.expiration_time > Utc::now())
            .unwrap_or(false))
    }

    /// Single-use consumption: resolves the user through the (email, code)
    /// pair, rewrites the password hash, and marks the code used. Returns
    /// `false` when the code is invalid, used, or expired.
    pub fn reset_password(
        &self,
        email: &str,
        code: &str,
        new_hashed_password: &str,
    ) -> Result<bool, RepositoryError> {
        let Some(data) = self.get_code_data(email, code)? else {
            return Ok(false);
        };
        if data.used || data.expiration_time <= Utc::now() {
            return Ok(false);
        }

        let params = ProcParams::new()
            .add("user_id", data.user_id)
            .add("hashed_password", new_hashed_password.to_string());
        self.link
            .execute_non_query("UpdateUserPassword", &params)
            .map_err(|e| RepositoryError::wrap("Database error while updating password.", e))?;

        let params = ProcParams::new()
            .add("user_id", data.user_id)
            .add("reset_code", code.to_string());
        self.link
            .execute_non_query("MarkResetCodeUsed", &params)
            .map_err(|e| RepositoryError::wrap("Database error while marking code used.", e))?;
        Ok(true)
    }

    /// Sweep rows past expiry; returns the number removed.
    pub fn cleanup_expired(&self) -> Result<usize, RepositoryError> {
        self.link
            .execute_non_query(
                "DeleteExpiredResetCodes",
                &ProcParams::new().add_datetime("now", Utc::now()),
            )
            .map_err(|e| {
                RepositoryError::wrap("Database error while cleaning up reset codes.", e)
            })
    }
}

fn map_code_data(row: &ProcRow) -> Option<ResetCodeData> {
    Some(ResetCodeData {
        user_id: row.i64("user_id")?,
        expiration_time: row.datetime("expiration_time")?,
        used: row.bool("used")?,
    })
}
