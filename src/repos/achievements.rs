use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc};

use crate::db::datalink::DataLink;
use crate::db::row::{ProcParams, ProcRow};
use crate::error::RepositoryError;
use crate::models::{Achievement, AchievementWithStatus};
use crate::repos::users::map_user;

#[derive(Clone)]
pub struct AchievementsRepository {
    link: Arc<DataLink>,
}

impl AchievementsRepository {
    pub fn new(link: Arc<DataLink>) -> Self {
        Self { link }
    }

    pub fn get_all(&self) -> Result<Vec<Achievement>, RepositoryError> {
        let rows = self
            .link
            .execute_reader("GetAllAchievements", &ProcParams::new())
            .map_err(|e| {
                RepositoryError::wrap("Database error while retrieving achievements.", e)
            })?;
        Ok(rows.iter().filter_map(map_achievement).collect())
    }

    pub fn get_with_status_for_user(
        &self,
        user_id: i64,
    ) -> Result<Vec<AchievementWithStatus>, RepositoryError> {
        let rows = self
            .link
            .execute_reader(
                "GetAchievementsWithStatusForUser",
                &ProcParams::new().add("user_id", user_id),
            )
            .map_err(|e| {
                RepositoryError::wrap("Database error while retrieving achievements.", e)
            })?;
        Ok(rows
            .iter()
            .filter_map(|row| {
                let achievement = map_achievement(row)?;
                let unlocked_at = row.datetime("unlocked_at");
                Some(AchievementWithStatus {
                    achievement,
                    unlocked: unlocked_at.is_some(),
                    unlocked_at,
                })
            })
            .collect())
    }

    pub fn get_by_name(&self, name: &str) -> Result<Option<Achievement>, RepositoryError> {
        let rows = self
            .link
            .execute_reader(
                "GetAchievementByName",
                &ProcParams::new().add("name", name.to_string()),
            )
            .map_err(|e| {
                RepositoryError::wrap("Database error while retrieving achievement.", e)
            })?;
        Ok(rows.iter().find_map(map_achievement))
    }

    pub fn unlock(&self, user_id: i64, achievement_id: i64) -> Result<(), RepositoryError> {
        let params = ProcParams::new()
            .add("user_id", user_id)
            .add("achievement_id", achievement_id)
            .add_datetime("unlocked_at", Utc::now());
        self.link
            .execute_non_query("UnlockAchievement", &params)
            .map_err(|e| {
                RepositoryError::wrap("Database error while unlocking achievement.", e)
            })?;
        Ok(())
    }

    pub fn is_unlocked(&self, user_id: i64, achievement_id: i64) -> Result<bool, RepositoryError> {
        let params = ProcParams::new()
            .add("user_id", user_id)
            .add("achievement_id", achievement_id);
        let count: i64 = self
            .link
            .execute_scalar("IsAchievementUnlocked", &params)
            .map_err(|e| {
                RepositoryError::wrap("Database error while checking achievement.", e)
            })?;
        Ok(count > 0)
    }

    pub fn unlocked_at(
        &self,
        user_id: i64,
        achievement_id: i64,
    ) -> Result<Option<DateTime<Utc>>, RepositoryError> {
        let params = ProcParams::new()
            .add("user_id", user_id)
            .add("achievement_id", achievement_id);
        let rows = self
            .link
            .execute_reader("GetUnlockedAtForAchievement", &params)
            .map_err(|e| {
                RepositoryError::wrap("Database error while retrieving unlock data.", e)
            })?;
        Ok(rows.first().and_then(|row| row.datetime("unlocked_at")))
    }

    pub fn number_of_owned_games(&self, user_id: i64) -> Result<i64, RepositoryError> {
        self.link
            .execute_scalar(
                "GetNumberOfOwnedGames",
                &ProcParams::new().add("user_id", user_id),
            )
            .map_err(|e| RepositoryError::wrap("Database error while counting owned games.", e))
    }

    /// Whole years since the account was created, decremented by one when the
    /// anniversary has not been reached yet this year.
    pub fn get_years_of_activity(&self, user_id: i64) -> Result<i64, RepositoryError> {
        let rows = self
            .link
            .execute_reader("GetUserById", &ProcParams::new().add("user_id", user_id))
            .map_err(|e| RepositoryError::wrap("Database error while retrieving user.", e))?;
        let user = rows.iter().find_map(map_user).ok_or_else(|| {
            RepositoryError::new(format!("User with ID {user_id} does not exist."))
        })?;
        Ok(years_of_activity(user.created_at, Utc::now()))
    }
}

fn years_of_activity(created_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let mut years = i64::from(now.year()) - i64::from(created_at.year());
    // (month, day) rather than ordinal: day-of-year shifts across leap years.
    if (now.month(), now.day()) < (created_at.month(), created_at.day()) {
        years -= 1;
    }
    years
}

fn map_achievement(row: &ProcRow) -> Option<Achievement> {
    Some(Achievement {
        id: row.i64("achievement_id")?,
        name: row.text("name")?.to_string(),
        description: row.text("description").map(str::to_string),
        category: row.text("category").unwrap_or_default().to_string(),
        points: row.i64("points").unwrap_or(0),
        icon: row.text("icon").map(str::to_string),
    })
}
