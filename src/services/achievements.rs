//! Achievement progression. Unlocks are idempotent; `grant_eligible` walks
//! the milestone tables against the user's current counts.

use crate::error::ServiceError;
use crate::models::{Achievement, AchievementWithStatus};
use crate::repos::{AchievementsRepository, FriendshipsRepository, UsersRepository};

const FRIENDSHIP_MILESTONES: &[(&str, i64)] =
    &[("First Friend", 1), ("Social Circle", 5), ("Popular", 10)];
const OWNED_GAME_MILESTONES: &[(&str, i64)] =
    &[("First Game", 1), ("Collector", 5), ("Library", 10)];
const ACTIVITY_MILESTONES: &[(&str, i64)] = &[("One Year Club", 1), ("Veteran", 3)];
const DEVELOPER_ACHIEVEMENT: &str = "Developer";

#[derive(Clone)]
pub struct AchievementsService {
    achievements: AchievementsRepository,
    friendships: FriendshipsRepository,
    users: UsersRepository,
}

impl AchievementsService {
    pub fn new(
        achievements: AchievementsRepository,
        friendships: FriendshipsRepository,
        users: UsersRepository,
    ) -> Self {
        Self {
            achievements,
            friendships,
            users,
        }
    }

    pub fn get_achievements_with_status(
        &self,
        user_id: i64,
    ) -> Result<Vec<AchievementWithStatus>, ServiceError> {
        self.achievements
            .get_with_status_for_user(user_id)
            .map_err(|e| ServiceError::internal("Failed to retrieve achievements.", e))
    }

    /// Unlock once; repeated calls are no-ops.
    pub fn unlock_achievement(
        &self,
        user_id: i64,
        achievement_id: i64,
    ) -> Result<(), ServiceError> {
        let unlocked = self
            .achievements
            .is_unlocked(user_id, achievement_id)
            .map_err(|e| ServiceError::internal("Failed to check achievement.", e))?;
        if unlocked {
            return Ok(());
        }
        self.achievements
            .unlock(user_id, achievement_id)
            .map_err(|e| ServiceError::internal("Failed to unlock achievement.", e))
    }

    /// Evaluate every milestone for the user and unlock the ones newly met.
    /// Returns the achievements unlocked by this call.
    pub fn grant_eligible(&self, user_id: i64) -> Result<Vec<Achievement>, ServiceError> {
        let friend_count = self
            .friendships
            .count_for_user(user_id)
            .map_err(|e| ServiceError::internal("Failed to count friendships.", e))?;
        let game_count = self
            .achievements
            .number_of_owned_games(user_id)
            .map_err(|e| ServiceError::internal("Failed to count owned games.", e))?;
        let years = self
            .achievements
            .get_years_of_activity(user_id)
            .map_err(|e| ServiceError::internal(e.message().to_string(), e))?;
        let developer = self
            .users
            .get_user_by_id(user_id)
            .map_err(|e| ServiceError::internal("Failed to load user.", e))?
            .map(|user| user.developer)
            .unwrap_or(false);

        let mut granted = Vec::new();
        for (milestones, count) in [
            (FRIENDSHIP_MILESTONES, friend_count),
            (OWNED_GAME_MILESTONES, game_count),
            (ACTIVITY_MILESTONES, years),
        ] {
            for (name, threshold) in milestones {
                if count >= *threshold {
                    self.grant_by_name(user_id, name, &mut granted)?;
                }
            }
        }
        if developer {
            self.grant_by_name(user_id, DEVELOPER_ACHIEVEMENT, &mut granted)?;
        }
        Ok(granted)
    }

    fn grant_by_name(
        &self,
        user_id: i64,
        name: &str,
        granted: &mut Vec<Achievement>,
    ) -> Result<(), ServiceError> {
        let Some(achievement) = self
            .achievements
            .get_by_name(name)
            .map_err(|e| ServiceError::internal("Failed to load achievement.", e))?
        else {
            tracing::warn!(name, "achievement missing from catalog");
            return Ok(());
        };
        let unlocked = self
            .achievements
            .is_unlocked(user_id, achievement.id)
            .map_err(|e| ServiceError::internal("Failed to check achievement.", e))?;
        if !unlocked {
            self.achievements
                .unlock(user_id, achievement.id)
                .map_err(|e| ServiceError::internal("Failed to unlock achievement.", e))?;
            granted.push(achievement);
        }
        Ok(())
    }
}
