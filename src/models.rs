//! Domain records produced by the repositories. Serialize derives are for the
//! UI layer consuming these over its own boundary; the password hash never
//! serializes.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Collection id 1 is the virtual "all owned games" collection; it is never a
/// persisted row and lookups for it are redirected.
pub const ALL_OWNED_GAMES_COLLECTION_ID: i64 = 1;

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip)]
    pub hashed_password: String,
    pub developer: bool,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
    pub profile_picture: Option<String>,
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub id: String,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Wallet {
    pub id: i64,
    pub user_id: i64,
    pub balance: f64,
    pub points: i64,
}

/// Immutable shop entry: pay `price`, receive `points`. The catalog lives in
/// the wallet service, not the store.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PointsOffer {
    pub price: f64,
    pub points: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct OwnedGame {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub cover_picture: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Collection {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub cover_picture: Option<String>,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    /// Lazily attached; empty until games are loaded.
    pub games: Vec<OwnedGame>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Friendship {
    pub id: i64,
    pub user_id: i64,
    pub friend_id: i64,
    /// Joined in at read time, not stored on the friendship row.
    pub friend_username: String,
    pub friend_profile_picture: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Feature {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub cost: i64,
    pub description: Option<String>,
    pub source: Option<String>,
    /// Only meaningful when the feature was read joined with a user.
    pub equipped: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Achievement {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub points: i64,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AchievementWithStatus {
    #[serde(flatten)]
    pub achievement: Achievement,
    pub unlocked: bool,
    pub unlocked_at: Option<DateTime<Utc>>,
}
