use std::sync::Arc;

use chrono::Duration;

use crate::config::Config;
use crate::db::datalink::DataLink;
use crate::db::DbPool;
use crate::repos::{
    AchievementsRepository, CollectionsRepository, FeaturesRepository, FriendshipsRepository,
    OwnedGamesRepository, PasswordResetRepository, SessionsRepository, UsersRepository,
    WalletRepository,
};
use crate::services::{
    AchievementsService, CollectionsService, FeaturesService, FriendsService, OwnedGamesService,
    PasswordResetService, SessionContext, SessionService, UserService, WalletService,
};

/// Composition root. Repositories share one data link over the pool; the
/// session context is the single mutable piece and is shared by every
/// service that needs the signed-in user.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub context: Arc<SessionContext>,
    pub sessions: SessionService,
    pub users: UserService,
    pub wallet: WalletService,
    pub features: FeaturesService,
    pub friends: FriendsService,
    pub collections: CollectionsService,
    pub owned_games: OwnedGamesService,
    pub achievements: AchievementsService,
    pub password_reset: PasswordResetService,
}

impl AppState {
    pub fn new(pool: DbPool, config: Config) -> Self {
        let link = Arc::new(DataLink::new(pool));
        let context = Arc::new(SessionContext::new());

        let users_repo = UsersRepository::new(link.clone());
        let sessions_repo = SessionsRepository::new(link.clone());
        let wallet_repo = WalletRepository::new(link.clone());
        let features_repo = FeaturesRepository::new(link.clone());
        let friendships_repo = FriendshipsRepository::new(link.clone());
        let collections_repo = CollectionsRepository::new(link.clone());
        let owned_games_repo = OwnedGamesRepository::new(link.clone());
        let achievements_repo = AchievementsRepository::new(link.clone());
        let reset_repo = PasswordResetRepository::new(link);

        let sessions = SessionService::new(
            sessions_repo,
            users_repo.clone(),
            context.clone(),
            Duration::hours(config.auth.session_hours),
        );
        let users = UserService::new(
            users_repo.clone(),
            wallet_repo.clone(),
            sessions.clone(),
            config.auth.bcrypt_cost,
        );
        let wallet = WalletService::new(wallet_repo.clone(), context.clone());
        let features = FeaturesService::new(features_repo, wallet_repo);
        let friends = FriendsService::new(friendships_repo.clone());
        let collections = CollectionsService::new(collections_repo);
        let owned_games = OwnedGamesService::new(owned_games_repo);
        let achievements =
            AchievementsService::new(achievements_repo, friendships_repo, users_repo.clone());
        let password_reset = PasswordResetService::new(
            reset_repo,
            users_repo,
            config.auth.bcrypt_cost,
            config.auth.reset_code_minutes,
        );

        Self {
            config,
            context,
            sessions,
            users,
            wallet,
            features,
            friends,
            collections,
            owned_games,
            achievements,
            password_reset,
        }
    }
}
