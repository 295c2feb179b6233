//! One repository per aggregate. Every public method invokes the data link
//! with a fixed procedure name, maps rows through the typed `ProcRow`
//! boundary, and wraps failures in a `RepositoryError` with an
//! operation-specific message. Validation errors raised here (missing user,
//! duplicate friendship) propagate verbatim.

pub mod achievements;
pub mod collections;
pub mod features;
pub mod friendships;
pub mod owned_games;
pub mod password_reset;
pub mod sessions;
pub mod users;
pub mod wallet;

pub use achievements::AchievementsRepository;
pub use collections::CollectionsRepository;
pub use features::FeaturesRepository;
pub use friendships::FriendshipsRepository;
pub use owned_games::OwnedGamesRepository;
pub use password_reset::PasswordResetRepository;
pub use sessions::SessionsRepository;
pub use users::UsersRepository;
pub use wallet::WalletRepository;
