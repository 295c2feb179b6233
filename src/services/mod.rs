//! Business rules on top of the repositories. Services own validation,
//! password hashing, the session mirror, and the user-facing outcome
//! messages; repositories stay limited to procedure invocation.

pub mod achievements;
pub mod collections;
pub mod features;
pub mod friends;
pub mod owned_games;
pub mod password_reset;
pub mod session;
pub mod users;
pub mod wallet;

pub use achievements::AchievementsService;
pub use collections::CollectionsService;
pub use features::FeaturesService;
pub use friends::FriendsService;
pub use owned_games::OwnedGamesService;
pub use password_reset::PasswordResetService;
pub use session::{SessionContext, SessionService};
pub use users::UserService;
pub use wallet::WalletService;
