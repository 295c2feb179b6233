//! Named procedure catalog.
//!
//! The store is only ever touched through these named, parameterized
//! operations; repositories refer to them by name and the data link resolves
//! the SQL. Adding a column means touching exactly one entry here plus the
//! mapper that reads it.

/// name -> SQL with named parameters.
pub const PROCEDURES: &[(&str, &str)] = &[
    // -- Users --
    (
        "GetAllUsers",
        "SELECT user_id, username, email, hashed_password, developer, created_at, last_login, profile_picture, bio
         FROM users ORDER BY username",
    ),
    (
        "GetUserById",
        "SELECT user_id, username, email, hashed_password, developer, created_at, last_login, profile_picture, bio
         FROM users WHERE user_id = :user_id",
    ),
    (
        "GetUserByEmail",
        "SELECT user_id, username, email, hashed_password, developer, created_at, last_login, profile_picture, bio
         FROM users WHERE email = :email",
    ),
    (
        "GetUserByUsername",
        "SELECT user_id, username, email, hashed_password, developer, created_at, last_login, profile_picture, bio
         FROM users WHERE username = :username",
    ),
    (
        "GetUserByEmailOrUsername",
        "SELECT user_id, username, email, hashed_password, developer, created_at, last_login, profile_picture, bio
         FROM users WHERE email = :identifier OR username = :identifier",
    ),
    (
        "CreateUser",
        "INSERT INTO users (username, email, hashed_password, developer, created_at)
         VALUES (:username, :email, :hashed_password, :developer, :created_at)
         RETURNING user_id, username, email, hashed_password, developer, created_at, last_login, profile_picture, bio",
    ),
    (
        "UpdateLastLogin",
        "UPDATE users SET last_login = :last_login WHERE user_id = :user_id",
    ),
    (
        "UpdateUserProfile",
        "UPDATE users SET profile_picture = :profile_picture, bio = :bio WHERE user_id = :user_id",
    ),
    (
        "UpdateUserPassword",
        "UPDATE users SET hashed_password = :hashed_password WHERE user_id = :user_id",
    ),
    // -- Sessions --
    (
        "CreateSession",
        "INSERT INTO sessions (session_id, user_id, created_at, expires_at)
         VALUES (:session_id, :user_id, :created_at, :expires_at)",
    ),
    (
        "GetSessionById",
        "SELECT session_id, user_id, created_at, expires_at FROM sessions WHERE session_id = :session_id",
    ),
    ("DeleteSession", "DELETE FROM sessions WHERE session_id = :session_id"),
    (
        "DeleteSessionsForUser",
        "DELETE FROM sessions WHERE user_id = :user_id",
    ),
    (
        "DeleteExpiredSessions",
        "DELETE FROM sessions WHERE expires_at <= :now",
    ),
    // -- Wallets --
    ("CreateWallet", "INSERT INTO wallets (user_id) VALUES (:user_id)"),
    (
        "GetWalletIdByUserId",
        "SELECT wallet_id FROM wallets WHERE user_id = :user_id",
    ),
    (
        "GetWalletById",
        "SELECT wallet_id, user_id, balance, points FROM wallets WHERE wallet_id = :wallet_id",
    ),
    (
        "AddMoneyToWallet",
        "UPDATE wallets SET balance = balance + :amount WHERE wallet_id = :wallet_id",
    ),
    (
        "AddPointsToWallet",
        "UPDATE wallets SET points = points + :amount WHERE wallet_id = :wallet_id",
    ),
    // Debit and credit in one statement so a purchase is atomic.
    (
        "BuyPoints",
        "UPDATE wallets SET balance = balance - :price, points = points + :number_of_points
         WHERE user_id = :user_id",
    ),
    (
        "DeductPoints",
        "UPDATE wallets SET points = points - :amount WHERE user_id = :user_id AND points >= :amount",
    ),
    // -- Friendships --
    (
        "GetFriendsForUser",
        "SELECT friendship_id, user_id, friend_id FROM friendships WHERE user_id = :user_id",
    ),
    (
        "AddFriend",
        "INSERT INTO friendships (user_id, friend_id) VALUES (:user_id, :friend_id)",
    ),
    (
        "RemoveFriend",
        "DELETE FROM friendships WHERE friendship_id = :friendship_id",
    ),
    (
        "GetFriendshipCountForUser",
        "SELECT COUNT(*) FROM friendships WHERE user_id = :user_id",
    ),
    (
        "GetFriendshipId",
        "SELECT friendship_id FROM friendships WHERE user_id = :user_id AND friend_id = :friend_id",
    ),
    // -- Collections --
    (
        "GetAllCollectionsForUser",
        "SELECT collection_id, user_id, name, cover_picture, is_public, created_at
         FROM collections WHERE user_id = :user_id",
    ),
    (
        "GetPublicCollectionsForUser",
        "SELECT collection_id, user_id, name, cover_picture, is_public, created_at
         FROM collections WHERE user_id = :user_id AND is_public = 1",
    ),
    (
        "GetCollectionById",
        "SELECT collection_id, user_id, name, cover_picture, is_public, created_at
         FROM collections WHERE collection_id = :collection_id",
    ),
    (
        "CreateCollection",
        "INSERT INTO collections (user_id, name, cover_picture, is_public, created_at)
         VALUES (:user_id, :name, :cover_picture, :is_public, :created_at)
         RETURNING collection_id, user_id, name, cover_picture, is_public, created_at",
    ),
    (
        "UpdateCollection",
        "UPDATE collections SET name = :name, cover_picture = :cover_picture, is_public = :is_public
         WHERE collection_id = :collection_id",
    ),
    (
        "DeleteCollection",
        "DELETE FROM collections WHERE collection_id = :collection_id",
    ),
    (
        "GetGamesInCollection",
        "SELECT og.game_id, og.user_id, og.title, og.description, og.cover_picture
         FROM owned_games og
         JOIN collection_games cg ON cg.game_id = og.game_id
         WHERE cg.collection_id = :collection_id",
    ),
    (
        "AddGameToCollection",
        "INSERT INTO collection_games (collection_id, game_id) VALUES (:collection_id, :game_id)",
    ),
    (
        "RemoveGameFromCollection",
        "DELETE FROM collection_games WHERE collection_id = :collection_id AND game_id = :game_id",
    ),
    // -- Owned games --
    (
        "GetAllOwnedGamesForUser",
        "SELECT game_id, user_id, title, description, cover_picture
         FROM owned_games WHERE user_id = :user_id",
    ),
    (
        "GetOwnedGameById",
        "SELECT game_id, user_id, title, description, cover_picture
         FROM owned_games WHERE game_id = :game_id AND user_id = :user_id",
    ),
    (
        "AddOwnedGame",
        "INSERT INTO owned_games (user_id, title, description, cover_picture)
         VALUES (:user_id, :title, :description, :cover_picture)
         RETURNING game_id, user_id, title, description, cover_picture",
    ),
    (
        "RemoveOwnedGame",
        "DELETE FROM owned_games WHERE game_id = :game_id AND user_id = :user_id",
    ),
    // -- Achievements --
    (
        "GetAllAchievements",
        "SELECT achievement_id, name, description, category, points, icon
         FROM achievements ORDER BY achievement_id",
    ),
    (
        "GetAchievementsWithStatusForUser",
        "SELECT a.achievement_id, a.name, a.description, a.category, a.points, a.icon, au.unlocked_at
         FROM achievements a
         LEFT JOIN achievement_user au
           ON au.achievement_id = a.achievement_id AND au.user_id = :user_id
         ORDER BY a.achievement_id",
    ),
    (
        "GetAchievementByName",
        "SELECT achievement_id, name, description, category, points, icon
         FROM achievements WHERE name = :name",
    ),
    (
        "UnlockAchievement",
        "INSERT INTO achievement_user (user_id, achievement_id, unlocked_at)
         VALUES (:user_id, :achievement_id, :unlocked_at)",
    ),
    (
        "IsAchievementUnlocked",
        "SELECT COUNT(*) FROM achievement_user
         WHERE user_id = :user_id AND achievement_id = :achievement_id",
    ),
    (
        "GetUnlockedAtForAchievement",
        "SELECT unlocked_at FROM achievement_user
         WHERE user_id = :user_id AND achievement_id = :achievement_id",
    ),
    (
        "GetNumberOfOwnedGames",
        "SELECT COUNT(*) FROM owned_games WHERE user_id = :user_id",
    ),
    // -- Features --
    (
        "GetAllFeatures",
        "SELECT feature_id, name, type, cost, description, source FROM features ORDER BY cost DESC",
    ),
    (
        "GetFeaturesByType",
        "SELECT feature_id, name, type, cost, description, source FROM features
         WHERE type = :type ORDER BY cost DESC",
    ),
    (
        "GetFeatureById",
        "SELECT feature_id, name, type, cost, description, source FROM features
         WHERE feature_id = :feature_id",
    ),
    (
        "GetUserFeatures",
        "SELECT f.feature_id, f.name, f.type, f.cost, f.description, f.source, fu.equipped
         FROM features f
         JOIN feature_user fu ON fu.feature_id = f.feature_id
         WHERE fu.user_id = :user_id ORDER BY f.cost DESC",
    ),
    (
        "GetEquippedFeaturesForUser",
        "SELECT f.feature_id, f.name, f.type, f.cost, f.description, f.source, fu.equipped
         FROM features f
         JOIN feature_user fu ON fu.feature_id = f.feature_id
         WHERE fu.user_id = :user_id AND fu.equipped = 1",
    ),
    (
        "GetFeatureUserRelationship",
        "SELECT user_id, feature_id, equipped FROM feature_user
         WHERE user_id = :user_id AND feature_id = :feature_id",
    ),
    (
        "AddUserFeature",
        "INSERT INTO feature_user (user_id, feature_id, equipped) VALUES (:user_id, :feature_id, 0)",
    ),
    (
        "EquipFeature",
        "UPDATE feature_user SET equipped = 1 WHERE user_id = :user_id AND feature_id = :feature_id",
    ),
    (
        "UnequipFeature",
        "UPDATE feature_user SET equipped = 0 WHERE user_id = :user_id AND feature_id = :feature_id",
    ),
    (
        "UnequipFeaturesByType",
        "UPDATE feature_user SET equipped = 0
         WHERE user_id = :user_id
           AND feature_id IN (SELECT feature_id FROM features WHERE type = :type)",
    ),
    // Category exclusivity in a single statement: equips the requested
    // feature and unequips every other purchased feature of the same type.
    (
        "ReplaceEquippedFeature",
        "UPDATE feature_user SET equipped = CASE WHEN feature_id = :feature_id THEN 1 ELSE 0 END
         WHERE user_id = :user_id
           AND feature_id IN (SELECT feature_id FROM features WHERE type = :type)",
    ),
    // -- Password reset --
    (
        "DeleteResetCodesForUser",
        "DELETE FROM password_reset_codes WHERE user_id = :user_id",
    ),
    (
        "StorePasswordResetCode",
        "INSERT INTO password_reset_codes (user_id, reset_code, expiration_time, used)
         VALUES (:user_id, :reset_code, :expiration_time, 0)",
    ),
    (
        "GetResetCodeData",
        "SELECT prc.user_id, prc.expiration_time, prc.used
         FROM password_reset_codes prc
         JOIN users u ON u.user_id = prc.user_id
         WHERE u.email = :email AND prc.reset_code = :reset_code",
    ),
    (
        "MarkResetCodeUsed",
        "UPDATE password_reset_codes SET used = 1
         WHERE user_id = :user_id AND reset_code = :reset_code",
    ),
    (
        "DeleteExpiredResetCodes",
        "DELETE FROM password_reset_codes WHERE expiration_time <= :now",
    ),
];

pub fn sql_for(name: &str) -> Option<&'static str> {
    PROCEDURES
        .iter()
        .find(|(proc_name, _)| *proc_name == name)
        .map(|(_, sql)| *sql)
}
