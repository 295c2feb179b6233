use crate::error::ServiceError;
use crate::models::Friendship;
use crate::repos::FriendshipsRepository;

#[derive(Clone)]
pub struct FriendsService {
    friendships: FriendshipsRepository,
}

impl FriendsService {
    pub fn new(friendships: FriendshipsRepository) -> Self {
        Self { friendships }
    }

    /// The repository validates both ids and rejects duplicates; its message
    /// ("Friendship already exists.", "User with ID .. does not exist.")
    /// stays the user-visible text.
    pub fn add_friend(&self, user_id: i64, friend_id: i64) -> Result<(), ServiceError> {
        self.friendships
            .add(user_id, friend_id)
            .map_err(|e| ServiceError::internal(e.message().to_string(), e))
    }

    pub fn remove_friend(&self, friendship_id: i64) -> Result<(), ServiceError> {
        self.friendships
            .remove(friendship_id)
            .map_err(|e| ServiceError::internal("Failed to remove friend.", e))
    }

    pub fn get_all_friendships(&self, user_id: i64) -> Result<Vec<Friendship>, ServiceError> {
        self.friendships
            .get_all(user_id)
            .map_err(|e| ServiceError::internal("Failed to retrieve friendships.", e))
    }

    pub fn get_friendship_count(&self, user_id: i64) -> Result<i64, ServiceError> {
        self.friendships
            .count_for_user(user_id)
            .map_err(|e| ServiceError::internal("Failed to count friendships.", e))
    }

    pub fn are_users_friends(&self, user_id: i64, friend_id: i64) -> Result<bool, ServiceError> {
        self.friendships
            .exists(user_id, friend_id)
            .map_err(|e| ServiceError::internal("Failed to check friendship.", e))
    }

    pub fn get_friendship_id(
        &self,
        user_id: i64,
        friend_id: i64,
    ) -> Result<Option<i64>, ServiceError> {
        self.friendships
            .friendship_id(user_id, friend_id)
            .map_err(|e| ServiceError::internal("Failed to retrieve friendship.", e))
    }
}
