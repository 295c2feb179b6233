use std::sync::Arc;

use crate::db::datalink::DataLink;
use crate::db::row::ProcParams;
use crate::error::RepositoryError;
use crate::models::Friendship;
use crate::repos::users::map_user;

#[derive(Clone)]
pub struct FriendshipsRepository {
    link: Arc<DataLink>,
}

impl FriendshipsRepository {
    pub fn new(link: Arc<DataLink>) -> Self {
        Self { link }
    }

    /// Both users must exist and the directed pair must not already be
    /// linked. The validation messages here are user-visible and propagate
    /// verbatim through the service tier.
    pub fn add(&self, user_id: i64, friend_id: i64) -> Result<(), RepositoryError> {
        for id in [user_id, friend_id] {
            if self.lookup_user(id)?.is_none() {
                return Err(RepositoryError::new(format!(
                    "User with ID {id} does not exist."
                )));
            }
        }
        if self.friendship_id(user_id, friend_id)?.is_some() {
            return Err(RepositoryError::new("Friendship already exists."));
        }

        let params = ProcParams::new()
            .add("user_id", user_id)
            .add("friend_id", friend_id);
        self.link
            .execute_non_query("AddFriend", &params)
            .map_err(|e| RepositoryError::wrap("Database error while adding friendship.", e))?;
        Ok(())
    }

    /// Joins in each friend's username and profile picture with a secondary
    /// lookup per row (fine at these volumes), sorted by friend username.
    pub fn get_all(&self, user_id: i64) -> Result<Vec<Friendship>, RepositoryError> {
        let rows = self
            .link
            .execute_reader(
                "GetFriendsForUser",
                &ProcParams::new().add("user_id", user_id),
            )
            .map_err(|e| {
                RepositoryError::wrap("Database error while retrieving friendships.", e)
            })?;

        let mut friendships = Vec::with_capacity(rows.len());
        for row in &rows {
            let (Some(id), Some(user_id), Some(friend_id)) = (
                row.i64("friendship_id"),
                row.i64("user_id"),
                row.i64("friend_id"),
            ) else {
                continue;
            };
            let Some(friend) = self.lookup_user(friend_id)? else {
                continue;
            };
            friendships.push(Friendship {
                id,
                user_id,
                friend_id,
                friend_username: friend.username,
                friend_profile_picture: friend.profile_picture,
            });
        }
        friendships.sort_by(|a, b| a.friend_username.cmp(&b.friend_username));
        Ok(friendships)
    }

    pub fn remove(&self, friendship_id: i64) -> Result<(), RepositoryError> {
        self.link
            .execute_non_query(
                "RemoveFriend",
                &ProcParams::new().add("friendship_id", friendship_id),
            )
            .map_err(|e| RepositoryError::wrap("Database error while removing friendship.", e))?;
        Ok(())
    }

    pub fn count_for_user(&self, user_id: i64) -> Result<i64, RepositoryError> {
        self.link
            .execute_scalar(
                "GetFriendshipCountForUser",
                &ProcParams::new().add("user_id", user_id),
            )
            .map_err(|e| {
                RepositoryError::wrap("Database error while counting friendships.", e)
            })
    }

    pub fn friendship_id(
        &self,
        user_id: i64,
        friend_id: i64,
    ) -> Result<Option<i64>, RepositoryError> {
        let params = ProcParams::new()
            .add("user_id", user_id)
            .add("friend_id", friend_id);
        let rows = self
            .link
            .execute_reader("GetFriendshipId", &params)
            .map_err(|e| {
                RepositoryError::wrap("Database error while retrieving friendship.", e)
            })?;
        Ok(rows.first().and_then(|row| row.i64("friendship_id")))
    }

    pub fn exists(&self, user_id: i64, friend_id: i64) -> Result<bool, RepositoryError> {
        Ok(self.friendship_id(user_id, friend_id)?.is_some())
    }

    fn lookup_user(&self, user_id: i64) -> Result<Option<crate::models::User>, RepositoryError> {
        let rows = self
            .link
            .execute_reader("GetUserById", &ProcParams::new().add("user_id", user_id))
            .map_err(|e| RepositoryError::wrap("Database error while retrieving user.", e))?;
        Ok(rows.iter().find_map(map_user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::repos::UsersRepository;

    fn setup() -> (FriendshipsRepository, UsersRepository) {
        let pool = db::create_test_pool();
        db::run_migrations(&pool).unwrap();
        let link = Arc::new(DataLink::new(pool));
        (
            FriendshipsRepository::new(link.clone()),
            UsersRepository::new(link),
        )
    }

    fn user(users: &UsersRepository, name: &str) -> i64 {
        users
            .create_user(name, &format!("{name}@example.com"), "h", false)
            .unwrap()
            .id
    }

    #[test]
    fn add_and_count_friendship() {
        let (repo, users) = setup();
        let a = user(&users, "alice");
        let b = user(&users, "bob");
        repo.add(a, b).unwrap();
        assert_eq!(repo.count_for_user(a).unwrap(), 1);
        let all = repo.get_all(a).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].friend_id, b);
        assert_eq!(all[0].friend_username, "bob");
    }

    #[test]
    fn missing_user_gets_descriptive_error() {
        let (repo, users) = setup();
        let a = user(&users, "alice");
        let err = repo.add(a, 999).unwrap_err();
        assert_eq!(err.to_string(), "User with ID 999 does not exist.");
    }

    #[test]
    fn duplicate_friendship_is_rejected() {
        let (repo, users) = setup();
        let a = user(&users, "alice");
        let b = user(&users, "bob");
        repo.add(a, b).unwrap();
        let err = repo.add(a, b).unwrap_err();
        assert_eq!(err.to_string(), "Friendship already exists.");
    }

    #[test]
    fn listing_sorts_by_friend_username() {
        let (repo, users) = setup();
        let a = user(&users, "alice");
        let zoe = user(&users, "zoe");
        let bob = user(&users, "bob");
        repo.add(a, zoe).unwrap();
        repo.add(a, bob).unwrap();
        let all = repo.get_all(a).unwrap();
        let names: Vec<_> = all.iter().map(|f| f.friend_username.as_str()).collect();
        assert_eq!(names, ["bob", "zoe"]);
    }

    #[test]
    fn remove_clears_the_pair() {
        let (repo, users) = setup();
        let a = user(&users, "alice");
        let b = user(&users, "bob");
        repo.add(a, b).unwrap();
        let id = repo.friendship_id(a, b).unwrap().unwrap();
        repo.remove(id).unwrap();
        assert!(!repo.exists(a, b).unwrap());
    }
}
