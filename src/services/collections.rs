use chrono::Utc;

use crate::error::ServiceError;
use crate::models::{Collection, OwnedGame, ALL_OWNED_GAMES_COLLECTION_ID};
use crate::repos::CollectionsRepository;

#[derive(Clone)]
pub struct CollectionsService {
    collections: CollectionsRepository,
}

impl CollectionsService {
    pub fn new(collections: CollectionsRepository) -> Self {
        Self { collections }
    }

    pub fn get_collections_for_user(&self, user_id: i64) -> Result<Vec<Collection>, ServiceError> {
        self.collections
            .get_all_for_user(user_id)
            .map_err(|e| ServiceError::internal("Failed to retrieve collections.", e))
    }

    pub fn get_public_collections_for_user(
        &self,
        user_id: i64,
    ) -> Result<Vec<Collection>, ServiceError> {
        self.collections
            .get_public_for_user(user_id)
            .map_err(|e| ServiceError::internal("Failed to retrieve public collections.", e))
    }

    pub fn get_last_three_collections_for_user(
        &self,
        user_id: i64,
    ) -> Result<Vec<Collection>, ServiceError> {
        self.collections
            .get_last_three_for_user(user_id)
            .map_err(|e| ServiceError::internal("Failed to retrieve recent collections.", e))
    }

    /// Id 1 yields the virtual "All Owned Games" collection assembled on the
    /// fly; any other id is a real row with its games attached.
    pub fn get_collection_by_id(
        &self,
        collection_id: i64,
        user_id: i64,
    ) -> Result<Option<Collection>, ServiceError> {
        if collection_id == ALL_OWNED_GAMES_COLLECTION_ID {
            let games = self.get_games_in_collection(collection_id, user_id)?;
            return Ok(Some(Collection {
                id: ALL_OWNED_GAMES_COLLECTION_ID,
                user_id,
                name: "All Owned Games".into(),
                cover_picture: None,
                is_public: false,
                created_at: Utc::now(),
                games,
            }));
        }
        let Some(mut collection) = self
            .collections
            .get_by_id(collection_id)
            .map_err(|e| ServiceError::internal("Failed to retrieve collection.", e))?
        else {
            return Ok(None);
        };
        collection.games = self.get_games_in_collection(collection_id, user_id)?;
        Ok(Some(collection))
    }

    pub fn get_games_in_collection(
        &self,
        collection_id: i64,
        user_id: i64,
    ) -> Result<Vec<OwnedGame>, ServiceError> {
        self.collections
            .get_games_in_collection(collection_id, user_id)
            .map_err(|e| ServiceError::internal("Failed to retrieve games in collection.", e))
    }

    pub fn create_collection(
        &self,
        user_id: i64,
        name: &str,
        cover_picture: Option<String>,
        is_public: bool,
    ) -> Result<Collection, ServiceError> {
        if name.trim().is_empty() {
            return Err(ServiceError::Validation(
                "Collection name cannot be empty.".into(),
            ));
        }
        self.collections
            .create(user_id, name, cover_picture, is_public)
            .map_err(|e| ServiceError::internal("Failed to create collection.", e))
    }

    pub fn update_collection(
        &self,
        collection_id: i64,
        name: &str,
        cover_picture: Option<String>,
        is_public: bool,
    ) -> Result<(), ServiceError> {
        if collection_id == ALL_OWNED_GAMES_COLLECTION_ID {
            return Err(ServiceError::Validation(
                "The all-owned-games collection cannot be modified.".into(),
            ));
        }
        self.collections
            .update(collection_id, name, cover_picture, is_public)
            .map_err(|e| ServiceError::internal("Failed to update collection.", e))
    }

    pub fn delete_collection(&self, collection_id: i64) -> Result<(), ServiceError> {
        if collection_id == ALL_OWNED_GAMES_COLLECTION_ID {
            return Err(ServiceError::Validation(
                "The all-owned-games collection cannot be deleted.".into(),
            ));
        }
        self.collections
            .delete(collection_id)
            .map_err(|e| ServiceError::internal("Failed to delete collection.", e))
    }

    pub fn add_game_to_collection(
        &self,
        collection_id: i64,
        game_id: i64,
    ) -> Result<(), ServiceError> {
        if collection_id == ALL_OWNED_GAMES_COLLECTION_ID {
            return Err(ServiceError::Validation(
                "Games cannot be added to the all-owned-games collection.".into(),
            ));
        }
        self.collections
            .add_game(collection_id, game_id)
            .map_err(|e| ServiceError::internal("Failed to add game to collection.", e))
    }

    pub fn remove_game_from_collection(
        &self,
        collection_id: i64,
        game_id: i64,
    ) -> Result<(), ServiceError> {
        self.collections
            .remove_game(collection_id, game_id)
            .map_err(|e| ServiceError::internal("Failed to remove game from collection.", e))
    }
}
