use std::sync::Arc;

use crate::db::datalink::DataLink;
use crate::db::row::{ProcParams, ProcRow};
use crate::error::RepositoryError;
use crate::models::{Collection, OwnedGame, ALL_OWNED_GAMES_COLLECTION_ID};
use crate::repos::owned_games::map_owned_game;

#[derive(Clone)]
pub struct CollectionsRepository {
    link: Arc<DataLink>,
}

impl CollectionsRepository {
    pub fn new(link: Arc<DataLink>) -> Self {
        Self { link }
    }

    pub fn get_all_for_user(&self, user_id: i64) -> Result<Vec<Collection>, RepositoryError> {
        self.list("GetAllCollectionsForUser", user_id)
    }

    pub fn get_public_for_user(&self, user_id: i64) -> Result<Vec<Collection>, RepositoryError> {
        self.list("GetPublicCollectionsForUser", user_id)
    }

    fn list(&self, procedure: &str, user_id: i64) -> Result<Vec<Collection>, RepositoryError> {
        let rows = self
            .link
            .execute_reader(procedure, &ProcParams::new().add("user_id", user_id))
            .map_err(|e| {
                RepositoryError::wrap("Database error while retrieving collections.", e)
            })?;
        Ok(rows.iter().filter_map(map_collection).collect())
    }

    /// Newest three collections for the user.
    pub fn get_last_three_for_user(
        &self,
        user_id: i64,
    ) -> Result<Vec<Collection>, RepositoryError> {
        let mut collections = self.get_all_for_user(user_id)?;
        collections.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        collections.truncate(3);
        Ok(collections)
    }

    /// Plain row lookup. The id-1 virtual collection is assembled in the
    /// service, never read from the store.
    pub fn get_by_id(&self, collection_id: i64) -> Result<Option<Collection>, RepositoryError> {
        let rows = self
            .link
            .execute_reader(
                "GetCollectionById",
                &ProcParams::new().add("collection_id", collection_id),
            )
            .map_err(|e| {
                RepositoryError::wrap("Database error while retrieving collection.", e)
            })?;
        Ok(rows.iter().find_map(map_collection))
    }

    pub fn create(
        &self,
        user_id: i64,
        name: &str,
        cover_picture: Option<String>,
        is_public: bool,
    ) -> Result<Collection, RepositoryError> {
        let params = ProcParams::new()
            .add("user_id", user_id)
            .add("name", name.to_string())
            .add("cover_picture", cover_picture)
            .add("is_public", is_public)
            .add_datetime("created_at", chrono::Utc::now());
        let rows = self
            .link
            .execute_reader("CreateCollection", &params)
            .map_err(|e| RepositoryError::wrap("Database error while creating collection.", e))?;
        rows.iter()
            .find_map(map_collection)
            .ok_or_else(|| RepositoryError::new("Failed to create collection."))
    }

    pub fn update(
        &self,
        collection_id: i64,
        name: &str,
        cover_picture: Option<String>,
        is_public: bool,
    ) -> Result<(), RepositoryError> {
        let params = ProcParams::new()
            .add("collection_id", collection_id)
            .add("name", name.to_string())
            .add("cover_picture", cover_picture)
            .add("is_public", is_public);
        self.link
            .execute_non_query("UpdateCollection", &params)
            .map_err(|e| RepositoryError::wrap("Database error while updating collection.", e))?;
        Ok(())
    }

    pub fn delete(&self, collection_id: i64) -> Result<(), RepositoryError> {
        self.link
            .execute_non_query(
                "DeleteCollection",
                &ProcParams::new().add("collection_id", collection_id),
            )
            .map_err(|e| RepositoryError::wrap("Database error while deleting collection.", e))?;
        Ok(())
    }

    /// Collection id 1 redirects to every game the user owns; any other id is
    /// a collection-scoped lookup with no user filter.
    pub fn get_games_in_collection(
        &self,
        collection_id: i64,
        user_id: i64,
    ) -> Result<Vec<OwnedGame>, RepositoryError> {
        let (procedure, params) = if collection_id == ALL_OWNED_GAMES_COLLECTION_ID {
            (
                "GetAllOwnedGamesForUser",
                ProcParams::new().add("user_id", user_id),
            )
        } else {
            (
                "GetGamesInCollection",
                ProcParams::new().add("collection_id", collection_id),
            )
        };
        let rows = self.link.execute_reader(procedure, &params).map_err(|e| {
            RepositoryError::wrap("Database error while retrieving games in collection.", e)
        })?;
        Ok(rows.iter().filter_map(map_owned_game).collect())
    }

    pub fn add_game(&self, collection_id: i64, game_id: i64) -> Result<(), RepositoryError> {
        let params = ProcParams::new()
            .add("collection_id", collection_id)
            .add("game_id", game_id);
        self.link
            .execute_non_query("AddGameToCollection", &params)
            .map_err(|e| {
                RepositoryError::wrap("Database error while adding game to collection.", e)
            })?;
        Ok(())
    }

    pub fn remove_game(&self, collection_id: i64, game_id: i64) -> Result<(), RepositoryError> {
        let params = ProcParams::new()
            .add("collection_id", collection_id)
            .add("game_id", game_id);
        self.link
            .execute_non_query("RemoveGameFromCollection", &params)
            .map_err(|e| {
                RepositoryError::wrap("Database error while removing game from collection.", e)
            })?;
        Ok(())
    }
}

fn map_collection(row: &ProcRow) -> Option<Collection> {
    Some(Collection {
        id: row.i64("collection_id")?,
        user_id: row.i64("user_id")?,
        name: row.text("name")?.to_string(),
        cover_picture: row.text("cover_picture").map(str::to_string),
        is_public: row.bool("is_public").unwrap_or(false),
        created_at: row.datetime("created_at")?,
        games: Vec::new(),
    })
}
