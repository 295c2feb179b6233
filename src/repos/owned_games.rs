use std::sync::Arc;

use crate::db::datalink::DataLink;
use crate::db::row::{ProcParams, ProcRow};
use crate::error::RepositoryError;
use crate::models::OwnedGame;

#[derive(Clone)]
pub struct OwnedGamesRepository {
    link: Arc<DataLink>,
}

impl OwnedGamesRepository {
    pub fn new(link: Arc<DataLink>) -> Self {
        Self { link }
    }

    pub fn get_all_for_user(&self, user_id: i64) -> Result<Vec<OwnedGame>, RepositoryError> {
        let rows = self
            .link
            .execute_reader(
                "GetAllOwnedGamesForUser",
                &ProcParams::new().add("user_id", user_id),
            )
            .map_err(|e| {
                RepositoryError::wrap("Database error while retrieving owned games.", e)
            })?;
        Ok(rows.iter().filter_map(map_owned_game).collect())
    }

    /// Lookup is scoped to the owner; another user's game id yields `None`.
    pub fn get_by_id(
        &self,
        game_id: i64,
        user_id: i64,
    ) -> Result<Option<OwnedGame>, RepositoryError> {
        let params = ProcParams::new()
            .add("game_id", game_id)
            .add("user_id", user_id);
        let rows = self
            .link
            .execute_reader("GetOwnedGameById", &params)
            .map_err(|e| RepositoryError::wrap("Database error while retrieving owned game.", e))?;
        Ok(rows.iter().find_map(map_owned_game))
    }

    pub fn add(
        &self,
        user_id: i64,
        title: &str,
        description: Option<String>,
        cover_picture: Option<String>,
    ) -> Result<OwnedGame, RepositoryError> {
        let params = ProcParams::new()
            .add("user_id", user_id)
            .add("title", title.to_string())
            .add("description", description)
            .add("cover_picture", cover_picture);
        let rows = self
            .link
            .execute_reader("AddOwnedGame", &params)
            .map_err(|e| RepositoryError::wrap("Database error while adding owned game.", e))?;
        rows.iter()
            .find_map(map_owned_game)
            .ok_or_else(|| RepositoryError::new("Failed to add owned game."))
    }

    pub fn remove(&self, game_id: i64, user_id: i64) -> Result<(), RepositoryError> {
        let params = ProcParams::new()
            .add("game_id", game_id)
            .add("user_id", user_id);
        self.link
            .execute_non_query("RemoveOwnedGame", &params)
            .map_err(|e| RepositoryError::wrap("Database error while removing owned game.", e))?;
        Ok(())
    }
}

pub(crate) fn map_owned_game(row: &ProcRow) -> Option<OwnedGame> {
    Some(OwnedGame {
        id: row.i64("game_id")?,
        user_id: row.i64("user_id")?,
        title: row.text("title")?.to_string(),
        description: row.text("description").map(str::to_string),
        cover_picture: row.text("cover_picture").map(str::to_string),
    })
}
