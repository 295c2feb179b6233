use crate::error::ServiceError;
use crate::models::OwnedGame;
use crate::repos::OwnedGamesRepository;

#[derive(Clone)]
pub struct OwnedGamesService {
    owned_games: OwnedGamesRepository,
}

impl OwnedGamesService {
    pub fn new(owned_games: OwnedGamesRepository) -> Self {
        Self { owned_games }
    }

    pub fn get_all_owned_games(&self, user_id: i64) -> Result<Vec<OwnedGame>, ServiceError> {
        self.owned_games
            .get_all_for_user(user_id)
            .map_err(|e| ServiceError::internal("Failed to retrieve owned games.", e))
    }

    pub fn get_owned_game_by_id(
        &self,
        game_id: i64,
        user_id: i64,
    ) -> Result<Option<OwnedGame>, ServiceError> {
        self.owned_games
            .get_by_id(game_id, user_id)
            .map_err(|e| ServiceError::internal("Failed to retrieve owned game.", e))
    }

    pub fn add_owned_game(
        &self,
        user_id: i64,
        title: &str,
        description: Option<String>,
        cover_picture: Option<String>,
    ) -> Result<OwnedGame, ServiceError> {
        if title.trim().is_empty() {
            return Err(ServiceError::Validation("Game title cannot be empty.".into()));
        }
        self.owned_games
            .add(user_id, title, description, cover_picture)
            .map_err(|e| ServiceError::internal("Failed to add owned game.", e))
    }

    pub fn remove_owned_game(&self, game_id: i64, user_id: i64) -> Result<(), ServiceError> {
        self.owned_games
            .remove(game_id, user_id)
            .map_err(|e| ServiceError::internal("Failed to remove owned game.", e))
    }
}
