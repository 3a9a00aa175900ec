//! Catalog service: CRUD operations over the game store

use std::sync::Arc;
use tracing::{debug, info};

use crate::{
    error::{AppError, AppResult},
    models::{Game, GamePatch, NewGame},
    repositories::GameStore,
    validation::FieldErrors,
};

/// Catalog operations, each a thin boundary around one store call
#[derive(Clone)]
pub struct CatalogService {
    games: Arc<dyn GameStore>,
}

impl CatalogService {
    pub fn new(games: Arc<dyn GameStore>) -> Self {
        Self { games }
    }

    pub async fn list_games(&self) -> AppResult<Vec<Game>> {
        let games = self.games.list().await?;
        debug!("Listed {} games", games.len());
        Ok(games)
    }

    pub async fn get_game(&self, id: i64) -> AppResult<Game> {
        self.games.get(id).await?.ok_or(AppError::NotFound(id))
    }

    pub async fn create_game(&self, game: NewGame) -> AppResult<Game> {
        let game = self.games.insert(&game).await?;
        info!("Game {} created", game.id);
        Ok(game)
    }

    /// Apply a partial update; omitted fields keep their value
    ///
    /// Concurrent updates to the same id are last-writer-wins per field.
    pub async fn update_game(&self, id: i64, patch: GamePatch) -> AppResult<Game> {
        if patch.is_empty() {
            return self.get_game(id).await;
        }

        let game = self
            .games
            .update(id, &patch)
            .await?
            .ok_or(AppError::NotFound(id))?;
        info!("Game {} updated", id);
        Ok(game)
    }

    /// Report a validation failure for `id`, unless the id is unknown
    ///
    /// An update aimed at a missing game is a NotFound first.
    pub async fn reject_update(&self, id: i64, errors: FieldErrors) -> AppError {
        match self.games.get(id).await {
            Ok(Some(_)) => AppError::Validation(errors),
            Ok(None) => AppError::NotFound(id),
            Err(e) => e.into(),
        }
    }

    pub async fn delete_game(&self, id: i64) -> AppResult<()> {
        if !self.games.delete(id).await? {
            return Err(AppError::NotFound(id));
        }
        info!("Game {} deleted", id);
        Ok(())
    }
}
