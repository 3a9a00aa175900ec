//! In-process store for development runs and tests

use async_trait::async_trait;
use std::{collections::BTreeMap, sync::Arc};
use tokio::sync::Mutex;
use tracing::info;

use super::{GameStore, StoreError, UserStore};
use crate::models::{Game, GamePatch, NewGame, NewUser, User};

#[derive(Default)]
struct MemoryState {
    games: BTreeMap<i64, Game>,
    last_game_id: i64,
    users: BTreeMap<i64, User>,
    last_user_id: i64,
}

/// Store holding games and users in memory
///
/// Ids are never reused, even after a delete, matching a database sequence.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GameStore for MemoryStore {
    async fn insert(&self, game: &NewGame) -> Result<Game, StoreError> {
        info!("Creating new game: {}", game.name());

        let mut state = self.state.lock().await;
        state.last_game_id += 1;
        let game = Game {
            id: state.last_game_id,
            name: game.name().to_string(),
            description: game.description().to_string(),
            price: game.price(),
        };
        state.games.insert(game.id, game.clone());
        Ok(game)
    }

    async fn list(&self) -> Result<Vec<Game>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.games.values().cloned().collect())
    }

    async fn get(&self, id: i64) -> Result<Option<Game>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.games.get(&id).cloned())
    }

    async fn update(&self, id: i64, patch: &GamePatch) -> Result<Option<Game>, StoreError> {
        let mut state = self.state.lock().await;
        Ok(state.games.get_mut(&id).map(|game| {
            patch.apply_to(game);
            game.clone()
        }))
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let mut state = self.state.lock().await;
        Ok(state.games.remove(&id).is_some())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert(&self, user: &NewUser) -> Result<User, StoreError> {
        let mut state = self.state.lock().await;

        for existing in state.users.values() {
            if existing.username == user.username {
                return Err(StoreError::Conflict { field: "username" });
            }
            if existing.email == user.email {
                return Err(StoreError::Conflict { field: "email" });
            }
        }

        state.last_user_id += 1;
        let user = User {
            id: state.last_user_id,
            username: user.username.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash().clone(),
        };
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_username_or_email(
        &self,
        username_or_email: &str,
    ) -> Result<Option<User>, StoreError> {
        let email = username_or_email.to_lowercase();
        let state = self.state.lock().await;

        // An email match wins over a username match
        Ok(state
            .users
            .values()
            .find(|user| user.email == email)
            .or_else(|| {
                state
                    .users
                    .values()
                    .find(|user| user.username == username_or_email)
            })
            .cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.users.get(&id).cloned())
    }
}
