//! Repositories for database operations
//!
//! The catalog and auth services only see the [`GameStore`] and [`UserStore`]
//! ports; PostgreSQL and in-process memory both implement them.

use async_trait::async_trait;
use common::error::DatabaseError;
use sqlx::PgPool;
use thiserror::Error;
use tracing::info;

use crate::models::{Game, GamePatch, NewGame, NewUser, User};

pub mod game;
pub mod memory;
pub mod user;

pub use game::PgGameRepository;
pub use memory::MemoryStore;
pub use user::PgUserRepository;

/// Errors raised by a store implementation
#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique column already holds the value
    #[error("Duplicate value for unique field `{field}`")]
    Conflict { field: &'static str },

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl StoreError {
    pub(crate) fn query(error: sqlx::Error) -> Self {
        Self::Database(DatabaseError::Query(error))
    }
}

/// Storage port for catalog entries
#[async_trait]
pub trait GameStore: Send + Sync {
    /// Insert a game, returning it with its assigned id
    async fn insert(&self, game: &NewGame) -> Result<Game, StoreError>;

    /// All games, ordered by id
    async fn list(&self) -> Result<Vec<Game>, StoreError>;

    async fn get(&self, id: i64) -> Result<Option<Game>, StoreError>;

    /// Apply a partial update, returning the new state or `None` for an unknown id
    async fn update(&self, id: i64, patch: &GamePatch) -> Result<Option<Game>, StoreError>;

    /// Hard-delete a game, returning whether a row was removed
    async fn delete(&self, id: i64) -> Result<bool, StoreError>;
}

/// Storage port for user accounts
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert an account; duplicate username or email yields [`StoreError::Conflict`]
    async fn insert(&self, user: &NewUser) -> Result<User, StoreError>;

    async fn find_by_username_or_email(&self, username_or_email: &str)
    -> Result<Option<User>, StoreError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError>;
}

/// Apply the embedded SQL migrations
pub async fn run_migrations(pool: &PgPool) -> Result<(), DatabaseError> {
    info!("Running database migrations");

    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| DatabaseError::Migration(e.to_string()))?;

    info!("Database migrations applied");
    Ok(())
}
