//! Game repository for database operations

use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::{debug, info};

use super::{GameStore, StoreError};
use crate::models::{Game, GamePatch, NewGame, Price};

/// PostgreSQL-backed game repository
#[derive(Clone)]
pub struct PgGameRepository {
    pool: PgPool,
}

impl PgGameRepository {
    /// Create a new game repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn game_from_row(row: &PgRow) -> Result<Game, StoreError> {
    let price: f64 = row.get("price");
    let price = Price::new(price).map_err(|e| {
        StoreError::query(sqlx::Error::Decode(
            format!("stored price {} is out of range: {}", price, e).into(),
        ))
    })?;

    Ok(Game {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        price,
    })
}

#[async_trait]
impl GameStore for PgGameRepository {
    async fn insert(&self, game: &NewGame) -> Result<Game, StoreError> {
        info!("Creating new game: {}", game.name());

        let row = sqlx::query(
            r#"
            INSERT INTO games (name, description, price)
            VALUES ($1, $2, $3::NUMERIC(10, 2))
            RETURNING id, name, COALESCE(description, '') AS description, price::FLOAT8 AS price
            "#,
        )
        .bind(game.name())
        .bind(game.description())
        .bind(game.price().as_f64())
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::query)?;

        game_from_row(&row)
    }

    async fn list(&self) -> Result<Vec<Game>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, COALESCE(description, '') AS description, price::FLOAT8 AS price
            FROM games
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::query)?;

        rows.iter().map(game_from_row).collect()
    }

    async fn get(&self, id: i64) -> Result<Option<Game>, StoreError> {
        debug!("Finding game by ID: {}", id);

        let row = sqlx::query(
            r#"
            SELECT id, name, COALESCE(description, '') AS description, price::FLOAT8 AS price
            FROM games
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::query)?;

        row.as_ref().map(game_from_row).transpose()
    }

    async fn update(&self, id: i64, patch: &GamePatch) -> Result<Option<Game>, StoreError> {
        info!("Updating game: {}", id);

        // One statement, so omitted fields are read and written atomically
        let row = sqlx::query(
            r#"
            UPDATE games
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                price = COALESCE($4::NUMERIC(10, 2), price)
            WHERE id = $1
            RETURNING id, name, COALESCE(description, '') AS description, price::FLOAT8 AS price
            "#,
        )
        .bind(id)
        .bind(patch.name())
        .bind(patch.description())
        .bind(patch.price().map(Price::as_f64))
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::query)?;

        row.as_ref().map(game_from_row).transpose()
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        info!("Deleting game: {}", id);

        let result = sqlx::query("DELETE FROM games WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(StoreError::query)?;

        Ok(result.rows_affected() > 0)
    }
}
