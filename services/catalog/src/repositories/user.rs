//! User repository for database operations

use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;

use super::{StoreError, UserStore};
use crate::{
    models::{NewUser, User},
    password::PasswordDigest,
};

/// PostgreSQL-backed user repository
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn user_from_row(row: &PgRow) -> User {
    User {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        password_hash: PasswordDigest::from_stored(row.get::<String, _>("password_hash")),
    }
}

/// Translate a unique violation into the field it concerns
fn map_insert_error(error: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &error {
        if db.is_unique_violation() {
            let field = match db.constraint() {
                Some(constraint) if constraint.contains("email") => "email",
                _ => "username",
            };
            return StoreError::Conflict { field };
        }
    }
    StoreError::query(error)
}

#[async_trait]
impl UserStore for PgUserRepository {
    async fn insert(&self, user: &NewUser) -> Result<User, StoreError> {
        info!("Creating new user: {}", user.username);

        let row = sqlx::query(
            r#"
            INSERT INTO usuarios (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, username, email, password_hash
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(user.password_hash().as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(map_insert_error)?;

        Ok(user_from_row(&row))
    }

    async fn find_by_username_or_email(
        &self,
        username_or_email: &str,
    ) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, username, email, password_hash
            FROM usuarios
            WHERE username = $1 OR email = LOWER($1)
            ORDER BY (email = LOWER($1)) DESC, id
            LIMIT 1
            "#,
        )
        .bind(username_or_email)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::query)?;

        Ok(row.as_ref().map(user_from_row))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, username, email, password_hash
            FROM usuarios
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::query)?;

        Ok(row.as_ref().map(user_from_row))
    }
}
