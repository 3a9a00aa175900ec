//! Custom error types for the common library
//!
//! This module defines the infrastructure error types shared by the catalog
//! service's stores.

use sqlx::Error as SqlxError;
use thiserror::Error;

/// Failure of the PostgreSQL layer behind the game and user stores
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Pool could not reach the server at startup
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// A store query failed; unique violations are mapped before reaching here
    #[error("Database query error: {0}")]
    Query(#[source] SqlxError),

    /// Embedded schema migrations could not be applied
    #[error("Database migration error: {0}")]
    Migration(String),

    /// `DATABASE_*` settings are missing or inconsistent
    #[error("Database configuration error: {0}")]
    Configuration(String),
}

/// Result of a pool or store operation
pub type DatabaseResult<T> = Result<T, DatabaseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_failing_layer() {
        let error = DatabaseError::Migration("checksum mismatch".to_string());
        assert_eq!(
            error.to_string(),
            "Database migration error: checksum mismatch"
        );

        let error = DatabaseError::Query(SqlxError::RowNotFound);
        assert!(error.to_string().starts_with("Database query error:"));
    }
}
