//! Integration tests for the infrastructure components
//!
//! These tests verify that the PostgreSQL database and the Redis session
//! cache are reachable with the configured environment. They need live
//! services, so they are ignored by default:
//! `cargo test -p common -- --ignored`.

use common::{
    cache::{RedisConfig, RedisPool},
    database::{DatabaseConfig, health_check, init_pool},
};
use sqlx::Row;

#[tokio::test]
#[ignore = "requires running PostgreSQL and Redis servers"]
async fn test_infrastructure_integration() -> Result<(), Box<dyn std::error::Error>> {
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    assert!(health_check(&pool).await?, "Database health check failed");

    // NUMERIC(10,2) round-trips through FLOAT8 the way the game store reads prices
    let row = sqlx::query("SELECT 19.99::NUMERIC(10,2)::FLOAT8 AS price")
        .fetch_one(&pool)
        .await?;
    let price: f64 = row.get("price");
    assert_eq!(price, 19.99, "PostgreSQL numeric cast test failed");

    let redis_config = RedisConfig::from_env()?;
    let redis_pool = RedisPool::new(&redis_config).await?;

    assert!(
        redis_pool.health_check().await?,
        "Redis health check failed"
    );

    let test_key = "session:integration_test";
    redis_pool.set(test_key, "integration", Some(10)).await?;
    assert_eq!(
        redis_pool.get(test_key).await?,
        Some("integration".to_string()),
        "Redis SET/GET test failed"
    );

    redis_pool.delete(test_key).await?;
    assert_eq!(
        redis_pool.get(test_key).await?,
        None,
        "Redis delete operation failed"
    );

    Ok(())
}
