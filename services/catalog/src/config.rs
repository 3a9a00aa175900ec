//! Service configuration
//!
//! Read from `CATALOG_*` environment variables through the `config` crate.
//! Database and Redis connection settings stay with their own loaders in the
//! `common` crate.

use anyhow::{Result, bail};
use serde::Deserialize;

use crate::{password::HashingCost, session::SessionConfig};

/// Which backend holds games, users and sessions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// PostgreSQL for records, Redis for sessions
    Postgres,
    /// Everything in process memory; lost on restart
    Memory,
}

fn default_bind_address() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_storage() -> StorageBackend {
    StorageBackend::Postgres
}

fn default_session_ttl() -> u64 {
    SessionConfig::default().session_ttl_seconds
}

fn default_remember_ttl() -> u64 {
    SessionConfig::default().remember_ttl_seconds
}

fn default_password_memory() -> u32 {
    HashingCost::default().memory_kib
}

fn default_password_iterations() -> u32 {
    HashingCost::default().iterations
}

fn default_password_parallelism() -> u32 {
    HashingCost::default().parallelism
}

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_storage")]
    pub storage: StorageBackend,
    #[serde(default = "default_session_ttl")]
    pub session_ttl_seconds: u64,
    #[serde(default = "default_remember_ttl")]
    pub remember_ttl_seconds: u64,
    /// Mark session cookies `Secure` (serve over HTTPS)
    #[serde(default)]
    pub secure_cookies: bool,
    #[serde(default = "default_password_memory")]
    pub password_memory_kib: u32,
    #[serde(default = "default_password_iterations")]
    pub password_iterations: u32,
    #[serde(default = "default_password_parallelism")]
    pub password_parallelism: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            storage: default_storage(),
            session_ttl_seconds: default_session_ttl(),
            remember_ttl_seconds: default_remember_ttl(),
            secure_cookies: false,
            password_memory_kib: default_password_memory(),
            password_iterations: default_password_iterations(),
            password_parallelism: default_password_parallelism(),
        }
    }
}

impl AppConfig {
    /// Create a new AppConfig from environment variables
    ///
    /// # Environment Variables
    /// - `CATALOG_BIND_ADDRESS`: listen address (default: "0.0.0.0:8000")
    /// - `CATALOG_STORAGE`: `postgres` or `memory` (default: `postgres`)
    /// - `CATALOG_SESSION_TTL_SECONDS`: browser-session lifetime (default: 43200)
    /// - `CATALOG_REMEMBER_TTL_SECONDS`: "remember me" lifetime (default: 2592000)
    /// - `CATALOG_SECURE_COOKIES`: `true` to set the `Secure` flag (default: false)
    /// - `CATALOG_PASSWORD_MEMORY_KIB`, `CATALOG_PASSWORD_ITERATIONS`,
    ///   `CATALOG_PASSWORD_PARALLELISM`: Argon2 cost
    pub fn from_env() -> Result<Self> {
        let config: Self = config::Config::builder()
            .add_source(config::Environment::with_prefix("CATALOG").try_parsing(true))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.session_ttl_seconds == 0 || self.remember_ttl_seconds == 0 {
            bail!("Session lifetimes must be at least one second");
        }
        if self.remember_ttl_seconds < self.session_ttl_seconds {
            bail!("CATALOG_REMEMBER_TTL_SECONDS must not be shorter than CATALOG_SESSION_TTL_SECONDS");
        }
        Ok(())
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            session_ttl_seconds: self.session_ttl_seconds,
            remember_ttl_seconds: self.remember_ttl_seconds,
        }
    }

    pub fn hashing_cost(&self) -> HashingCost {
        HashingCost {
            memory_kib: self.password_memory_kib,
            iterations: self.password_iterations,
            parallelism: self.password_parallelism,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 5] = [
        "CATALOG_BIND_ADDRESS",
        "CATALOG_STORAGE",
        "CATALOG_SESSION_TTL_SECONDS",
        "CATALOG_REMEMBER_TTL_SECONDS",
        "CATALOG_SECURE_COOKIES",
    ];

    fn clear_env() {
        for var in VARS {
            unsafe {
                std::env::remove_var(var);
            }
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();

        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.bind_address, "0.0.0.0:8000");
        assert_eq!(config.storage, StorageBackend::Postgres);
        assert_eq!(config.session_ttl_seconds, 43200);
        assert_eq!(config.remember_ttl_seconds, 2592000);
        assert!(!config.secure_cookies);
    }

    #[test]
    #[serial]
    fn test_custom_values() {
        clear_env();
        unsafe {
            std::env::set_var("CATALOG_BIND_ADDRESS", "127.0.0.1:9000");
            std::env::set_var("CATALOG_STORAGE", "memory");
            std::env::set_var("CATALOG_SESSION_TTL_SECONDS", "60");
            std::env::set_var("CATALOG_SECURE_COOKIES", "true");
        }

        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.bind_address, "127.0.0.1:9000");
        assert_eq!(config.storage, StorageBackend::Memory);
        assert_eq!(config.session_config().session_ttl_seconds, 60);
        assert!(config.secure_cookies);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_rejects_remember_shorter_than_session() {
        clear_env();
        unsafe {
            std::env::set_var("CATALOG_SESSION_TTL_SECONDS", "600");
            std::env::set_var("CATALOG_REMEMBER_TTL_SECONDS", "60");
        }

        assert!(AppConfig::from_env().is_err());

        clear_env();
    }
}
