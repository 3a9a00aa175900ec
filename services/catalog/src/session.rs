//! Server-side session management
//!
//! A session is an opaque token in a cookie pointing at a [`SessionRecord`]
//! kept in Redis (or in memory for development runs). Records carry their own
//! expiry, and Redis keys are given a matching TTL.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use common::cache::RedisPool;
use std::{collections::HashMap, sync::Arc};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::models::{SessionRecord, SessionToken};

/// Errors raised by a session store
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session backend error: {0}")]
    Backend(#[from] anyhow::Error),

    #[error("Session record encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Storage port for session records
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn save(
        &self,
        token: &SessionToken,
        record: &SessionRecord,
        ttl_seconds: u64,
    ) -> Result<(), SessionError>;

    async fn load(&self, token: &SessionToken) -> Result<Option<SessionRecord>, SessionError>;

    async fn remove(&self, token: &SessionToken) -> Result<(), SessionError>;
}

fn session_key(token: &SessionToken) -> String {
    format!("session:{}", token.as_str())
}

/// Session store backed by Redis
#[derive(Clone)]
pub struct RedisSessionStore {
    redis_pool: RedisPool,
}

impl RedisSessionStore {
    pub fn new(redis_pool: RedisPool) -> Self {
        Self { redis_pool }
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn save(
        &self,
        token: &SessionToken,
        record: &SessionRecord,
        ttl_seconds: u64,
    ) -> Result<(), SessionError> {
        let value = serde_json::to_string(record)?;
        self.redis_pool
            .set(&session_key(token), &value, Some(ttl_seconds))
            .await?;
        Ok(())
    }

    async fn load(&self, token: &SessionToken) -> Result<Option<SessionRecord>, SessionError> {
        match self.redis_pool.get(&session_key(token)).await? {
            Some(value) => Ok(Some(serde_json::from_str(&value)?)),
            None => Ok(None),
        }
    }

    async fn remove(&self, token: &SessionToken) -> Result<(), SessionError> {
        self.redis_pool.delete(&session_key(token)).await?;
        Ok(())
    }
}

/// Session store kept in process memory
#[derive(Clone, Default)]
pub struct MemorySessionStore {
    entries: Arc<Mutex<HashMap<SessionToken, SessionRecord>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn save(
        &self,
        token: &SessionToken,
        record: &SessionRecord,
        _ttl_seconds: u64,
    ) -> Result<(), SessionError> {
        let mut entries = self.entries.lock().await;
        let now = Utc::now();
        entries.retain(|_, existing| !existing.is_expired(now));
        entries.insert(token.clone(), record.clone());
        Ok(())
    }

    async fn load(&self, token: &SessionToken) -> Result<Option<SessionRecord>, SessionError> {
        let entries = self.entries.lock().await;
        Ok(entries.get(token).cloned())
    }

    async fn remove(&self, token: &SessionToken) -> Result<(), SessionError> {
        let mut entries = self.entries.lock().await;
        entries.remove(token);
        Ok(())
    }
}

/// Upper bound on any session lifetime (ten years)
pub const MAX_TTL_SECONDS: u64 = 10 * 365 * 24 * 60 * 60;

/// Session lifetimes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Lifetime of an ordinary browser session, in seconds
    pub session_ttl_seconds: u64,
    /// Lifetime of a "remember me" session, in seconds
    pub remember_ttl_seconds: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_ttl_seconds: 12 * 60 * 60,
            remember_ttl_seconds: 30 * 24 * 60 * 60,
        }
    }
}

/// Session manager for creating, resolving and destroying sessions
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    config: SessionConfig,
}

impl SessionManager {
    /// Create a new session manager
    pub fn new(store: Arc<dyn SessionStore>, config: SessionConfig) -> Self {
        Self { store, config }
    }

    /// Seconds a session lives for, depending on the remember flag
    pub fn ttl_seconds(&self, remember: bool) -> u64 {
        if remember {
            self.config.remember_ttl_seconds
        } else {
            self.config.session_ttl_seconds
        }
    }

    /// Create a new session for a user under a freshly generated token
    pub async fn create_session(
        &self,
        user_id: i64,
        remember: bool,
    ) -> Result<(SessionToken, SessionRecord), SessionError> {
        info!("Creating session for user: {}", user_id);

        let ttl = self.ttl_seconds(remember);
        let now = Utc::now();
        let record = SessionRecord {
            user_id,
            remember,
            created_at: now,
            expires_at: now + Duration::seconds(ttl.min(MAX_TTL_SECONDS) as i64),
        };

        let token = SessionToken::generate();
        self.store.save(&token, &record, ttl).await?;

        Ok((token, record))
    }

    /// Look up a live session; expired records are dropped and reported absent
    pub async fn get_session(
        &self,
        token: &SessionToken,
    ) -> Result<Option<SessionRecord>, SessionError> {
        match self.store.load(token).await? {
            Some(record) if record.is_expired(Utc::now()) => {
                debug!("Session for user {} has expired", record.user_id);
                self.store.remove(token).await?;
                Ok(None)
            }
            other => Ok(other),
        }
    }

    /// Delete a session
    pub async fn delete_session(&self, token: &SessionToken) -> Result<(), SessionError> {
        self.store.remove(token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager(config: SessionConfig) -> SessionManager {
        SessionManager::new(Arc::new(MemorySessionStore::new()), config)
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        let sessions = manager(SessionConfig::default());
        let (token, record) = sessions.create_session(7, false).await.unwrap();

        let loaded = sessions.get_session(&token).await.unwrap();
        assert_eq!(loaded, Some(record));

        sessions.delete_session(&token).await.unwrap();
        assert_eq!(sessions.get_session(&token).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_remember_extends_lifetime() {
        let sessions = manager(SessionConfig::default());
        let (_, short) = sessions.create_session(1, false).await.unwrap();
        let (_, long) = sessions.create_session(1, true).await.unwrap();

        assert!(long.remember);
        assert!(long.expires_at > short.expires_at);
        assert_eq!(sessions.ttl_seconds(true), 30 * 24 * 60 * 60);
    }

    #[tokio::test]
    async fn test_expired_session_is_absent() {
        let sessions = manager(SessionConfig {
            session_ttl_seconds: 0,
            remember_ttl_seconds: 0,
        });
        let (token, _) = sessions.create_session(3, false).await.unwrap();
        assert_eq!(sessions.get_session(&token).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_tokens_are_unique() {
        let sessions = manager(SessionConfig::default());
        let (first, _) = sessions.create_session(1, false).await.unwrap();
        let (second, _) = sessions.create_session(1, false).await.unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_unknown_token_is_absent() {
        let sessions = manager(SessionConfig::default());
        let token = SessionToken::from("nope".to_string());
        assert_eq!(sessions.get_session(&token).await.unwrap(), None);
    }
}
