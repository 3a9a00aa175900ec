//! Application state shared across handlers

use std::sync::Arc;

use crate::{
    auth::AuthService,
    catalog::CatalogService,
    config::AppConfig,
    password::{CredentialError, CredentialManager},
    repositories::{GameStore, MemoryStore, UserStore},
    session::{MemorySessionStore, SessionManager, SessionStore},
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub catalog: CatalogService,
    pub auth: AuthService,
    /// Set the `Secure` attribute on cookies
    pub secure_cookies: bool,
}

impl AppState {
    pub fn new(
        games: Arc<dyn GameStore>,
        users: Arc<dyn UserStore>,
        sessions: Arc<dyn SessionStore>,
        credentials: CredentialManager,
        config: &AppConfig,
    ) -> Self {
        let sessions = SessionManager::new(sessions, config.session_config());
        Self {
            catalog: CatalogService::new(games),
            auth: AuthService::new(users, credentials, sessions),
            secure_cookies: config.secure_cookies,
        }
    }

    /// State backed entirely by process memory
    pub fn in_memory(config: &AppConfig) -> Result<Self, CredentialError> {
        let store = Arc::new(MemoryStore::new());
        let credentials = CredentialManager::new(config.hashing_cost())?;
        Ok(Self::new(
            store.clone(),
            store,
            Arc::new(MemorySessionStore::new()),
            credentials,
            config,
        ))
    }
}
