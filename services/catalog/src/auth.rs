//! Registration, login and session resolution

use std::sync::Arc;
use tracing::{info, warn};

use crate::{
    error::{AppError, AppResult},
    models::{NewUser, SessionRecord, SessionToken, User},
    password::{CredentialManager, run_blocking},
    repositories::UserStore,
    session::SessionManager,
    validation::{FieldErrors, validate_email, validate_password, validate_username},
};

/// Authenticated user information attached to gated requests
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub token: SessionToken,
}

/// A freshly established session
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: User,
    pub token: SessionToken,
    pub record: SessionRecord,
}

/// Auth gate: moves a client between anonymous and authenticated
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    credentials: CredentialManager,
    sessions: SessionManager,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        credentials: CredentialManager,
        sessions: SessionManager,
    ) -> Self {
        Self {
            users,
            credentials,
            sessions,
        }
    }

    /// Create an account
    ///
    /// The email is stored trimmed and lower-cased. Duplicate usernames or
    /// emails are reported as [`AppError::Conflict`] with field messages.
    pub async fn register(&self, username: &str, email: &str, password: &str) -> AppResult<User> {
        let username = username.trim();
        let email = email.trim().to_lowercase();

        let mut errors = FieldErrors::new();
        if let Err(e) = validate_username(username) {
            errors.add("username", e);
        }
        if let Err(e) = validate_email(&email) {
            errors.add("email", e);
        }
        if let Err(e) = validate_password(password) {
            errors.add("password", e);
        }
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        let mut conflicts = FieldErrors::new();
        if let Some(existing) = self.users.find_by_username_or_email(username).await? {
            if existing.username == username {
                conflicts.add("username", "Username already taken");
            }
        }
        if let Some(existing) = self.users.find_by_username_or_email(&email).await? {
            if existing.email == email {
                conflicts.add("email", "Email already registered");
            }
        }
        if !conflicts.is_empty() {
            return Err(AppError::Conflict(conflicts));
        }

        let credentials = self.credentials.clone();
        let username = username.to_string();
        let password = password.to_string();
        let new_user =
            run_blocking(move || NewUser::new(&credentials, username, email, &password)).await??;
        // A concurrent registration can still lose the race at the unique index
        let user = self.users.insert(&new_user).await?;

        info!("Registered user {} ({})", user.username, user.id);
        Ok(user)
    }

    /// Check credentials and open a session
    ///
    /// Unknown accounts and wrong passwords both end in
    /// [`AppError::InvalidCredentials`], after the same hashing work.
    pub async fn login(
        &self,
        identifier: &str,
        password: &str,
        remember: bool,
    ) -> AppResult<LoginOutcome> {
        let identifier = identifier.trim();
        let user = self.users.find_by_username_or_email(identifier).await?;

        let credentials = self.credentials.clone();
        let password = password.to_string();
        let (user, verified) = run_blocking(move || {
            let verified = match &user {
                Some(user) => user.verify_password(&credentials, &password),
                None => credentials.verify_unknown_account(&password),
            };
            (user, verified)
        })
        .await?;

        let user = match user {
            Some(user) if verified => user,
            Some(user) => {
                warn!("Failed login for user {}", user.id);
                return Err(AppError::InvalidCredentials);
            }
            None => {
                warn!("Failed login for unknown account");
                return Err(AppError::InvalidCredentials);
            }
        };

        let (token, record) = self.sessions.create_session(user.id, remember).await?;
        info!("User {} logged in", user.id);

        Ok(LoginOutcome {
            user,
            token,
            record,
        })
    }

    /// End a session; unknown tokens are ignored
    pub async fn logout(&self, token: &SessionToken) -> AppResult<()> {
        self.sessions.delete_session(token).await?;
        Ok(())
    }

    /// Resolve a session token to its user
    pub async fn authenticate(&self, token: &SessionToken) -> AppResult<AuthUser> {
        let record = self
            .sessions
            .get_session(token)
            .await?
            .ok_or(AppError::Unauthorized)?;

        let Some(user) = self.users.find_by_id(record.user_id).await? else {
            warn!("Session refers to missing user {}", record.user_id);
            self.sessions.delete_session(token).await?;
            return Err(AppError::Unauthorized);
        };

        Ok(AuthUser {
            id: user.id,
            username: user.username,
            email: user.email,
            token: token.clone(),
        })
    }
}
