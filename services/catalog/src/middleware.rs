//! Session cookies and the authentication gate

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::{debug, warn};

use crate::{
    AppState,
    auth::AuthUser,
    error::{ApiError, AppError},
    models::{SessionRecord, SessionToken},
};

pub const SESSION_COOKIE: &str = "catalog_session";
pub const LOGIN_PATH: &str = "/auth/login";

/// Read the session token presented by the client
pub fn session_token(jar: &CookieJar) -> Option<SessionToken> {
    jar.get(SESSION_COOKIE)
        .map(|cookie| cookie.value())
        .filter(|value| !value.is_empty())
        .map(|value| SessionToken::from(value.to_string()))
}

/// Cookie carrying a new session
///
/// Remembered sessions get a `Max-Age`; others end with the browser session.
pub fn session_cookie(
    token: &SessionToken,
    record: &SessionRecord,
    secure: bool,
) -> Cookie<'static> {
    let mut builder = Cookie::build((SESSION_COOKIE, token.as_str().to_string()))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax);

    if record.remember {
        let lifetime = (record.expires_at - record.created_at).num_seconds();
        builder = builder.max_age(time::Duration::seconds(lifetime));
    }

    builder.build()
}

/// Drop the session cookie from the client
pub fn clear_session_cookie(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}

async fn resolve(state: &AppState, jar: &CookieJar) -> Result<AuthUser, AppError> {
    let token = session_token(jar).ok_or(AppError::Unauthorized)?;
    state.auth.authenticate(&token).await
}

/// The logged-in user on public pages, if any
///
/// Backend failures are logged and treated as anonymous.
pub async fn current_user(state: &AppState, jar: &CookieJar) -> Option<AuthUser> {
    match resolve(state, jar).await {
        Ok(user) => Some(user),
        Err(AppError::Unauthorized) => None,
        Err(e) => {
            warn!("Could not resolve session: {}", e);
            None
        }
    }
}

/// Gate for the JSON API: 401 when there is no live session
pub async fn require_api_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = resolve(&state, &jar).await?;

    // Add the user to request extensions for use in handlers
    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

/// Gate for the web UI: anonymous visitors are sent to the login page
pub async fn require_web_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    match resolve(&state, &jar).await {
        Ok(user) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Err(AppError::Unauthorized) => {
            debug!("Redirecting anonymous request for {} to login", req.uri().path());
            (clear_session_cookie(jar), Redirect::to(LOGIN_PATH)).into_response()
        }
        Err(e) => crate::error::WebError(e).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn record(remember: bool) -> SessionRecord {
        let now = Utc::now();
        SessionRecord {
            user_id: 1,
            remember,
            created_at: now,
            expires_at: now + Duration::days(30),
        }
    }

    #[test]
    fn test_browser_session_cookie_has_no_max_age() {
        let token = SessionToken::generate();
        let cookie = session_cookie(&token, &record(false), false);

        assert_eq!(cookie.value(), token.as_str());
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert!(cookie.max_age().is_none());
    }

    #[test]
    fn test_remembered_session_cookie_persists() {
        let token = SessionToken::generate();
        let cookie = session_cookie(&token, &record(true), true);

        assert_eq!(cookie.max_age(), Some(time::Duration::days(30)));
        assert_eq!(cookie.secure(), Some(true));
    }

    #[test]
    fn test_empty_cookie_is_no_token() {
        let jar = CookieJar::new().add(Cookie::new(SESSION_COOKIE, ""));
        assert!(session_token(&jar).is_none());
    }
}
