//! JSON API

use axum::{
    Extension, Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use serde_json::Value;

use crate::{
    AppState,
    auth::AuthUser,
    error::{ApiError, ApiResult},
    middleware::{clear_session_cookie, require_api_session, session_cookie, session_token},
    models::UserResponse,
    validation::{FieldErrors, game_patch_from_json, new_game_from_json},
};

/// Routes mounted under `/api`
pub fn router(state: AppState) -> Router<AppState> {
    let protected_routes = Router::new()
        .route("/games", get(list_games).post(create_game))
        .route(
            "/games/:id",
            get(get_game).put(update_game).delete(delete_game),
        )
        .route("/auth/logout", post(logout))
        .route_layer(middleware::from_fn_with_state(state, require_api_session));

    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .merge(protected_routes)
}

fn invalid_body(rejection: JsonRejection) -> FieldErrors {
    FieldErrors::single("_schema", rejection.body_text())
}

/// Game id from the path; a non-integer id is a field error, not a text reply
fn game_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, FieldErrors> {
    path.map(|Path(id)| id)
        .map_err(|_| FieldErrors::single("id", "Not a valid integer."))
}

/// List every game
pub async fn list_games(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let games = state.catalog.list_games().await?;
    Ok(Json(games))
}

/// Get a game by id
pub async fn get_game(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<impl IntoResponse> {
    let id = game_id(path)?;
    let game = state.catalog.get_game(id).await?;
    Ok(Json(game))
}

/// Create a game; responds 201 with the stored record
pub async fn create_game(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(body) = body.map_err(invalid_body)?;
    let game = new_game_from_json(&body)?;

    let game = state.catalog.create_game(game).await?;
    Ok((StatusCode::CREATED, Json(game)))
}

/// Partially update a game
pub async fn update_game(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let id = game_id(path)?;
    let patch = match body
        .map_err(invalid_body)
        .and_then(|Json(body)| game_patch_from_json(&body))
    {
        Ok(patch) => patch,
        Err(errors) => return Err(state.catalog.reject_update(id, errors).await.into()),
    };

    let game = state.catalog.update_game(id, patch).await?;
    Ok(Json(game))
}

/// Delete a game; responds 204
pub async fn delete_game(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<impl IntoResponse> {
    let id = game_id(path)?;
    state.catalog.delete_game(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Request for account registration
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Request for user login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Email address or username
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub remember: bool,
}

/// Register an account; responds 201 without the password hash
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(payload) = payload.map_err(invalid_body)?;

    let user = state
        .auth
        .register(&payload.username, &payload.email, &payload.password)
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

/// Log in and receive a session cookie
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(payload) = payload.map_err(invalid_body)?;

    let outcome = state
        .auth
        .login(&payload.email, &payload.password, payload.remember)
        .await?;

    // A new login replaces whatever session the client held
    if let Some(previous) = session_token(&jar) {
        state.auth.logout(&previous).await?;
    }

    let cookie = session_cookie(&outcome.token, &outcome.record, state.secure_cookies);
    Ok((jar.add(cookie), Json(UserResponse::from(&outcome.user))))
}

/// End the current session
pub async fn logout(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    state.auth.logout(&user.token).await?;
    Ok((clear_session_cookie(jar), StatusCode::NO_CONTENT))
}
