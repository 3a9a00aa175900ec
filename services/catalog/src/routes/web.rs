//! HTML front end: landing page, catalog pages and the contact form

use axum::{
    Extension, Form, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use tracing::info;

use crate::{
    AppState,
    auth::AuthUser,
    error::{AppError, WebError, WebResult},
    flash::{self, Flash},
    middleware::{current_user, require_web_session},
    validation::{game_patch_from_form, new_game_from_form, validate_contact},
    views::{self, Chrome, ContactFormValues, GameFormValues, SearchResult},
};

const CATALOG_PATH: &str = "/catalog";

/// Public pages plus the gated catalog pages
pub fn router(state: AppState) -> Router<AppState> {
    let protected_routes = Router::new()
        .route("/catalog", get(list_games).post(create_game))
        .route("/catalog/search", post(search_game))
        .route("/catalog/new", get(new_game_form))
        .route("/catalog/:id", post(update_game))
        .route("/catalog/:id/edit", get(edit_game_form))
        .route("/catalog/:id/delete", post(delete_game))
        .route_layer(middleware::from_fn_with_state(state, require_web_session));

    Router::new()
        .route("/", get(landing))
        .route("/contact", get(contact_form).post(send_contact))
        .merge(protected_routes)
}

/// Submitted game form; absent fields read as empty
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GameForm {
    pub name: String,
    pub description: String,
    pub price: String,
}

impl From<GameForm> for GameFormValues {
    fn from(form: GameForm) -> Self {
        Self {
            name: form.name,
            description: form.description,
            price: form.price,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchForm {
    pub id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub message: String,
}

pub async fn landing(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let user = current_user(&state, &jar).await;
    let (jar, flash) = flash::take(jar);

    let chrome = Chrome {
        username: user.as_ref().map(|user| user.username.as_str()),
        flash,
    };
    (jar, Html(views::landing(chrome)))
}

pub async fn list_games(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    jar: CookieJar,
) -> WebResult<impl IntoResponse> {
    let games = state.catalog.list_games().await?;
    let (jar, flash) = flash::take(jar);

    let chrome = Chrome {
        username: Some(user.username.as_str()),
        flash,
    };
    Ok((jar, Html(views::game_list(chrome, &games, None))))
}

/// Look up one game by id and show it above the listing
pub async fn search_game(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Form(form): Form<SearchForm>,
) -> WebResult<impl IntoResponse> {
    let (status, result) = match form.id.trim().parse::<i64>() {
        Ok(id) => match state.catalog.get_game(id).await {
            Ok(game) => (StatusCode::OK, SearchResult::Found(game)),
            Err(AppError::NotFound(id)) => (StatusCode::OK, SearchResult::Missing(id)),
            Err(e) => return Err(e.into()),
        },
        Err(_) => (
            StatusCode::BAD_REQUEST,
            SearchResult::Invalid("Enter a numeric game ID.".to_string()),
        ),
    };

    let games = state.catalog.list_games().await?;
    let chrome = Chrome {
        username: Some(user.username.as_str()),
        flash: None,
    };
    Ok((status, Html(views::game_list(chrome, &games, Some(&result)))))
}

pub async fn new_game_form(Extension(user): Extension<AuthUser>) -> impl IntoResponse {
    let chrome = Chrome {
        username: Some(user.username.as_str()),
        flash: None,
    };
    Html(views::game_form(
        chrome,
        None,
        &GameFormValues::default(),
        &Default::default(),
    ))
}

pub async fn create_game(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    jar: CookieJar,
    Form(form): Form<GameForm>,
) -> WebResult<Response> {
    let game = match new_game_from_form(&form.name, &form.description, &form.price) {
        Ok(game) => game,
        Err(errors) => {
            let chrome = Chrome {
                username: Some(user.username.as_str()),
                flash: None,
            };
            let page = views::game_form(chrome, None, &form.into(), &errors);
            return Ok((StatusCode::BAD_REQUEST, Html(page)).into_response());
        }
    };

    state.catalog.create_game(game).await?;
    Ok((flash::push(jar, Flash::GameCreated), Redirect::to(CATALOG_PATH)).into_response())
}

pub async fn edit_game_form(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> WebResult<impl IntoResponse> {
    let game = state.catalog.get_game(id).await?;

    let chrome = Chrome {
        username: Some(user.username.as_str()),
        flash: None,
    };
    Ok(Html(views::game_form(
        chrome,
        Some(id),
        &GameFormValues::from(&game),
        &Default::default(),
    )))
}

pub async fn update_game(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
    jar: CookieJar,
    Form(form): Form<GameForm>,
) -> WebResult<Response> {
    let patch = match game_patch_from_form(&form.name, &form.description, &form.price) {
        Ok(patch) => patch,
        Err(errors) => {
            let errors = match state.catalog.reject_update(id, errors).await {
                AppError::Validation(errors) => errors,
                other => return Err(WebError(other)),
            };
            let chrome = Chrome {
                username: Some(user.username.as_str()),
                flash: None,
            };
            let page = views::game_form(chrome, Some(id), &form.into(), &errors);
            return Ok((StatusCode::BAD_REQUEST, Html(page)).into_response());
        }
    };

    state.catalog.update_game(id, patch).await?;
    Ok((flash::push(jar, Flash::GameUpdated), Redirect::to(CATALOG_PATH)).into_response())
}

pub async fn delete_game(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    jar: CookieJar,
) -> WebResult<impl IntoResponse> {
    state.catalog.delete_game(id).await?;
    Ok((flash::push(jar, Flash::GameDeleted), Redirect::to(CATALOG_PATH)))
}

pub async fn contact_form(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let user = current_user(&state, &jar).await;
    let chrome = Chrome {
        username: user.as_ref().map(|user| user.username.as_str()),
        flash: None,
    };
    Html(views::contact_form(
        chrome,
        &ContactFormValues::default(),
        &Default::default(),
    ))
}

/// Accept a contact message; it is only written to the log
pub async fn send_contact(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<ContactForm>,
) -> Response {
    if let Err(errors) = validate_contact(&form.name, &form.email, &form.message) {
        let user = current_user(&state, &jar).await;
        let chrome = Chrome {
            username: user.as_ref().map(|user| user.username.as_str()),
            flash: None,
        };
        let values = ContactFormValues {
            name: form.name,
            email: form.email,
            message: form.message,
        };
        let page = views::contact_form(chrome, &values, &errors);
        return (StatusCode::BAD_REQUEST, Html(page)).into_response();
    }

    info!(
        "Contact message from {} <{}>: {}",
        form.name.trim(),
        form.email.trim(),
        form.message.trim()
    );
    (flash::push(jar, Flash::MessageSent), Redirect::to("/")).into_response()
}
