//! Login, registration and logout pages

use axum::{
    Extension, Form, Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use crate::{
    AppState,
    auth::AuthUser,
    error::{AppError, INVALID_CREDENTIALS_MESSAGE, WebError, WebResult},
    flash::{self, Flash},
    middleware::{
        LOGIN_PATH, clear_session_cookie, current_user, require_web_session, session_cookie,
        session_token,
    },
    validation::FieldErrors,
    views::{self, Chrome, RegisterFormValues},
};

pub fn router(state: AppState) -> Router<AppState> {
    let protected_routes = Router::new()
        .route("/auth/logout", get(logout).post(logout))
        .route_layer(middleware::from_fn_with_state(state, require_web_session));

    Router::new()
        .route(LOGIN_PATH, get(login_form).post(login))
        .route("/auth/register", get(register_form).post(register))
        .merge(protected_routes)
}

/// Submitted login form; the checkbox is absent when unticked
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub remember: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

pub async fn login_form(State(state): State<AppState>, jar: CookieJar) -> Response {
    if current_user(&state, &jar).await.is_some() {
        return Redirect::to("/catalog").into_response();
    }

    let (jar, flash) = flash::take(jar);
    let chrome = Chrome {
        username: None,
        flash,
    };
    (jar, Html(views::login_form(chrome, "", None))).into_response()
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> WebResult<Response> {
    let remember = form.remember.is_some();

    match state.auth.login(&form.email, &form.password, remember).await {
        Ok(outcome) => {
            if let Some(previous) = session_token(&jar) {
                state.auth.logout(&previous).await?;
            }
            let cookie = session_cookie(&outcome.token, &outcome.record, state.secure_cookies);
            let jar = flash::push(jar.add(cookie), Flash::LoggedIn);
            Ok((jar, Redirect::to("/catalog")).into_response())
        }
        Err(AppError::InvalidCredentials) => {
            let page = views::login_form(
                Chrome::default(),
                &form.email,
                Some(INVALID_CREDENTIALS_MESSAGE),
            );
            Ok((StatusCode::UNAUTHORIZED, Html(page)).into_response())
        }
        Err(e) => Err(WebError(e)),
    }
}

pub async fn register_form() -> impl IntoResponse {
    Html(views::register_form(
        Chrome::default(),
        &RegisterFormValues::default(),
        &FieldErrors::new(),
    ))
}

pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<RegisterForm>,
) -> WebResult<Response> {
    let values = RegisterFormValues {
        username: form.username.clone(),
        email: form.email.clone(),
    };

    let (status, errors) = if form.password != form.confirm_password {
        (
            StatusCode::BAD_REQUEST,
            FieldErrors::single("confirm_password", "Passwords must match"),
        )
    } else {
        match state
            .auth
            .register(&form.username, &form.email, &form.password)
            .await
        {
            Ok(_) => {
                let jar = flash::push(jar, Flash::Registered);
                return Ok((jar, Redirect::to(LOGIN_PATH)).into_response());
            }
            Err(AppError::Validation(errors)) => (StatusCode::BAD_REQUEST, errors),
            Err(AppError::Conflict(errors)) => (StatusCode::CONFLICT, errors),
            Err(e) => return Err(WebError(e)),
        }
    };

    let page = views::register_form(Chrome::default(), &values, &errors);
    Ok((status, Html(page)).into_response())
}

pub async fn logout(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    jar: CookieJar,
) -> WebResult<impl IntoResponse> {
    state.auth.logout(&user.token).await?;

    let jar = flash::push(clear_session_cookie(jar), Flash::LoggedOut);
    Ok((jar, Redirect::to("/")))
}
