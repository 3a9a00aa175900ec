//! One-shot messages shown on the page after a redirect
//!
//! Only a short code travels in the cookie; the text lives here, so nothing
//! the client sends is ever echoed into a page.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

pub const FLASH_COOKIE: &str = "catalog_flash";

/// Severity used to style a flash message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashLevel {
    Success,
    Info,
}

impl FlashLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Info => "info",
        }
    }
}

/// Messages that survive exactly one redirect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flash {
    LoggedIn,
    LoggedOut,
    Registered,
    GameCreated,
    GameUpdated,
    GameDeleted,
    MessageSent,
}

impl Flash {
    const ALL: [Flash; 7] = [
        Flash::LoggedIn,
        Flash::LoggedOut,
        Flash::Registered,
        Flash::GameCreated,
        Flash::GameUpdated,
        Flash::GameDeleted,
        Flash::MessageSent,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Self::LoggedIn => "logged-in",
            Self::LoggedOut => "logged-out",
            Self::Registered => "registered",
            Self::GameCreated => "game-created",
            Self::GameUpdated => "game-updated",
            Self::GameDeleted => "game-deleted",
            Self::MessageSent => "message-sent",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|flash| flash.code() == code)
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::LoggedIn => "Logged in successfully. Welcome!",
            Self::LoggedOut => "You have been logged out.",
            Self::Registered => "Registration complete. You can now log in.",
            Self::GameCreated => "Game created.",
            Self::GameUpdated => "Game updated.",
            Self::GameDeleted => "Game deleted.",
            Self::MessageSent => "Thanks, your message has been sent.",
        }
    }

    pub fn level(self) -> FlashLevel {
        match self {
            Self::LoggedOut => FlashLevel::Info,
            _ => FlashLevel::Success,
        }
    }
}

/// Queue a flash for the next page
pub fn push(jar: CookieJar, flash: Flash) -> CookieJar {
    jar.add(
        Cookie::build((FLASH_COOKIE, flash.code()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax),
    )
}

/// Take the pending flash, if any, clearing it from the client
pub fn take(jar: CookieJar) -> (CookieJar, Option<Flash>) {
    let flash = jar
        .get(FLASH_COOKIE)
        .and_then(|cookie| Flash::from_code(cookie.value()));

    if jar.get(FLASH_COOKIE).is_none() {
        return (jar, flash);
    }
    (jar.remove(Cookie::build(FLASH_COOKIE).path("/")), flash)
}
