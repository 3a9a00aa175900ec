//! Server-rendered HTML pages
//!
//! Every value interpolated into markup goes through [`escape`].

use std::fmt::Write;

use crate::{
    flash::Flash,
    models::Game,
    validation::FieldErrors,
};

/// Escape text for use in element content and quoted attributes
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Per-request page chrome: who is logged in and any pending flash
#[derive(Debug, Clone, Copy, Default)]
pub struct Chrome<'a> {
    pub username: Option<&'a str>,
    pub flash: Option<Flash>,
}

fn layout(chrome: Chrome<'_>, title: &str, body: &str) -> String {
    let nav = match chrome.username {
        Some(username) => format!(
            r#"<a href="/catalog">Catalog</a> <a href="/catalog/new">Add game</a> <a href="/contact">Contact</a> <span>{}</span> <form method="post" action="/auth/logout" class="inline"><button type="submit">Log out</button></form>"#,
            escape(username)
        ),
        None => r#"<a href="/contact">Contact</a> <a href="/auth/login">Log in</a> <a href="/auth/register">Register</a>"#.to_string(),
    };

    let flash = chrome
        .flash
        .map(|flash| {
            format!(
                r#"<div class="flash flash-{}">{}</div>"#,
                flash.level().as_str(),
                escape(flash.message())
            )
        })
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title} | Game Catalog</title>
</head>
<body>
<header><a href="/">Game Catalog</a> <nav>{nav}</nav></header>
{flash}
<main>
<h1>{title}</h1>
{body}
</main>
</body>
</html>
"#,
        title = escape(title),
    )
}

fn field_errors(errors: &FieldErrors, field: &str) -> String {
    let mut out = String::new();
    for message in errors.get(field).unwrap_or_default() {
        let _ = write!(out, r#"<p class="error">{}</p>"#, escape(message));
    }
    out
}

fn form_errors(errors: &FieldErrors) -> String {
    // Messages not tied to an input of the form, such as `_schema`
    let mut out = String::new();
    if let Some(messages) = errors.get("_schema") {
        for message in messages {
            let _ = write!(out, r#"<p class="error">{}</p>"#, escape(message));
        }
    }
    out
}

fn input(
    label: &str,
    kind: &str,
    name: &str,
    value: &str,
    errors: &FieldErrors,
) -> String {
    format!(
        r#"<label>{label} <input type="{kind}" name="{name}" value="{value}"></label>{errors}"#,
        label = escape(label),
        value = escape(value),
        errors = field_errors(errors, name),
    )
}

pub fn landing(chrome: Chrome<'_>) -> String {
    let body = match chrome.username {
        Some(_) => r#"<p>Browse and manage the board game catalog.</p><p><a href="/catalog">Go to the catalog</a></p>"#,
        None => r#"<p>Browse and manage the board game catalog.</p><p><a href="/auth/login">Log in</a> or <a href="/auth/register">create an account</a> to get started.</p>"#,
    };
    layout(chrome, "Welcome", body)
}

/// Outcome of a lookup by id on the listing page
#[derive(Debug, Clone)]
pub enum SearchResult {
    Found(Game),
    Missing(i64),
    Invalid(String),
}

fn game_row(game: &Game) -> String {
    format!(
        r#"<tr><td>{id}</td><td>{name}</td><td>{description}</td><td>{price}</td><td><a href="/catalog/{id}/edit">Edit</a> <form method="post" action="/catalog/{id}/delete" class="inline"><button type="submit">Delete</button></form></td></tr>"#,
        id = game.id,
        name = escape(&game.name),
        description = escape(&game.description),
        price = game.price,
    )
}

fn game_table(games: &[Game]) -> String {
    if games.is_empty() {
        return "<p>No games in the catalog yet.</p>".to_string();
    }
    let rows: String = games.iter().map(game_row).collect();
    format!(
        "<table><thead><tr><th>ID</th><th>Name</th><th>Description</th><th>Price</th><th></th></tr></thead><tbody>{rows}</tbody></table>"
    )
}

pub fn game_list(chrome: Chrome<'_>, games: &[Game], search: Option<&SearchResult>) -> String {
    let mut body = String::from(
        r#"<form method="post" action="/catalog/search"><label>Find by ID <input type="text" name="id"></label> <button type="submit">Search</button></form>"#,
    );

    match search {
        Some(SearchResult::Found(game)) => {
            let _ = write!(
                body,
                r#"<section class="search-result"><h2>Search result</h2>{}</section>"#,
                game_table(std::slice::from_ref(game))
            );
        }
        Some(SearchResult::Missing(id)) => {
            let _ = write!(body, r#"<p class="notice">No game found with ID {id}.</p>"#);
        }
        Some(SearchResult::Invalid(message)) => {
            let _ = write!(body, r#"<p class="error">{}</p>"#, escape(message));
        }
        None => {}
    }

    body.push_str(&game_table(games));
    body.push_str(r#"<p><a href="/catalog/new">Add a game</a></p>"#);
    layout(chrome, "Catalog", &body)
}

/// Values shown in the game form
#[derive(Debug, Clone, Default)]
pub struct GameFormValues {
    pub name: String,
    pub description: String,
    pub price: String,
}

impl From<&Game> for GameFormValues {
    fn from(game: &Game) -> Self {
        Self {
            name: game.name.clone(),
            description: game.description.clone(),
            price: game.price.to_string(),
        }
    }
}

/// Create form when `id` is `None`, edit form otherwise
pub fn game_form(
    chrome: Chrome<'_>,
    id: Option<i64>,
    values: &GameFormValues,
    errors: &FieldErrors,
) -> String {
    let (title, action) = match id {
        Some(id) => ("Edit game", format!("/catalog/{id}")),
        None => ("New game", "/catalog".to_string()),
    };

    let body = format!(
        r#"<form method="post" action="{action}">{schema}{name}{description}{price}<button type="submit">Save</button></form><p><a href="/catalog">Back to the catalog</a></p>"#,
        schema = form_errors(errors),
        name = input("Name", "text", "name", &values.name, errors),
        description = input("Description", "text", "description", &values.description, errors),
        price = input("Price", "text", "price", &values.price, errors),
    );
    layout(chrome, title, &body)
}

pub fn login_form(chrome: Chrome<'_>, email: &str, error: Option<&str>) -> String {
    let error = error
        .map(|message| format!(r#"<p class="error">{}</p>"#, escape(message)))
        .unwrap_or_default();
    let none = FieldErrors::new();

    let body = format!(
        r#"{error}<form method="post" action="/auth/login">{email}{password}<label><input type="checkbox" name="remember" value="on"> Remember me</label><button type="submit">Log in</button></form><p>No account? <a href="/auth/register">Register</a></p>"#,
        email = input("Email", "text", "email", email, &none),
        password = input("Password", "password", "password", "", &none),
    );
    layout(chrome, "Log in", &body)
}

/// Values shown in the registration form; passwords are never echoed
#[derive(Debug, Clone, Default)]
pub struct RegisterFormValues {
    pub username: String,
    pub email: String,
}

pub fn register_form(
    chrome: Chrome<'_>,
    values: &RegisterFormValues,
    errors: &FieldErrors,
) -> String {
    let body = format!(
        r#"<form method="post" action="/auth/register">{username}{email}{password}{confirm}<button type="submit">Register</button></form><p>Already registered? <a href="/auth/login">Log in</a></p>"#,
        username = input("Username", "text", "username", &values.username, errors),
        email = input("Email", "email", "email", &values.email, errors),
        password = input("Password", "password", "password", "", errors),
        confirm = input("Confirm password", "password", "confirm_password", "", errors),
    );
    layout(chrome, "Register", &body)
}

/// Values shown in the contact form
#[derive(Debug, Clone, Default)]
pub struct ContactFormValues {
    pub name: String,
    pub email: String,
    pub message: String,
}

pub fn contact_form(
    chrome: Chrome<'_>,
    values: &ContactFormValues,
    errors: &FieldErrors,
) -> String {
    let body = format!(
        r#"<form method="post" action="/contact">{name}{email}<label>Message <textarea name="message">{message}</textarea></label>{message_errors}<button type="submit">Send</button></form>"#,
        name = input("Name", "text", "name", &values.name, errors),
        email = input("Email", "email", "email", &values.email, errors),
        message = escape(&values.message),
        message_errors = field_errors(errors, "message"),
    );
    layout(chrome, "Contact", &body)
}

pub fn error_page(chrome: Chrome<'_>, title: &str, message: &str) -> String {
    let body = format!(
        r#"<p>{}</p><p><a href="/">Back to the start page</a></p>"#,
        escape(message)
    );
    layout(chrome, title, &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Price;

    fn game(name: &str) -> Game {
        Game {
            id: 3,
            name: name.to_string(),
            description: "Classic".to_string(),
            price: Price::new(19.99).unwrap(),
        }
    }

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#x27;Jerry&#x27;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_game_names_are_escaped() {
        let page = game_list(Chrome::default(), &[game("<script>alert(1)</script>")], None);
        assert!(!page.contains("<script>"));
        assert!(page.contains("&lt;script&gt;"));
        assert!(page.contains("19.99"));
    }

    #[test]
    fn test_missing_search_result_message() {
        let page = game_list(Chrome::default(), &[], Some(&SearchResult::Missing(42)));
        assert!(page.contains("No game found with ID 42."));
    }

    #[test]
    fn test_form_keeps_submitted_values_and_errors() {
        let values = GameFormValues {
            name: "Chess".to_string(),
            description: "Classic".to_string(),
            price: "abc".to_string(),
        };
        let errors = FieldErrors::single("price", "Not a valid number.");
        let page = game_form(Chrome::default(), None, &values, &errors);

        assert!(page.contains(r#"value="Chess""#));
        assert!(page.contains(r#"value="abc""#));
        assert!(page.contains("Not a valid number."));
        assert!(page.contains(r#"action="/catalog""#));
    }

    #[test]
    fn test_chrome_shows_user_and_flash() {
        let chrome = Chrome {
            username: Some("alice"),
            flash: Some(Flash::LoggedIn),
        };
        let page = landing(chrome);
        assert!(page.contains("alice"));
        assert!(page.contains("Logged in successfully. Welcome!"));
        assert!(page.contains("/auth/logout"));
    }
}
