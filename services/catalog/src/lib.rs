//! Game catalog service
//!
//! A CRUD catalog of games behind a session login, served both as a JSON API
//! under `/api` and as server-rendered HTML pages.

pub mod auth;
pub mod catalog;
pub mod config;
pub mod error;
pub mod flash;
pub mod middleware;
pub mod models;
pub mod password;
pub mod repositories;
pub mod routes;
pub mod session;
pub mod state;
pub mod validation;
pub mod views;

pub use state::AppState;
