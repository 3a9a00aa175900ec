//! Common library for the game catalog
//!
//! This crate provides the infrastructure pieces the catalog service builds
//! on: PostgreSQL connectivity, the Redis client used for server-side
//! sessions, and the shared database error type.

pub mod cache;
pub mod database;
pub mod error;
