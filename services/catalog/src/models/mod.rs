//! Catalog service models

pub mod game;
pub mod session;
pub mod user;

// Re-export for convenience
pub use game::{Game, GamePatch, NewGame, Price, PriceError};
pub use session::{SessionRecord, SessionToken};
pub use user::{NewUser, User, UserResponse};
