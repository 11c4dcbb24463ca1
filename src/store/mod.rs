pub mod memory;
pub mod password;
pub mod token;
pub mod user;
pub mod workout;

pub use memory::MemoryStore;
pub use password::Password;
pub use token::{Token, TokenStore, SCOPE_AUTH};
pub use user::{NewUser, UpdateUser, User, UserStore};
pub use workout::{Workout, WorkoutEntry, WorkoutStore};

use thiserror::Error;

/// Errors produced by the store layer. Validation and not-found failures are
/// client-visible; everything else is logged and surfaced as a generic 500.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("credential error: {0}")]
    Credential(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    pub fn validation(msg: impl Into<String>) -> Self {
        StoreError::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        StoreError::NotFound(msg.into())
    }
}
