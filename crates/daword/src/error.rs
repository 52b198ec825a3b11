//! Error types for the daword crate.

use thiserror::Error;

/// Errors surfaced by task-pane operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Clause not found: {key}")]
    ClauseNotFound { key: String },

    #[error("Document host error: {0}")]
    Host(String),

    #[error("Please enter both email and password")]
    MissingCredentials,

    #[error("Dialog error: {0}")]
    Dialog(String),
}

/// Result type alias for task-pane operations.
pub type Result<T> = std::result::Result<T, Error>;
