//! Errors surfaced by the daword binary.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Document(#[from] daword::Error),

    #[error(transparent)]
    Proxy(#[from] daword_proxy::ProxyError),

    #[error("Cannot access {path}: {source}")]
    File {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to start runtime: {0}")]
    Runtime(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CliError>;
