//! Error types shared by the core modules.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid hex color '{0}': {1}")]
    InvalidColor(String, &'static str),
    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Import error: {0}")]
    Import(String),
    #[error("Scene '{0}' is incomplete: it contains no meshes")]
    IncompleteScene(String),
}
