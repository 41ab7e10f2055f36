use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, StorageError>;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Input not found: {0}")]
    MissingInput(PathBuf),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Feature error: {0}")]
    Feature(#[from] samos_core::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<atomicwrites::Error<std::io::Error>> for StorageError {
    fn from(e: atomicwrites::Error<std::io::Error>) -> Self {
        match e {
            atomicwrites::Error::Internal(e) | atomicwrites::Error::User(e) => StorageError::Io(e),
        }
    }
}
