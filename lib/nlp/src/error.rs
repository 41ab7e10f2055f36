use thiserror::Error;

pub type Result<T> = std::result::Result<T, NlpError>;

#[derive(Error, Debug)]
pub enum NlpError {
    #[error("Storage error: {0}")]
    Storage(#[from] samos_storage::StorageError),

    #[error("Invalid lexicon: {0}")]
    Lexicon(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
