use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ExtractError>;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Input folder not found: {0}")]
    MissingInput(PathBuf),

    #[error("Model error in {path}: {source}")]
    Model {
        path: PathBuf,
        #[source]
        source: samos_core::Error,
    },

    #[error("Core error: {0}")]
    Core(#[from] samos_core::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] samos_storage::StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
