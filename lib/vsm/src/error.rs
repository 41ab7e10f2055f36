use thiserror::Error;

pub type Result<T> = std::result::Result<T, VsmError>;

#[derive(Error, Debug)]
pub enum VsmError {
    #[error("Invalid parameters: {0}")]
    Parameters(String),

    #[error("Core error: {0}")]
    Core(#[from] samos_core::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] samos_storage::StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
