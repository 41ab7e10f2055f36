use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid feature '{line}': {reason}")]
    InvalidFeature { line: String, reason: String },

    #[error("Malformed model: {0}")]
    MalformedModel(String),

    #[error("Unknown {option} value: {value}")]
    UnknownOption { option: &'static str, value: String },

    #[error("Matrix index out of bounds: ({row}, {column})")]
    OutOfBounds { row: usize, column: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid_feature(line: &str, reason: impl Into<String>) -> Self {
        Error::InvalidFeature {
            line: line.to_string(),
            reason: reason.into(),
        }
    }
}
