use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("{operation} failed ({status}): {message}")]
    Api {
        operation: &'static str,
        status: StatusCode,
        message: String,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("No completed tasks to delete")]
    NothingToDelete,
}

impl ClientError {
    /// Whether this is the backend reporting a missing resource.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::Api { status, .. } if *status == StatusCode::NOT_FOUND)
    }
}

impl From<validator::ValidationErrors> for ClientError {
    fn from(err: validator::ValidationErrors) -> Self {
        ClientError::Validation(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
