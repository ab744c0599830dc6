use crate::schema::ValidationFailure;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ErkError {
    #[error("plan not found: {0}")]
    NotFound(String),

    #[error("{provider} error: {message}")]
    Provider { provider: String, message: String },

    #[error(transparent)]
    Validation(#[from] ValidationFailure),

    #[error("no schema registered for block kind '{0}'")]
    UnknownBlockKind(String),

    #[error("invalid block kind '{0}': must be lowercase alphanumeric with hyphens")]
    InvalidBlockKind(String),

    #[error("malformed metadata block: {0}")]
    MalformedBlock(String),

    #[error("invalid plan state '{0}': expected open or closed")]
    InvalidState(String),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl ErkError {
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        ErkError::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ErkError>;
