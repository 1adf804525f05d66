use thiserror::Error;

use crate::types::Stage;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid quota: {0:?}")]
    InvalidQuota(String),

    #[error("Missing process field `{field}` for stage {stage}")]
    MissingProcessField { stage: Stage, field: &'static str },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Rewrite error: {0}")]
    Rewrite(String),

    #[error("Compose error: {0}")]
    Compose(String),

    #[error("Malformed cover content: {key} has non-numeric value {value:?}")]
    MalformedCoverContent { key: &'static str, value: String },

    #[error("Image generation error: {0:#}")]
    ImageGeneration(#[source] anyhow::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("External error: {0}")]
    External(#[from] anyhow::Error),
}

impl Error {
    /// Stable tag for the error variant, used in API responses.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidQuota(_) => "InvalidQuota",
            Error::MissingProcessField { .. } => "MissingProcessField",
            Error::InvalidRequest(_) => "InvalidRequest",
            Error::Fetch(_) => "FetchError",
            Error::Rewrite(_) => "RewriteError",
            Error::Compose(_) => "ComposeError",
            Error::MalformedCoverContent { .. } => "MalformedCoverContent",
            Error::ImageGeneration(_) => "ImageGenerationError",
            Error::Storage(_) => "StorageError",
            Error::Config(_) => "ConfigError",
            Error::Io(_) => "IoError",
            Error::Serialization(_) => "SerializationError",
            Error::Http(_) => "HttpError",
            Error::External(_) => "ExternalError",
        }
    }

    /// True when the failure came from a collaborator rather than the caller's input.
    pub fn is_external(&self) -> bool {
        matches!(
            self,
            Error::Fetch(_)
                | Error::Rewrite(_)
                | Error::Compose(_)
                | Error::ImageGeneration(_)
                | Error::Storage(_)
                | Error::Http(_)
                | Error::External(_)
        )
    }

    pub fn image_generation(message: impl std::fmt::Display) -> Self {
        Error::ImageGeneration(anyhow::anyhow!("{}", message))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_message() {
        let err = Error::MissingProcessField { stage: Stage::Fetch, field: "lookbackDays" };
        assert_eq!(err.to_string(), "Missing process field `lookbackDays` for stage fetch");
        assert_eq!(err.kind(), "MissingProcessField");
        assert!(!err.is_external());
    }

    #[test]
    fn test_invalid_request_is_caller_input() {
        let err = Error::InvalidRequest("user id must not be empty".to_string());
        assert_eq!(err.kind(), "InvalidRequest");
        assert!(!err.is_external());
    }

    #[test]
    fn test_image_generation_wraps_cause() {
        let cause = Error::Http(reqwest::Client::new().get("not a url").build().unwrap_err());
        let err = Error::ImageGeneration(anyhow::Error::new(cause).context("request failed"));
        assert!(err.is_external());
        assert!(err.to_string().starts_with("Image generation error: request failed"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
