use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message used when an error carries no text of its own.
pub const GENERIC_FAILURE: &str = "Generation failed";

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Config(String),
    #[error("{0}")]
    Upstream(String),
    #[error("{0}")]
    Request(String),
    #[error("{0}")]
    Response(String),
    #[error("{0}")]
    Serialization(String),
}

impl GenerationError {
    pub fn http_status(&self) -> u16 {
        match self {
            GenerationError::Validation(_) => 400,
            _ => 500,
        }
    }

    /// Message shown to the caller, never empty.
    pub fn public_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            GENERIC_FAILURE.to_string()
        } else {
            message
        }
    }
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        GenerationError::Request(err.to_string())
    }
}

impl From<serde_json::Error> for GenerationError {
    fn from(err: serde_json::Error) -> Self {
        GenerationError::Serialization(err.to_string())
    }
}

/// JSON body returned for every failed request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub error: String,
}

impl From<&GenerationError> for ErrorBody {
    fn from(err: &GenerationError) -> Self {
        ErrorBody {
            error: err.public_message(),
        }
    }
}

#[cfg(feature = "server")]
impl actix_web::ResponseError for GenerationError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        actix_web::http::StatusCode::from_u16(self.http_status())
            .unwrap_or(actix_web::http::StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> actix_web::HttpResponse {
        actix_web::HttpResponse::build(actix_web::ResponseError::status_code(self))
            .json(ErrorBody::from(self))
    }
}

pub type Result<T> = std::result::Result<T, GenerationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(GenerationError::Validation("x".into()).http_status(), 400);
        assert_eq!(GenerationError::Config("x".into()).http_status(), 500);
        assert_eq!(GenerationError::Upstream("x".into()).http_status(), 500);
    }

    #[test]
    fn test_empty_message_falls_back() {
        let err = GenerationError::Upstream(String::new());
        assert_eq!(ErrorBody::from(&err).error, GENERIC_FAILURE);

        let err = GenerationError::Config("REPLICATE_API_TOKEN not configured".into());
        assert_eq!(
            ErrorBody::from(&err).error,
            "REPLICATE_API_TOKEN not configured"
        );
    }
}
