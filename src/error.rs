use actix_web::HttpResponse;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::utils::response::Response;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized action")]
    Forbidden,

    #[error("The given data was invalid")]
    Validation(Vec<FieldViolation>),

    #[error("did not match data URI with image data")]
    InvalidImageFormat,

    #[error("base64 decode failed")]
    InvalidImageEncoding,

    #[error("Invalid question ID: \"{0}\"")]
    InvalidQuestion(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    pub fn to_response(&self) -> HttpResponse {
        match self {
            ApiError::Forbidden => Response::forbidden(&self.to_string()),
            ApiError::Validation(violations) => HttpResponse::BadRequest()
                .content_type("application/json")
                .json(json!({
                    "error": self.to_string(),
                    "violations": violations,
                })),
            ApiError::InvalidImageFormat
            | ApiError::InvalidImageEncoding
            | ApiError::InvalidQuestion(_) => Response::bad_request(&self.to_string()),
            ApiError::NotFound(_) => Response::not_found(&self.to_string()),
            ApiError::Database(error) => {
                log::error!("{:?}", error);
                Response::internal_server_error(&self.to_string())
            }
            ApiError::Io(error) => {
                log::error!("{:?}", error);
                Response::internal_server_error(&self.to_string())
            }
        }
    }

    pub fn violation(field: &str, message: &str) -> Self {
        ApiError::Validation(vec![FieldViolation::new(field, message)])
    }
}
