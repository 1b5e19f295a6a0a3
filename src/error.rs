use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use async_openai::error::OpenAIError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdvisorError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Gemini API daily request limit ({limit}) reached. Please try again tomorrow.")]
    QuotaExceeded { limit: u32 },

    #[error("Malformed model response: {0}")]
    MalformedModelResponse(String),

    #[error("{0}")]
    Validation(String),

    #[error("Completion error: {0}")]
    Completion(#[from] OpenAIError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for AdvisorError {
    fn from(value: reqwest::Error) -> Self {
        AdvisorError::Transport(value.to_string())
    }
}

impl ResponseError for AdvisorError {
    fn status_code(&self) -> StatusCode {
        match self {
            AdvisorError::Validation(_) => StatusCode::BAD_REQUEST,
            AdvisorError::QuotaExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            AdvisorError::Transport(_) | AdvisorError::Completion(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}
