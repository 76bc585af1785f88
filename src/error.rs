use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sqlparser::tokenizer::TokenizerError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Unsupported SQL language: {0}")]
    UnsupportedLanguage(String),

    #[error("Extraction failed: {0}")]
    Extraction(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] confique::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T = ()> = std::result::Result<T, Error>;

impl From<TokenizerError> for Error {
    fn from(value: TokenizerError) -> Self {
        Error::Extraction(value.to_string())
    }
}

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Error::InvalidRequest(_) | Error::UnsupportedLanguage(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Error::InvalidRequest(_) => "invalid request parameters",
            Error::UnsupportedLanguage(_) => "unsupported SQL language",
            _ => "internal server error",
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": self.label(),
            "message": self.to_string(),
        });
        (self.status(), Json(body)).into_response()
    }
}
