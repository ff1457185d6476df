use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("CSV parse error: {0}")]
    Parse(String),

    #[error("Catalog is not configured: {0}")]
    Configuration(String),

    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(String),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Errors that abort a whole batch instead of a single row.
    pub fn is_fatal(&self) -> bool {
        matches!(self, AppError::Configuration(_))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Parse(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::Configuration(_) => (StatusCode::SERVICE_UNAVAILABLE, self.to_string()),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
            AppError::ExternalApi(msg) => (StatusCode::BAD_GATEWAY, msg),
            AppError::CatalogUnavailable(_) | AppError::HttpClient(_) => {
                (StatusCode::BAD_GATEWAY, self.to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_configuration_errors_are_fatal() {
        assert!(AppError::Configuration("no key".to_string()).is_fatal());
        assert!(!AppError::CatalogUnavailable("retries exhausted".to_string()).is_fatal());
        assert!(!AppError::Parse("empty".to_string()).is_fatal());
    }

    #[test]
    fn test_status_codes() {
        let cases = vec![
            (AppError::Parse("x".to_string()), StatusCode::BAD_REQUEST),
            (AppError::Configuration("x".to_string()), StatusCode::SERVICE_UNAVAILABLE),
            (AppError::CatalogUnavailable("x".to_string()), StatusCode::BAD_GATEWAY),
            (AppError::NotFound("x".to_string()), StatusCode::NOT_FOUND),
            (AppError::Internal("x".to_string()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }

    #[tokio::test]
    async fn test_reqwest_errors_map_to_bad_gateway() {
        let error: AppError = reqwest::get("not a url").await.unwrap_err().into();

        assert!(matches!(error, AppError::HttpClient(_)));
        assert!(!error.is_fatal());
        assert_eq!(error.into_response().status(), StatusCode::BAD_GATEWAY);
    }
}
