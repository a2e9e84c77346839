//! Error handling for the Shopfront HTTP layer

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

type Source = Box<dyn std::error::Error + Send + Sync>;

/// Failure envelope shared by every endpoint: `{"success": false, "message": ...}`
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
}

/// Application error types that map to HTTP responses
#[derive(Error, Debug)]
pub enum AppError {
    #[error("not found: {message}")]
    NotFound { message: String },

    #[error("bad request: {message}")]
    BadRequest { message: String },

    #[error("method not allowed: {message}")]
    MethodNotAllowed { message: String },

    #[error("timeout: {message}")]
    Timeout { message: String },

    /// The client only ever sees `message`; `source` is logged.
    #[error("{message}: {source}")]
    Internal {
        message: String,
        #[source]
        source: Source,
    },
}

impl AppError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn method_not_allowed(message: impl Into<String>) -> Self {
        Self::MethodNotAllowed {
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>, source: impl Into<Source>) -> Self {
        Self::Internal {
            message: message.into(),
            source: source.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Timeout { .. } => StatusCode::REQUEST_TIMEOUT,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = match self {
            AppError::NotFound { message }
            | AppError::BadRequest { message }
            | AppError::MethodNotAllowed { message }
            | AppError::Timeout { message } => {
                tracing::debug!(status_code = %status.as_u16(), %message, "request rejected");
                message
            }
            AppError::Internal { message, source } => {
                let error_id = Uuid::new_v4();
                tracing::error!(
                    error_id = %error_id,
                    status_code = %status.as_u16(),
                    error = %source,
                    "{message}"
                );
                message
            }
        };

        let body = ErrorBody {
            success: false,
            message,
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_not_found_envelope() {
        let response = AppError::not_found("Product not found").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(response).await,
            json!({"success": false, "message": "Product not found"})
        );
    }

    #[tokio::test]
    async fn test_internal_error_hides_source() {
        let source = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let error = AppError::internal("Error fetching products", source);
        assert!(error.to_string().contains("disk on fire"));

        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({"success": false, "message": "Error fetching products"})
        );
    }

    #[tokio::test]
    async fn test_timeout_envelope() {
        let response = AppError::timeout("Request timed out").into_response();
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(
            body_json(response).await,
            json!({"success": false, "message": "Request timed out"})
        );
    }

    #[test]
    fn test_bad_request_mapping() {
        let error = AppError::bad_request("price must be a non-negative number");
        assert_eq!(error.status(), StatusCode::BAD_REQUEST);
    }
}
