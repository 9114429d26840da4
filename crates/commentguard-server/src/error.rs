//! HTTP error mapping

use async_trait::async_trait;
use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use commentguard_core::Error;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::error;

/// Message returned to visitors whose submission ended in rejection
pub const REJECTED_SUBMISSION_MESSAGE: &str = "Comment rejected by moderation";

/// Errors returned by HTTP handlers
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidRequest(String),

    #[error("missing or invalid owner token")]
    Unauthorized,

    #[error("{}", REJECTED_SUBMISSION_MESSAGE)]
    Rejected,

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    fn status_and_type(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "not_found_error"),
            Self::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request_error"),
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "authentication_error"),
            Self::Rejected => (StatusCode::BAD_REQUEST, "moderation_rejected"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        match err {
            Error::NotFound { .. } => Self::NotFound(err.to_string()),
            Error::Invalid(msg) => Self::InvalidRequest(msg),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidRequest(rejection.body_text())
    }
}

/// JSON body extractor that rejects malformed bodies with the
/// [`AppError`] envelope
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind) = self.status_and_type();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }

        let body = json!({
            "error": {
                "message": self.to_string(),
                "type": kind,
            }
        });

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_errors_map_to_status() {
        let not_found: AppError = Error::not_found("website", "abc").into();
        assert_eq!(not_found.status_and_type().0, StatusCode::NOT_FOUND);

        let invalid: AppError = Error::invalid("empty").into();
        assert_eq!(invalid.status_and_type().0, StatusCode::BAD_REQUEST);
        assert_eq!(invalid.to_string(), "empty");

        let storage: AppError = Error::storage("disk").into();
        assert_eq!(
            storage.status_and_type().0,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_bad_json_body_is_invalid_request() {
        #[derive(Debug, serde::Deserialize)]
        struct Payload {
            #[allow(dead_code)]
            content: String,
        }

        let request = Request::builder()
            .header("content-type", "application/json")
            .body(axum::body::Body::from(r#"{"url": "/"}"#))
            .unwrap();
        let err = ApiJson::<Payload>::from_request(request, &()).await.unwrap_err();

        assert!(matches!(err, AppError::InvalidRequest(_)));
        assert!(err.to_string().contains("content"));
        assert_eq!(err.status_and_type().1, "invalid_request_error");
    }

    #[test]
    fn test_rejected_message() {
        assert_eq!(AppError::Rejected.to_string(), "Comment rejected by moderation");
        assert_eq!(AppError::Rejected.status_and_type().0, StatusCode::BAD_REQUEST);
    }
}
