use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;
use store::StoreError;

use super::response::KvResponse;

/// Every way a gateway request can fail. Rendered as a `{success: false,
/// error}` envelope with the matching status code.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid request body: {0}")]
    InvalidBody(String),
    #[error("{0}")]
    MissingField(&'static str),
    #[error("request body too large")]
    PayloadTooLarge,
    #[error("key not found: {0}")]
    KeyNotFound(String),
    #[error("not found")]
    RouteNotFound,
    #[error("method not allowed")]
    MethodNotAllowed,
    #[error("service unavailable: {0}")]
    Unavailable(String),
    #[error("{0}")]
    Store(#[from] StoreError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidBody(_) | ApiError::MissingField(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::KeyNotFound(_) | ApiError::RouteNotFound => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("API ERROR: {}", self);
        } else {
            tracing::debug!(status = status.as_u16(), "API request rejected: {}", self);
        }

        (status, Json(KvResponse::failure(self.to_string()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::InvalidBody("eof".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::MissingField("key is required").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::KeyNotFound("foo".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(ApiError::RouteNotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::MethodNotAllowed.status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            ApiError::Store(StoreError::BucketNotFound("b".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_store_message_is_surfaced() {
        let err = ApiError::from(StoreError::InvalidBucketName("bad name".into()));
        assert_eq!(err.to_string(), "invalid bucket name: \"bad name\"");
    }
}
