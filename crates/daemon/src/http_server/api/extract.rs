use axum::async_trait;
use axum::extract::{FromRequest, Request};
use bytes::Bytes;
use http::StatusCode;
use serde::de::DeserializeOwned;

use super::error::ApiError;

/// JSON request body.
///
/// Unlike `axum::Json` this does not insist on a `Content-Type` header, and
/// every failure (unreadable body, bad JSON, wrong shape, unknown field) is
/// reported through the [`ApiError`] envelope.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state).await.map_err(|rejection| {
            if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                ApiError::PayloadTooLarge
            } else {
                ApiError::InvalidBody(rejection.body_text())
            }
        })?;

        serde_json::from_slice(&body)
            .map(JsonBody)
            .map_err(|e| ApiError::InvalidBody(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    #[serde(deny_unknown_fields)]
    struct Strict {
        key: String,
    }

    async fn extract(body: &'static str) -> Result<JsonBody<Strict>, ApiError> {
        let req = http::Request::builder()
            .method("POST")
            .uri("/")
            .body(Body::from(body))
            .unwrap();
        JsonBody::<Strict>::from_request(req, &()).await
    }

    #[tokio::test]
    async fn test_accepts_body_without_content_type() {
        let JsonBody(strict) = extract(r#"{"key":"foo"}"#).await.unwrap();
        assert_eq!(strict.key, "foo");
    }

    #[tokio::test]
    async fn test_rejects_malformed_json() {
        let err = extract("{not json").await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidBody(_)));
    }

    #[tokio::test]
    async fn test_rejects_empty_body() {
        let err = extract("").await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidBody(_)));
    }

    #[tokio::test]
    async fn test_rejects_unknown_field() {
        let err = extract(r#"{"key":"foo","extra":1}"#).await.unwrap_err();
        match err {
            ApiError::InvalidBody(msg) => assert!(msg.contains("unknown field `extra`")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
