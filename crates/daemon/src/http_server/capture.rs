//! Request/response capture for diagnostics.
//!
//! Wraps the whole router: buffers the request body, logs it together with
//! the request headers, runs the inner service, then buffers and logs the
//! response status and body before passing both on unchanged. Only active
//! when `debug` logging is enabled for this module.
//!
//! Must sit inside the `DefaultBodyLimit` layer: buffering here uses the
//! same limit and the same 413 rejection as the handlers.

use axum::body::{to_bytes, Body};
use axum::extract::{FromRequest, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use http::header::CONTENT_LENGTH;
use http::StatusCode;
use tracing::Level;

use super::api::ApiError;
use super::MAX_BODY_SIZE_BYTES;

pub async fn capture(request: Request, next: Next) -> Response {
    if !tracing::enabled!(Level::DEBUG) {
        return next.run(request).await;
    }

    let (parts, body) = request.into_parts();
    tracing::debug!("Request: {} {}", parts.method, parts.uri.path());
    for (name, value) in parts.headers.iter() {
        tracing::debug!("  {}: {:?}", name, value);
    }

    let request = if declared_length(&parts).is_some_and(|len| len > MAX_BODY_SIZE_BYTES) {
        tracing::debug!("Request Body: <over {} bytes, not captured>", MAX_BODY_SIZE_BYTES);
        Request::from_parts(parts, body)
    } else {
        let body = match Bytes::from_request(Request::from_parts(parts.clone(), body), &()).await {
            Ok(body) => body,
            Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                return ApiError::PayloadTooLarge.into_response();
            }
            Err(rejection) => {
                tracing::debug!("Error reading request body: {}", rejection.body_text());
                return ApiError::InvalidBody(rejection.body_text()).into_response();
            }
        };
        if !body.is_empty() {
            tracing::debug!("Request Body: {}", String::from_utf8_lossy(&body));
        }
        Request::from_parts(parts, Body::from(body))
    };

    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body = match to_bytes(body, usize::MAX).await {
        Ok(body) => body,
        Err(e) => {
            tracing::error!("Error reading response body: {}", e);
            return Response::from_parts(parts, Body::empty());
        }
    };
    tracing::debug!("Response Status: {}", parts.status.as_u16());
    tracing::debug!("Response Body: {}", String::from_utf8_lossy(&body));

    Response::from_parts(parts, Body::from(body))
}

fn declared_length(parts: &http::request::Parts) -> Option<usize> {
    parts
        .headers
        .get(CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}
