use axum::http::{Method, Uri};
use axum::response::{IntoResponse, Response};

use crate::http_server::api::ApiError;

pub async fn not_found_handler(uri: Uri) -> Response {
    tracing::debug!(path = uri.path(), "no route");
    ApiError::RouteNotFound.into_response()
}

pub async fn method_not_allowed_handler(method: Method, uri: Uri) -> Response {
    tracing::debug!(%method, path = uri.path(), "method not allowed");
    ApiError::MethodNotAllowed.into_response()
}
