use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use std::time::Duration;
use tokio::time::timeout;

use super::data_source::*;
use crate::http_server::api::ApiError;

const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(10);

/// `GET /api/ready`: 200 with an empty body once the backend answers.
#[tracing::instrument]
pub async fn handler(data_src: StateDataSource) -> Response {
    match timeout(HEALTH_CHECK_TIMEOUT, data_src.is_ready()).await {
        Ok(Ok(())) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
        )
            .into_response(),
        Ok(Err(e)) => ApiError::Unavailable(e.to_string()).into_response(),
        Err(_) => ApiError::Unavailable("health check timed out".to_string()).into_response(),
    }
}
