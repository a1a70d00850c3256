use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use crate::http_server::api::{ApiError, KvResponse};
use crate::{Namespace, ServiceState};

/// List every key in the caller's namespace. The request body is ignored.
#[tracing::instrument(skip_all, fields(namespace = %namespace))]
pub async fn handler(
    State(state): State<ServiceState>,
    namespace: Namespace,
) -> Result<impl IntoResponse, ApiError> {
    let bucket = state.buckets().ensure(namespace.as_str()).await?;
    let keys = bucket.keys().await?;

    tracing::debug!(count = keys.len(), "LIST");

    Ok(Json(KvResponse::with_data(keys)))
}
