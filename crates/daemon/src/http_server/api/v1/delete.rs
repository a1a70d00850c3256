use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::http_server::api::{ApiError, JsonBody, KvResponse};
use crate::{Namespace, ServiceState};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteRequest {
    /// Key to remove
    #[serde(default)]
    pub key: String,
}

#[tracing::instrument(skip_all, fields(namespace = %namespace))]
pub async fn handler(
    State(state): State<ServiceState>,
    namespace: Namespace,
    JsonBody(req): JsonBody<DeleteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.key.is_empty() {
        return Err(ApiError::MissingField("key is required"));
    }

    let bucket = state.buckets().ensure(namespace.as_str()).await?;
    let removed = bucket.delete(&req.key).await?;

    tracing::debug!(key = %req.key, removed, "DELETE");

    Ok(Json(KvResponse::ok()))
}
