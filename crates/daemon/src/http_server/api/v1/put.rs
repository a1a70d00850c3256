use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::http_server::api::{ApiError, JsonBody, KvResponse};
use crate::{Namespace, ServiceState};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PutRequest {
    /// Key to write
    #[serde(default)]
    pub key: String,
    /// Value to store; empty values are rejected
    #[serde(default)]
    pub value: String,
}

#[tracing::instrument(skip_all, fields(namespace = %namespace))]
pub async fn handler(
    State(state): State<ServiceState>,
    namespace: Namespace,
    JsonBody(req): JsonBody<PutRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.key.is_empty() || req.value.is_empty() {
        return Err(ApiError::MissingField("key and value are required"));
    }

    let bucket = state.buckets().ensure(namespace.as_str()).await?;
    let revision = bucket.put(&req.key, &req.value).await?;

    tracing::debug!(key = %req.key, revision, bytes = req.value.len(), "PUT");

    Ok(Json(KvResponse::ok()))
}
