use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::http_server::api::{ApiError, JsonBody, KvResponse};
use crate::{Namespace, ServiceState};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetRequest {
    /// Key to read
    #[serde(default)]
    pub key: String,
}

#[tracing::instrument(skip_all, fields(namespace = %namespace))]
pub async fn handler(
    State(state): State<ServiceState>,
    namespace: Namespace,
    JsonBody(req): JsonBody<GetRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.key.is_empty() {
        return Err(ApiError::MissingField("key is required"));
    }

    let bucket = state.buckets().ensure(namespace.as_str()).await?;
    let entry = bucket
        .get(&req.key)
        .await?
        .ok_or_else(|| ApiError::KeyNotFound(req.key.clone()))?;

    tracing::debug!(key = %req.key, revision = entry.revision, "GET");

    let value = String::from_utf8_lossy(&entry.value).into_owned();
    Ok(Json(KvResponse::with_data(value)))
}
