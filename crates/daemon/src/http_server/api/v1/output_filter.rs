use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use http::HeaderMap;
use serde::{Deserialize, Serialize};

use crate::http_server::api::{ApiError, JsonBody, OutputFilterResponse};
use crate::{output_key, Namespace, ServiceState};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputFilterRequest {
    /// Tool output to capture
    pub output: String,
    /// Whether the output came from a chat tool
    #[serde(default)]
    pub chat: bool,
    /// Whether the output continues an earlier call
    #[serde(default)]
    pub continuation: bool,
}

/// Store tool output under a freshly generated key and hand the key back, so
/// callers can pass a reference around instead of the output itself.
#[tracing::instrument(skip_all, fields(namespace = %namespace))]
pub async fn handler(
    State(state): State<ServiceState>,
    namespace: Namespace,
    headers: HeaderMap,
    JsonBody(req): JsonBody<OutputFilterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let tool = output_key::tool_name(&headers);
    let key = output_key::generate(tool);
    tracing::info!(
        chat = req.chat,
        continuation = req.continuation,
        "Generated output key: {}",
        key
    );

    let bucket = state.buckets().ensure(namespace.as_str()).await?;
    bucket.put(&key, &req.output).await?;

    Ok(Json(OutputFilterResponse::with_key(key)))
}
