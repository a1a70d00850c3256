//! Unique keys for captured tool output.

use http::HeaderMap;
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Header naming the tool whose output is being captured.
pub const TOOL_NAME_HEADER: &str = "x-gptscript-tool-name";

/// Tool name used when the header is missing or empty.
pub const UNKNOWN_TOOL: &str = "unknown";

/// Name of the tool that produced the output, from the request headers.
pub fn tool_name(headers: &HeaderMap) -> &str {
    headers
        .get(TOOL_NAME_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|name| !name.is_empty())
        .unwrap_or(UNKNOWN_TOOL)
}

/// Generate a fresh key of the form `output-<tool>-<sha256 hex>`.
///
/// The digest is taken over a random v4 uuid, so two calls never produce the
/// same key even for the same tool in the same namespace.
pub fn generate(tool: &str) -> String {
    let digest = Sha256::digest(Uuid::new_v4().to_string().as_bytes());
    format!("output-{}-{}", tool, hex::encode(digest))
}
