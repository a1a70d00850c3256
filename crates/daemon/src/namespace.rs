//! Workspace isolation: every request is served out of a bucket derived from
//! the caller's workspace id.
//!
//! The caller identity travels in the `X-GPTScript-Env` header as
//! comma-separated `KEY=value` pairs, e.g.
//!
//! ```text
//! X-GPTScript-Env: GPTSCRIPT_WORKSPACE_ID=ws-1, OTHER=thing
//! ```
//!
//! The workspace id is hashed into a fixed-length lowercase hex string that
//! becomes the bucket name, so bucket names never reveal the id itself.
//! Requests without a workspace id all share the `default` bucket.

use std::convert::Infallible;
use std::fmt;

use axum::async_trait;
use axum::extract::FromRequestParts;
use http::request::Parts;
use http::HeaderMap;
use sha2::{Digest, Sha256};

/// Header carrying the caller's environment pairs.
pub const ENV_HEADER: &str = "x-gptscript-env";

/// Key of the pair holding the workspace id.
pub const WORKSPACE_ID_KEY: &str = "GPTSCRIPT_WORKSPACE_ID";

/// Namespace used when no workspace id is supplied.
pub const DEFAULT_NAMESPACE: &str = "default";

/// Look up `key` in the env pairs of the request headers.
///
/// Pairs that do not split into exactly one key and one value are skipped.
/// The first matching pair wins.
pub fn env_value<'a>(headers: &'a HeaderMap, key: &str) -> Option<&'a str> {
    headers
        .get_all(ENV_HEADER)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .find_map(|pair| {
            let mut parts = pair.split('=');
            match (parts.next(), parts.next(), parts.next()) {
                (Some(k), Some(v), None) if k.trim() == key => Some(v.trim()),
                _ => None,
            }
        })
}

/// The workspace id of the caller, if one was supplied.
pub fn workspace_token(headers: &HeaderMap) -> Option<&str> {
    env_value(headers, WORKSPACE_ID_KEY).filter(|token| !token.is_empty())
}

/// A resolved namespace; doubles as the bucket name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Namespace(String);

impl Namespace {
    /// Resolve the namespace for a request.
    pub fn resolve(headers: &HeaderMap) -> Self {
        let namespace = Self::from_token(workspace_token(headers));
        if namespace.is_default() {
            tracing::debug!("no {WORKSPACE_ID_KEY} supplied, using default namespace");
        }
        namespace
    }

    /// Derive the namespace for a workspace id.
    pub fn from_token(token: Option<&str>) -> Self {
        match token {
            Some(token) => {
                let digest = Sha256::digest(token.as_bytes());
                Self(hex::encode(digest))
            }
            None => Self(DEFAULT_NAMESPACE.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_default(&self) -> bool {
        self.0 == DEFAULT_NAMESPACE
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Namespace
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Namespace::resolve(&parts.headers))
    }
}
