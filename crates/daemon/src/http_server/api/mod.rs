use axum::routing::get;
use axum::Router;
use http::header::{ACCEPT, CONTENT_TYPE, ORIGIN};
use http::Method;
use tower_http::cors::{Any, CorsLayer};

mod error;
mod extract;
mod response;
pub mod v1;

pub use error::ApiError;
pub use extract::JsonBody;
pub use response::{KvResponse, OutputFilterResponse};

use super::handlers::method_not_allowed_handler;
use super::health;
use crate::ServiceState;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    let cors_layer = CorsLayer::new()
        .allow_methods(vec![Method::GET, Method::POST])
        .allow_headers(vec![ACCEPT, CONTENT_TYPE, ORIGIN])
        .allow_origin(Any)
        .allow_credentials(false);

    Router::new()
        .route(
            "/ready",
            get(health::readiness::handler).fallback(method_not_allowed_handler),
        )
        .nest("/v1", v1::router(state.clone()))
        .with_state(state)
        .layer(cors_layer)
}
