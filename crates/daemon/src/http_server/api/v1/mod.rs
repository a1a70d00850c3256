use axum::routing::post;
use axum::Router;

use crate::http_server::handlers::method_not_allowed_handler;
use crate::ServiceState;

pub mod delete;
pub mod get;
pub mod list;
pub mod output_filter;
pub mod put;

// Re-export for convenience
pub use delete::DeleteRequest;
pub use get::GetRequest;
pub use output_filter::OutputFilterRequest;
pub use put::PutRequest;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .route(
            "/get",
            post(get::handler).fallback(method_not_allowed_handler),
        )
        .route(
            "/put",
            post(put::handler).fallback(method_not_allowed_handler),
        )
        .route(
            "/delete",
            post(delete::handler).fallback(method_not_allowed_handler),
        )
        .route(
            "/list",
            post(list::handler).fallback(method_not_allowed_handler),
        )
        .route(
            "/output-filter",
            post(output_filter::handler).fallback(method_not_allowed_handler),
        )
        .with_state(state)
}
