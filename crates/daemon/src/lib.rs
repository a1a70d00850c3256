// Service modules (daemon functionality)
pub mod http_server;
pub mod namespace;
pub mod output_key;
pub mod process;
pub mod service_config;
pub mod service_state;

// Re-exports for consumers
pub use namespace::Namespace;
pub use process::spawn_service;
pub use service_config::Config as ServiceConfig;
pub use service_state::{State as ServiceState, StateSetupError};
