pub mod utils;

use std::time::Duration;

use futures::future::join_all;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::http_server::{self, HttpServerError};
use crate::{ServiceConfig, ServiceState};

const FINAL_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

const LOG_FILE_PREFIX: &str = "kvd.log";

/// Process exit codes, one per way the service can fail.
mod exit_code {
    pub const STATE_SETUP: i32 = 3;
    pub const SHUTDOWN: i32 = 4;
    pub const BIND: i32 = 5;
    pub const SERVE: i32 = 6;
}

/// `RUST_LOG` wins over the configured level when set.
fn env_filter(level: tracing::Level) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy()
}

/// Install the global subscriber: compact stdout, plus a log file when a log
/// directory is configured. The returned guards flush the writers on drop.
fn init_logging(service_config: &ServiceConfig) -> Vec<WorkerGuard> {
    let mut guards = Vec::new();

    let (stdout_writer, stdout_guard) = tracing_appender::non_blocking(std::io::stdout());
    guards.push(stdout_guard);

    let stdout_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(stdout_writer)
        .with_filter(env_filter(service_config.log_level));

    let file_layer = service_config.log_dir.as_deref().map(|log_dir| {
        if let Err(e) = std::fs::create_dir_all(log_dir) {
            eprintln!("Warning: Failed to create log directory {:?}: {}", log_dir, e);
        }

        let appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
        let (file_writer, file_guard) = tracing_appender::non_blocking(appender);
        guards.push(file_guard);

        tracing_subscriber::fmt::layer()
            .with_writer(file_writer)
            .with_ansi(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(env_filter(service_config.log_level))
    });

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer)
        .init();

    utils::register_panic_logger();
    utils::report_build_info();

    guards
}

/// Open the storage backend, exiting if it cannot be brought up.
async fn create_state(service_config: &ServiceConfig) -> ServiceState {
    ServiceState::from_config(service_config)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("error creating server state: {}", e);
            std::process::exit(exit_code::STATE_SETUP);
        })
}

/// Flush and close the backend, logging rather than failing.
async fn close_state(state: &ServiceState) -> bool {
    match state.close().await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!("error closing database: {}", e);
            false
        }
    }
}

/// Wait for the shutdown signal, then for every task to finish. Returns
/// whether any task reported a failure.
async fn shutdown_and_join(
    graceful_waiter: JoinHandle<()>,
    handles: Vec<JoinHandle<Result<(), HttpServerError>>>,
) -> bool {
    let _ = graceful_waiter.await;

    let Ok(results) = timeout(FINAL_SHUTDOWN_TIMEOUT, join_all(handles)).await else {
        tracing::error!(
            "Failed to shut down within {} seconds",
            FINAL_SHUTDOWN_TIMEOUT.as_secs()
        );
        std::process::exit(exit_code::SHUTDOWN);
    };

    results.into_iter().any(|result| match result {
        Ok(Ok(())) => false,
        Ok(Err(_)) => true,
        Err(e) => {
            tracing::error!("service task panicked: {}", e);
            true
        }
    })
}

/// Run the key-value service until SIGINT/SIGTERM or a fatal gateway error.
///
/// Startup order: storage backend opened and answering, then the listener
/// bound, then traffic served. Shutdown runs the other way round: the
/// gateway stops accepting and drains in-flight requests before the
/// backend is flushed and closed.
pub async fn spawn_service(service_config: &ServiceConfig) {
    let _guards = init_logging(service_config);
    let (graceful_waiter, shutdown_tx, shutdown_rx) = utils::graceful_shutdown_blocker();
    let state = create_state(service_config).await;

    let http_config = http_server::Config::new(service_config.listen_addr);
    let listener = match http_server::bind(&http_config).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("{}", e);
            close_state(&state).await;
            std::process::exit(exit_code::BIND);
        }
    };

    let api_state = state.clone();
    let api_handle = tokio::spawn(async move {
        let result = http_server::serve(listener, http_config, api_state, shutdown_rx).await;
        if let Err(e) = &result {
            tracing::error!("API server error: {}", e);
            let _ = shutdown_tx.send(());
        }
        result
    });

    tracing::info!(
        "Running: API:{} storage:{}",
        service_config.listen_addr,
        service_config.storage_dir.display()
    );

    let failed = shutdown_and_join(graceful_waiter, vec![api_handle]).await;
    let closed = close_state(&state).await;

    if let Some(code) = exit_status(failed, closed) {
        std::process::exit(code);
    }
    tracing::info!("shutdown complete");
}

/// Exit code after an orderly shutdown; `None` means a clean exit.
fn exit_status(task_failed: bool, closed: bool) -> Option<i32> {
    if task_failed {
        Some(exit_code::SERVE)
    } else if !closed {
        Some(exit_code::SHUTDOWN)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finished_waiter() -> JoinHandle<()> {
        tokio::spawn(async {})
    }

    #[tokio::test]
    async fn test_join_reports_clean_shutdown() {
        let handle = tokio::spawn(async { Ok(()) });
        assert!(!shutdown_and_join(finished_waiter(), vec![handle]).await);
    }

    #[tokio::test]
    async fn test_join_reports_failed_gateway() {
        let ok = tokio::spawn(async { Ok(()) });
        let failed = tokio::spawn(async {
            Err(HttpServerError::ServingFailed(std::io::Error::other(
                "listener died",
            )))
        });
        assert!(shutdown_and_join(finished_waiter(), vec![ok, failed]).await);
    }

    #[test]
    fn test_env_filter_defaults_to_configured_level() {
        if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
            return;
        }

        let filter = env_filter(tracing::Level::WARN);
        assert_eq!(
            <EnvFilter as Layer<tracing_subscriber::Registry>>::max_level_hint(&filter),
            Some(tracing::level_filters::LevelFilter::WARN)
        );
    }

    #[test]
    fn test_gateway_failure_exits_non_zero() {
        assert_eq!(exit_status(true, true), Some(exit_code::SERVE));
        assert_eq!(exit_status(true, false), Some(exit_code::SERVE));
        assert_eq!(exit_status(false, false), Some(exit_code::SHUTDOWN));
        assert_eq!(exit_status(false, true), None);
    }
}
