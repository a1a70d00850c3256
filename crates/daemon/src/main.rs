//! kvd - workspace-isolated durable key-value service
//!
//! Serves a JSON-over-HTTP key-value API. Each caller gets a private bucket
//! derived from the workspace id in its request headers; all buckets live
//! in one SQLite database under the storage directory.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use kv_daemon::{spawn_service, ServiceConfig};

/// kvd - workspace-isolated durable key-value service
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(short = 'H', long, env = "KV_HOST", default_value = "0.0.0.0")]
    host: IpAddr,

    /// Port to listen on for HTTP requests
    #[arg(short, long, env = "PORT", default_value = "8080")]
    port: u16,

    /// Directory for storing data
    #[arg(short, long, env = "KV_STORAGE", default_value = "./data")]
    storage: PathBuf,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, env = "KV_LOG_LEVEL", default_value = "info")]
    log_level: tracing::Level,

    /// Directory for log files (logs to stdout only if not set)
    #[arg(long, env = "KV_LOG_DIR")]
    log_dir: Option<PathBuf>,
}

impl Args {
    fn into_config(self) -> Result<ServiceConfig> {
        let storage_dir = if self.storage.is_absolute() {
            self.storage
        } else {
            std::env::current_dir()
                .context("unable to resolve the working directory")?
                .join(self.storage)
        };

        Ok(ServiceConfig {
            listen_addr: SocketAddr::new(self.host, self.port),
            storage_dir,
            log_level: self.log_level,
            log_dir: self.log_dir,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Args::parse().into_config()?;
    spawn_service(&config).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Args::try_parse_from(["kvd"]).unwrap().into_config().unwrap();
        assert_eq!(config.listen_addr.to_string(), "0.0.0.0:8080");
        assert!(config.storage_dir.is_absolute());
        assert!(config.storage_dir.ends_with("data"));
        assert_eq!(config.log_level, tracing::Level::INFO);
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn test_flags() {
        let args = Args::try_parse_from([
            "kvd",
            "-H",
            "127.0.0.1",
            "-p",
            "9000",
            "-s",
            "/var/lib/kv",
            "--log-level",
            "debug",
        ])
        .unwrap();
        let config = args.into_config().unwrap();

        assert_eq!(config.listen_addr.to_string(), "127.0.0.1:9000");
        assert_eq!(config.storage_dir, PathBuf::from("/var/lib/kv"));
        assert_eq!(config.log_level, tracing::Level::DEBUG);
    }

    #[test]
    fn test_rejects_bad_port() {
        assert!(Args::try_parse_from(["kvd", "--port", "not-a-port"]).is_err());
    }
}
