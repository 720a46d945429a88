//! shelter server entry point.
//!
//! Boots the worker (install, then activate) and serves it over MCP on the
//! stdio transport. Logging goes to stderr to avoid interfering with the
//! JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use shelter_client::{Dispatch, FetchClient, FetchConfig, Host, Transport, Worker, WorkerEvent};
use shelter_core::{AppConfig, CacheDb};
use tracing_subscriber::EnvFilter;

mod handler;
mod host;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    tracing::info!(
        app = %config.app_name,
        version = %config.cache_version,
        db = %config.db_path.display(),
        "Starting shelter server on stdio transport"
    );

    let db = CacheDb::open(&config.db_path).await?;
    let transport: Arc<dyn Transport> = Arc::new(FetchClient::new(FetchConfig::from(&config))?);
    let host: Arc<dyn Host> = Arc::new(host::LoggingHost);
    let worker = Worker::new(config, db, transport.clone(), host)?;

    boot(&worker).await?;

    let handler = handler::ShelterServer::new(worker.clone(), transport);
    let server = serve_server(handler, stdio()).await?;
    server.waiting().await?;

    tracing::info!(pending = worker.background().pending(), "draining background work");
    worker.background().settle().await;

    Ok(())
}

/// Run install then activate, settling each phase before the next.
async fn boot(worker: &Worker) -> Result<()> {
    for event in [WorkerEvent::Install, WorkerEvent::Activate] {
        if let Dispatch::WaitUntil(barrier) = worker.dispatch(event) {
            barrier.settle().await?;
        }
    }
    tracing::info!(phase = %worker.lifecycle().phase(), "worker ready");
    Ok(())
}
