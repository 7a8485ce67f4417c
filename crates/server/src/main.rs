//! good-first-issues MCP server entry point.
//!
//! Boots the MCP server on stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use anyhow::{Context, Result};
use gfi_client::{GithubClient, GithubConfig, IssueFinder};
use gfi_core::{AppConfig, MemoryStore, ResultCache, SessionStore, SqliteStore};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod handler;
mod tools;

/// Pick the session store: SQLite when a path is configured, memory otherwise.
async fn open_store(config: &AppConfig) -> Result<Box<dyn SessionStore>> {
    let Some(path) = &config.db_path else {
        tracing::info!("no db_path configured, caching in memory");
        return Ok(Box::new(MemoryStore::new()));
    };

    let session_id = config.session_id_or_new();
    let store = SqliteStore::open(path, session_id.as_str())
        .await
        .with_context(|| format!("opening session store at {}", path.display()))?;
    store.purge_other_sessions().await?;
    tracing::info!(session_id = %session_id, path = %path.display(), "using SQLite session store");

    Ok(Box::new(store))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;

    tracing::info!("Starting good-first-issues server on stdio transport");

    let store = open_store(&config).await?;
    let cache = ResultCache::with_ttl(store, config.cache_ttl()).await;
    let client = GithubClient::new(GithubConfig::from(&config))?;

    let handler = handler::GfiServer::new(IssueFinder::new(client, cache), config);
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}
