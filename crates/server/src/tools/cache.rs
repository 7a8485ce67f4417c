//! cache_stats and cache_clear tool implementations.

use gfi_client::{IssueFinder, IssueProvider};
use gfi_core::{Error, SessionStore};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Output from the cache_stats tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheStatsOutput {
    /// Number of live cache entries.
    pub size: usize,
    /// Entry fingerprints, sorted.
    pub keys: Vec<String>,
}

/// Output from the cache_clear tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheClearOutput {
    /// Number of entries dropped.
    pub cleared: usize,
}

/// Implementation of the cache_stats tool.
pub async fn stats_impl<P, S>(finder: &IssueFinder<P, S>) -> Result<CallToolResult, McpError>
where
    P: IssueProvider + 'static,
    S: SessionStore + 'static,
{
    let stats = finder.cache_stats().await;
    let output = CacheStatsOutput { size: stats.size, keys: stats.keys };
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}

/// Implementation of the cache_clear tool.
pub async fn clear_impl<P, S>(finder: &IssueFinder<P, S>) -> Result<CallToolResult, McpError>
where
    P: IssueProvider + 'static,
    S: SessionStore + 'static,
{
    let cleared = finder.cache_stats().await.size;
    finder.clear_cache().await;
    tracing::info!(cleared, "result cache cleared");

    let json = serde_json::to_string_pretty(&CacheClearOutput { cleared })
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}
