mod api;
mod cache;
mod config;
mod corpus;
mod engine;
mod error;
mod format;
mod guidelines;
mod index;
mod model;
mod platform;
mod prompt;
mod search;
mod server;
mod session;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use rmcp::{ServiceExt, transport::stdio};
use tracing::info;
use tracing_subscriber::EnvFilter;

use assistant_common::completion::{CompletionClient, CompletionClientConfig};
use assistant_common::secrets::resolve_credential;
use cache::SearchCache;
use config::Config;
use index::IndexService;
use server::DebugAssistantServer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing to stderr (stdout is reserved for MCP JSON-RPC)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!("starting debug-assistant MCP server");

    // 1. Load config from environment and resolve the API credential
    let config = Config::from_env()?;
    info!(
        debug_cases_path = %config.debug_cases_path,
        lancedb_path = %config.lancedb_path,
        redis = config.redis_url.is_some(),
        "configuration loaded"
    );

    let api_key = resolve_credential("GROQ_API_KEY")
        .ok_or_else(|| anyhow::anyhow!("GROQ_API_KEY not set (environment or secrets file)"))?;
    let client = CompletionClient::new(CompletionClientConfig {
        base_url: config.groq_base_url.clone(),
        api_key,
        timeout: Duration::from_secs(config.groq_timeout_secs),
    })?;

    // 2. Connect to Redis (optional — graceful degradation if unavailable)
    let redis_cache = assistant_common::redis::RedisCache::new(config.redis_url.as_deref());
    if redis_cache.is_available().await {
        info!("redis connected");
    } else {
        info!("redis unavailable, running without cache");
    }
    let cache = Arc::new(SearchCache::new(redis_cache));

    // 3. Initialize embedding model
    info!("initializing embedding model (may download on first run)");
    let embedder = Arc::new(assistant_common::embedding::Embedder::new().await?);
    info!("embedding model ready");

    // 4. Connect to LanceDB
    let vectordb =
        Arc::new(assistant_common::vectordb::VectorDb::connect(&config.lancedb_path).await?);
    info!("lancedb connected");

    // 5. Load the knowledge base and make sure the index matches it
    let corpus = corpus::load_corpus(Path::new(&config.debug_cases_path))?;
    info!(
        platforms = corpus.sections.len(),
        cases = corpus.sections.iter().map(|s| s.cases.len()).sum::<usize>(),
        "knowledge base loaded"
    );

    let index_service = IndexService::new(
        config.clone(),
        Arc::clone(&embedder),
        Arc::clone(&vectordb),
        Arc::clone(&cache),
    );
    index_service.ensure(&corpus).await?;

    // 6. Build MCP server and serve on stdio
    let server = DebugAssistantServer::new(corpus, embedder, vectordb, cache, client, config);

    info!("MCP server ready, serving on stdio");
    let service = server.serve(stdio()).await.inspect_err(|e| {
        tracing::error!(error = %e, "MCP server error");
    })?;

    service.waiting().await?;
    info!("MCP server shut down");
    Ok(())
}
