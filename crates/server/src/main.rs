use anyhow::{Context, Result};
use sfcore_ai_engine::EngineCache;
use sfcore_ai_server::{build_router, config::Settings, logging, state::AppState};
use std::net::SocketAddr;
use tracing::info;

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

#[tokio::main]
async fn main() -> Result<()> {
    // APP__* env > config/settings.toml > defaults
    let settings = Settings::load().context("Failed to load configuration")?;
    logging::init_logger(&settings.logging).context("Failed to initialize logging")?;

    info!("🚀 Starting SFCore AI chat server...");
    info!("✅ Configuration loaded (logs in {}/)", settings.logging.dir);
    info!("LLM backend: {} (default model: {})", settings.llm.base_url, settings.llm.default_model);

    let engines = EngineCache::llama_server(settings.llm.engine_options());

    let addr = SocketAddr::from((
        settings
            .server
            .host
            .parse::<std::net::IpAddr>()
            .context("Invalid server.host")?,
        settings.server.port,
    ));

    let state = AppState::new(settings, engines);
    let app = build_router(state);

    info!("🎯 Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    axum::serve(listener, app).await?;

    Ok(())
}
