mod cli;

use crate::cli::{CacheBackendArg, LogFormatArg, CLI};
use clap::Parser;
use readshim_cache::{CachedController, MokaResourceCache, RedisResourceCache};
use readshim_core::Controller;
use readshim_gateway::{App, AppState, HttpUpstream};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CLI::try_parse()?;
    init_tracing(config.log_format);

    info!(
        listen_addr = %config.listen_addr,
        upstream_url = %config.upstream_url,
        cache_backend = %config.cache,
        "starting gateway server"
    );

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.upstream_timeout_secs))
        .build()?;
    let upstream = HttpUpstream::new(client, config.upstream_url);
    let cache_ttl = Duration::from_secs(config.cache_ttl_secs);

    let controller: Arc<dyn Controller> = match config.cache {
        CacheBackendArg::Memory => {
            let cache: MokaResourceCache = MokaResourceCache::builder()
                .max_capacity(config.cache_capacity)
                .ttl(cache_ttl)
                .build()
                .into();
            Arc::new(CachedController::new(upstream, cache))
        }
        CacheBackendArg::Redis => {
            let redis_url = config
                .redis_url
                .ok_or("redis url is required when cache backend is redis")?;
            let cache = RedisResourceCache::connect(&redis_url)
                .await?
                .with_prefix(config.redis_key_prefix)
                .with_ttl(cache_ttl);
            Arc::new(CachedController::new(upstream, cache))
        }
    };

    let app = App::router(AppState::new(controller));
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    info!(listen_addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn init_tracing(format: LogFormatArg) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormatArg::Text => builder.init(),
        LogFormatArg::Json => builder.json().init(),
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down");
    }
}
