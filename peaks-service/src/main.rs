use anyhow::{Context, Result};
use peaks_service::{
    config::AppConfig,
    engine::PeakQueryEngine,
    metrics_server, observability,
    server::{self, AppState},
    snapshot::{CachedSnapshotSource, SnapshotSource},
    sources,
};
use std::{net::SocketAddr, sync::Arc, time::Duration};

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    // Load configuration
    let cfg = AppConfig::load()?;

    // Start metrics server if configured
    if let Some(metrics_cfg) = &cfg.metrics {
        metrics_server::init(&metrics_cfg.bind_addr)?;
    }

    let raw_source = sources::open(&cfg).await?;

    let source: Arc<dyn SnapshotSource> = if cfg.source.cache {
        let cached = Arc::new(CachedSnapshotSource::new(raw_source));

        // Warm the cache at startup; a failure here is logged and retried by the
        // first query instead of preventing the server from starting.
        if let Err(e) = cached.load().await {
            tracing::warn!(error = %e, "initial snapshot load failed");
        }

        if cfg.source.refresh_interval_secs > 0 {
            spawn_refresh(cached.clone(), Duration::from_secs(cfg.source.refresh_interval_secs));
        }
        cached as Arc<dyn SnapshotSource>
    } else {
        raw_source
    };

    let state = AppState::new(PeakQueryEngine::new(source), cfg.query.clone());
    let app = server::router(state);

    let addr: SocketAddr = cfg
        .server
        .bind_addr
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid server.bind_addr: {e}"))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "peaks service listening");

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

fn spawn_refresh(cache: Arc<CachedSnapshotSource>, every: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // The first tick completes immediately; the cache is already warm.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if let Err(e) = cache.refresh().await {
                tracing::warn!(error = %e, "snapshot refresh failed, keeping previous snapshot");
            }
        }
    });
}
