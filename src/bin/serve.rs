//! HTTP surface: `/health`, `/config`, `POST /evaluate` and `/metrics`.

use anyhow::{Context, Result};

use media_scan_engine::api::create_router;
use media_scan_engine::config::load_engine_config_default;
use media_scan_engine::logging::init_tracing;
use media_scan_engine::metrics::Metrics;
use media_scan_engine::Engine;

const ENV_BIND: &str = "MEDIA_SCAN_BIND";
const DEFAULT_BIND: &str = "127.0.0.1:8000";

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing();

    let metrics = Metrics::init()?;
    let cfg = load_engine_config_default().context("loading engine config")?;
    let engine = Engine::new(cfg).context("invalid engine config")?;

    let app = create_router(engine).merge(metrics.router());

    let bind = std::env::var(ENV_BIND).unwrap_or_else(|_| DEFAULT_BIND.to_string());
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("binding {bind}"))?;
    tracing::info!(addr = %bind, "listening");
    axum::serve(listener, app).await.context("http server")?;
    Ok(())
}
