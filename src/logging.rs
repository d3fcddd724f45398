//! Tracing setup shared by both binaries.
//!
//! Filter comes from `RUST_LOG`, falling back to [`DEFAULT_FILTER`].
//! `MEDIA_SCAN_LOG_JSON=1` switches from compact lines to JSON events.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const ENV_LOG_JSON: &str = "MEDIA_SCAN_LOG_JSON";
pub const DEFAULT_FILTER: &str = "media_scan=info,engine=info,ingest=info,warn";

/// Install the global subscriber. A second call is a no-op.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let json = std::env::var(ENV_LOG_JSON).ok().is_some_and(|v| v == "1");

    let res = if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .try_init()
    };
    if res.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
