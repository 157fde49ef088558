//! UK News Decoded: binary entrypoint.
//! Boots the Axum HTTP server that serves clustered stories.

use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact tracing logs filtered by `RUST_LOG`. Shuttle may already have
/// installed a subscriber, in which case this is a no-op.
fn enable_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("uk_news_decoded=info,warn"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    enable_tracing();

    let router = uk_news_decoded::app().await?;
    Ok(router.into())
}
