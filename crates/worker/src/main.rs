use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "visioncast_worker=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            tracing::error!("DATABASE_URL is not set");
            std::process::exit(1);
        }
    };

    let pool = match visioncast_db::create_pool(&database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!(error = %e, "Failed to connect to database");
            std::process::exit(1);
        }
    };

    let poll_interval = std::env::var("WORKER_POLL_INTERVAL_MS")
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_millis)
        .unwrap_or(visioncast_worker::generation::DEFAULT_POLL_INTERVAL);

    let cancel = CancellationToken::new();
    let loop_handle = tokio::spawn(visioncast_worker::run(
        pool,
        poll_interval,
        cancel.clone(),
    ));

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    cancel.cancel();
    let _ = loop_handle.await;
}
