mod api;
mod config;
mod errors;
mod ratelimit;
mod report;
mod store;

use api::{ApiServer, AppState};
use anyhow::Context;
use config::Config;
use ratelimit::RateLimiter;
use std::process::ExitCode;
use std::sync::Arc;
use store::MongoReportStore;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_tracing();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Startup failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<()> {
    let config = Config::from_env().context("invalid configuration")?;

    tracing::info!(
        "TravelSafe Hub starting on port {}, rate limit {} requests per {:?}",
        config.api_port,
        config.rate_limit_max,
        config.rate_limit_window
    );

    // ── 1. Datastore (connection is checked in the background) ─────
    let store = MongoReportStore::connect(&config)
        .await
        .context("could not set up the MongoDB client")?;

    // ── 2. Rate limiter shared by every route ──────────────────────
    let limiter = Arc::new(RateLimiter::new(
        config.rate_limit_window,
        config.rate_limit_max,
    ));
    limiter.spawn_sweeper();

    // ── 3. Serve until Ctrl+C / SIGTERM ────────────────────────────
    let state = AppState::new(Arc::new(store), &config.api_key, config.store_timeout);
    ApiServer::new(state, limiter).run(config.api_port).await
}

/// `RUST_LOG` picks the filter, `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match std::env::var("LOG_FORMAT").as_deref() {
        Ok("json") => builder.json().init(),
        _ => builder.init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startup_error_reads_as_one_line() {
        let err = Config::from_lookup(|_| None)
            .context("invalid configuration")
            .unwrap_err();
        assert_eq!(format!("{err:#}"), "invalid configuration: MONGO_URI must be set");
    }
}
