//! `taskboard-devserver`: in-memory REST backend for local development.
//!
//! ```bash
//! cargo run --bin taskboard-devserver -- --bind 127.0.0.1:8080
//! ```

use std::sync::Arc;

use clap::Parser;
use taskboard_devserver::api;
use taskboard_devserver::config::{ServerCliArgs, ServerConfig};
use taskboard_devserver::store::Database;

#[tokio::main]
async fn main() {
    let cli = ServerCliArgs::parse();

    let config = match ServerConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            std::process::exit(1);
        }
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let db = Arc::new(Database::new(&config.seed));
    tracing::info!(
        addr = %config.bind_addr,
        users = config.seed.users.len(),
        "starting taskboard dev server"
    );

    match api::start_server_with_state(&config.bind_addr, db).await {
        Ok((bound_addr, handle)) => {
            tracing::info!(addr = %bound_addr, "dev server listening");
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "dev server task failed");
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to start dev server");
            std::process::exit(1);
        }
    }
}
