//! services/client/src/bin/desk.rs

use clap::Parser;
use client_lib::{
    adapters::{http_auth::HttpAuthAdapter, snapshot_file::FileSnapshotStore},
    cli::{run, Cli},
    config::Config,
    error::ClientError,
};
use standards_desk_core::session::SessionManager;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    // --- 1. Parse Arguments, Load Configuration & Set Up Logging ---
    let cli = Cli::parse();
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded.");

    // --- 2. Build the HTTP Client & Service Adapters ---
    let http = reqwest::Client::builder()
        .timeout(config.http_timeout)
        .build()?;
    let auth_adapter = Arc::new(HttpAuthAdapter::new(http, config.api_base_url.clone()));
    let snapshot_store = Arc::new(FileSnapshotStore::new(config.session_file.clone()));

    // --- 3. Rehydrate the Session & Dispatch the Command ---
    let session = SessionManager::new(auth_adapter, snapshot_store);
    run(cli.command, &session).await
}
