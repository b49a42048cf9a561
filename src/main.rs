//! Billtrack server binary

use anyhow::Result;
use billtrack::auth::email::InboxMailer;
use billtrack::config::AppConfig;
use billtrack::server::{AppState, build_router};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => AppConfig::from_yaml_file(&path)?,
        None => AppConfig::default(),
    };

    // The in-process mailer logs verification emails; swap in a real
    // transport to deliver them.
    let state = AppState::new(&config, Arc::new(InboxMailer::new()));
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "billtrack listening");
    axum::serve(listener, router).await?;

    Ok(())
}
