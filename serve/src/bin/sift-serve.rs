//! Chat server entry point.
//!
//! Loads `.env`, builds the immutable [`Settings`] once, wires the real
//! clients, and serves until the process exits.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use serve::{run_serve, AppState};
use sift::Settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::from_env();
    let addr = settings.addr.clone();
    let state = Arc::new(AppState::from_settings(settings));
    run_serve(Some(&addr), state).await
}
