//! Relay server (default binary).
//!
//! Seats two clients per lobby and echoes their moves. Configure with the
//! `DRAUGHTS_RELAY_*` environment variables and `RUST_LOG`.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use draughts::sync::{run_relay, RelayConfig};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = RelayConfig::from_env();
    run_relay(config, None).await
}
