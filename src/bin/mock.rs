//! crmdash Mock Backend
//!
//! Run with: cargo run --bin crmdash-mock
//!
//! Serves seeded demo records for every entity type so the CLI can be used
//! without a real CRM account.
//!
//! # Configuration
//!
//! Read from the usual config file `[mock]` section, plus:
//! - `CRMDASH_MOCK_HOST`: Host to bind to (default: 127.0.0.1)
//! - `CRMDASH_MOCK_PORT`: Port to listen on (default: 3000)
//! - `CRMDASH_MOCK_TOKEN`: Only accept this bearer token (default: any)
//! - `RUST_LOG`: Log filter (default: from config)

use std::sync::Arc;

use crmdash::config::Config;
use crmdash::mock::{self, MockState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load_default();
    crmdash::logging::init(&config.logging)?;

    tracing::info!("Starting crmdash mock backend v{}", env!("CARGO_PKG_VERSION"));

    let mut state = MockState::demo();
    match std::env::var("CRMDASH_MOCK_TOKEN") {
        Ok(token) if !token.is_empty() => {
            tracing::info!("Accepting a single configured bearer token");
            state = state.with_accepted_token(token);
        }
        _ => tracing::info!("Accepting any non-empty bearer token"),
    }

    mock::serve(Arc::new(state), &config.mock.addr()).await?;

    Ok(())
}
