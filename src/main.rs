//! truckdoc - inspection report generator for collection trucks.
//!
//! Reads the plate, inspection address and date off two photographs,
//! lets the operator correct them, and fills a Word template with the
//! values and the photographs.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use truckdoc::cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (before anything else)
    let _ = dotenvy::dotenv();

    // Initialize logging based on verbosity
    let default_filter = if cli::is_verbose() {
        "truckdoc=info"
    } else {
        "truckdoc=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Run CLI
    cli::run().await
}
