//! Binary crate for the `owm-web` weather front-end.
//!
//! This crate focuses on:
//! - Parsing CLI arguments and interactive configuration
//! - Routing HTTP requests to the core provider
//! - Rendering the results as HTML

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod assets;
mod cli;
mod handlers;
mod render;
mod server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "owm_web=info,owm_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cmd = cli::Cli::parse();
    cmd.run().await
}
