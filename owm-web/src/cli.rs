use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Text};
use owm_core::{Config, provider_from_config};

use crate::server::{self, AppState};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "owm-web", version, about = "Weather pages backed by the OpenWeather API")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the web server.
    Serve {
        /// Address to bind. Use 0.0.0.0 to reach it from other devices on the LAN.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        #[arg(long, default_value_t = 5000)]
        port: u16,
    },

    /// Store the API key and default city in the config file.
    Configure,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Serve { host, port } => serve(&host, port).await,
            Command::Configure => configure(),
        }
    }
}

async fn serve(host: &str, port: u16) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .with_context(|| format!("Invalid listen address {host}:{port}"))?;

    let config = Config::from_environment()?;
    tracing::info!(
        default_city = %config.default_city,
        units = %config.units,
        api_key = config.has_api_key(),
        "Loaded configuration"
    );

    let provider = provider_from_config(&config)?;
    let state = AppState::new(Arc::from(provider), &config);

    server::serve(addr, state).await
}

fn configure() -> anyhow::Result<()> {
    // Only the file is edited here; environment variables still win at serve time.
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key (blank keeps the current one):")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()?;
    if !api_key.trim().is_empty() {
        config.api_key = Some(api_key.trim().to_string());
    }

    let city = Text::new("Default city:")
        .with_default(&config.default_city)
        .prompt()?;
    if !city.trim().is_empty() {
        config.default_city = city.trim().to_string();
    }

    let path = config.save()?;
    println!("Saved configuration to {}", path.display());

    if !config.has_api_key() {
        println!("No API key stored yet; set OWM_API_KEY or run `owm-web configure` again.");
    }

    Ok(())
}
