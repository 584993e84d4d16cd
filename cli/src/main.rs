//! Rent API CLI server
//!
//! Headless reservation service suitable for deployment as a systemd
//! service, Docker container, or standalone process.
//!
//! ```sh
//! # Run with default config (~/.config/rentapi/config.toml)
//! rent-service
//!
//! # Custom config path
//! rent-service --config /etc/rentapi/config.toml
//!
//! # Validate config without starting
//! rent-service --check
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};

use rentapi::config::AppConfig;
use rentapi::server::{init_tracing, ServerHandle, ServerOptions};

/// Rent API: car reservation lifecycle and booking-conflict service.
#[derive(Parser, Debug)]
#[command(
    name = "rent-service",
    version,
    about = "Car rental reservation service",
    long_about = "Rent API: REST server for car reservations with overlap \
                  detection, pricing and a payment/rental lifecycle.\n\n\
                  Default config: ~/.config/rentapi/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "RENTAPI_CONFIG")]
    config: Option<PathBuf>,

    /// Override the REST API listen port.
    #[arg(long)]
    api_port: Option<u16>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration file and exit without starting the server.
    #[arg(long)]
    check: bool,

    /// Skip database migrations on startup.
    #[arg(long)]
    no_migrate: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // ── Load configuration ─────────────────────────────────────
    let config_path = cli.config.unwrap_or_else(rentapi::default_config_path);

    let mut config = match AppConfig::load(&config_path) {
        Ok(cfg) => cfg,
        Err(e) if cli.check => {
            eprintln!("Invalid configuration in {}: {}", config_path.display(), e);
            std::process::exit(1);
        }
        Err(e) => {
            tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::new("info"))
                .init();
            error!("Failed to load config from {}: {}", config_path.display(), e);
            return Err(e.into());
        }
    };

    // ── Apply CLI overrides ────────────────────────────────────
    if let Some(port) = cli.api_port {
        config.server.api_port = port;
    }
    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }

    // ── Config validation mode ─────────────────────────────────
    if cli.check {
        println!("Configuration is valid");
        println!("   Config file     : {}", config_path.display());
        println!("   API address     : {}", config.server.address());
        println!("   Database        : {}", config.database.connection_url());
        println!("   Log level       : {}", config.logging.level);
        println!(
            "   Payment timeout : {} min",
            config.reservations.payment_timeout_minutes
        );
        println!("   Auto advance    : {}", config.reservations.auto_advance);
        return Ok(());
    }

    init_tracing(&config);
    info!("Configuration loaded from {}", config_path.display());
    if let Some(port) = cli.api_port {
        info!("CLI override: api_port = {}", port);
    }

    // ── Start server ───────────────────────────────────────────
    let handle = ServerHandle::start(ServerOptions {
        config,
        auto_migrate: !cli.no_migrate,
    })
    .await?;

    handle.install_signal_handler();
    info!("Press Ctrl+C to shutdown gracefully.");

    handle.shutdown_signal().wait().await;
    handle.wait().await;

    Ok(())
}
