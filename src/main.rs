//! CRM API Gateway
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌───────────────────────────────────────────────────────┐
//!                     │                      API GATEWAY                      │
//!   HTTP request      │  ┌────────┐   ┌──────────┐   ┌────────────┐           │
//!   ──────────────────┼─▶│  http  │──▶│ dispatch │──▶│ validation │           │
//!                     │  │ routes │   │          │   │ pagination │           │
//!                     │  └────────┘   └────┬─────┘   └────────────┘           │
//!                     │                    ▼                                  │
//!                     │              ┌──────────┐   ┌──────────┐              │
//!                     │              │  client  │──▶│ backend  │──────────────┼──▶ user_service
//!                     │              │ facade   │   │ registry │──────────────┼──▶ schedule_service
//!                     │              └──────────┘   └──────────┘              │
//!   envelope          │  ┌──────────┐                                         │
//!   ◀─────────────────┼──│ envelope │◀── Value | GatewayError                 │
//!                     │  └──────────┘                                         │
//!                     │  config · observability · lifecycle                   │
//!                     └───────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use crm_gateway::config::{load_config, load_default, ConfigError, GatewayConfig};
use crm_gateway::lifecycle::{self, signals, Shutdown};
use crm_gateway::observability::logging;

#[derive(Parser)]
#[command(name = "crm-gateway")]
#[command(about = "REST gateway in front of the CRM backend services", long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults plus environment variables when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Validate the configuration and the backend descriptor set, then exit.
    #[arg(long)]
    check: bool,
}

fn load(cli: &Cli) -> Result<GatewayConfig, ConfigError> {
    match &cli.config {
        Some(path) => load_config(path),
        None => load_default(),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if cli.check {
        return match lifecycle::load_schema(&config) {
            Ok(schema) => {
                for method in schema.missing_methods() {
                    println!("not in descriptor set: {}", method);
                }
                println!("configuration OK");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("configuration error: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    logging::init(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = ?config.environment,
        bind_address = %config.listener.bind_address,
        backends = config.backends.len(),
        request_timeout_secs = config.timeouts.request_secs,
        "crm-gateway starting"
    );

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(shutdown.clone());

    if let Err(e) = lifecycle::run(config, shutdown).await {
        tracing::error!(error = %e, "Gateway terminated with error");
        return ExitCode::FAILURE;
    }

    tracing::info!("Shutdown complete");
    ExitCode::SUCCESS
}
