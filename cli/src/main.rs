// Copyright (c) 2026 Aquaflow Systems
// SPDX-License-Identifier: AGPL-3.0

//! # Aquaflow sandbox CLI
//!
//! Developer harness for the workflow engine: loads a JSON state file into
//! the in-memory repositories, applies one tenant-scoped operation, writes
//! the state back, and prints the outcome plus any emitted workflow events.
//!
//! ## Commands
//!
//! - `aquaflow seed` - Create a demo organization with a customer and technician
//! - `aquaflow order place|pay|assign|approve|reject|remove|complete|review-kyc` - Installation orders
//! - `aquaflow customer add|review-kyc` - Customer records and identity KYC
//! - `aquaflow request open|assign|status` - Service requests
//! - `aquaflow technician add|list` - Technician pool and availability listing

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;

mod commands;
mod sandbox;

use commands::{CustomerCommand, OrderCommand, RequestCommand, TechnicianCommand};

/// Aquaflow service operations sandbox
#[derive(Parser)]
#[command(name = "aquaflow")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to the sandbox state file
    #[arg(
        short,
        long,
        global = true,
        env = "AQUAFLOW_STATE",
        value_name = "FILE",
        default_value = "aquaflow-state.json"
    )]
    state: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "AQUAFLOW_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a demo organization with one customer and one technician
    Seed,

    /// Installation-order workflow
    #[command(name = "order")]
    Order {
        #[command(subcommand)]
        command: OrderCommand,
    },

    /// Customer records and identity KYC
    #[command(name = "customer")]
    Customer {
        #[command(subcommand)]
        command: CustomerCommand,
    },

    /// Service-request dispatch
    #[command(name = "request")]
    Request {
        #[command(subcommand)]
        command: RequestCommand,
    },

    /// Technician pool and availability
    #[command(name = "technician")]
    Technician {
        #[command(subcommand)]
        command: TechnicianCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_logging(&cli.log_level)?;

    match cli.command {
        Some(Commands::Seed) => commands::seed::run(&cli.state).await,
        Some(Commands::Order { command }) => commands::order::handle_command(command, &cli.state).await,
        Some(Commands::Customer { command }) => {
            commands::customer::handle_command(command, &cli.state).await
        }
        Some(Commands::Request { command }) => {
            commands::request::handle_command(command, &cli.state).await
        }
        Some(Commands::Technician { command }) => {
            commands::technician::handle_command(command, &cli.state).await
        }
        None => {
            eprintln!("{}", "No command specified. Use --help for usage.".yellow());
            std::process::exit(1);
        }
    }
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    Ok(())
}
