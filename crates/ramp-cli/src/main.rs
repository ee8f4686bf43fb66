//! RAMP CLI - Quarterly roadmap planning from the terminal
//!
//! Product managers use this CLI to:
//! - Browse the backlog and see which epics are still available
//! - Assign epics to a quarter and batch-edit the roadmap
//! - Score epics with the RICE heuristic
//! - Inspect capacity plans and derive effort ratings from them

use clap::{Parser, Subcommand};
use ramp_client::{RestBacklogStore, RestCapacityStore, RestClient, RestRoadmapStore};
use ramp_core::{CapacityStore, RoadmapPlanner};
use ramp_types::{PlanningPeriod, ProductId, Quarter};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod error;
mod output;

use commands::{backlog, capacity, roadmap};
use config::CliConfig;
use error::{CliError, CliResult};
use output::print_error;

const DEFAULT_ENDPOINT: &str = "http://localhost:8080";

/// RAMP CLI application
#[derive(Parser)]
#[command(name = "ramp")]
#[command(about = "RAMP - Roadmap and Allocation Management Planner CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "RAMP_CONFIG")]
    config: Option<String>,

    /// Planning backend endpoint
    #[arg(short, long, env = "RAMP_ENDPOINT")]
    endpoint: Option<String>,

    /// API bearer token
    #[arg(long, env = "RAMP_TOKEN")]
    token: Option<String>,

    /// Product to plan for
    #[arg(short, long, env = "RAMP_PRODUCT")]
    product: Option<i64>,

    /// Planning year (defaults to the current year)
    #[arg(short = 'Y', long)]
    year: Option<i32>,

    /// Planning quarter, 1 to 4 (defaults to the current quarter)
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=4))]
    quarter: Option<u8>,

    /// Output format (table, json, yaml)
    #[arg(short, long, default_value = "table")]
    output: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Browse the product backlog
    Backlog {
        #[command(subcommand)]
        command: backlog::BacklogCommands,
    },

    /// Build and edit the quarterly roadmap
    Roadmap {
        #[command(subcommand)]
        command: roadmap::RoadmapCommands,
    },

    /// Capacity planning
    Capacity {
        #[command(subcommand)]
        command: capacity::CapacityCommands,
    },

    /// Show effective configuration
    Config,
}

fn resolve_period(year: Option<i32>, quarter: Option<u8>) -> CliResult<PlanningPeriod> {
    let current = PlanningPeriod::current();
    let quarter = match quarter {
        Some(q) => Quarter::new(q).map_err(|e| CliError::Invalid(e.to_string()))?,
        None => current.quarter,
    };
    Ok(PlanningPeriod::new(year.unwrap_or(current.year), quarter))
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        print_error(&err.to_string());
        std::process::exit(1);
    }
}

async fn run() -> CliResult<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    // Load config; flags and env win over the file
    let file_config = CliConfig::load(cli.config.as_deref())?;
    let endpoint = cli
        .endpoint
        .or(file_config.endpoint)
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
    let token = cli.token.or(file_config.token);
    let timeout = Duration::from_secs(file_config.timeout_seconds.unwrap_or(30));
    let product = cli.product.or(file_config.default_product).map(ProductId);
    let period = resolve_period(cli.year, cli.quarter)?;

    debug!(endpoint = %endpoint, period = %period, "Resolved session settings");

    // Execute command
    match cli.command {
        Commands::Config => {
            println!("Endpoint: {}", endpoint);
            match product {
                Some(product) => println!("Product:  {}", product),
                None => println!("Product:  (unset)"),
            }
            println!("Period:   {}", period);
            println!("Token:    {}", if token.is_some() { "set" } else { "(unset)" });
            Ok(())
        }
        command => {
            let product = product.ok_or_else(|| {
                CliError::Config(
                    "No product selected; pass --product or set default_product in the config file"
                        .to_string(),
                )
            })?;

            let client = Arc::new(RestClient::with_timeout(&endpoint, token, timeout)?);
            let capacity_store: Arc<dyn CapacityStore> =
                Arc::new(RestCapacityStore::new(client.clone()));
            let mut planner = RoadmapPlanner::new(
                Arc::new(RestBacklogStore::new(client.clone())),
                Arc::new(RestRoadmapStore::new(client)),
                capacity_store.clone(),
                product,
                period,
            );

            match command {
                Commands::Backlog { command } => {
                    backlog::execute(command, &mut planner, cli.output).await
                }
                Commands::Roadmap { command } => {
                    roadmap::execute(command, &mut planner, cli.output).await
                }
                Commands::Capacity { command } => {
                    capacity::execute(command, &mut planner, capacity_store, cli.output).await
                }
                // Handled above
                Commands::Config => Ok(()),
            }
        }
    }
}
