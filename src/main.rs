use std::path::PathBuf;

use clap::{Parser, Subcommand};
use eyre::{bail, Result};
use log::{info, LevelFilter};
use serde::Serialize;

use swap_routes::config::Config;
use swap_routes::models::snapshot::Snapshot;
use swap_routes::routes::types::Route;
use swap_routes::utils::logger::setup_logger;

/// Offline swap route simulator
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log every dropped path and cache hit
    #[arg(short, long, global = true)]
    verbose: bool,

    /// What to compute
    #[command(subcommand)]
    command: Commands,
}

/// Subcommands
#[derive(Subcommand)]
enum Commands {
    /// List every pool path between two tokens
    Paths {
        /// Snapshot file with pools and tokens
        #[arg(long)]
        snapshot: PathBuf,
        /// Token to sell
        #[arg(long)]
        from: String,
        /// Token to buy
        #[arg(long)]
        to: String,
        /// Longest path, defaults to SWAP_ROUTES_MAX_HOPS
        #[arg(long)]
        max_hops: Option<usize>,
    },
    /// Price and rank routes between two tokens
    Routes {
        /// Snapshot file with pools and tokens
        #[arg(long)]
        snapshot: PathBuf,
        /// Token to sell
        #[arg(long)]
        from: String,
        /// Token to buy
        #[arg(long)]
        to: String,
        /// Raw amount: the input, or with --reverse the output wanted
        #[arg(long)]
        amount: u128,
        /// Solve for the input needed to receive --amount
        #[arg(long)]
        reverse: bool,
        /// Longest path, defaults to SWAP_ROUTES_MAX_HOPS
        #[arg(long)]
        max_hops: Option<usize>,
    },
}

/// A route as printed by the CLI
#[derive(Serialize)]
struct RouteOutput<'a> {
    /// The priced route
    route: &'a Route,
    /// Hops plus solver iterations
    gas_multiplier: u64,
    /// Gas under the configured model
    estimated_gas: u64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logger(cli.verbose.then_some(LevelFilter::Debug))?;
    let config = Config::from_env()?;

    match cli.command {
        Commands::Paths {
            snapshot,
            from,
            to,
            max_hops,
        } => {
            let calculator = Snapshot::from_file(&snapshot)?.into_calculator();
            let paths =
                calculator.get_possible_paths(&from, &to, max_hops.unwrap_or(config.max_hops));
            info!("Found {} paths from {from} to {to}", paths.len());
            println!("{}", serde_json::to_string_pretty(&paths)?);
        }
        Commands::Routes {
            snapshot,
            from,
            to,
            amount,
            reverse,
            max_hops,
        } => {
            if amount == 0 {
                bail!("--amount must be positive");
            }
            let mut calculator = Snapshot::from_file(&snapshot)?.into_calculator();
            let routes = calculator.calculate_routes(
                amount,
                &from,
                &to,
                max_hops.unwrap_or(config.max_hops),
                reverse,
            );
            let output: Vec<RouteOutput<'_>> = routes
                .iter()
                .map(|route| RouteOutput {
                    route,
                    gas_multiplier: route.gas_multiplier(),
                    estimated_gas: route.estimated_gas(&config.gas),
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
