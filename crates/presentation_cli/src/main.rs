//! Valhalla route tester CLI
//!
//! Command-line interface for exercising a Valhalla routing service.

#![allow(clippy::print_stdout)]

mod commands;

use clap::{Parser, Subcommand};
use domain::{Coordinate, Costing};
use integration_valhalla::{RoutingClient, ValhallaClient, ValhallaConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Valhalla route tester CLI
#[derive(Parser)]
#[command(name = "valhalla-cli")]
#[command(author, version, about = "Valhalla routing and isochrone tester", long_about = None)]
struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Valhalla base URL (overrides valhalla.toml)
    #[arg(short, long, global = true, env = "VALHALLA_URL")]
    url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute an optimal route through two or more stops
    ///
    /// Example: valhalla-cli route --costing pedestrian 36.72,-4.42 36.73,-4.40
    Route {
        /// Travel mode
        #[arg(short, long, default_value_t = Costing::Auto)]
        costing: Costing,

        /// Stops as "lat,lon"
        #[arg(required = true, allow_hyphen_values = true)]
        locations: Vec<Coordinate>,
    },

    /// Check which points are reachable from a centre within a time budget
    Reachable {
        /// Isochrone centre as "lat,lon"
        #[arg(long, default_value_t = Coordinate::malaga(), allow_hyphen_values = true)]
        center: Coordinate,

        /// Time budget in minutes
        #[arg(short, long, default_value_t = 15, value_parser = clap::value_parser!(u32).range(5..=60))]
        minutes: u32,

        /// Travel mode
        #[arg(short, long, default_value_t = Costing::Auto)]
        costing: Costing,

        /// Candidate points as "lat,lon"
        #[arg(required = true, allow_hyphen_values = true)]
        points: Vec<Coordinate>,
    },

    /// Check that the Valhalla service answers
    Health,
}

/// Determine log filter level from verbosity count
const fn log_filter_from_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = log_filter_from_verbosity(cli.verbose);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ValhallaConfig::load_with_url(cli.url)?;
    let client = ValhallaClient::new(&config)?;

    match cli.command {
        Commands::Route { costing, locations } => {
            match commands::route(&client, &locations, costing).await {
                Some(report) => println!("{report}"),
                None => {
                    println!("❌ No route found");
                    std::process::exit(1);
                },
            }
        },

        Commands::Reachable {
            center,
            minutes,
            costing,
            points,
        } => {
            let report = commands::reachable(&client, center, minutes, &points, costing).await;
            println!("{report}");
        },

        Commands::Health => {
            if client.is_healthy().await {
                println!("✅ Healthy: {}", config.base_url);
            } else {
                println!("❌ Unhealthy: {}", config.base_url);
                std::process::exit(1);
            }
        },
    }

    Ok(())
}
