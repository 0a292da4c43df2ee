#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line tool for the urban heat island map.
//!
//! Generates heat fields, classifies points, and summarizes selections
//! from the terminal, or starts the API server. Run without a subcommand
//! to pick an action from an interactive menu.

mod commands;
mod menu;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use commands::Context;
use uhi_map_field::registry;
use uhi_map_field_models::GeoPoint;
use uhi_map_server::ServerConfig;

#[derive(Parser)]
#[command(name = "uhi_map", about = "Urban heat island map toolkit")]
struct Cli {
    /// Registered heat field to use
    #[arg(long, global = true, default_value = registry::DEFAULT_FIELD_ID)]
    field: String,

    /// Field definition TOML file to use instead of a registered field
    #[arg(long, global = true)]
    field_path: Option<PathBuf>,

    /// Grid cell size in degrees (defaults to the field's own)
    #[arg(long, global = true)]
    cell_size: Option<f64>,

    /// Seed for reproducible intensities
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the heat field as `GeoJSON`
    Grid {
        /// Write to this file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Classify a single point
    Classify {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lng: f64,
    },
    /// Find the grid cell nearest to a point
    Nearest {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lng: f64,
    },
    /// Summarize the heat under a selection shape
    Aggregate {
        /// Selection shape JSON or `GeoJSON` polygon file
        #[arg(long)]
        shape: PathBuf,
        /// Save the selection summary to this file
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Print the color legend
    Legend,
    /// List the field's region rules
    Regions,
    /// Start the API server
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        bind_addr: String,
        #[arg(long, default_value_t = 8080)]
        port: u16,
        /// Reuse one generated field across requests
        #[arg(long)]
        cache_field: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        return menu::run(&cli.field, cli.field_path.as_deref(), cli.cell_size, cli.seed).await;
    };

    if let Commands::Serve {
        bind_addr,
        port,
        cache_field,
    } = command
    {
        if cli.cell_size.is_some() || cli.seed.is_some() {
            log::warn!("--cell-size and --seed do not apply to the server");
        }
        return commands::serve(ServerConfig {
            bind_addr,
            port,
            field_id: cli.field,
            field_path: cli.field_path,
            cache_field,
        })
        .await;
    }

    let mut ctx = Context::open(&cli.field, cli.field_path.as_deref(), cli.cell_size, cli.seed)?;

    match command {
        Commands::Grid { output } => commands::grid(&mut ctx, output.as_deref())?,
        Commands::Classify { lat, lng } => commands::classify(&mut ctx, GeoPoint::new(lat, lng)),
        Commands::Nearest { lat, lng } => commands::nearest(&mut ctx, GeoPoint::new(lat, lng))?,
        Commands::Aggregate { shape, output } => {
            let shape = commands::read_shape(&shape)?;
            commands::aggregate(&mut ctx, shape, output.as_deref())?;
        }
        Commands::Legend => commands::legend(),
        Commands::Regions => commands::regions(&ctx),
        // Started above.
        Commands::Serve { .. } => {}
    }

    Ok(())
}
