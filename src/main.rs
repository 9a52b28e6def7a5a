mod color;
mod config;
mod ingest;
mod render;
mod store;
mod trajectory;
mod web;

use clap::{Parser, Subcommand};
use std::future::Future;
use std::process::ExitCode;

use crate::config::{Config, DEFAULT_CONFIG_PATH};
use crate::ingest::Poller;
use crate::render::{log_outcome, render_pass, RenderJob};

#[derive(Parser)]
#[command(name = "plane-o-mat")]
#[command(about = "Aircraft position logger and trajectory map")]
struct Cli {
    /// Configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the configuration file
    Check,
    /// Render the map once from the record store
    Render,
    /// Poll the API, log detections and keep the map up to date
    Watch,
    /// Serve the live map and the JSON API
    Serve,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let config = match Config::from_file(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading {}: {}", cli.config, e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Check => check(&config),
        Commands::Render => render(&config),
        Commands::Watch => block_on(watch(config)),
        Commands::Serve => block_on(serve(config)),
    }
}

fn check(config: &Config) -> ExitCode {
    let loc = &config.location;
    println!("Configuration is valid");
    println!(
        "  station: {:.4}, {:.4} radius {} NM",
        loc.lat, loc.lon, loc.radius_nm
    );
    println!(
        "  altitude band: {} to {} ft, color ceiling {} ft",
        config.altitude.min_ft, config.altitude.max_ft, config.altitude.color_ceiling_ft
    );
    println!(
        "  blacklists: {} callsign prefixes, {} registrations, {} descriptions",
        config.filters.callsign_blacklist.len(),
        config.filters.regis_blacklist.len(),
        config.filters.desc_blacklist.len()
    );
    println!("  records: {}", config.store.records.display());
    println!("  map: {}", config.store.map.display());
    println!("  api: {}", config.api_endpoint());
    ExitCode::SUCCESS
}

fn render(config: &Config) -> ExitCode {
    match render_pass(&RenderJob::from_config(config)) {
        Ok(outcome) => {
            log_outcome(&outcome);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Render failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn watch(config: Config) -> ExitCode {
    match Poller::connect(&config).await {
        Ok(poller) => {
            poller.run().await;
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Cannot start poller: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn serve(config: Config) -> ExitCode {
    match web::run_server(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn block_on<F: Future<Output = ExitCode>>(future: F) -> ExitCode {
    match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime.block_on(future),
        Err(e) => {
            eprintln!("Cannot start async runtime: {}", e);
            ExitCode::FAILURE
        }
    }
}
