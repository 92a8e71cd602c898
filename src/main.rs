use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use care_allocation::adapter::AllocationAdapter;
use care_allocation::config::{Config, ConfigOverrides};
use care_allocation::estimates::TripEstimate;
use care_allocation::output::csv::{allocation_to_csv, estimates_to_csv};
use care_allocation::output::json::render_json;
use care_allocation::output::table::{render_allocation_table, render_estimate_table};
use care_allocation::server::run_server;
use care_allocation::types::{AllocationRequest, AllocationResult};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Debug, Parser)]
#[command(
    name = "care-allocation",
    about = "Request a care-facility allocation from the optimization service"
)]
struct Cli {
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Optimizer URL, or a path on the local optimizer host.
    #[arg(short, long)]
    url: Option<String>,
    #[arg(long = "timeout-ms")]
    timeout_ms: Option<u64>,
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Send one patient and its candidate facilities to the optimizer.
    Allocate {
        #[arg(short, long)]
        request: PathBuf,
    },
    /// Show cost, travel time and boardings for trip distances.
    Estimate {
        #[arg(short, long = "distance", required = true)]
        distances: Vec<f64>,
    },
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    Config {
        #[arg(long)]
        init: bool,
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load(Some(&config_path))?;
    config.apply_overrides(ConfigOverrides {
        service_url: cli.url.clone(),
        timeout_ms: cli.timeout_ms,
    });

    match &cli.command {
        Commands::Allocate { request } => {
            let request = read_request(request)?;
            let adapter = AllocationAdapter::from_config(&config.service)
                .context("failed building optimizer HTTP client")?;
            let result = adapter
                .find_best_allocation(&request.patient, &request.candidates)
                .await
                .map_err(|e| anyhow!("allocation failed ({}): {e}", e.kind()))?;
            print_allocation(&result, cli.output)?;
        }
        Commands::Estimate { distances } => {
            let estimates = distances
                .iter()
                .copied()
                .map(TripEstimate::for_distance)
                .collect::<Vec<_>>();
            print_estimates(&estimates, cli.output)?;
        }
        Commands::Serve { host, port } => {
            let host = host.clone().unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            let bind = format!("{host}:{port}");
            let addr: SocketAddr = bind
                .parse()
                .map_err(|e| anyhow!("invalid bind address {bind}: {e}"))?;
            run_server(config, addr).await?;
        }
        Commands::Config { init, show } => {
            handle_config_command(*init, *show, &config, &config_path)?;
        }
    }

    Ok(())
}

fn read_request(path: &Path) -> Result<AllocationRequest> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed reading request: {}", path.display()))?;
    serde_json::from_str(&data)
        .with_context(|| format!("failed parsing request JSON: {}", path.display()))
}

fn handle_config_command(init: bool, show: bool, config: &Config, config_path: &Path) -> Result<()> {
    if init {
        Config::write_template(config_path)?;
        println!("Wrote config template to {}", config_path.display());
    }
    if show || !init {
        println!("{}", render_json(config)?);
        println!("endpoint: {}", config.service.resolved_endpoint());
    }
    Ok(())
}

fn print_allocation(result: &AllocationResult, output: OutputFormat) -> Result<()> {
    match output {
        OutputFormat::Table => println!("{}", render_allocation_table(result)),
        OutputFormat::Json => println!("{}", render_json(result)?),
        OutputFormat::Csv => print!("{}", allocation_to_csv(result)?),
    }
    Ok(())
}

fn print_estimates(estimates: &[TripEstimate], output: OutputFormat) -> Result<()> {
    match output {
        OutputFormat::Table => println!("{}", render_estimate_table(estimates)),
        OutputFormat::Json => println!("{}", render_json(estimates)?),
        OutputFormat::Csv => print!("{}", estimates_to_csv(estimates)?),
    }
    Ok(())
}
