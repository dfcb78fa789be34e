//! Shopcheck CLI - Main Entry Point
//!
//! Runs the storefront scenarios and the supporting tooling: environment
//! inspection, synthetic test data and direct account API calls.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;

use shopcheck_cli::commands::{api, data, env, preflight, run, Context, DEFAULT_CONFIG_PATH};
use shopcheck_cli::output::OutputFormat;
use shopcheck_common::{logging, DEFAULT_BASE_URL, VERSION};

/// Shopcheck - storefront E2E and API checks
#[derive(Parser)]
#[command(name = "shopcheck")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Environment file
    #[arg(long, env = "SHOPCHECK_CONFIG", default_value = DEFAULT_CONFIG_PATH, global = true)]
    config: PathBuf,

    /// Environment name (falls back to TEST_ENV, SHOPCHECK_ENV, then qa)
    #[arg(short, long, global = true)]
    env: Option<String>,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run scenarios
    Run(run::RunArgs),

    /// Inspect environments
    #[command(subcommand)]
    Env(env::EnvCommands),

    /// Generate test data
    #[command(subcommand)]
    Data(data::DataCommands),

    /// Call the storefront API
    #[command(subcommand)]
    Api(api::ApiCommands),

    /// Check that the storefront and API are reachable
    Preflight(preflight::PreflightArgs),

    /// Show version information
    Version,
}

async fn dispatch(cli: Cli) -> anyhow::Result<()> {
    let ctx = Context {
        config: cli.config,
        env: cli.env,
        format: cli.format,
    };

    match cli.command {
        Commands::Run(args) => run::execute(args, &ctx).await?,
        Commands::Env(cmd) => env::execute(cmd, &ctx).await?,
        Commands::Data(cmd) => data::execute(cmd, &ctx).await?,
        Commands::Api(cmd) => api::execute(cmd, &ctx).await?,
        Commands::Preflight(args) => preflight::execute(args, &ctx).await?,
        Commands::Version => {
            println!("Shopcheck CLI v{}", VERSION);
            println!("Storefront E2E and API checks");
            println!();
            println!("Default target: {}", DEFAULT_BASE_URL);
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose, cli.log_json) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }

    if let Err(e) = dispatch(cli).await {
        eprintln!("❌ {:#}", e);
        std::process::exit(1);
    }
}
