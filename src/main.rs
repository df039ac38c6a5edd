//! edgestack - Azure edge stack as a Pulumi YAML program
//!
//! This is the main entry point for the edgestack CLI.

mod cli;

use anyhow::Result;
use cli::commands::{CommandContext, Runnable};
use cli::{Cli, Commands};
use edgestack::config::{Config, LogFormat, LoggingConfig};
use edgestack::error::Error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Application version information
const VERSION: &str = env!("CARGO_PKG_VERSION");
const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Load configuration
    let config = Config::load(cli.config.as_ref()).unwrap_or_else(|e| {
        eprintln!("Warning: Failed to load config: {}", e);
        Config::default()
    });

    // Initialize logging based on verbosity
    init_logging(cli.verbosity(), &config.logging);

    // Display version if verbose
    if cli.verbosity() >= 2 {
        eprintln!("edgestack v{} by {}", VERSION, AUTHORS);
    }

    // Create command context
    let mut ctx = CommandContext::new(&cli, config);

    // Execute the appropriate command
    let result = match &cli.command {
        Commands::Render(args) => args.run(&mut ctx).await,
        Commands::Diff(args) => args.run(&mut ctx).await,
        Commands::Graph(args) => args.run(&mut ctx).await,
        Commands::Names(args) => args.run(&mut ctx).await,
        Commands::Check(args) => args.run(&mut ctx).await,
    };

    let exit_code = match result {
        Ok(code) => code,
        Err(e) => {
            ctx.output.error(&format!("{:#}", e));
            e.downcast_ref::<Error>().map_or(1, Error::exit_code)
        }
    };

    std::process::exit(exit_code);
}

/// Initialize logging based on verbosity level
fn init_logging(verbosity: u8, logging: &LoggingConfig) {
    let filter = match verbosity {
        0 => logging.level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let registry = tracing_subscriber::registry().with(env_filter);
    match logging.format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Text => registry
            .with(
                fmt::layer()
                    .with_target(verbosity >= 3)
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}
