//! CLI module for edgestack
//!
//! This module provides the command-line interface for edgestack,
//! including argument parsing, configuration loading, and subcommand handling.

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// edgestack - Azure edge stack as a Pulumi YAML program
///
/// Declares resource group, network, storage, key vault and Front Door with WAF
/// for one stack, and renders the result for the Pulumi engine.
#[derive(Parser, Debug, Clone)]
#[command(name = "edgestack")]
#[command(author = "Edgestack Contributors")]
#[command(version)]
#[command(about = "Declares an Azure edge stack and renders it as a Pulumi YAML program", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Stack (environment) name
    #[arg(short = 's', long, global = true, env = "EDGESTACK_STACK")]
    pub stack: Option<String>,

    /// Directory holding Pulumi.yaml and the stack settings
    #[arg(short = 'C', long = "project-dir", global = true)]
    pub project_dir: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short = 'v', long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Output format
    #[arg(long, global = true, default_value = "human")]
    pub output: OutputFormat,

    /// Path to configuration file
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

/// Output format for CLI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output with colors
    #[default]
    Human,
    /// JSON output for scripting
    Json,
    /// YAML output
    Yaml,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Build the stack and write the Pulumi YAML program
    Render(commands::render::RenderArgs),

    /// Compare an existing rendered program with a fresh render
    Diff(commands::diff::DiffArgs),

    /// Show the declaration order or the dependency graph
    Graph(commands::graph::GraphArgs),

    /// Print every derived resource name for the stack
    Names(commands::names::NamesArgs),

    /// Validate settings and report configuration findings
    Check(commands::check::CheckArgs),
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Get the effective verbosity level (0-4)
    pub fn verbosity(&self) -> u8 {
        self.verbose.min(4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from(["edgestack", "render"]).unwrap();
        assert!(matches!(cli.command, Commands::Render(_)));
    }

    #[test]
    fn test_verbosity() {
        let cli = Cli::try_parse_from(["edgestack", "-vvv", "graph"]).unwrap();
        assert_eq!(cli.verbosity(), 3);
    }

    #[test]
    fn test_global_stack_after_subcommand() {
        let cli =
            Cli::try_parse_from(["edgestack", "names", "--stack", "prod", "-C", "infra"]).unwrap();
        assert_eq!(cli.stack.as_deref(), Some("prod"));
        assert_eq!(cli.project_dir, Some(PathBuf::from("infra")));
    }

    #[test]
    fn test_output_format() {
        let cli = Cli::try_parse_from(["edgestack", "--output", "json", "check"]).unwrap();
        assert_eq!(cli.output, OutputFormat::Json);
        assert!(Cli::try_parse_from(["edgestack", "--output", "xml", "check"]).is_err());
    }
}
