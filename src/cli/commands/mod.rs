//! Subcommands module for edgestack CLI
//!
//! This module contains all the subcommand implementations.

pub mod check;
pub mod diff;
pub mod graph;
pub mod names;
pub mod render;

use crate::cli::output::OutputFormatter;
use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use edgestack::components::StackInputs;
use edgestack::config::Config;
use edgestack::settings::StackSettings;
use std::path::PathBuf;

/// Common context shared between commands
pub struct CommandContext {
    /// Configuration
    pub config: Config,
    /// Output formatter
    pub output: OutputFormatter,
    /// Stack selected on the command line
    pub stack: Option<String>,
    /// Project directory selected on the command line
    pub project_dir: Option<PathBuf>,
}

impl CommandContext {
    /// Create a new command context from CLI arguments
    pub fn new(cli: &crate::cli::Cli, config: Config) -> Self {
        let use_color = !cli.no_color && config.colors.enabled;
        let output = OutputFormatter::new(use_color, cli.output, cli.verbosity());

        Self {
            config,
            output,
            stack: cli.stack.clone(),
            project_dir: cli.project_dir.clone(),
        }
    }

    /// Get the effective stack name
    pub fn stack(&self) -> Result<String> {
        match self.stack.as_ref().or(self.config.defaults.stack.as_ref()) {
            Some(stack) if !stack.is_empty() => Ok(stack.clone()),
            _ => bail!("No stack selected: pass --stack or set EDGESTACK_STACK"),
        }
    }

    /// Get the effective project directory
    pub fn project_dir(&self) -> PathBuf {
        self.project_dir
            .clone()
            .unwrap_or_else(|| self.config.defaults.project_dir.clone())
    }

    /// Load the project and stack settings
    pub async fn load_settings(&self) -> Result<StackSettings> {
        let stack = self.stack()?;
        let project_dir = self.project_dir();
        self.output.debug(&format!(
            "Loading stack '{}' from {}",
            stack,
            project_dir.display()
        ));
        Ok(StackSettings::load(&project_dir, &stack).await?)
    }

    /// Load and validate every configuration value, optionally pinning the SAS start
    pub async fn load_inputs(&self, issued_at: Option<DateTime<Utc>>) -> Result<StackInputs> {
        let settings = self.load_settings().await?;
        let inputs = StackInputs::from_settings(&settings)?;
        Ok(match issued_at {
            Some(instant) => inputs.with_issued_at(instant),
            None => inputs,
        })
    }
}

/// Trait for runnable commands
#[async_trait::async_trait]
pub trait Runnable {
    /// Execute the command
    async fn run(&self, ctx: &mut CommandContext) -> Result<i32>;
}

/// Parses an RFC 3339 timestamp argument.
pub(crate) fn parse_instant(value: &str) -> std::result::Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| format!("expected an RFC 3339 timestamp: {}", e))
}
