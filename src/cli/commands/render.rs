//! Render command
//!
//! Builds the stack and writes the Pulumi YAML program.

use super::{parse_instant, CommandContext, Runnable};
use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Parser, ValueEnum};
use edgestack::components::declare_stack;
use edgestack::error::ErrorContext;
use edgestack::render::{render, RenderFormat};
use std::path::PathBuf;

/// Serialization format argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Yaml,
    Json,
}

impl From<FormatArg> for RenderFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Yaml => RenderFormat::Yaml,
            FormatArg::Json => RenderFormat::Json,
        }
    }
}

/// Arguments for the render command
#[derive(Parser, Debug, Clone)]
pub struct RenderArgs {
    /// Write the program to this file instead of stdout
    #[arg(long, short = 'o')]
    pub out: Option<PathBuf>,

    /// Program format (defaults to the output file extension, then yaml)
    #[arg(long, short = 'f')]
    pub format: Option<FormatArg>,

    /// SAS start time (RFC 3339), defaults to now
    #[arg(long, value_parser = parse_instant)]
    pub issued_at: Option<DateTime<Utc>>,
}

impl RenderArgs {
    /// Output path, from the flag or the configuration
    fn out_path(&self, ctx: &CommandContext) -> Option<PathBuf> {
        self.out.clone().or_else(|| ctx.config.defaults.output.clone())
    }

    /// Effective format: flag, then output extension, then configuration
    fn render_format(&self, ctx: &CommandContext, out: Option<&PathBuf>) -> RenderFormat {
        match (self.format, out) {
            (Some(format), _) => format.into(),
            (None, Some(path)) => RenderFormat::from_path(path),
            (None, None) => ctx.config.defaults.format,
        }
    }

    /// Execute the render command
    pub async fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        let inputs = ctx.load_inputs(self.issued_at).await?;
        let stack = declare_stack(&inputs)?;

        let out = self.out_path(ctx);
        let format = self.render_format(ctx, out.as_ref());
        let text = render(&stack.program, format)?;

        match out {
            Some(path) => {
                tokio::fs::write(&path, &text)
                    .await
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                ctx.output.info(&format!(
                    "Wrote {} declarations for stack '{}' to {}",
                    stack.program.len(),
                    inputs.common.environment,
                    path.display()
                ));
            }
            None => {
                print!("{}", text);
                ctx.output.flush();
            }
        }

        Ok(0)
    }
}

#[async_trait::async_trait]
impl Runnable for RenderArgs {
    async fn run(&self, ctx: &mut CommandContext) -> Result<i32> {
        self.execute(ctx).await
    }
}
