//! Diff command
//!
//! Compares a previously rendered program with a fresh render of the stack.
//! The SAS start time recorded in the existing program is reused, so only
//! configuration changes show up.

use super::{parse_instant, CommandContext, Runnable};
use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use edgestack::components::declare_stack;
use edgestack::diff::{colorize, diff_programs, resource_changes};
use edgestack::error::Error;
use edgestack::render::{PulumiYamlDocument, RenderFormat};
use std::path::PathBuf;

/// Arguments for the diff command
#[derive(Parser, Debug, Clone)]
pub struct DiffArgs {
    /// Previously rendered program (defaults to the configured output path)
    #[arg(long)]
    pub against: Option<PathBuf>,

    /// SAS start time (RFC 3339), defaults to the one in the existing program
    #[arg(long, value_parser = parse_instant)]
    pub issued_at: Option<DateTime<Utc>>,
}

impl DiffArgs {
    /// Execute the diff command
    pub async fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        let path = self
            .against
            .clone()
            .or_else(|| ctx.config.defaults.output.clone())
            .ok_or_else(|| anyhow!("Nothing to compare against: pass --against FILE"))?;

        if !path.exists() {
            return Err(Error::FileNotFound(path).into());
        }

        let format = RenderFormat::from_path(&path);
        let old_text = tokio::fs::read_to_string(&path).await?;
        let old_doc = PulumiYamlDocument::parse(&old_text, format)?;

        let issued_at = self.issued_at.or_else(|| old_doc.issued_at());
        if issued_at.is_none() {
            ctx.output.warning(&format!(
                "{} records no SAS start time; the SAS window will show as changed",
                path.display()
            ));
        }
        let inputs = ctx.load_inputs(issued_at).await?;
        let stack = declare_stack(&inputs)?;
        let new_doc = PulumiYamlDocument::from_program(&stack.program);
        let new_text = new_doc.to_text(format)?;

        let label = path.display().to_string();
        let diff = diff_programs(&old_text, &new_text, &label, "rendered");
        let changes = resource_changes(&old_doc, &new_doc);

        if ctx.output.is_structured() {
            ctx.output.emit(&serde_json::json!({
                "changed": diff.has_changes(),
                "stats": diff.stats,
                "resources": changes,
            }))?;
        } else if diff.has_changes() {
            if ctx.output.use_color() {
                print!("{}", colorize(&diff.unified));
            } else {
                print!("{}", diff.unified);
            }
            if !changes.is_empty() {
                let items: Vec<String> = changes
                    .iter()
                    .map(|c| format!("{} {} ({})", c.kind, c.symbol, c.type_token))
                    .collect();
                ctx.output.list("Resources", &items);
            }
            println!("\n{}", diff.stats);
        } else {
            println!("No changes: {} is up to date", path.display());
        }

        Ok(i32::from(diff.has_changes()))
    }
}

#[async_trait::async_trait]
impl Runnable for DiffArgs {
    async fn run(&self, ctx: &mut CommandContext) -> Result<i32> {
        self.execute(ctx).await
    }
}
