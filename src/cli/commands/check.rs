//! Check command
//!
//! Validates the stack settings, builds the program and reports configuration
//! findings. Findings never change what gets rendered.

use super::{CommandContext, Runnable};
use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use edgestack::components::declare_stack;
use edgestack::lint::{LintIssue, Severity, StackChecker};

/// Arguments for the check command
#[derive(Parser, Debug, Clone)]
pub struct CheckArgs {
    /// Exit non-zero when an error-level finding is reported
    #[arg(long)]
    pub strict: bool,

    /// Rules to skip (by rule ID)
    #[arg(long = "skip", action = clap::ArgAction::Append)]
    pub skip_rules: Vec<String>,

    /// Treat warnings as errors
    #[arg(long)]
    pub warnings_as_errors: bool,
}

fn severity_label(issue: &LintIssue, use_color: bool) -> String {
    let label = format!("{:>8}", issue.severity.to_string());
    if !use_color {
        return label;
    }
    match issue.severity {
        Severity::Critical => label.red().bold().to_string(),
        Severity::Error => label.red().to_string(),
        Severity::Warning => label.yellow().to_string(),
        Severity::Hint => label.cyan().to_string(),
    }
}

impl CheckArgs {
    /// Execute the check command
    pub async fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        let inputs = ctx.load_inputs(None).await?;
        let stack = declare_stack(&inputs)?;
        ctx.output.info(&format!(
            "Built {} declarations with {} dependency edges",
            stack.program.len(),
            stack.program.graph().edge_count()
        ));

        let mut config = ctx.config.lint.clone();
        config.skip_rules.extend(self.skip_rules.iter().cloned());
        config.warnings_as_errors |= self.warnings_as_errors;

        let result = StackChecker::new(config).check(&inputs);

        if ctx.output.is_structured() {
            ctx.output.emit(&result)?;
        } else {
            ctx.output.banner(&format!(
                "CHECK [{}/{}]",
                inputs.common.project, inputs.common.environment
            ));
            if !result.issues.is_empty() {
                ctx.output.section("Findings");
            }
            for issue in &result.issues {
                println!(
                    "{} {} {}: {}",
                    severity_label(issue, ctx.output.use_color()),
                    issue.rule_id,
                    issue.symbol.as_deref().unwrap_or("-"),
                    issue.message
                );
                if let Some(ref suggestion) = issue.suggestion {
                    println!("{:>8}   {}", "", suggestion);
                }
            }
            println!("\n{}", result.summary());
        }

        if self.strict && result.has_errors() {
            Ok(result.exit_code())
        } else {
            Ok(0)
        }
    }
}

#[async_trait::async_trait]
impl Runnable for CheckArgs {
    async fn run(&self, ctx: &mut CommandContext) -> Result<i32> {
        self.execute(ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edgestack::lint::RuleCategory;

    #[test]
    fn test_check_args_parsing() {
        let args =
            CheckArgs::try_parse_from(["check", "--strict", "--skip", "NM001", "--skip", "ST002"])
                .unwrap();
        assert!(args.strict);
        assert_eq!(args.skip_rules, vec!["NM001", "ST002"]);
    }

    #[test]
    fn test_severity_label_plain() {
        let issue = LintIssue::new("ST001", "x", Severity::Warning, RuleCategory::Security, "m");
        assert_eq!(severity_label(&issue, false), " warning");
    }
}
