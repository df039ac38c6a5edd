//! Output formatting module for edgestack
//!
//! Provides colored human output and structured (JSON/YAML) output.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use std::io::{self, Write};

use super::OutputFormat;

/// Output formatter for different output modes
pub struct OutputFormatter {
    /// Use colored output
    use_color: bool,
    /// Output format
    format: OutputFormat,
    /// Verbosity level
    verbosity: u8,
}

impl OutputFormatter {
    /// Create a new output formatter
    pub fn new(use_color: bool, format: OutputFormat, verbosity: u8) -> Self {
        // Respect NO_COLOR environment variable
        let use_color = use_color && std::env::var("NO_COLOR").is_err();
        if !use_color {
            colored::control::set_override(false);
        }

        Self {
            use_color,
            format,
            verbosity,
        }
    }

    /// True when output is JSON or YAML.
    pub fn is_structured(&self) -> bool {
        !matches!(self.format, OutputFormat::Human)
    }

    pub fn use_color(&self) -> bool {
        self.use_color
    }

    /// Print a value in the structured format.
    pub fn emit<T: Serialize>(&self, value: &T) -> Result<()> {
        match self.format {
            OutputFormat::Yaml => print!("{}", serde_yaml::to_string(value)?),
            _ => println!("{}", serde_json::to_string_pretty(value)?),
        }
        Ok(())
    }

    /// Print a banner/header
    pub fn banner(&self, title: &str) {
        if self.is_structured() {
            return;
        }

        let line = "=".repeat(title.len() + 4);
        if self.use_color {
            println!("\n{}", line.bright_blue());
            println!("{}", format!("  {}  ", title).bright_blue().bold());
            println!("{}\n", line.bright_blue());
        } else {
            println!("\n{}", line);
            println!("  {}  ", title);
            println!("{}\n", line);
        }
    }

    /// Print a section header
    pub fn section(&self, title: &str) {
        if self.is_structured() {
            return;
        }

        if self.use_color {
            println!("\n{}", title.cyan().bold());
            println!("{}", "-".repeat(title.len()).cyan());
        } else {
            println!("\n{}", title);
            println!("{}", "-".repeat(title.len()));
        }
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        self.notice("error", "ERROR:", message);
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        self.notice("warning", "WARNING:", message);
    }

    /// Print a hint message
    pub fn hint(&self, message: &str) {
        self.notice("hint", "HINT:", message);
    }

    fn notice(&self, kind: &str, label: &str, message: &str) {
        if self.is_structured() {
            let notice = serde_json::json!({ "type": kind, "message": message });
            eprintln!("{}", notice);
            return;
        }

        if self.use_color {
            let label = match kind {
                "error" => label.red().bold(),
                "warning" => label.yellow().bold(),
                _ => label.cyan().bold(),
            };
            eprintln!("{} {}", label, message);
        } else {
            eprintln!("{} {}", label, message);
        }
    }

    /// Print an info message (respects verbosity)
    pub fn info(&self, message: &str) {
        if self.verbosity < 1 || self.is_structured() {
            return;
        }

        if self.use_color {
            eprintln!("{} {}", "INFO:".blue(), message);
        } else {
            eprintln!("INFO: {}", message);
        }
    }

    /// Print a debug message (requires higher verbosity)
    pub fn debug(&self, message: &str) {
        if self.verbosity < 2 || self.is_structured() {
            return;
        }

        if self.use_color {
            eprintln!("{} {}", "DEBUG:".magenta(), message);
        } else {
            eprintln!("DEBUG: {}", message);
        }
    }

    /// Print a list of items
    pub fn list(&self, title: &str, items: &[String]) {
        if self.use_color {
            println!("\n{}:", title.bright_white().bold());
        } else {
            println!("\n{}:", title);
        }

        for item in items {
            if self.use_color {
                println!("  {} {}", "-".bright_black(), item);
            } else {
                println!("  - {}", item);
            }
        }
    }

    /// Print a table
    pub fn table(&self, headers: &[&str], rows: &[Vec<String>]) {
        print!("{}", render_table(headers, rows, self.use_color));
    }

    /// Flush stdout
    pub fn flush(&self) {
        let _ = io::stdout().flush();
    }
}

/// Lays out `rows` under `headers` with padded columns.
fn render_table(headers: &[&str], rows: &[Vec<String>], use_color: bool) -> String {
    // Calculate column widths
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.len());
            }
        }
    }

    let join = |cells: &mut dyn Iterator<Item = &str>| -> String {
        cells
            .enumerate()
            .map(|(i, cell)| format!("{:width$}", cell, width = widths[i]))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut out = String::new();

    let header_line = join(&mut headers.iter().copied());
    if use_color {
        out.push_str(&header_line.bright_white().bold().to_string());
    } else {
        out.push_str(&header_line);
    }
    out.push('\n');

    let sep: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    if use_color {
        out.push_str(&sep.join("-+-").bright_black().to_string());
    } else {
        out.push_str(&sep.join("-+-"));
    }
    out.push('\n');

    for row in rows {
        out.push_str(&join(&mut row.iter().take(widths.len()).map(String::as_str)));
        out.push('\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_table() {
        let table = render_table(
            &["symbol", "name"],
            &[
                vec!["resourceGroup".to_string(), "rg-acme-dev".to_string()],
                vec!["subnet".to_string(), "sn-acme-dev".to_string()],
            ],
            false,
        );
        assert_eq!(
            table,
            "symbol        | name\n\
             --------------+------------\n\
             resourceGroup | rg-acme-dev\n\
             subnet        | sn-acme-dev\n"
        );
    }

    #[test]
    fn test_structured_modes() {
        assert!(!OutputFormatter::new(false, OutputFormat::Human, 0).is_structured());
        assert!(OutputFormatter::new(false, OutputFormat::Json, 0).is_structured());
        assert!(OutputFormatter::new(false, OutputFormat::Yaml, 0).is_structured());
    }
}
