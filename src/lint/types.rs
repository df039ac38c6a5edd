//! Finding types.
//!
//! Severity levels, rule categories, single findings and the aggregated
//! result of checking one stack.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Severity level for lint issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational hint, not a problem.
    Hint,
    /// Potential issue that should be reviewed.
    Warning,
    /// Definite problem in the declared configuration.
    Error,
    /// Severe security or correctness issue.
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Hint => write!(f, "hint"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

impl Default for Severity {
    fn default() -> Self {
        Severity::Hint
    }
}

/// Category of lint rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCategory {
    /// Settings that contradict each other.
    Consistency,
    /// Exposure and access control.
    Security,
    /// Derived resource names.
    Naming,
}

impl std::fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleCategory::Consistency => write!(f, "consistency"),
            RuleCategory::Security => write!(f, "security"),
            RuleCategory::Naming => write!(f, "naming"),
        }
    }
}

/// A single finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LintIssue {
    /// Rule identifier (e.g. "KV001").
    pub rule_id: String,
    /// Human-readable rule name.
    pub rule_name: String,
    pub severity: Severity,
    pub category: RuleCategory,
    pub message: String,
    /// Declaration the finding is about.
    pub symbol: Option<String>,
    /// Configuration key that controls the finding.
    pub config_key: Option<String>,
    /// Suggested fix.
    pub suggestion: Option<String>,
}

impl LintIssue {
    /// Create a new lint issue.
    pub fn new(
        rule_id: impl Into<String>,
        rule_name: impl Into<String>,
        severity: Severity,
        category: RuleCategory,
        message: impl Into<String>,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            rule_name: rule_name.into(),
            severity,
            category,
            message: message.into(),
            symbol: None,
            config_key: None,
            suggestion: None,
        }
    }

    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    pub fn with_config_key(mut self, key: impl Into<String>) -> Self {
        self.config_key = Some(key.into());
        self
    }

    /// Add a suggestion for fixing the issue.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Check if this is an error or critical issue.
    pub fn is_error(&self) -> bool {
        matches!(self.severity, Severity::Error | Severity::Critical)
    }
}

impl std::fmt::Display for LintIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(ref symbol) = self.symbol {
            write!(f, "{}: ", symbol)?;
        }
        write!(f, "[{}] {} - {}", self.rule_id, self.severity, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, "\n  Suggestion: {}", suggestion)?;
        }
        Ok(())
    }
}

/// Result of checking one stack.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LintResult {
    /// Stack that was checked.
    pub stack: String,
    pub issues: Vec<LintIssue>,
    /// Number of rules evaluated.
    pub rules_run: usize,
}

impl LintResult {
    pub fn new(stack: impl Into<String>) -> Self {
        Self {
            stack: stack.into(),
            ..Self::default()
        }
    }

    pub fn add_issue(&mut self, issue: LintIssue) {
        self.issues.push(issue);
    }

    /// Get issues filtered by severity.
    pub fn issues_by_severity(&self, severity: Severity) -> Vec<&LintIssue> {
        self.issues.iter().filter(|i| i.severity == severity).collect()
    }

    /// Get issues filtered by category.
    pub fn issues_by_category(&self, category: RuleCategory) -> Vec<&LintIssue> {
        self.issues.iter().filter(|i| i.category == category).collect()
    }

    /// Finds the issue raised by `rule_id`.
    pub fn issue(&self, rule_id: &str) -> Option<&LintIssue> {
        self.issues.iter().find(|i| i.rule_id == rule_id)
    }

    /// Check if there are any errors or critical issues.
    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(|i| i.is_error())
    }

    pub fn count_by_severity(&self) -> HashMap<Severity, usize> {
        let mut counts = HashMap::new();
        for issue in &self.issues {
            *counts.entry(issue.severity).or_insert(0) += 1;
        }
        counts
    }

    /// Exit code for the findings: 3 critical, 2 error, 1 warning, 0 otherwise.
    pub fn exit_code(&self) -> i32 {
        match self.issues.iter().map(|i| i.severity).max() {
            Some(Severity::Critical) => 3,
            Some(Severity::Error) => 2,
            Some(Severity::Warning) => 1,
            _ => 0,
        }
    }

    pub fn summary(&self) -> String {
        let counts = self.count_by_severity();
        let count = |s: Severity| counts.get(&s).copied().unwrap_or(0);

        format!(
            "Checked stack '{}' with {} rule(s): {} critical, {} error(s), {} warning(s), {} hint(s)",
            self.stack,
            self.rules_run,
            count(Severity::Critical),
            count(Severity::Error),
            count(Severity::Warning),
            count(Severity::Hint)
        )
    }
}

/// Rule selection, read from the `[lint]` section of the tool configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LintConfig {
    /// Rules to skip (by rule ID).
    pub skip_rules: Vec<String>,
    /// Minimum severity to report.
    pub min_severity: Severity,
    /// Whether to treat warnings as errors.
    pub warnings_as_errors: bool,
}

impl LintConfig {
    pub fn is_enabled(&self, rule_id: &str) -> bool {
        !self.skip_rules.iter().any(|r| r.eq_ignore_ascii_case(rule_id))
    }
}
