//! Stack rules.

use tracing::debug;

use super::types::{LintConfig, LintIssue, LintResult, RuleCategory, Severity};
use crate::components::StackInputs;
use crate::naming::{is_production, MAX_COMPACT_NAME_LEN};

type Rule = fn(&StackInputs) -> Vec<LintIssue>;

/// Every rule, in report order.
const RULES: [(&str, Rule); 5] = [
    ("KV001", check_vault_soft_delete),
    ("ST001", check_storage_https_only),
    ("ST002", check_storage_allow_list),
    ("WAF001", check_waf_allow_list),
    ("NM001", check_truncated_names),
];

/// Runs the enabled rules against validated stack inputs.
#[derive(Debug, Clone, Default)]
pub struct StackChecker {
    config: LintConfig,
}

impl StackChecker {
    pub fn new(config: LintConfig) -> Self {
        Self { config }
    }

    pub fn check(&self, inputs: &StackInputs) -> LintResult {
        let mut result = LintResult::new(&inputs.common.environment);

        for (rule_id, rule) in RULES {
            if !self.config.is_enabled(rule_id) {
                continue;
            }
            result.rules_run += 1;

            for mut issue in rule(inputs) {
                if self.config.warnings_as_errors && issue.severity == Severity::Warning {
                    issue.severity = Severity::Error;
                }
                if issue.severity < self.config.min_severity {
                    continue;
                }
                debug!(
                    rule = %issue.rule_id,
                    severity = %issue.severity,
                    symbol = issue.symbol.as_deref().unwrap_or("-"),
                    "{}",
                    issue.message
                );
                result.add_issue(issue);
            }
        }

        result
    }
}

/// Checks `inputs` with every rule enabled.
pub fn check_stack(inputs: &StackInputs) -> LintResult {
    StackChecker::default().check(inputs)
}

fn check_vault_soft_delete(inputs: &StackInputs) -> Vec<LintIssue> {
    let policy = &inputs.key_vault;
    if !policy.is_contradictory() {
        return Vec::new();
    }

    vec![LintIssue::new(
        "KV001",
        "contradictory-soft-delete",
        Severity::Error,
        RuleCategory::Consistency,
        format!(
            "soft delete is disabled but softDeleteRetentionInDays is {} and purge protection is {}",
            policy.soft_delete_retention_in_days,
            if policy.enable_purge_protection { "enabled" } else { "disabled" }
        ),
    )
    .with_symbol("keyVault")
    .with_config_key("keyVault:params.enableSoftDelete")
    .with_suggestion("set keyVault:params.enableSoftDelete to true")]
}

fn check_storage_https_only(inputs: &StackInputs) -> Vec<LintIssue> {
    if inputs.storage.https_only {
        return Vec::new();
    }

    let severity = if is_production(&inputs.common.environment) {
        Severity::Error
    } else {
        Severity::Warning
    };

    vec![LintIssue::new(
        "ST001",
        "storage-https-only-disabled",
        severity,
        RuleCategory::Security,
        "storage account accepts plain HTTP traffic",
    )
    .with_symbol("storageAccount")
    .with_config_key("storageAccount:params.httpsOnly")
    .with_suggestion("set storageAccount:params.httpsOnly to true")]
}

fn check_storage_allow_list(inputs: &StackInputs) -> Vec<LintIssue> {
    if !inputs.storage.allows_any_address() {
        return Vec::new();
    }

    vec![LintIssue::new(
        "ST002",
        "storage-allows-any-address",
        Severity::Warning,
        RuleCategory::Security,
        "storage network rules allow every address (0.0.0.0/0)",
    )
    .with_symbol("storageAccount")
    .with_config_key("storageAccount:params.allowedIpRanges")
    .with_suggestion("list the CIDR blocks that need direct blob access")]
}

fn check_waf_allow_list(inputs: &StackInputs) -> Vec<LintIssue> {
    if !inputs.waf.allowed_ip_ranges.is_empty() {
        return Vec::new();
    }

    vec![LintIssue::new(
        "WAF001",
        "waf-blocks-all",
        Severity::Warning,
        RuleCategory::Security,
        "WAF allow-list is empty; every request to the endpoint is blocked",
    )
    .with_symbol("wafPolicy")
    .with_config_key("waf:params.allowedIpRanges")
    .with_suggestion("add the organization's CIDR blocks to waf:params.allowedIpRanges")]
}

fn check_truncated_names(inputs: &StackInputs) -> Vec<LintIssue> {
    let names = inputs.names();
    names
        .truncated_names()
        .into_iter()
        .map(|(prefix, full)| {
            let (symbol, compact) = match prefix {
                "sa" => ("storageAccount", &names.storage_account),
                _ => ("keyVault", &names.key_vault),
            };
            LintIssue::new(
                "NM001",
                "name-truncated",
                Severity::Hint,
                RuleCategory::Naming,
                format!(
                    "'{}' exceeds {} characters and was shortened to '{}'",
                    full, MAX_COMPACT_NAME_LEN, compact
                ),
            )
            .with_symbol(symbol)
        })
        .collect()
}
