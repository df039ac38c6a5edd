//! Names command
//!
//! Prints every name derived from the project and stack names. Only the
//! project file and the stack name are needed; stack configuration is not
//! validated.

use super::{CommandContext, Runnable};
use anyhow::Result;
use clap::Parser;
use edgestack::naming::{StackNames, MAX_COMPACT_NAME_LEN};

/// Arguments for the names command
#[derive(Parser, Debug, Clone)]
pub struct NamesArgs {}

/// `(label, name)` rows in declaration order.
fn rows(names: &StackNames) -> Vec<(&'static str, &str)> {
    vec![
        ("resource group", names.resource_group.as_str()),
        ("virtual network", names.virtual_network.as_str()),
        ("subnet", names.subnet.as_str()),
        ("key vault", names.key_vault.as_str()),
        ("key vault endpoint", names.key_vault_private_endpoint.as_str()),
        ("storage account", names.storage_account.as_str()),
        ("blob container", names.blob_container.as_str()),
        ("auth token suffix", names.auth_token_suffix.as_str()),
        ("storage endpoint", names.storage_private_endpoint.as_str()),
        ("front door profile", names.front_door_profile.as_str()),
        ("front door endpoint", names.front_door_endpoint.as_str()),
        ("custom domain", names.custom_domain.as_str()),
        ("custom domain host", names.custom_domain_host.as_str()),
        ("origin group", names.origin_group.as_str()),
        ("origin", names.origin.as_str()),
        ("rule set", names.rule_set.as_str()),
        ("cache rule", names.cache_rule.as_str()),
        ("cache behavior", names.cache_behavior.as_str()),
        ("route", names.route.as_str()),
        ("waf policy", names.waf_policy.as_str()),
        ("security policy", names.security_policy.as_str()),
    ]
}

impl NamesArgs {
    /// Execute the names command
    pub async fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        let settings = ctx.load_settings().await?;
        let names = StackNames::new(settings.project(), settings.stack());

        if ctx.output.is_structured() {
            ctx.output.emit(&names)?;
            return Ok(0);
        }

        ctx.output.banner(&format!(
            "NAMES [{}/{}]",
            names.project, names.environment
        ));
        let table: Vec<Vec<String>> = rows(&names)
            .into_iter()
            .map(|(label, name)| vec![label.to_string(), name.to_string()])
            .collect();
        ctx.output.table(&["resource", "name"], &table);

        for (prefix, full) in names.truncated_names() {
            ctx.output.hint(&format!(
                "{}: '{}' is longer than {} characters once hyphens are removed",
                prefix, full, MAX_COMPACT_NAME_LEN
            ));
        }

        Ok(0)
    }
}

#[async_trait::async_trait]
impl Runnable for NamesArgs {
    async fn run(&self, ctx: &mut CommandContext) -> Result<i32> {
        self.execute(ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_cover_production_names() {
        let names = StackNames::new("acme", "prod");
        let rows = rows(&names);
        assert!(rows.contains(&("resource group", "rg-acme-prod")));
        assert!(rows.contains(&("custom domain host", "cdn.beopenit.io")));
        assert!(rows.contains(&("cache behavior", "Override")));
    }
}
