//! Naming rules for every declared resource.
//!
//! All names are pure functions of the project name and the stack (environment)
//! name. Most resources use `{prefix}-{project}-{env}`; storage accounts and key
//! vaults only accept alphanumerics and at most 24 characters, so their names are
//! hyphen-stripped and truncated with [`compact`].

use serde::{Deserialize, Serialize};

/// Longest name accepted for storage accounts and key vaults.
pub const MAX_COMPACT_NAME_LEN: usize = 24;

/// Stack name treated as production.
pub const PRODUCTION_ENVIRONMENT: &str = "prod";

/// Apex domain under which the CDN custom domain lives.
pub const CDN_APEX_DOMAIN: &str = "beopenit.io";

/// Builds `{prefix}-{project}-{env}`.
pub fn resource_name(prefix: &str, project: &str, env: &str) -> String {
    format!("{}-{}-{}", prefix, project, env)
}

/// Strips hyphens and clips the result to [`MAX_COMPACT_NAME_LEN`] characters.
///
/// Overflow is removed from the tail and the remainder is clipped again to the
/// limit, so the result is always a prefix of the hyphen-stripped input.
pub fn compact(name: &str) -> String {
    let stripped: String = name.chars().filter(|c| *c != '-').collect();
    let len = stripped.chars().count();

    if len <= MAX_COMPACT_NAME_LEN {
        return stripped;
    }

    let overflow = len - MAX_COMPACT_NAME_LEN;
    stripped
        .chars()
        .take(len - overflow)
        .take(MAX_COMPACT_NAME_LEN)
        .collect()
}

/// Builds the compact name for `{prefix}-{project}-{env}`.
pub fn compact_name(prefix: &str, project: &str, env: &str) -> String {
    compact(&resource_name(prefix, project, env))
}

/// Returns true when compacting `name` drops characters beyond the hyphens.
pub fn is_truncated(name: &str) -> bool {
    name.chars().filter(|c| *c != '-').count() > MAX_COMPACT_NAME_LEN
}

/// Returns true for the production stack.
pub fn is_production(env: &str) -> bool {
    env == PRODUCTION_ENVIRONMENT
}

/// Hostname of the CDN custom domain for a stack.
pub fn custom_domain_host(env: &str) -> String {
    if is_production(env) {
        format!("cdn.{}", CDN_APEX_DOMAIN)
    } else {
        format!("cdn.{}.{}", env, CDN_APEX_DOMAIN)
    }
}

/// Cache behaviour applied by the Front Door rewrite rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CacheBehavior {
    /// Never cache; every request reaches the origin.
    BypassCache,
    /// Use the provider's default caching.
    Override,
}

impl CacheBehavior {
    /// Selects the behaviour for a stack: `Override` for production only.
    pub fn for_environment(env: &str) -> Self {
        if is_production(env) {
            Self::Override
        } else {
            Self::BypassCache
        }
    }

    /// Provider string for this behaviour.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BypassCache => "BypassCache",
            Self::Override => "Override",
        }
    }
}

impl std::fmt::Display for CacheBehavior {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every derived name for one project/stack pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackNames {
    pub project: String,
    pub environment: String,
    pub resource_group: String,
    pub virtual_network: String,
    pub subnet: String,
    pub storage_account: String,
    pub blob_container: String,
    pub storage_private_endpoint: String,
    pub auth_token_suffix: String,
    pub key_vault: String,
    pub key_vault_private_endpoint: String,
    pub front_door_profile: String,
    pub front_door_endpoint: String,
    pub custom_domain: String,
    pub custom_domain_host: String,
    pub origin_group: String,
    pub origin: String,
    pub rule_set: String,
    pub cache_rule: String,
    pub route: String,
    pub waf_policy: String,
    pub security_policy: String,
    pub cache_behavior: CacheBehavior,
}

impl StackNames {
    /// Derives all names for `project` deployed as stack `env`.
    pub fn new(project: &str, env: &str) -> Self {
        let front_door_profile = resource_name("fd", project, env);
        let cache_rule = format!("fd-rule-{}-{}-1", front_door_profile, env);

        Self {
            project: project.to_string(),
            environment: env.to_string(),
            resource_group: resource_name("rg", project, env),
            virtual_network: resource_name("vnet", project, env),
            subnet: resource_name("sn", project, env),
            storage_account: compact_name("sa", project, env),
            blob_container: resource_name("cn", project, env),
            storage_private_endpoint: resource_name("pe-as", project, env),
            auth_token_suffix: format!("kv-name-{}", env),
            key_vault: compact_name("kv", project, env),
            key_vault_private_endpoint: resource_name("pe-kv", project, env),
            front_door_endpoint: resource_name("fd-endpoint", project, env),
            custom_domain: format!("fd-custom-domain-{}", env),
            custom_domain_host: custom_domain_host(env),
            origin_group: resource_name("fd-origin-group", project, env),
            origin: resource_name("fd-origin", project, env),
            rule_set: "fd-rule-set".to_string(),
            cache_rule,
            route: resource_name("afd-route", project, env),
            waf_policy: resource_name("afd-waf-policy", project, env),
            security_policy: resource_name("afd-security-policy", project, env),
            cache_behavior: CacheBehavior::for_environment(env),
            front_door_profile,
        }
    }

    /// Returns true when the stack is production.
    pub fn is_production(&self) -> bool {
        is_production(&self.environment)
    }

    /// Compact names that lost characters to truncation, as `(prefix, name)`.
    pub fn truncated_names(&self) -> Vec<(&'static str, String)> {
        ["sa", "kv"]
            .into_iter()
            .map(|prefix| (prefix, resource_name(prefix, &self.project, &self.environment)))
            .filter(|(_, full)| is_truncated(full))
            .collect()
    }
}
