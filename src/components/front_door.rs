//! Front Door: profile, endpoint, custom domain, origin, rules, route and WAF.

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::common::StackContext;
use super::storage::StorageOutputs;
use super::waf::WafIpFilter;
use crate::declare::{escape_literal, literal, types, Handle, Program, ResourceDecl};
use crate::error::{Error, Result};
use crate::settings::StackSettings;

/// Location of every Front Door resource.
pub const GLOBAL_LOCATION: &str = "global";

/// URL pattern bound by the route and the security policy.
pub const ROUTE_PATTERN: &str = "/*";

/// Query string selecting a versioned asset (`version=1.2.3`).
pub const VERSION_QUERY_PATTERN: &str = "^version=([0-9]).([0-9]).([0-9])$";

/// Request message attached to the private link towards the storage account.
pub const PRIVATE_LINK_MESSAGE: &str = "Private link service from azure Front door";

/// Managed rule sets of the WAF policy, as `(type, version)`.
pub const MANAGED_RULE_SETS: [(&str, &str); 2] = [
    ("Microsoft_DefaultRuleSet", "2.1"),
    ("Microsoft_BotManagerRuleSet", "1.1"),
];

/// `frontDoor:params`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrontDoorParams {
    pub sku: String,
    pub afd_uri_prefix: String,
    pub afd_uri_suffix: String,
}

impl FrontDoorParams {
    pub fn from_settings(settings: &StackSettings) -> Result<Self> {
        let params: Self = settings.namespace("frontDoor").require_object("params")?;
        if params.sku.trim().is_empty() {
            return Err(Error::invalid_config("frontDoor:params.sku", "must not be empty"));
        }
        Ok(params)
    }
}

#[derive(Debug, Clone)]
pub struct FrontDoorOutputs {
    pub profile: Handle,
    pub endpoint: Handle,
    pub custom_domain: Handle,
    pub origin_group: Handle,
    pub origin: Handle,
    pub rule_set: Handle,
    pub cache_rule: Handle,
    pub route: Handle,
    pub waf_policy: Handle,
    pub security_policy: Handle,
    /// Portal URL of the profile.
    pub management_url: String,
}

pub fn declare(
    program: &mut Program,
    ctx: &StackContext,
    storage: &StorageOutputs,
    params: &FrontDoorParams,
    filter: &WafIpFilter,
) -> Result<FrontDoorOutputs> {
    let names = &ctx.names;
    let rg = ctx.resource_group_name();

    let profile = program.declare(
        ResourceDecl::new("frontDoorProfile", types::CDN_PROFILE, &names.front_door_profile)
            .properties(json!({
                "resourceGroupName": rg,
                "location": GLOBAL_LOCATION,
                "profileName": names.front_door_profile,
                "sku": { "name": literal(&params.sku) },
                "tags": ctx.tags(),
            }))
            .depends_on(&storage.account),
    )?;

    let endpoint = program.declare(
        ResourceDecl::new("frontDoorEndpoint", types::AFD_ENDPOINT, &names.front_door_endpoint)
            .properties(json!({
                "resourceGroupName": rg,
                "location": GLOBAL_LOCATION,
                "endpointName": names.front_door_endpoint,
                "profileName": profile.name_ref(),
                "enabledState": "Enabled",
                "tags": ctx.tags(),
            })),
    )?;

    let custom_domain = program.declare(
        ResourceDecl::new("customDomain", types::AFD_CUSTOM_DOMAIN, &names.custom_domain)
            .properties(json!({
                "resourceGroupName": rg,
                "profileName": profile.name_ref(),
                "hostName": escape_literal(&names.custom_domain_host),
                "customDomainName": names.custom_domain,
                "tlsSettings": {
                    "certificateType": "ManagedCertificate",
                    "minimumTlsVersion": "TLS12",
                },
            })),
    )?;

    let origin_group = program.declare(
        ResourceDecl::new("originGroup", types::AFD_ORIGIN_GROUP, &names.origin_group).properties(
            json!({
                "resourceGroupName": rg,
                "profileName": profile.name_ref(),
                "originGroupName": names.origin_group,
                "sessionAffinityState": "Enabled",
                "loadBalancingSettings": {
                    "sampleSize": 4,
                    "successfulSamplesRequired": 3,
                    "additionalLatencyInMilliseconds": 50,
                },
                "healthProbeSettings": {
                    "probeIntervalInSeconds": 100,
                    "probePath": "/",
                    "probeProtocol": "Http",
                    "probeRequestType": "HEAD",
                },
            }),
        ),
    )?;

    let blob_host = format!("{}.blob.core.windows.net", storage.account.name_ref());
    let origin = program.declare(
        ResourceDecl::new("origin", types::AFD_ORIGIN, &names.origin)
            .properties(json!({
                "resourceGroupName": rg,
                "profileName": profile.name_ref(),
                "originGroupName": origin_group.name_ref(),
                "hostName": blob_host,
                "originHostHeader": blob_host,
                "httpPort": 80,
                "httpsPort": 443,
                "priority": 1,
                "weight": 100,
                "enabledState": "Enabled",
                "sharedPrivateLinkResource": {
                    "privateLink": { "id": storage.account.id() },
                    "groupId": "blob",
                    "privateLinkLocation": ctx.location(),
                    "requestMessage": PRIVATE_LINK_MESSAGE,
                },
            }))
            .depends_on(&origin_group),
    )?;

    let rule_set = program.declare(
        ResourceDecl::new("ruleSet", types::RULE_SET, &names.rule_set).properties(json!({
            "resourceGroupName": rg,
            "profileName": profile.name_ref(),
            "ruleSetName": names.rule_set,
        })),
    )?;

    let cache_rule = program.declare(
        ResourceDecl::new("cacheRule", types::RULE, &names.cache_rule).properties(json!({
            "resourceGroupName": rg,
            "profileName": profile.name_ref(),
            "ruleName": names.cache_rule,
            "ruleSetName": rule_set.name_ref(),
            "matchProcessingBehavior": "Stop",
            "order": 1,
            "actions": [
                {
                    "name": "UrlRewrite",
                    "parameters": {
                        "sourcePattern": "/",
                        "destination": storage.blob_uri,
                        "typeName": "DeliveryRuleUrlRewriteActionParameters",
                        "preserveUnmatchedPath": false,
                    },
                },
                {
                    "name": "RouteConfigurationOverride",
                    "parameters": {
                        "cacheBehavior": names.cache_behavior.as_str(),
                        "typeName": "DeliveryRuleRouteConfigurationOverrideActionParameters",
                    },
                },
            ],
            "conditions": [
                {
                    "name": "RequestScheme",
                    "parameters": {
                        "operator": "Equal",
                        "matchValues": ["HTTPS"],
                        "typeName": "DeliveryRuleRequestSchemeConditionParameters",
                    },
                },
                {
                    "name": "QueryString",
                    "parameters": {
                        "operator": "RegEx",
                        "matchValues": [VERSION_QUERY_PATTERN],
                        "typeName": "DeliveryRuleQueryStringConditionParameters",
                    },
                },
            ],
        })),
    )?;

    let route = program.declare(
        ResourceDecl::new("route", types::ROUTE, &names.route)
            .properties(json!({
                "resourceGroupName": rg,
                "routeName": names.route,
                "profileName": profile.name_ref(),
                "endpointName": endpoint.name_ref(),
                "enabledState": "Enabled",
                "linkToDefaultDomain": "Enabled",
                "forwardingProtocol": "MatchRequest",
                "httpsRedirect": "Enabled",
                "patternsToMatch": [ROUTE_PATTERN],
                "ruleSets": [{ "id": rule_set.id() }],
                "originGroup": { "id": origin_group.id() },
                "customDomains": [{ "id": custom_domain.id() }],
            }))
            .depends_on(&origin),
    )?;

    let managed_rule_sets: Vec<_> = MANAGED_RULE_SETS
        .iter()
        .map(|(rule_set_type, version)| {
            json!({
                "ruleSetType": rule_set_type,
                "ruleSetVersion": version,
                "ruleSetAction": "Block",
            })
        })
        .collect();

    let waf_policy = program.declare(
        ResourceDecl::new("wafPolicy", types::WAF_POLICY, &names.waf_policy).properties(json!({
            "resourceGroupName": rg,
            "location": GLOBAL_LOCATION,
            "policyName": names.waf_policy,
            "sku": { "name": literal(&params.sku) },
            "policySettings": {
                "enabledState": "Enabled",
                "mode": "Prevention",
            },
            "managedRules": { "managedRuleSets": managed_rule_sets },
            "customRules": { "rules": [filter.custom_rule()] },
            "tags": ctx.tags(),
        })),
    )?;

    let security_policy = program.declare(
        ResourceDecl::new("securityPolicy", types::SECURITY_POLICY, &names.security_policy)
            .properties(json!({
                "securityPolicyName": names.security_policy,
                "resourceGroupName": rg,
                "profileName": profile.name_ref(),
                "parameters": {
                    "type": "WebApplicationFirewall",
                    "wafPolicy": { "id": waf_policy.id() },
                    "associations": [{
                        "domains": [
                            { "id": endpoint.id() },
                            { "id": custom_domain.id() },
                        ],
                        "patternsToMatch": [ROUTE_PATTERN],
                    }],
                },
            })),
    )?;

    let management_url = format!(
        "{}/{}/{}/{}",
        escape_literal(&params.afd_uri_prefix),
        rg,
        escape_literal(&params.afd_uri_suffix),
        profile.name_ref()
    );

    Ok(FrontDoorOutputs {
        profile,
        endpoint,
        custom_domain,
        origin_group,
        origin,
        rule_set,
        cache_rule,
        route,
        waf_policy,
        security_policy,
        management_url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_from_settings() {
        let settings = StackSettings::new("acme", "dev").with_value(
            "frontDoor:params",
            serde_yaml::from_str(
                "sku: Premium_AzureFrontDoor\nafdUriPrefix: https://portal\nafdUriSuffix: providers/Microsoft.Cdn/profiles",
            )
            .unwrap(),
        );
        let params = FrontDoorParams::from_settings(&settings).unwrap();
        assert_eq!(params.sku, "Premium_AzureFrontDoor");
        assert_eq!(params.afd_uri_suffix, "providers/Microsoft.Cdn/profiles");
    }

    #[test]
    fn test_params_missing_suffix() {
        let settings = StackSettings::new("acme", "dev").with_value(
            "frontDoor:params",
            serde_yaml::from_str("sku: Premium_AzureFrontDoor\nafdUriPrefix: x").unwrap(),
        );
        assert!(matches!(
            FrontDoorParams::from_settings(&settings),
            Err(Error::InvalidConfig { ref key, .. }) if key == "frontDoor:params"
        ));
    }
}
