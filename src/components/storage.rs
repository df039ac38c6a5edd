//! Storage account, container, SAS token and its vault secret.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::common::StackContext;
use super::key_vault::KeyVaultOutputs;
use super::network::{private_endpoint, NetworkOutputs};
use super::waf::parse_ranges;
use crate::declare::{
    escape_literal, literal, secret, types, Handle, OutputRef, Program, ResourceDecl, VariableDecl,
};
use crate::error::{Error, Result};
use crate::sas::{SasWindow, SAS_PERMISSIONS, SAS_PROTOCOLS, SAS_RESOURCE};
use crate::settings::StackSettings;

/// Soft-delete retention of blobs, in days.
pub const BLOB_RETENTION_DAYS: u32 = 7;

/// Extension of the file served through the rewrite rule.
pub const APP_EXTENSION: &str = "js";

/// Length of the random secret-name suffix.
pub const SECRET_SUFFIX_LENGTH: u32 = 3;

/// Services allowed through the network rule set regardless of IP rules.
pub const NETWORK_BYPASS: &str = "Logging, Metrics, AzureServices";

fn default_allowed_ip_ranges() -> Vec<String> {
    vec!["0.0.0.0/0".to_string()]
}

/// `storageAccount:params`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageAccountParams {
    pub sku: String,
    pub kind: String,
    #[serde(default = "default_allowed_ip_ranges")]
    pub allowed_ip_ranges: Vec<String>,
    #[serde(default)]
    pub https_only: bool,
}

impl StorageAccountParams {
    pub fn from_settings(settings: &StackSettings) -> Result<Self> {
        let params: Self = settings.namespace("storageAccount").require_object("params")?;
        if params.sku.trim().is_empty() {
            return Err(Error::invalid_config("storageAccount:params.sku", "must not be empty"));
        }
        if params.kind.trim().is_empty() {
            return Err(Error::invalid_config("storageAccount:params.kind", "must not be empty"));
        }
        parse_ranges("storageAccount:params.allowedIpRanges", &params.allowed_ip_ranges)?;
        Ok(params)
    }

    pub fn allows_any_address(&self) -> bool {
        parse_ranges("storageAccount:params.allowedIpRanges", &self.allowed_ip_ranges)
            .map(|ranges| ranges.iter().any(|r| r.is_any()))
            .unwrap_or(false)
    }

    fn ip_rules(&self) -> Result<Value> {
        let ranges = parse_ranges("storageAccount:params.allowedIpRanges", &self.allowed_ip_ranges)?;
        Ok(Value::Array(
            ranges
                .iter()
                .map(|r| json!({ "iPAddressOrRange": r.to_string() }))
                .collect(),
        ))
    }
}

/// Rewrite destination: the requested path, an 8-character query-string
/// prefix, the app extension and the container SAS as query string.
pub fn blob_uri(sas_token: &OutputRef) -> String {
    format!(
        "/{{url_path}}-{{query-string:8}}.{}?{}",
        APP_EXTENSION, sas_token
    )
}

#[derive(Debug, Clone)]
pub struct StorageOutputs {
    pub account: Handle,
    pub blob_service: Handle,
    pub container: Handle,
    pub secret_suffix: Handle,
    pub sas_token: Handle,
    pub secret: Handle,
    pub private_endpoint: Handle,
    pub blob_uri: String,
}

pub fn declare(
    program: &mut Program,
    ctx: &StackContext,
    network: &NetworkOutputs,
    vault: &KeyVaultOutputs,
    params: &StorageAccountParams,
    window: &SasWindow,
) -> Result<StorageOutputs> {
    let names = &ctx.names;

    let account = program.declare(
        ResourceDecl::new("storageAccount", types::STORAGE_ACCOUNT, &names.storage_account)
            .properties(json!({
                "accountName": names.storage_account,
                "resourceGroupName": ctx.resource_group_name(),
                "location": ctx.location(),
                "sku": { "name": literal(&params.sku) },
                "kind": literal(&params.kind),
                "allowBlobPublicAccess": false,
                "enableHttpsTrafficOnly": params.https_only,
                "networkRuleSet": {
                    "defaultAction": "Deny",
                    "bypass": NETWORK_BYPASS,
                    "ipRules": params.ip_rules()?,
                },
                "tags": ctx.tags(),
            })),
    )?;

    let blob_service = program.declare(
        ResourceDecl::new("blobService", types::BLOB_SERVICE_PROPERTIES, "blobService").properties(
            json!({
                "accountName": account.name_ref(),
                "blobServicesName": "default",
                "resourceGroupName": ctx.resource_group_name(),
                "deleteRetentionPolicy": {
                    "enabled": true,
                    "days": BLOB_RETENTION_DAYS,
                    "allowPermanentDelete": true,
                },
                "isVersioningEnabled": true,
            }),
        ),
    )?;

    let container = program.declare(
        ResourceDecl::new("blobContainer", types::BLOB_CONTAINER, &names.blob_container)
            .properties(json!({
                "resourceGroupName": ctx.resource_group_name(),
                "accountName": account.name_ref(),
                "containerName": names.blob_container,
                "publicAccess": "None",
            })),
    )?;

    let secret_suffix = program.declare(
        ResourceDecl::new("authTokenSuffix", types::RANDOM_STRING, &names.auth_token_suffix)
            .properties(json!({
                "length": SECRET_SUFFIX_LENGTH,
                "upper": false,
                "special": false,
            })),
    )?;

    let sas_token = program.declare_variable(
        VariableDecl::invoke(
            "sasToken",
            types::LIST_SERVICE_SAS,
            json!({
                "accountName": account.name_ref(),
                "resourceGroupName": ctx.resource_group_name(),
                "protocols": SAS_PROTOCOLS,
                "permissions": SAS_PERMISSIONS,
                "resource": SAS_RESOURCE,
                "sharedAccessExpiryTime": window.expiry_iso(),
                "sharedAccessStartTime": window.start_iso(),
                "canonicalizedResource": format!(
                    "/blob/{}/{}",
                    account.name_ref(),
                    container.name_ref()
                ),
            }),
        )
        .returning("serviceSasToken"),
    )?;

    let token_secret = program.declare(
        ResourceDecl::new("authTokenSecret", types::KEY_VAULT_SECRET, "secret").properties(json!({
            "resourceGroupName": ctx.resource_group_name(),
            "vaultName": vault.vault.name_ref(),
            "secretName": format!(
                "auth-token-{}-{}",
                escape_literal(ctx.environment()),
                secret_suffix.output("result")
            ),
            "properties": {
                "value": secret(sas_token.value()),
                "attributes": {
                    "enabled": true,
                    "expires": window.expiry_epoch_seconds(),
                },
            },
        })),
    )?;

    let private_endpoint = private_endpoint(
        program,
        ctx,
        "storagePrivateEndpoint",
        &names.storage_private_endpoint,
        &network.subnet,
        &account,
    )?;

    Ok(StorageOutputs {
        blob_uri: blob_uri(&sas_token.value()),
        account,
        blob_service,
        container,
        secret_suffix,
        sas_token,
        secret: token_secret,
        private_endpoint,
    })
}
