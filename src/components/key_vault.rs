//! Key vault and its private endpoint.

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::common::StackContext;
use super::network::{private_endpoint, NetworkOutputs};
use crate::declare::{literal, types, Handle, Program, ResourceDecl};
use crate::error::Result;
use crate::settings::StackSettings;

/// Vault settings, optionally overridden by `keyVault:params`.
///
/// The defaults keep soft delete disabled while setting a retention period.
/// That combination is declared as-is and reported by the `KV001` check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VaultPolicy {
    pub sku_name: String,
    pub sku_family: String,
    pub enable_rbac_authorization: bool,
    pub public_network_access: String,
    pub enable_purge_protection: bool,
    pub soft_delete_retention_in_days: u32,
    pub enable_soft_delete: bool,
}

impl Default for VaultPolicy {
    fn default() -> Self {
        Self {
            sku_name: "standard".to_string(),
            sku_family: "A".to_string(),
            enable_rbac_authorization: true,
            public_network_access: "Disabled".to_string(),
            enable_purge_protection: true,
            soft_delete_retention_in_days: 7,
            enable_soft_delete: false,
        }
    }
}

impl VaultPolicy {
    pub fn from_settings(settings: &StackSettings) -> Result<Self> {
        Ok(settings
            .namespace("keyVault")
            .get_object("params")?
            .unwrap_or_default())
    }

    /// Soft delete off while a retention period or purge protection is set.
    pub fn is_contradictory(&self) -> bool {
        !self.enable_soft_delete
            && (self.soft_delete_retention_in_days > 0 || self.enable_purge_protection)
    }
}

#[derive(Debug, Clone)]
pub struct KeyVaultOutputs {
    pub vault: Handle,
    pub private_endpoint: Handle,
}

pub fn declare(
    program: &mut Program,
    ctx: &StackContext,
    network: &NetworkOutputs,
    policy: &VaultPolicy,
) -> Result<KeyVaultOutputs> {
    let names = &ctx.names;

    let vault = program.declare(
        ResourceDecl::new("keyVault", types::KEY_VAULT, &names.key_vault).properties(json!({
            "vaultName": names.key_vault,
            "resourceGroupName": ctx.resource_group_name(),
            "location": ctx.location(),
            "properties": {
                "tenantId": ctx.tenant_id(),
                "sku": {
                    "name": literal(&policy.sku_name),
                    "family": literal(&policy.sku_family),
                },
                "enableRbacAuthorization": policy.enable_rbac_authorization,
                "publicNetworkAccess": literal(&policy.public_network_access),
                "enablePurgeProtection": policy.enable_purge_protection,
                "softDeleteRetentionInDays": policy.soft_delete_retention_in_days,
                "enableSoftDelete": policy.enable_soft_delete,
            },
            "tags": ctx.tags(),
        })),
    )?;

    let private_endpoint = private_endpoint(
        program,
        ctx,
        "keyVaultPrivateEndpoint",
        &names.key_vault_private_endpoint,
        &network.subnet,
        &vault,
    )?;

    Ok(KeyVaultOutputs {
        vault,
        private_endpoint,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_is_contradictory() {
        let policy = VaultPolicy::default();
        assert!(policy.enable_rbac_authorization);
        assert_eq!(policy.public_network_access, "Disabled");
        assert!(policy.is_contradictory());
    }

    #[test]
    fn test_override_from_settings() {
        let settings = StackSettings::new("acme", "dev").with_value(
            "keyVault:params",
            serde_yaml::from_str("enableSoftDelete: true").unwrap(),
        );
        let policy = VaultPolicy::from_settings(&settings).unwrap();
        assert!(policy.enable_soft_delete);
        assert_eq!(policy.soft_delete_retention_in_days, 7);
        assert!(!policy.is_contradictory());
    }

    #[test]
    fn test_absent_params_use_defaults() {
        let settings = StackSettings::new("acme", "dev");
        assert_eq!(
            VaultPolicy::from_settings(&settings).unwrap(),
            VaultPolicy::default()
        );
    }
}
