//! Stack components.
//!
//! Each component reads the shared [`StackContext`] and its own configuration
//! block, then adds its declarations to the [`Program`]. Components run leaf
//! first:
//!
//! 1. [`common`]: resource group and shared context
//! 2. [`network`]: virtual network and subnet
//! 3. [`key_vault`]: vault and private endpoint
//! 4. [`storage`]: account, container, SAS token, secret, private endpoint
//! 5. [`front_door`]: CDN profile through security policy
//!
//! All configuration is read and validated by [`StackInputs::from_settings`]
//! before the first declaration is made.

pub mod common;
pub mod front_door;
pub mod key_vault;
pub mod network;
pub mod storage;
pub mod waf;

use chrono::{DateTime, Utc};
use tracing::info;

pub use common::{CommonParams, StackContext};
pub use front_door::{FrontDoorOutputs, FrontDoorParams};
pub use key_vault::{KeyVaultOutputs, VaultPolicy};
pub use network::{NetworkOutputs, VnetParams};
pub use storage::{StorageAccountParams, StorageOutputs};
pub use waf::{IpRange, WafIpFilter, WafParams};

use crate::declare::{secret, Program};
use crate::error::Result;
use crate::naming::StackNames;
use crate::sas::SasWindow;
use crate::settings::StackSettings;

/// Every configuration value the stack needs, validated.
#[derive(Debug, Clone, PartialEq)]
pub struct StackInputs {
    pub common: CommonParams,
    pub description: Option<String>,
    pub vnet: VnetParams,
    pub key_vault: VaultPolicy,
    pub storage: StorageAccountParams,
    pub front_door: FrontDoorParams,
    pub waf: WafParams,
    /// Start of the SAS validity window.
    pub issued_at: DateTime<Utc>,
}

impl StackInputs {
    /// Reads and validates all configuration. Fails on the first missing or
    /// malformed key.
    pub fn from_settings(settings: &StackSettings) -> Result<Self> {
        Ok(Self {
            common: CommonParams::from_settings(settings)?,
            description: settings.description().map(str::to_string),
            front_door: FrontDoorParams::from_settings(settings)?,
            vnet: VnetParams::from_settings(settings)?,
            storage: StorageAccountParams::from_settings(settings)?,
            key_vault: VaultPolicy::from_settings(settings)?,
            waf: WafParams::from_settings(settings)?,
            issued_at: Utc::now(),
        })
    }

    /// Pins the SAS start time.
    pub fn with_issued_at(mut self, issued_at: DateTime<Utc>) -> Self {
        self.issued_at = issued_at;
        self
    }

    pub fn names(&self) -> StackNames {
        StackNames::new(&self.common.project, &self.common.environment)
    }
}

/// Stack output names, in export order.
pub mod outputs {
    pub const RESOURCE_GROUP_NAME: &str = "resourceGroupName";
    pub const SUBNET_ID: &str = "subnetId";
    pub const STORAGE_ACCOUNT_ID: &str = "storageAccountId";
    pub const STORAGE_ACCOUNT_NAME: &str = "storageAccountName";
    pub const BLOB_CONTAINER_NAME: &str = "blobContainerName";
    pub const BLOB_URI: &str = "blobUri";
    pub const KEY_VAULT_ID: &str = "keyVaultId";
    pub const PROFILE_ID: &str = "frontDoorProfileId";
    pub const ENDPOINT_ID: &str = "frontDoorEndpointId";
    pub const ORIGIN_GROUP_ID: &str = "frontDoorOriginGroupId";
    pub const AFD_URL: &str = "afdUrl";
}

/// A fully declared stack.
#[derive(Debug, Clone)]
pub struct DeclaredStack {
    pub program: Program,
    pub context: StackContext,
    pub network: NetworkOutputs,
    pub key_vault: KeyVaultOutputs,
    pub storage: StorageOutputs,
    pub front_door: FrontDoorOutputs,
    pub sas_window: SasWindow,
}

impl DeclaredStack {
    pub fn names(&self) -> &StackNames {
        &self.context.names
    }
}

/// Declares every component and exports the stack outputs.
pub fn declare_stack(inputs: &StackInputs) -> Result<DeclaredStack> {
    let sas_window = SasWindow::starting_at(inputs.issued_at)?;
    let filter = inputs.waf.filter()?;

    let mut program =
        Program::new(&inputs.common.project).with_description(inputs.description.clone());

    let context = common::declare(&mut program, &inputs.common)?;
    let network = network::declare(&mut program, &context, &inputs.vnet)?;
    let key_vault = key_vault::declare(&mut program, &context, &network, &inputs.key_vault)?;
    let storage = storage::declare(
        &mut program,
        &context,
        &network,
        &key_vault,
        &inputs.storage,
        &sas_window,
    )?;
    let front_door = front_door::declare(
        &mut program,
        &context,
        &storage,
        &inputs.front_door,
        &filter,
    )?;

    program.export(outputs::RESOURCE_GROUP_NAME, context.resource_group_name())?;
    program.export(outputs::SUBNET_ID, network.subnet.id())?;
    program.export(outputs::STORAGE_ACCOUNT_ID, storage.account.id())?;
    program.export(outputs::STORAGE_ACCOUNT_NAME, storage.account.name_ref())?;
    program.export(outputs::BLOB_CONTAINER_NAME, storage.container.name_ref())?;
    program.export(outputs::BLOB_URI, secret(storage.blob_uri.as_str()))?;
    program.export(outputs::KEY_VAULT_ID, key_vault.vault.id())?;
    program.export(outputs::PROFILE_ID, front_door.profile.id())?;
    program.export(outputs::ENDPOINT_ID, front_door.endpoint.id())?;
    program.export(outputs::ORIGIN_GROUP_ID, front_door.origin_group.id())?;
    program.export(outputs::AFD_URL, front_door.management_url.as_str())?;

    info!(
        project = %inputs.common.project,
        stack = %inputs.common.environment,
        declarations = program.len(),
        "Declared stack"
    );

    Ok(DeclaredStack {
        program,
        context,
        network,
        key_vault,
        storage,
        front_door,
        sas_window,
    })
}
