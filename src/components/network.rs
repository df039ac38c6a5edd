//! Virtual network, subnet and private endpoints.

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::common::StackContext;
use super::waf::parse_ranges;
use crate::declare::{literal, types, Handle, Program, ResourceDecl};
use crate::error::Result;
use crate::settings::StackSettings;

/// `vnet:params`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VnetParams {
    /// Address space of the virtual network (one CIDR).
    pub vnet_address_prefixes: String,
    /// Address prefix of the subnet (one CIDR).
    pub sn_address_prefixes: String,
}

impl VnetParams {
    pub fn from_settings(settings: &StackSettings) -> Result<Self> {
        let params: Self = settings.namespace("vnet").require_object("params")?;
        parse_ranges(
            "vnet:params.vnetAddressPrefixes",
            std::slice::from_ref(&params.vnet_address_prefixes),
        )?;
        parse_ranges(
            "vnet:params.snAddressPrefixes",
            std::slice::from_ref(&params.sn_address_prefixes),
        )?;
        Ok(params)
    }
}

#[derive(Debug, Clone)]
pub struct NetworkOutputs {
    pub virtual_network: Handle,
    pub subnet: Handle,
}

pub fn declare(
    program: &mut Program,
    ctx: &StackContext,
    params: &VnetParams,
) -> Result<NetworkOutputs> {
    let names = &ctx.names;

    let virtual_network = program.declare(
        ResourceDecl::new("virtualNetwork", types::VIRTUAL_NETWORK, &names.virtual_network)
            .properties(json!({
                "resourceGroupName": ctx.resource_group_name(),
                "location": ctx.location(),
                "virtualNetworkName": names.virtual_network,
                "addressSpace": {
                    "addressPrefixes": [literal(&params.vnet_address_prefixes)],
                },
                "tags": ctx.tags(),
            })),
    )?;

    let subnet = program.declare(
        ResourceDecl::new("subnet", types::SUBNET, &names.subnet).properties(json!({
            "resourceGroupName": ctx.resource_group_name(),
            "subnetName": names.subnet,
            "virtualNetworkName": virtual_network.name_ref(),
            "addressPrefix": literal(&params.sn_address_prefixes),
            "privateEndpointNetworkPolicies": "Enabled",
        })),
    )?;

    Ok(NetworkOutputs {
        virtual_network,
        subnet,
    })
}

/// Declares a private endpoint binding `subnet` to `target`.
///
/// The single service connection carries the endpoint's own name.
pub fn private_endpoint(
    program: &mut Program,
    ctx: &StackContext,
    symbol: &str,
    name: &str,
    subnet: &Handle,
    target: &Handle,
) -> Result<Handle> {
    program.declare(
        ResourceDecl::new(symbol, types::PRIVATE_ENDPOINT, name).properties(json!({
            "resourceGroupName": ctx.resource_group_name(),
            "location": ctx.location(),
            "subnet": { "id": subnet.id() },
            "privateLinkServiceConnections": [{
                "name": name,
                "privateLinkServiceId": target.id(),
            }],
            "tags": ctx.tags(),
        })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_params_camel_case() {
        let settings = StackSettings::new("acme", "dev").with_value(
            "vnet:params",
            serde_yaml::from_str("vnetAddressPrefixes: 10.0.0.0/16\nsnAddressPrefixes: 10.0.1.0/24")
                .unwrap(),
        );
        let params = VnetParams::from_settings(&settings).unwrap();
        assert_eq!(params.sn_address_prefixes, "10.0.1.0/24");
    }

    #[test]
    fn test_params_reject_bad_prefix() {
        let settings = StackSettings::new("acme", "dev").with_value(
            "vnet:params",
            serde_yaml::from_str("vnetAddressPrefixes: 10.0.0.0/16\nsnAddressPrefixes: subnet-a")
                .unwrap(),
        );
        let err = VnetParams::from_settings(&settings).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { ref key, .. }
            if key == "vnet:params.snAddressPrefixes"));
    }
}
