//! Shared context and the resource group.

use serde_json::{json, Map, Value};

use crate::declare::{literal, types, Handle, OutputRef, Program, ResourceDecl};
use crate::error::Result;
use crate::naming::StackNames;
use crate::settings::StackSettings;

/// Stack-wide values every component reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommonParams {
    pub project: String,
    pub environment: String,
    pub url: String,
    pub location: String,
    pub tenant_id: String,
    pub subscription_id: String,
}

impl CommonParams {
    /// Reads `project:url` and the `azure-native` location and identifiers.
    pub fn from_settings(settings: &StackSettings) -> Result<Self> {
        let project = settings.namespace("project");
        let azure = settings.namespace("azure-native");

        Ok(Self {
            project: settings.project().to_string(),
            environment: settings.stack().to_string(),
            url: project.require("url")?,
            location: azure.require("location")?,
            tenant_id: azure.require("tenantID")?,
            subscription_id: azure.require("subscriptionID")?,
        })
    }

    /// The `pulumi:name`, `pulumi:url`, `pulumi:stack` tag set.
    pub fn tags(&self) -> Value {
        let mut tags = Map::new();
        tags.insert("pulumi:name".to_string(), literal(&self.project));
        tags.insert("pulumi:url".to_string(), literal(&self.url));
        tags.insert("pulumi:stack".to_string(), literal(&self.environment));
        Value::Object(tags)
    }
}

/// Immutable context handed to each component after the resource group exists.
#[derive(Debug, Clone)]
pub struct StackContext {
    pub params: CommonParams,
    pub names: StackNames,
    pub resource_group: Handle,
    tags: Value,
}

impl StackContext {
    pub fn environment(&self) -> &str {
        &self.params.environment
    }

    pub fn tags(&self) -> Value {
        self.tags.clone()
    }

    pub fn location(&self) -> Value {
        literal(&self.params.location)
    }

    pub fn tenant_id(&self) -> Value {
        literal(&self.params.tenant_id)
    }

    /// Reference to the resource group's name.
    pub fn resource_group_name(&self) -> OutputRef {
        self.resource_group.name_ref()
    }
}

/// Declares the resource group and returns the shared context.
pub fn declare(program: &mut Program, params: &CommonParams) -> Result<StackContext> {
    let names = StackNames::new(&params.project, &params.environment);
    let tags = params.tags();

    let resource_group = program.declare(
        ResourceDecl::new("resourceGroup", types::RESOURCE_GROUP, &names.resource_group)
            .properties(json!({
                "resourceGroupName": names.resource_group,
                "location": literal(&params.location),
                "tags": tags,
            })),
    )?;

    Ok(StackContext {
        params: params.clone(),
        names,
        resource_group,
        tags,
    })
}
