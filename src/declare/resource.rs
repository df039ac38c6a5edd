//! Resource and variable declarations.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::value::{OutputRef, Symbol};

/// Provider type tokens of every declared resource and invoked function.
pub mod types {
    pub const RESOURCE_GROUP: &str = "azure-native:resources:ResourceGroup";
    pub const VIRTUAL_NETWORK: &str = "azure-native:network:VirtualNetwork";
    pub const SUBNET: &str = "azure-native:network:Subnet";
    pub const PRIVATE_ENDPOINT: &str = "azure-native:network:PrivateEndpoint";
    pub const STORAGE_ACCOUNT: &str = "azure-native:storage:StorageAccount";
    pub const BLOB_SERVICE_PROPERTIES: &str = "azure-native:storage:BlobServiceProperties";
    pub const BLOB_CONTAINER: &str = "azure-native:storage:BlobContainer";
    pub const RANDOM_STRING: &str = "random:RandomString";
    pub const KEY_VAULT: &str = "azure-native:keyvault:Vault";
    pub const KEY_VAULT_SECRET: &str = "azure-native:keyvault:Secret";
    pub const CDN_PROFILE: &str = "azure-native:cdn:Profile";
    pub const AFD_ENDPOINT: &str = "azure-native:cdn:AFDEndpoint";
    pub const AFD_CUSTOM_DOMAIN: &str = "azure-native:cdn:AFDCustomDomain";
    pub const AFD_ORIGIN_GROUP: &str = "azure-native:cdn:AFDOriginGroup";
    pub const AFD_ORIGIN: &str = "azure-native:cdn:AFDOrigin";
    pub const RULE_SET: &str = "azure-native:cdn:RuleSet";
    pub const RULE: &str = "azure-native:cdn:Rule";
    pub const ROUTE: &str = "azure-native:cdn:Route";
    pub const WAF_POLICY: &str = "azure-native:network:Policy";
    pub const SECURITY_POLICY: &str = "azure-native:cdn:SecurityPolicy";

    pub const LIST_SERVICE_SAS: &str = "azure-native:storage:listStorageAccountServiceSAS";
}

/// Whether a declaration is a resource or a function-call variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclKind {
    Resource,
    Variable,
}

impl std::fmt::Display for DeclKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeclKind::Resource => write!(f, "resource"),
            DeclKind::Variable => write!(f, "variable"),
        }
    }
}

/// A resource to be created by the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceDecl {
    pub symbol: String,
    pub type_token: String,
    /// Logical name; the engine's resource name (e.g. `rg-acme-staging`).
    pub name: String,
    pub properties: Value,
    pub depends_on: Vec<String>,
}

impl ResourceDecl {
    /// Creates a declaration with no properties.
    pub fn new(
        symbol: impl Into<String>,
        type_token: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            type_token: type_token.into(),
            name: name.into(),
            properties: Value::Object(Map::new()),
            depends_on: Vec::new(),
        }
    }

    /// Sets the resource inputs. Must be a JSON object.
    pub fn properties(mut self, properties: Value) -> Self {
        self.properties = properties;
        self
    }

    /// Adds an explicit ordering dependency on another declaration.
    pub fn depends_on(mut self, handle: &Handle) -> Self {
        let symbol = handle.symbol().as_str().to_string();
        if !self.depends_on.contains(&symbol) {
            self.depends_on.push(symbol);
        }
        self
    }
}

/// A value computed by invoking a provider function.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDecl {
    pub symbol: String,
    pub function: String,
    pub arguments: Value,
    /// Field of the function result bound to the variable.
    pub return_field: Option<String>,
}

impl VariableDecl {
    pub fn invoke(symbol: impl Into<String>, function: impl Into<String>, arguments: Value) -> Self {
        Self {
            symbol: symbol.into(),
            function: function.into(),
            arguments,
            return_field: None,
        }
    }

    /// Binds only `field` of the result.
    pub fn returning(mut self, field: impl Into<String>) -> Self {
        self.return_field = Some(field.into());
        self
    }
}

/// Typed handle to an accepted declaration.
///
/// Handles are only produced by [`Program`](super::Program), so every
/// reference built from one points at something already declared.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Handle {
    symbol: Symbol,
    kind: DeclKind,
}

impl Handle {
    pub(crate) fn new(symbol: Symbol, kind: DeclKind) -> Self {
        Self { symbol, kind }
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn kind(&self) -> DeclKind {
        self.kind
    }

    /// Reference to one output property.
    pub fn output(&self, property: &str) -> OutputRef {
        OutputRef::new(self.symbol.clone(), Some(property.to_string()))
    }

    /// Reference to the provider id.
    pub fn id(&self) -> OutputRef {
        self.output("id")
    }

    /// Reference to the provider-assigned name.
    pub fn name_ref(&self) -> OutputRef {
        self.output("name")
    }

    /// Reference to the whole declaration (variable value or `dependsOn` target).
    pub fn value(&self) -> OutputRef {
        OutputRef::new(self.symbol.clone(), None)
    }
}
