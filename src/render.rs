//! Pulumi YAML rendering.
//!
//! Turns a [`Program`] into the document the engine reads from `Pulumi.yaml`
//! (`runtime: yaml`). Declarations keep declaration order. Resources carry
//! their logical name in `name:` and explicit ordering in `options.dependsOn`.

use std::path::Path;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::declare::Program;
use crate::error::{Error, Result};

/// Runtime value of every rendered program.
pub const RUNTIME: &str = "yaml";

/// Function argument carrying the SAS start time.
pub const SAS_START_ARGUMENT: &str = "sharedAccessStartTime";

/// Serialization format of a rendered program.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderFormat {
    #[default]
    Yaml,
    Json,
}

impl RenderFormat {
    /// Guesses the format from a file extension. Unknown extensions are YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::Json,
            _ => Self::Yaml,
        }
    }
}

impl std::fmt::Display for RenderFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderFormat::Yaml => write!(f, "yaml"),
            RenderFormat::Json => write!(f, "json"),
        }
    }
}

/// The `Pulumi.yaml` document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PulumiYamlDocument {
    pub name: String,
    pub runtime: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub variables: IndexMap<String, VariableEntry>,
    #[serde(default)]
    pub resources: IndexMap<String, ResourceEntry>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub outputs: IndexMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableEntry {
    #[serde(rename = "fn::invoke")]
    pub invoke: InvokeEntry,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvokeEntry {
    pub function: String,
    pub arguments: Value,
    #[serde(rename = "return", default, skip_serializing_if = "Option::is_none")]
    pub return_field: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceEntry {
    #[serde(rename = "type")]
    pub type_token: String,
    pub name: String,
    #[serde(default = "empty_object", skip_serializing_if = "is_empty_object")]
    pub properties: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<ResourceOptions>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceOptions {
    #[serde(rename = "dependsOn")]
    pub depends_on: Vec<String>,
}

fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}

fn is_empty_object(value: &Value) -> bool {
    match value {
        Value::Object(map) => map.is_empty(),
        Value::Null => true,
        _ => false,
    }
}

impl PulumiYamlDocument {
    /// Builds the document for `program`.
    pub fn from_program(program: &Program) -> Self {
        let variables = program
            .variables()
            .iter()
            .map(|(symbol, decl)| {
                let entry = VariableEntry {
                    invoke: InvokeEntry {
                        function: decl.function.clone(),
                        arguments: decl.arguments.clone(),
                        return_field: decl.return_field.clone(),
                    },
                };
                (symbol.clone(), entry)
            })
            .collect();

        let resources = program
            .resources()
            .iter()
            .map(|(symbol, decl)| {
                let options = (!decl.depends_on.is_empty()).then(|| ResourceOptions {
                    depends_on: decl
                        .depends_on
                        .iter()
                        .map(|dep| format!("${{{}}}", dep))
                        .collect(),
                });
                let entry = ResourceEntry {
                    type_token: decl.type_token.clone(),
                    name: decl.name.clone(),
                    properties: decl.properties.clone(),
                    options,
                };
                (symbol.clone(), entry)
            })
            .collect();

        Self {
            name: program.project().to_string(),
            runtime: RUNTIME.to_string(),
            description: program.description().map(str::to_string),
            variables,
            resources,
            outputs: program.outputs().clone(),
        }
    }

    /// Serializes the document.
    pub fn to_text(&self, format: RenderFormat) -> Result<String> {
        let text = match format {
            RenderFormat::Yaml => serde_yaml::to_string(self)?,
            RenderFormat::Json => {
                let mut json = serde_json::to_string_pretty(self)?;
                json.push('\n');
                json
            }
        };
        debug!(format = %format, bytes = text.len(), "Rendered program");
        Ok(text)
    }

    /// Parses a previously rendered document.
    pub fn parse(text: &str, format: RenderFormat) -> Result<Self> {
        let document: Self = match format {
            RenderFormat::Yaml => serde_yaml::from_str(text)?,
            RenderFormat::Json => serde_json::from_str(text)?,
        };
        if document.runtime != RUNTIME {
            return Err(Error::Render(format!(
                "unsupported runtime '{}', expected '{}'",
                document.runtime, RUNTIME
            )));
        }
        Ok(document)
    }

    /// SAS start time recorded in the document, if any.
    ///
    /// Rendering again with this instant reproduces the same validity window,
    /// so a diff only shows configuration changes.
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.variables.values().find_map(|entry| {
            entry
                .invoke
                .arguments
                .get(SAS_START_ARGUMENT)
                .and_then(Value::as_str)
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|t| t.with_timezone(&Utc))
        })
    }
}

/// Renders `program` in `format`.
pub fn render(program: &Program, format: RenderFormat) -> Result<String> {
    PulumiYamlDocument::from_program(program).to_text(format)
}
