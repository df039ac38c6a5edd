//! Project and stack settings.
//!
//! Reads the two files a Pulumi project keeps next to its program:
//!
//! - `Pulumi.yaml` holds the project name (and an optional description)
//! - `Pulumi.<stack>.yaml` holds the stack configuration under `config:`
//!
//! Configuration keys are namespaced (`azure-native:location`). A key without a
//! namespace belongs to the project namespace, matching the engine's behaviour.
//! Values are read through a [`Namespace`], whose `require*` accessors fail fast
//! with [`Error::MissingConfig`] before any declaration is built.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};

/// Project file name.
pub const PROJECT_FILE: &str = "Pulumi.yaml";

/// Returns the stack settings file name for `stack`.
pub fn stack_file_name(stack: &str) -> String {
    format!("Pulumi.{}.yaml", stack)
}

#[derive(Debug, Deserialize)]
struct ProjectDocument {
    name: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct StackDocument {
    #[serde(default)]
    config: Option<IndexMap<String, serde_yaml::Value>>,
}

/// Settings of one project deployed as one stack.
#[derive(Debug, Clone)]
pub struct StackSettings {
    project: String,
    description: Option<String>,
    stack: String,
    config: IndexMap<String, serde_yaml::Value>,
    source: Option<PathBuf>,
}

impl StackSettings {
    /// Creates empty settings for `project` deployed as `stack`.
    pub fn new(project: impl Into<String>, stack: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            description: None,
            stack: stack.into(),
            config: IndexMap::new(),
            source: None,
        }
    }

    /// Sets a configuration value, qualifying bare keys with the project namespace.
    pub fn with_value(mut self, key: &str, value: serde_yaml::Value) -> Self {
        let key = self.qualify(key);
        self.config.insert(key, value);
        self
    }

    /// Sets a string configuration value.
    pub fn with_str(self, key: &str, value: &str) -> Self {
        self.with_value(key, serde_yaml::Value::String(value.to_string()))
    }

    /// Sets the project description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Parses settings from the contents of the project and stack files.
    pub fn from_documents(project_yaml: &str, stack_yaml: &str, stack: &str) -> Result<Self> {
        let project: ProjectDocument = serde_yaml::from_str(project_yaml)?;
        let document: StackDocument = if stack_yaml.trim().is_empty() {
            StackDocument::default()
        } else {
            serde_yaml::from_str(stack_yaml)?
        };

        let mut settings = Self::new(project.name, stack);
        settings.description = project.description;
        for (key, value) in document.config.unwrap_or_default() {
            settings = settings.with_value(&key, value);
        }

        Ok(settings)
    }

    /// Loads `Pulumi.yaml` and `Pulumi.<stack>.yaml` from `project_dir`.
    pub async fn load(project_dir: &Path, stack: &str) -> Result<Self> {
        let project_path = project_dir.join(PROJECT_FILE);
        let stack_path = project_dir.join(stack_file_name(stack));

        let project_yaml = tokio::fs::read_to_string(&project_path)
            .await
            .map_err(|e| Error::settings_load(&project_path, e.to_string()))?;
        let stack_yaml = tokio::fs::read_to_string(&stack_path)
            .await
            .map_err(|e| Error::settings_load(&stack_path, e.to_string()))?;

        let mut settings = Self::from_documents(&project_yaml, &stack_yaml, stack)
            .map_err(|e| Error::settings_load(&stack_path, e.to_string()))?;
        settings.source = Some(stack_path);

        debug!(
            project = %settings.project,
            stack = %settings.stack,
            keys = settings.config.len(),
            "Loaded stack settings"
        );

        Ok(settings)
    }

    /// Project name.
    pub fn project(&self) -> &str {
        &self.project
    }

    /// Stack (environment) name.
    pub fn stack(&self) -> &str {
        &self.stack
    }

    /// Project description, if any.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Path of the stack file these settings were loaded from.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Accessor for one configuration namespace.
    pub fn namespace(&self, name: &str) -> Namespace<'_> {
        Namespace {
            settings: self,
            name: name.to_string(),
        }
    }

    /// All fully qualified configuration keys, in file order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.config.keys().map(String::as_str)
    }

    fn qualify(&self, key: &str) -> String {
        if key.contains(':') {
            key.to_string()
        } else {
            format!("{}:{}", self.project, key)
        }
    }
}

/// Read access to the keys of one configuration namespace.
#[derive(Debug, Clone)]
pub struct Namespace<'a> {
    settings: &'a StackSettings,
    name: String,
}

impl Namespace<'_> {
    /// Namespace name.
    pub fn name(&self) -> &str {
        &self.name
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}:{}", self.name, key)
    }

    fn raw(&self, key: &str) -> Option<&serde_yaml::Value> {
        self.settings.config.get(&self.full_key(key))
    }

    /// Returns a scalar value as a string.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        match self.raw(key) {
            None | Some(serde_yaml::Value::Null) => Ok(None),
            Some(serde_yaml::Value::String(s)) => Ok(Some(s.clone())),
            Some(serde_yaml::Value::Bool(b)) => Ok(Some(b.to_string())),
            Some(serde_yaml::Value::Number(n)) => Ok(Some(n.to_string())),
            Some(_) => Err(Error::invalid_config(
                self.full_key(key),
                "expected a scalar value",
            )),
        }
    }

    /// Returns a scalar value, failing when it is absent or empty.
    pub fn require(&self, key: &str) -> Result<String> {
        match self.get(key)? {
            Some(value) if !value.trim().is_empty() => Ok(value),
            _ => Err(Error::missing_config(&self.name, key)),
        }
    }

    /// Deserializes an object value when present.
    pub fn get_object<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.raw(key) {
            None | Some(serde_yaml::Value::Null) => Ok(None),
            Some(value) => serde_yaml::from_value(value.clone())
                .map(Some)
                .map_err(|e| Error::invalid_config(self.full_key(key), e.to_string())),
        }
    }

    /// Deserializes an object value, failing when it is absent.
    pub fn require_object<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        self.get_object(key)?
            .ok_or_else(|| Error::missing_config(&self.name, key))
    }
}
