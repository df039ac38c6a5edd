//! Shared test utilities and fixtures for the edgestack test suite.
//!
//! This module provides:
//! - A complete stack configuration fixture with per-key overrides
//! - Helpers that turn the fixture into settings, inputs or a declared stack
//! - Temporary project directories holding `Pulumi.yaml` and the stack file
//!
//! # Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::*;
//! ```

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone, Utc};
use tempfile::TempDir;

use edgestack::components::{declare_stack, DeclaredStack, StackInputs};
use edgestack::settings::{stack_file_name, StackSettings, PROJECT_FILE};

pub const PROJECT: &str = "acme";

pub const PROJECT_YAML: &str = "name: acme\ndescription: Edge stack for acme\n";

/// Instant used as SAS start in every fixture.
pub fn issued_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

// ============================================================================
// Stack Fixture
// ============================================================================

/// Stack configuration that passes validation, with overridable keys.
#[derive(Debug, Clone)]
pub struct StackFixture {
    pub project_yaml: String,
    pub stack: String,
    config: serde_yaml::Mapping,
}

impl StackFixture {
    /// Complete configuration for `stack`.
    pub fn new(stack: &str) -> Self {
        let mut fixture = Self {
            project_yaml: PROJECT_YAML.to_string(),
            stack: stack.to_string(),
            config: serde_yaml::Mapping::new(),
        };
        fixture
            .set("project:url", "https://github.com/acme/edge")
            .set("azure-native:location", "westeurope")
            .set(
                "azure-native:tenantID",
                "00000000-0000-0000-0000-000000000001",
            )
            .set(
                "azure-native:subscriptionID",
                "00000000-0000-0000-0000-000000000002",
            )
            .set(
                "frontDoor:params",
                r#"
sku: Standard_AzureFrontDoor
afdUriPrefix: "https://portal.azure.com/#@acme/resource/subscriptions/x/resourceGroups"
afdUriSuffix: providers/Microsoft.Cdn/profiles
"#,
            )
            .set(
                "vnet:params",
                "vnetAddressPrefixes: 10.0.0.0/16\nsnAddressPrefixes: 10.0.1.0/24",
            )
            .set("storageAccount:params", "sku: Standard_LRS\nkind: StorageV2");
        fixture
    }

    /// Sets `key` to the YAML value `yaml`.
    pub fn set(&mut self, key: &str, yaml: &str) -> &mut Self {
        let value: serde_yaml::Value = serde_yaml::from_str(yaml).unwrap();
        self.config.insert(serde_yaml::Value::from(key), value);
        self
    }

    /// Removes `key`.
    pub fn remove(&mut self, key: &str) -> &mut Self {
        self.config.remove(key);
        self
    }

    /// Renames the project.
    pub fn project(&mut self, name: &str) -> &mut Self {
        self.project_yaml = format!("name: {}\n", name);
        self
    }

    /// Content of `Pulumi.<stack>.yaml`.
    pub fn stack_yaml(&self) -> String {
        let mut document = serde_yaml::Mapping::new();
        document.insert(
            serde_yaml::Value::from("config"),
            serde_yaml::Value::Mapping(self.config.clone()),
        );
        serde_yaml::to_string(&document).unwrap()
    }

    pub fn settings(&self) -> StackSettings {
        StackSettings::from_documents(&self.project_yaml, &self.stack_yaml(), &self.stack).unwrap()
    }

    /// Validated inputs with the SAS start pinned to [`issued_at`].
    pub fn inputs(&self) -> StackInputs {
        StackInputs::from_settings(&self.settings())
            .unwrap()
            .with_issued_at(issued_at())
    }

    pub fn declare(&self) -> DeclaredStack {
        declare_stack(&self.inputs()).unwrap()
    }

    /// Writes the project and stack files into a fresh temporary directory.
    pub fn write_project(&self) -> TempProject {
        let dir = tempfile::tempdir().unwrap();
        write_project_files(dir.path(), &self.project_yaml, &self.stack, &self.stack_yaml());
        TempProject { dir }
    }
}

// ============================================================================
// Temporary Projects
// ============================================================================

/// A project directory removed on drop.
pub struct TempProject {
    dir: TempDir,
}

impl TempProject {
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn join(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Adds another stack file to the project.
    pub fn add_stack(&self, fixture: &StackFixture) {
        std::fs::write(
            self.join(&stack_file_name(&fixture.stack)),
            fixture.stack_yaml(),
        )
        .unwrap();
    }
}

pub fn write_project_files(dir: &Path, project_yaml: &str, stack: &str, stack_yaml: &str) {
    std::fs::write(dir.join(PROJECT_FILE), project_yaml).unwrap();
    std::fs::write(dir.join(stack_file_name(stack)), stack_yaml).unwrap();
}
