//! Loading project and stack files from disk.

mod common;

use common::*;
use pretty_assertions::assert_eq;

use edgestack::error::Error;
use edgestack::settings::{stack_file_name, StackSettings};

#[tokio::test]
async fn test_load_from_project_dir() {
    let fixture = StackFixture::new("staging");
    let project = fixture.write_project();

    let settings = StackSettings::load(project.path(), "staging").await.unwrap();

    assert_eq!(settings.project(), PROJECT);
    assert_eq!(settings.stack(), "staging");
    assert_eq!(settings.description(), Some("Edge stack for acme"));
    assert_eq!(
        settings.source(),
        Some(project.join(&stack_file_name("staging")).as_path())
    );
    assert_eq!(
        settings.namespace("azure-native").require("location").unwrap(),
        "westeurope"
    );
}

#[tokio::test]
async fn test_several_stacks_in_one_project() {
    let project = StackFixture::new("dev").write_project();
    let mut prod = StackFixture::new("prod");
    prod.set("azure-native:location", "northeurope");
    project.add_stack(&prod);

    let dev = StackSettings::load(project.path(), "dev").await.unwrap();
    let prod = StackSettings::load(project.path(), "prod").await.unwrap();

    assert_eq!(dev.namespace("azure-native").require("location").unwrap(), "westeurope");
    assert_eq!(prod.namespace("azure-native").require("location").unwrap(), "northeurope");
}

#[tokio::test]
async fn test_missing_stack_file() {
    let project = StackFixture::new("dev").write_project();

    let err = StackSettings::load(project.path(), "prod").await.unwrap_err();

    match &err {
        Error::SettingsLoad { path, .. } => {
            assert_eq!(path, &project.join("Pulumi.prod.yaml"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(err.is_config_error());
    assert_eq!(err.exit_code(), 4);
}

#[tokio::test]
async fn test_malformed_stack_file() {
    let project = StackFixture::new("dev").write_project();
    std::fs::write(project.join("Pulumi.dev.yaml"), "config: [unclosed").unwrap();

    let err = StackSettings::load(project.path(), "dev").await.unwrap_err();
    assert!(matches!(err, Error::SettingsLoad { .. }));
}

#[test]
fn test_bare_keys_use_project_namespace() {
    let stack_yaml = "config:\n  url: https://github.com/acme/edge\n";
    let settings = StackSettings::from_documents(PROJECT_YAML, stack_yaml, "dev").unwrap();

    assert_eq!(settings.keys().collect::<Vec<_>>(), vec!["acme:url"]);
    assert_eq!(
        settings.namespace(PROJECT).require("url").unwrap(),
        "https://github.com/acme/edge"
    );
}

#[test]
fn test_null_config_section_is_empty() {
    let settings = StackSettings::from_documents(PROJECT_YAML, "config:\n", "dev").unwrap();
    assert_eq!(settings.keys().count(), 0);

    let settings = StackSettings::from_documents(PROJECT_YAML, "config: null\n", "dev").unwrap();
    assert_eq!(settings.keys().count(), 0);
}

#[test]
fn test_scalar_required_but_object_given() {
    let mut fixture = StackFixture::new("dev");
    fixture.set("azure-native:location", "{ region: westeurope }");

    let err = fixture
        .settings()
        .namespace("azure-native")
        .require("location")
        .unwrap_err();
    assert!(matches!(err, Error::InvalidConfig { ref key, .. } if key == "azure-native:location"));
}
