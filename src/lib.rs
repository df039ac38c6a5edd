//! # Edgestack - Azure edge stack as a Pulumi YAML program
//!
//! Edgestack declares the infrastructure of one application environment on
//! Azure and renders it as a Pulumi YAML program (`runtime: yaml`). The engine
//! that consumes the program owns state, diffing and provider calls; this crate
//! owns naming, configuration validation, declaration wiring and ordering.
//!
//! ## Core Concepts
//!
//! - **Stack settings**: `Pulumi.yaml` and `Pulumi.<stack>.yaml`, read through namespaced keys
//! - **Declarations**: resources and function calls keyed by a program symbol
//! - **Output references**: `${symbol.property}` values, the only way one declaration consumes another
//! - **Components**: common, network, key vault, storage and Front Door building blocks
//! - **Findings**: configuration that is legal but questionable, reported by `check`
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                           CLI Interface                              │
//! │                    (clap-based command parsing)                      │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                    │
//!                                    ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                 Stack settings + StackInputs validation              │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                    │
//!          ┌─────────────────────────┼─────────────────────────┐
//!          ▼                         ▼                         ▼
//! ┌─────────────────┐   ┌─────────────────────┐   ┌─────────────────────┐
//! │   Components    │   │   Program (symbols, │   │     Lint rules      │
//! │  (declare leaf  │──▶│   references,       │   │  (KV001, ST001...)  │
//! │     first)      │   │   dependsOn)        │   │                     │
//! └─────────────────┘   └─────────────────────┘   └─────────────────────┘
//!                                    │
//!                    ┌───────────────┴───────────────┐
//!                    ▼                               ▼
//! ┌─────────────────────────────────┐ ┌─────────────────────────────────┐
//! │  Dependency graph (petgraph)    │ │  Render (Pulumi YAML / JSON)    │
//! └─────────────────────────────────┘ └─────────────────────────────────┘
//! ```
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use edgestack::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let settings = StackSettings::load(Path::new("."), "staging").await?;
//!     let inputs = StackInputs::from_settings(&settings)?;
//!
//!     let stack = declare_stack(&inputs)?;
//!     println!("{}", render(&stack.program, RenderFormat::Yaml)?);
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Re-export commonly used items in prelude
pub mod prelude {
    //! Convenient re-exports of commonly used types.

    // Error handling
    pub use crate::error::{Error, Result};

    // Settings
    pub use crate::settings::{Namespace, StackSettings};

    // Declarations
    pub use crate::declare::{Handle, OutputRef, Program, ResourceDecl, VariableDecl};

    // Components
    pub use crate::components::{declare_stack, DeclaredStack, StackInputs};

    // Naming
    pub use crate::naming::{CacheBehavior, StackNames};

    // Graph
    pub use crate::graph::DependencyGraph;

    // Rendering
    pub use crate::render::{render, PulumiYamlDocument, RenderFormat};

    // Findings
    pub use crate::lint::{check_stack, LintResult, Severity};
}

// ============================================================================
// Core Modules
// ============================================================================

/// Error types and result aliases for Edgestack operations.
pub mod error;

/// Tool configuration (defaults, logging, colors, lint selection).
pub mod config;

/// Pulumi project and stack settings.
pub mod settings;

/// Naming rules derived from project and stack names.
pub mod naming;

// ============================================================================
// Declaration Model
// ============================================================================

/// Symbols, output references and the program container.
pub mod declare;

/// Dependency graph over declarations.
pub mod graph;

/// Shared access signature validity window.
pub mod sas;

/// The stack components and the orchestrator.
pub mod components;

// ============================================================================
// Reporting
// ============================================================================

/// Configuration findings.
pub mod lint;

/// Pulumi YAML rendering.
pub mod render;

/// Diff between rendered programs.
pub mod diff;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
