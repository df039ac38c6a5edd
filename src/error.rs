//! Error types for Edgestack.
//!
//! Two families matter to a user: configuration validation failures, raised
//! before any declaration is added, and declaration failures, raised while the
//! program is being assembled. Provider-side failures never reach this crate;
//! they surface from the engine that applies the rendered program.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Edgestack operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for Edgestack.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// A required stack configuration key is absent.
    #[error("Missing required configuration '{namespace}:{key}'")]
    MissingConfig {
        /// Configuration namespace (e.g. `azure-native`)
        namespace: String,
        /// Key inside the namespace
        key: String,
    },

    /// A configuration value is present but unusable.
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidConfig {
        /// Fully qualified configuration key
        key: String,
        /// Error message
        message: String,
    },

    /// Generic configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failed to load a project or stack settings file.
    #[error("Failed to load settings from '{path}': {message}")]
    SettingsLoad {
        /// Path to the settings file
        path: PathBuf,
        /// Error message
        message: String,
    },

    // ========================================================================
    // Declaration Errors
    // ========================================================================
    /// Symbol is not a valid program identifier.
    #[error("Invalid symbol '{0}': expected [A-Za-z_][A-Za-z0-9_]*")]
    InvalidSymbol(String),

    /// Two declarations share a symbol.
    #[error("Declaration '{0}' already exists")]
    DuplicateDeclaration(String),

    /// A property references a symbol that has not been declared yet.
    #[error("Declaration '{from}' references unknown symbol '{symbol}'")]
    UnknownReference {
        /// Declaration holding the reference
        from: String,
        /// Referenced symbol
        symbol: String,
    },

    /// An explicit dependency names a symbol that has not been declared yet.
    #[error("Declaration '{from}' depends on unknown symbol '{symbol}'")]
    UnknownDependency {
        /// Declaration holding the dependency
        from: String,
        /// Dependency symbol
        symbol: String,
    },

    /// Declaration properties must be an object.
    #[error("Properties of '{0}' must be a JSON object")]
    InvalidProperties(String),

    /// The shared access signature window cannot be computed.
    #[error("Invalid SAS validity window: {0}")]
    SasWindow(String),

    // ========================================================================
    // Graph Errors
    // ========================================================================
    /// Lookup of a node that is not part of the graph.
    #[error("Declaration '{0}' not found in dependency graph")]
    NodeNotFound(String),

    /// A dependency cycle prevents ordering.
    #[error("Dependency cycle detected: {0}")]
    DependencyCycle(String),

    // ========================================================================
    // Rendering Errors
    // ========================================================================
    /// Rendering the program failed.
    #[error("Failed to render program: {0}")]
    Render(String),

    // ========================================================================
    // IO Errors
    // ========================================================================
    /// File not found.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ========================================================================
    // Serialization Errors
    // ========================================================================
    /// YAML parsing error.
    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    // ========================================================================
    // Other Errors
    // ========================================================================
    /// Generic error with source.
    #[error("{message}")]
    Other {
        /// Error message
        message: String,
        /// Source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl Error {
    /// Creates a new missing configuration error.
    pub fn missing_config(namespace: impl Into<String>, key: impl Into<String>) -> Self {
        Self::MissingConfig {
            namespace: namespace.into(),
            key: key.into(),
        }
    }

    /// Creates a new invalid configuration error.
    pub fn invalid_config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Creates a new settings load error.
    pub fn settings_load(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::SettingsLoad {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Returns true if this error comes from configuration validation.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Error::MissingConfig { .. }
                | Error::InvalidConfig { .. }
                | Error::Config(_)
                | Error::SettingsLoad { .. }
        )
    }

    /// Returns the error code for CLI exit status.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::MissingConfig { .. }
            | Error::InvalidConfig { .. }
            | Error::Config(_)
            | Error::SettingsLoad { .. } => 4,
            Error::InvalidSymbol(_)
            | Error::DuplicateDeclaration(_)
            | Error::UnknownReference { .. }
            | Error::UnknownDependency { .. }
            | Error::InvalidProperties(_)
            | Error::SasWindow(_)
            | Error::NodeNotFound(_)
            | Error::DependencyCycle(_) => 2,
            _ => 1,
        }
    }
}

/// Extension trait for adding context to errors.
pub trait ErrorContext<T> {
    /// Adds context to an error.
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Adds context with a closure that is only evaluated on error.
    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Other {
            message: message.into(),
            source: Some(Box::new(e)),
        })
    }

    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| Error::Other {
            message: f().into(),
            source: Some(Box::new(e)),
        })
    }
}
