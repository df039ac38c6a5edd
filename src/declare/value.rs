//! Symbols, output references and interpolation helpers.

use std::collections::BTreeSet;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Serialize, Serializer};
use serde_json::{json, Value};

use crate::error::{Error, Result};

static SYMBOL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("Invalid symbol regex"));

// Group 1 captures a leading `$`, which marks the `$${` literal escape.
static REFERENCE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\$?)\$\{([A-Za-z_][A-Za-z0-9_]*)").expect("Invalid reference regex")
});

/// Program-local identifier of a declaration.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(String);

impl Symbol {
    /// Validates and wraps `name`.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if SYMBOL_REGEX.is_match(&name) {
            Ok(Self(name))
        } else {
            Err(Error::InvalidSymbol(name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for Symbol {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Reference to the output of another declaration.
///
/// Renders as `${symbol.property}`, or `${symbol}` when it names a whole
/// declaration (a variable value or a `dependsOn` target).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OutputRef {
    symbol: Symbol,
    property: Option<String>,
}

impl OutputRef {
    pub(crate) fn new(symbol: Symbol, property: Option<String>) -> Self {
        Self { symbol, property }
    }

    /// Referenced declaration.
    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Referenced output property, if any.
    pub fn property(&self) -> Option<&str> {
        self.property.as_deref()
    }
}

impl fmt::Display for OutputRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.property {
            Some(property) => write!(f, "${{{}.{}}}", self.symbol, property),
            None => write!(f, "${{{}}}", self.symbol),
        }
    }
}

impl Serialize for OutputRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl From<OutputRef> for Value {
    fn from(reference: OutputRef) -> Self {
        Value::String(reference.to_string())
    }
}

impl From<&OutputRef> for Value {
    fn from(reference: &OutputRef) -> Self {
        Value::String(reference.to_string())
    }
}

/// Escapes `${` so a literal string is never read as an interpolation.
pub fn escape_literal(text: &str) -> String {
    text.replace("${", "$${")
}

/// Wraps a literal string as a JSON value, escaped.
pub fn literal(text: &str) -> Value {
    Value::String(escape_literal(text))
}

/// Marks a value as secret in the rendered program.
pub fn secret(value: impl Into<Value>) -> Value {
    json!({ "fn::secret": value.into() })
}

/// Collects every symbol referenced by interpolations inside `value`.
pub fn references(value: &Value) -> BTreeSet<String> {
    let mut found = BTreeSet::new();
    collect_references(value, &mut found);
    found
}

fn collect_references(value: &Value, found: &mut BTreeSet<String>) {
    match value {
        Value::String(text) => {
            for caps in REFERENCE_REGEX.captures_iter(text) {
                if caps.get(1).is_some_and(|m| !m.as_str().is_empty()) {
                    continue;
                }
                if let Some(symbol) = caps.get(2) {
                    found.insert(symbol.as_str().to_string());
                }
            }
        }
        Value::Array(items) => items.iter().for_each(|v| collect_references(v, found)),
        Value::Object(map) => map.values().for_each(|v| collect_references(v, found)),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_validation() {
        assert!(Symbol::new("storageAccount").is_ok());
        assert!(Symbol::new("_private1").is_ok());
        assert!(matches!(
            Symbol::new("rg-acme"),
            Err(Error::InvalidSymbol(ref s)) if s == "rg-acme"
        ));
        assert!(Symbol::new("1st").is_err());
        assert!(Symbol::new("").is_err());
    }

    #[test]
    fn test_output_ref_display() {
        let symbol = Symbol::new("storageAccount").unwrap();
        let name = OutputRef::new(symbol.clone(), Some("name".to_string()));
        assert_eq!(name.to_string(), "${storageAccount.name}");
        assert_eq!(OutputRef::new(symbol, None).to_string(), "${storageAccount}");
    }

    #[test]
    fn test_references_nested() {
        let value = json!({
            "host": "${storageAccount.name}.blob.core.windows.net",
            "link": { "id": "${storageAccount.id}" },
            "domains": [{ "id": "${endpoint.id}" }, { "id": "${customDomain.id}" }],
            "port": 443
        });
        let refs: Vec<_> = references(&value).into_iter().collect();
        assert_eq!(refs, vec!["customDomain", "endpoint", "storageAccount"]);
    }

    #[test]
    fn test_escaped_literal_is_not_a_reference() {
        let value = literal("https://example.com/${notARef}");
        assert_eq!(value, json!("https://example.com/$${notARef}"));
        assert!(references(&value).is_empty());
    }

    #[test]
    fn test_secret_wraps_value() {
        let value = secret("${sasToken}");
        assert_eq!(value, json!({ "fn::secret": "${sasToken}" }));
        assert!(references(&value).contains("sasToken"));
    }
}
