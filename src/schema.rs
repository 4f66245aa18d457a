//! Declarative output schema: ordered field descriptors and how each one
//! finds its header column.

use crate::error::{ComuniError, Result};
use crate::types::constants::TRUNCATION_MARKER;
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Value domain of an output field
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum SemanticType {
    String,
    Boolean,
    Int32,
    Int64,
    /// A type name the materializer does not implement
    Unsupported(String),
}

impl SemanticType {
    /// Map a declared type name; `int` is the 64-bit default width
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "string" | "str" => SemanticType::String,
            "bool" | "boolean" => SemanticType::Boolean,
            "int32" => SemanticType::Int32,
            "int" | "int64" | "integer" => SemanticType::Int64,
            _ => SemanticType::Unsupported(name.trim().to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            SemanticType::String => "string",
            SemanticType::Boolean => "bool",
            SemanticType::Int32 => "int32",
            SemanticType::Int64 => "int64",
            SemanticType::Unsupported(name) => name,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, SemanticType::Unsupported(_))
    }
}

impl From<String> for SemanticType {
    fn from(name: String) -> Self {
        SemanticType::from_name(&name)
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a declared key is matched against header cells
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingKey {
    /// Whole header text, ignoring case and surrounding whitespace
    Exact(String),
    /// Leading part of the header text, ignoring case
    Prefix(String),
}

impl BindingKey {
    pub fn parse(key: &str) -> Self {
        let key = key.trim();
        match key.strip_suffix(TRUNCATION_MARKER) {
            Some(prefix) => BindingKey::Prefix(prefix.trim().to_string()),
            None => BindingKey::Exact(key.to_string()),
        }
    }

    /// Check a header cell. `header` must already be trimmed.
    pub fn matches(&self, header: &str) -> bool {
        match self {
            BindingKey::Exact(key) => eq_ignore_case(header, key),
            BindingKey::Prefix(prefix) => {
                let len = prefix.chars().count();
                let head = match header.char_indices().nth(len) {
                    Some((end, _)) => &header[..end],
                    None if header.chars().count() == len => header,
                    None => return false,
                };
                eq_ignore_case(head, prefix)
            }
        }
    }
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

/// One declared output field
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldDescriptor {
    #[serde(rename = "field")]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: SemanticType,
    /// Header name, optionally ending in the truncation marker
    pub key: String,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, kind: SemanticType, key: impl Into<String>) -> Self {
        FieldDescriptor {
            name: name.into(),
            kind,
            key: key.into(),
        }
    }

    pub fn binding_key(&self) -> BindingKey {
        BindingKey::parse(&self.key)
    }
}

/// Ordered list of field descriptors with unique names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<FieldDescriptor>,
}

impl Schema {
    pub fn new(fields: Vec<FieldDescriptor>) -> Result<Self> {
        let mut seen = HashSet::new();
        for field in &fields {
            if field.name.trim().is_empty() {
                return Err(ComuniError::ConfigError(
                    "schema contains a field with an empty name".to_string(),
                ));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(ComuniError::ConfigError(format!(
                    "duplicate field name \"{}\" in schema",
                    field.name
                )));
            }
        }
        Ok(Schema { fields })
    }

    /// For static tables whose field names are known to be unique
    pub(crate) fn new_unchecked(fields: Vec<FieldDescriptor>) -> Self {
        Schema { fields }
    }

    /// Load a schema from a JSON array of `{"field", "type", "key"}` objects
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let fields: Vec<FieldDescriptor> = serde_json::from_reader(reader)
            .map_err(|e| ComuniError::ConfigError(format!("invalid schema: {}", e)))?;
        Schema::new(fields)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref()).map_err(|e| {
            ComuniError::ConfigError(format!(
                "can't open schema file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Schema::from_reader(file)
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
