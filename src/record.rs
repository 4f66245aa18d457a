//! Typed records materialized from body rows.

use crate::binding::{Binding, BindingTable};
use crate::error::{ComuniError, Result};
use crate::reader::RawRow;
use crate::schema::SemanticType;
use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::debug;

/// A coerced cell value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    String(String),
    Boolean(bool),
    Int32(i32),
    Int64(i64),
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::String(s) => serializer.serialize_str(s),
            Value::Boolean(b) => serializer.serialize_bool(*b),
            Value::Int32(n) => serializer.serialize_i32(*n),
            Value::Int64(n) => serializer.serialize_i64(*n),
        }
    }
}

/// One output record. Values are kept in schema order; unbound fields are
/// absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedRecord {
    values: Vec<(String, Value)>,
}

impl TypedRecord {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Serialize for TypedRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in &self.values {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Coerce a raw cell to `kind`. The text is trimmed first.
pub fn coerce(kind: &SemanticType, raw: &str) -> std::result::Result<Value, String> {
    let text = raw.trim();
    match kind {
        SemanticType::String => Ok(Value::String(text.to_string())),
        SemanticType::Boolean => parse_bool(text).map(Value::Boolean),
        SemanticType::Int32 => text
            .parse::<i32>()
            .map(Value::Int32)
            .map_err(|e| e.to_string()),
        SemanticType::Int64 => text
            .parse::<i64>()
            .map(Value::Int64)
            .map_err(|e| e.to_string()),
        SemanticType::Unsupported(name) => Err(format!("unsupported type '{}'", name)),
    }
}

fn parse_bool(s: &str) -> std::result::Result<bool, String> {
    if s.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if s.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err("expected true or false".to_string())
    }
}

/// Turns body rows into typed records using a shared binding table
#[derive(Debug)]
pub struct Materializer<'a> {
    table: &'a BindingTable,
}

impl<'a> Materializer<'a> {
    /// Fails if any bound field declares a type we can't coerce to
    pub fn new(table: &'a BindingTable) -> Result<Self> {
        if let Some(binding) = table.bound().find(|b| !b.descriptor.kind.is_supported()) {
            return Err(ComuniError::UnsupportedFieldType {
                field: binding.descriptor.name.clone(),
                type_name: binding.descriptor.kind.name().to_string(),
            });
        }
        Ok(Materializer { table })
    }

    pub fn materialize_row(&self, row: &RawRow) -> Result<TypedRecord> {
        let mut slots: Vec<Option<Value>> = vec![None; self.table.bindings().len()];

        for (column, cell) in row.cells().iter().enumerate() {
            let Some((idx, binding)) = self.table.field_at(column) else {
                continue;
            };
            slots[idx] = Some(coerce_cell(binding, row.line(), cell)?);
        }

        let values = self
            .table
            .bindings()
            .iter()
            .zip(slots)
            .filter_map(|(binding, slot)| slot.map(|v| (binding.descriptor.name.clone(), v)))
            .collect();
        Ok(TypedRecord { values })
    }

    /// Materialize every row in order; the first failure aborts.
    pub fn materialize(&self, rows: &[RawRow]) -> Result<Vec<TypedRecord>> {
        let records = rows
            .iter()
            .map(|row| self.materialize_row(row))
            .collect::<Result<Vec<_>>>()?;
        debug!(records = records.len(), "materialized records");
        Ok(records)
    }
}

fn coerce_cell(binding: &Binding, line: u64, cell: &str) -> Result<Value> {
    let descriptor = &binding.descriptor;
    coerce(&descriptor.kind, cell).map_err(|reason| ComuniError::TypeCoercion {
        field: descriptor.name.clone(),
        header: binding.header.clone().unwrap_or_default(),
        type_name: descriptor.kind.name().to_string(),
        line,
        value: cell.to_string(),
        reason,
    })
}
