//! Header-to-field binding.

use crate::schema::{FieldDescriptor, Schema};
use tracing::{debug, warn};

/// A field descriptor and the header column it resolved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub descriptor: FieldDescriptor,
    /// None when no header column matched
    pub column: Option<usize>,
    /// Trimmed header text of the bound column
    pub header: Option<String>,
}

impl Binding {
    pub fn is_bound(&self) -> bool {
        self.column.is_some()
    }
}

/// Column index to field mapping built once per header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingTable {
    /// One entry per schema field, in schema order
    bindings: Vec<Binding>,
    /// One entry per header column: index into `bindings`
    by_column: Vec<Option<usize>>,
}

impl BindingTable {
    /// Resolve every schema field against `header`.
    ///
    /// Columns are always scanned in ascending index order, so a key that
    /// could match several columns binds to the lowest one. A column
    /// already claimed by an earlier field is not reassigned: the later
    /// field stays unbound even when a higher column would also match.
    pub fn bind(header: &[String], schema: &Schema) -> Self {
        let normalized: Vec<&str> = header.iter().map(|cell| cell.trim()).collect();
        let mut by_column: Vec<Option<usize>> = vec![None; normalized.len()];
        let mut bindings = Vec::with_capacity(schema.len());

        for (field_idx, descriptor) in schema.fields().iter().enumerate() {
            let key = descriptor.binding_key();
            let mut column = normalized.iter().position(|cell| key.matches(cell));

            if let Some(col) = column {
                if let Some(owner) = by_column[col] {
                    let owner: &Binding = &bindings[owner];
                    warn!(
                        field = %descriptor.name,
                        column = col,
                        owner = %owner.descriptor.name,
                        "header column already bound to an earlier field"
                    );
                    column = None;
                }
            }

            match column {
                Some(col) => {
                    debug!(
                        field = %descriptor.name,
                        column = col,
                        header = normalized[col],
                        "bound field"
                    );
                    by_column[col] = Some(field_idx);
                }
                None => warn!(
                    field = %descriptor.name,
                    key = %descriptor.key,
                    "no header column for field"
                ),
            }

            bindings.push(Binding {
                descriptor: descriptor.clone(),
                column,
                header: column.map(|col| normalized[col].to_string()),
            });
        }

        for (col, owner) in by_column.iter().enumerate() {
            if owner.is_none() {
                debug!(column = col, header = normalized[col], "ignoring unmapped header column");
            }
        }

        BindingTable {
            bindings,
            by_column,
        }
    }

    /// All bindings in schema order, bound or not
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Binding for a header column, with its position in schema order
    pub fn field_at(&self, column: usize) -> Option<(usize, &Binding)> {
        let idx = (*self.by_column.get(column)?)?;
        Some((idx, &self.bindings[idx]))
    }

    /// Number of header columns the table was built from
    pub fn column_count(&self) -> usize {
        self.by_column.len()
    }

    pub fn bound(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.iter().filter(|b| b.is_bound())
    }

    pub fn unbound(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.bindings
            .iter()
            .filter(|b| !b.is_bound())
            .map(|b| &b.descriptor)
    }
}
