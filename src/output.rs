use crate::error::{ComuniError, Result};
use crate::record::TypedRecord;
use crate::types::ErrorKind;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Serialize records as a JSON array
pub fn records_to_json(records: &[TypedRecord], pretty: bool) -> Result<Vec<u8>> {
    let data = if pretty {
        serde_json::to_vec_pretty(records)?
    } else {
        serde_json::to_vec(records)?
    };
    Ok(data)
}

/// Write serialized output. Callers only get here once every record has
/// been materialized and serialized.
pub fn write_output(path: &Path, data: &[u8]) -> Result<()> {
    fs::write(path, data).map_err(|e| {
        ComuniError::IoError(std::io::Error::new(
            e.kind(),
            format!("can't write output file '{}': {}", path.display(), e),
        ))
    })
}

/// Error report JSON structure
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ErrorReport {
    pub error: ErrorKind,
    pub error_msg_user: String,
    pub error_msg_internal: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_line: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_field: Option<String>,
}

impl ErrorReport {
    pub fn new(kind: ErrorKind) -> Self {
        ErrorReport {
            error: kind,
            error_msg_user: kind.message().to_string(),
            error_msg_internal: String::new(),
            error_line: None,
            error_field: None,
        }
    }

    pub fn from_error(error: &ComuniError) -> Self {
        let mut report =
            ErrorReport::new(error.error_kind()).with_internal_message(error.to_string());
        report.error_line = error.line();
        report.error_field = error.field().map(str::to_string);
        report
    }

    /// Set internal error message
    pub fn with_internal_message(mut self, msg: String) -> Self {
        self.error_msg_internal = msg;
        self
    }

    /// Convert to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}
