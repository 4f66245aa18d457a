use crate::types::ErrorKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ComuniError {
    #[error("can't acquire '{origin}': {message}")]
    Acquisition { origin: String, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("malformed table: {message}")]
    Parse { line: Option<u64>, message: String },

    #[error("can't convert {type_name} field '{field}' (column '{header}', line {line}) from {value:?}: {reason}")]
    TypeCoercion {
        field: String,
        header: String,
        type_name: String,
        line: u64,
        value: String,
        reason: String,
    },

    #[error("field '{field}' declares unsupported type '{type_name}'")]
    UnsupportedFieldType { field: String, type_name: String },

    #[error("can't serialize records: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ComuniError {
    pub fn error_kind(&self) -> ErrorKind {
        match self {
            ComuniError::Acquisition { .. } => ErrorKind::Acquisition,
            ComuniError::IoError(_) => ErrorKind::Process,
            ComuniError::Parse { .. } => ErrorKind::Parse,
            ComuniError::TypeCoercion { .. } => ErrorKind::TypeCoercion,
            ComuniError::UnsupportedFieldType { .. } => ErrorKind::UnsupportedFieldType,
            ComuniError::Serialization(_) => ErrorKind::Serialization,
            ComuniError::ConfigError(_) => ErrorKind::Config,
        }
    }

    /// Source line the failure refers to, when known
    pub fn line(&self) -> Option<u64> {
        match self {
            ComuniError::Parse { line, .. } => *line,
            ComuniError::TypeCoercion { line, .. } => Some(*line),
            _ => None,
        }
    }

    /// Output field the failure refers to, when known
    pub fn field(&self) -> Option<&str> {
        match self {
            ComuniError::TypeCoercion { field, .. }
            | ComuniError::UnsupportedFieldType { field, .. } => Some(field),
            _ => None,
        }
    }

    pub(crate) fn acquisition(origin: impl Into<String>, err: impl std::fmt::Display) -> Self {
        ComuniError::Acquisition {
            origin: origin.into(),
            message: err.to_string(),
        }
    }
}

impl From<csv::Error> for ComuniError {
    fn from(err: csv::Error) -> Self {
        ComuniError::Parse {
            line: err.position().map(|p| p.line()),
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ComuniError>;
