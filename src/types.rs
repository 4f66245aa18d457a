use serde_repr::{Deserialize_repr, Serialize_repr};
use std::fmt;

/// Error category codes reported in the JSON error report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum ErrorKind {
    Process = 0,              // Unhandled I/O failure
    Acquisition = 1,          // Source could not be fetched or opened
    Parse = 2,                // Malformed table structure
    TypeCoercion = 3,         // Cell value does not fit its declared type
    UnsupportedFieldType = 4, // Schema declares a type we can't materialize
    Serialization = 5,        // Output could not be serialized
    Config = 6,               // Invalid configuration or schema file
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl ErrorKind {
    pub fn message(&self) -> &'static str {
        match self {
            ErrorKind::Process => "Unhandled I/O error",
            ErrorKind::Acquisition => "Could not read the source. Is the path or URL correct?",
            ErrorKind::Parse => "The source is not a well-formed delimited table",
            ErrorKind::TypeCoercion => "A value does not match the type declared for its field",
            ErrorKind::UnsupportedFieldType => "The schema declares an unsupported field type",
            ErrorKind::Serialization => "Could not serialize the converted records",
            ErrorKind::Config => "Invalid configuration",
        }
    }
}

/// Constants
pub mod constants {
    /// Official ISTAT export of the Italian municipalities
    pub const ISTAT_COMUNI_CSV_URL: &str =
        "https://www.istat.it/storage/codici-unita-amministrative/Elenco-comuni-italiani.csv";
    pub const DEFAULT_CONVERT_OUTPUT: &str = "comuni.json";
    pub const DEFAULT_DOWNLOAD_OUTPUT: &str = "comuni.csv";

    /// Leading bytes inspected by the encoding detector
    pub const ENCODING_PEEK_SIZE: usize = 1024;

    pub const FIELD_DELIM: char = ';';
    pub const COMMENT_CHAR: char = '#';

    /// Suffix marking a binding key as a header prefix
    pub const TRUNCATION_MARKER: &str = "...";

    pub const FETCH_TIMEOUT_SECS: u64 = 60;
}
