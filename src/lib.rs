pub mod binding;
pub mod comune;
pub mod config;
pub mod converter;
pub mod detection;
pub mod error;
pub mod output;
pub mod reader;
pub mod record;
pub mod schema;
pub mod source;
pub mod types;

pub use binding::BindingTable;
pub use comune::{Comune, COMUNE_SCHEMA};
pub use config::{Config, Dialect, TransportConfig};
pub use converter::{run_convert, Conversion, Converter};
pub use error::{ComuniError, Result};
pub use record::{TypedRecord, Value};
pub use schema::{FieldDescriptor, Schema, SemanticType};
pub use source::Source;
pub use types::ErrorKind;
