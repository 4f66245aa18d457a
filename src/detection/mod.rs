pub mod charset;

pub use charset::{convert_to_utf8, detect_charset, DetectedEncoding};
