use crate::types::constants::ENCODING_PEEK_SIZE;
use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};
use tracing::{debug, warn};

/// Allow guessing UTF-8 encoding
const ALLOW_UTF8: bool = true;

/// Outcome of encoding detection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectedEncoding {
    pub encoding: &'static Encoding,
    /// false when the encoding is a best guess
    pub certain: bool,
}

impl DetectedEncoding {
    pub fn name(&self) -> &'static str {
        self.encoding.name()
    }
}

/// Detect the character encoding of `data` from its leading bytes.
/// `data` itself is left untouched; only a peek of it is inspected.
pub fn detect_charset(data: &[u8]) -> DetectedEncoding {
    let peek = &data[..data.len().min(ENCODING_PEEK_SIZE)];
    let detected = detect_from_peek(peek, peek.len() == data.len());
    debug!(
        encoding = detected.name(),
        certain = detected.certain,
        peeked = peek.len(),
        "detected input encoding"
    );
    detected
}

/// Detect the encoding of a peek. `complete` tells whether the peek holds
/// the whole input, so a multi-byte sequence cut at its end is not an error.
pub fn detect_from_peek(peek: &[u8], complete: bool) -> DetectedEncoding {
    // Check for BOM markers first
    if let Some((encoding, _)) = Encoding::for_bom(peek) {
        return DetectedEncoding {
            encoding,
            certain: true,
        };
    }

    if let Some(has_non_ascii) = check_utf8(peek, complete) {
        // Pure ASCII is also valid windows-1252, so it's only a guess
        return DetectedEncoding {
            encoding: UTF_8,
            certain: has_non_ascii,
        };
    }

    let mut detector = EncodingDetector::new();
    detector.feed(peek, complete);
    DetectedEncoding {
        encoding: detector.guess(None, ALLOW_UTF8),
        certain: false,
    }
}

/// Returns whether `data` contains non-ASCII bytes if it is valid UTF-8,
/// None otherwise.
fn check_utf8(data: &[u8], complete: bool) -> Option<bool> {
    match std::str::from_utf8(data) {
        Ok(text) => Some(!text.is_ascii()),
        // Truncated sequence at the end of a partial peek
        Err(e) if e.error_len().is_none() && !complete => Some(true),
        Err(_) => None,
    }
}

/// Convert data from the detected encoding to UTF-8, dropping any BOM.
/// Malformed sequences are replaced rather than rejected.
pub fn convert_to_utf8(data: &[u8], detected: &DetectedEncoding) -> String {
    let (decoded, had_errors) = detected.encoding.decode_with_bom_removal(data);
    if had_errors {
        warn!(
            encoding = detected.name(),
            "input contains sequences invalid for the detected encoding; replaced"
        );
    }
    decoded.into_owned()
}
