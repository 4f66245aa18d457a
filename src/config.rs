use crate::error::{ComuniError, Result};
use crate::types::constants::{
    COMMENT_CHAR, DEFAULT_CONVERT_OUTPUT, FETCH_TIMEOUT_SECS, FIELD_DELIM, ISTAT_COMUNI_CSV_URL,
};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Delimited table dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect {
    pub delimiter: u8,
    pub comment: u8,
}

impl Dialect {
    /// Build a dialect; both characters must be single-byte ASCII
    pub fn new(delimiter: char, comment: char) -> Result<Self> {
        if delimiter == comment {
            return Err(ComuniError::ConfigError(format!(
                "delimiter and comment prefix must differ (both are {:?})",
                delimiter
            )));
        }
        Ok(Dialect {
            delimiter: ascii_byte("delimiter", delimiter)?,
            comment: ascii_byte("comment prefix", comment)?,
        })
    }
}

impl Default for Dialect {
    fn default() -> Self {
        Dialect {
            delimiter: FIELD_DELIM as u8,
            comment: COMMENT_CHAR as u8,
        }
    }
}

fn ascii_byte(what: &str, c: char) -> Result<u8> {
    if (c.is_ascii() && !c.is_ascii_control()) || c == '\t' {
        Ok(c as u8)
    } else {
        Err(ComuniError::ConfigError(format!(
            "{} must be a printable ASCII character, got {:?}",
            what, c
        )))
    }
}

/// HTTP transport settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// Skip TLS certificate verification
    pub allow_insecure: bool,
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        TransportConfig {
            allow_insecure: false,
            timeout: Duration::from_secs(FETCH_TIMEOUT_SECS),
        }
    }
}

impl TransportConfig {
    /// Overlay `COMUNI_ALLOW_INSECURE` and `COMUNI_FETCH_TIMEOUT` from `lookup`
    pub fn with_vars<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("COMUNI_ALLOW_INSECURE") {
            self.allow_insecure = parse_flag("COMUNI_ALLOW_INSECURE", &value)?;
        }
        if let Some(value) = lookup("COMUNI_FETCH_TIMEOUT") {
            let secs: u64 = value.trim().parse().map_err(|_| {
                ComuniError::ConfigError(format!(
                    "COMUNI_FETCH_TIMEOUT must be a number of seconds, got {:?}",
                    value
                ))
            })?;
            self.timeout = Duration::from_secs(secs);
        }
        Ok(self)
    }
}

fn parse_flag(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" | "" => Ok(false),
        _ => Err(ComuniError::ConfigError(format!(
            "{} must be true or false, got {:?}",
            name, value
        ))),
    }
}

/// Conversion configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Local path or http(s) URL
    pub source: String,
    pub output: PathBuf,
    /// JSON schema file replacing the built-in municipality schema
    pub schema: Option<PathBuf>,
    pub pretty: bool,
    pub dialect: Dialect,
    pub transport: TransportConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            source: ISTAT_COMUNI_CSV_URL.to_string(),
            output: PathBuf::from(DEFAULT_CONVERT_OUTPUT),
            schema: None,
            pretty: false,
            dialect: Dialect::default(),
            transport: TransportConfig::default(),
        }
    }
}

impl Config {
    pub fn new(source: impl Into<String>, output: impl Into<PathBuf>) -> Self {
        Config {
            source: source.into(),
            output: output.into(),
            ..Config::default()
        }
    }

    /// Overlay environment variables onto `self`
    pub fn with_env(self) -> Result<Self> {
        self.with_vars(|name| env::var(name).ok())
    }

    /// Same as [`Config::with_env`] with an explicit variable lookup
    pub fn with_vars<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(source) = lookup("COMUNI_SOURCE").filter(|s| !s.trim().is_empty()) {
            self.source = source.trim().to_string();
        }
        self.transport = self.transport.with_vars(lookup)?;
        Ok(self)
    }

    pub fn with_transport(mut self, transport: TransportConfig) -> Self {
        self.transport = transport;
        self
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }
}
