//! Input acquisition from a local file or an http(s) URL.

use crate::config::TransportConfig;
use crate::error::{ComuniError, Result};
use reqwest::blocking::{Client, Response};
use reqwest::Url;
use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Where the raw table comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Url(Url),
    Path(PathBuf),
}

impl Source {
    pub fn parse(source: &str) -> Result<Self> {
        let source = source.trim();
        if source.starts_with("https://") || source.starts_with("http://") {
            let url = Url::parse(source).map_err(|e| ComuniError::acquisition(source, e))?;
            Ok(Source::Url(url))
        } else {
            Ok(Source::Path(PathBuf::from(source)))
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Source::Url(_))
    }

    /// Read the whole source into memory
    pub fn fetch(&self, transport: &TransportConfig) -> Result<Vec<u8>> {
        let data = match self {
            Source::Url(url) => {
                let response = self.get(url, transport)?;
                response
                    .bytes()
                    .map(|b| b.to_vec())
                    .map_err(|e| ComuniError::acquisition(self.to_string(), e))?
            }
            Source::Path(path) => {
                fs::read(path).map_err(|e| ComuniError::acquisition(self.to_string(), e))?
            }
        };
        info!(
            source = %self,
            remote = self.is_remote(),
            bytes = data.len(),
            "acquired source"
        );
        Ok(data)
    }

    /// Copy the raw bytes of the source into `output`; returns the byte count
    pub fn download(&self, transport: &TransportConfig, output: &Path) -> Result<u64> {
        let written = match self {
            Source::Url(url) => {
                let mut response = self.get(url, transport)?;
                let mut writer = BufWriter::new(File::create(output)?);
                let written = response
                    .copy_to(&mut writer)
                    .map_err(|e| ComuniError::acquisition(self.to_string(), e))?;
                writer.flush()?;
                written
            }
            Source::Path(path) => {
                fs::copy(path, output).map_err(|e| ComuniError::acquisition(self.to_string(), e))?
            }
        };
        info!(source = %self, output = %output.display(), bytes = written, "downloaded source");
        Ok(written)
    }

    fn get(&self, url: &Url, transport: &TransportConfig) -> Result<Response> {
        let client = http_client(transport)?;
        client
            .get(url.clone())
            .send()
            .and_then(Response::error_for_status)
            .map_err(|e| ComuniError::acquisition(self.to_string(), e))
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Url(url) => write!(f, "{}", url),
            Source::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Blocking HTTP client honoring the timeout and TLS verification toggle
pub fn http_client(transport: &TransportConfig) -> Result<Client> {
    Client::builder()
        .timeout(transport.timeout)
        .danger_accept_invalid_certs(transport.allow_insecure)
        .build()
        .map_err(|e| ComuniError::ConfigError(format!("can't build HTTP client: {}", e)))
}
