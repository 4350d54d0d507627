//! Tabular data sources for the catalog and site tables.

use std::io::Read;
use std::path::PathBuf;

use flate2::read::GzDecoder;
use tracing::debug;

use crate::error::SourceError;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Where a CSV table comes from.
///
/// Gzip-compressed content is detected by its magic bytes and inflated
/// transparently, whichever variant carries it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    File(PathBuf),
    Inline { label: String, bytes: Vec<u8> },
}

impl DataSource {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    pub fn inline(label: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self::Inline {
            label: label.into(),
            bytes: bytes.into(),
        }
    }

    /// Human-readable location, used in logs and error messages.
    pub fn label(&self) -> String {
        match self {
            Self::File(path) => path.display().to_string(),
            Self::Inline { label, .. } => label.clone(),
        }
    }

    /// Reads the whole source into memory, inflating gzip content.
    pub fn read_bytes(&self) -> Result<Vec<u8>, SourceError> {
        let raw = match self {
            Self::File(path) => std::fs::read(path).map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    SourceError::NotFound(path.display().to_string())
                } else {
                    SourceError::Io {
                        path: path.display().to_string(),
                        source: e,
                    }
                }
            })?,
            Self::Inline { bytes, .. } => bytes.clone(),
        };

        if raw.is_empty() {
            return Err(SourceError::Empty(self.label()));
        }

        if raw.starts_with(&GZIP_MAGIC) {
            debug!(source = %self.label(), compressed = raw.len(), "Inflating gzip source");
            let mut inflated = Vec::new();
            GzDecoder::new(raw.as_slice())
                .read_to_end(&mut inflated)
                .map_err(|e| SourceError::Io {
                    path: self.label(),
                    source: e,
                })?;
            if inflated.is_empty() {
                return Err(SourceError::Empty(self.label()));
            }
            return Ok(inflated);
        }

        Ok(raw)
    }
}
