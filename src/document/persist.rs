use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info};

use super::types::Document;

/// File extension of persisted documents.
pub const DOCUMENT_EXTENSION: &str = "quire";

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} is not a valid document: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Read and parse a persisted document.
///
/// Nothing is returned on failure, so callers never observe a partially
/// loaded document.
pub fn load(path: &Path) -> Result<Document, DocumentError> {
    let bytes = std::fs::read(path).map_err(|source| DocumentError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let document: Document =
        serde_json::from_slice(&bytes).map_err(|source| DocumentError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    info!(path = %path.display(), blocks = document.blocks.len(), "document loaded");
    Ok(document)
}

pub fn to_json(document: &Document) -> Result<String, DocumentError> {
    Ok(serde_json::to_string_pretty(document)?)
}

/// Write `document` to `path` atomically, stamping the modification time.
///
/// The JSON is written to a temporary file in the destination directory and
/// renamed over the target, so an interrupted save leaves the previous file
/// intact.
pub fn save(document: &mut Document, path: &Path) -> Result<(), DocumentError> {
    document.modified = Utc::now();
    let json = to_json(document)?;
    let io_err = |source| DocumentError::Io {
        path: path.to_path_buf(),
        source,
    };
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
    tmp.write_all(json.as_bytes()).map_err(io_err)?;
    tmp.write_all(b"\n").map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;
    debug!(path = %path.display(), bytes = json.len(), "document saved");
    Ok(())
}
