//! JSON artifact I/O between pipeline stages.
//!
//! Input artifacts are soft: a missing or malformed document degrades to
//! "absent" with a warning, and the pipeline still produces a report. Only
//! writing the output artifact can fail.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::evidence::EvidenceDatabase;
use crate::host::HostFipsSnapshot;

/// Errors reading or writing artifacts.
#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("Failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("Failed to parse JSON in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("Failed to serialize artifact: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Read and parse a whole JSON document.
pub fn read_json(path: &Path) -> Result<Value, ArtifactError> {
    let contents = fs::read_to_string(path).map_err(|source| ArtifactError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| ArtifactError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Read a JSON document, treating a missing or broken file as absent.
pub fn read_json_or_absent(path: &Path) -> Option<Value> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "artifact not present");
        return None;
    }
    match read_json(path) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(error = %e, "ignoring unreadable artifact");
            None
        }
    }
}

/// Load the evidence database; absent or malformed yields an empty database.
pub fn load_evidence_database(path: &Path) -> EvidenceDatabase {
    read_json_or_absent(path)
        .map(EvidenceDatabase::from_value)
        .unwrap_or_default()
}

/// The `os_key` recorded by OS detection, if any.
pub fn load_detected_os_key(path: &Path) -> Option<String> {
    let facts = read_json_or_absent(path)?;
    facts
        .get("os_key")
        .and_then(Value::as_str)
        .filter(|key| !key.trim().is_empty())
        .map(str::to_string)
}

/// The host FIPS snapshot, if one was collected and is non-empty.
pub fn load_host_snapshot(path: &Path) -> Option<HostFipsSnapshot> {
    let value = read_json_or_absent(path)?;
    let snapshot = HostFipsSnapshot::from_value(&value);
    if snapshot.is_none() {
        tracing::debug!(path = %path.display(), "host snapshot is empty; treating as absent");
    }
    snapshot
}

/// Write `value` as pretty JSON, replacing any existing document whole.
///
/// Each call writes to its own temporary file beside `path` and persists it
/// into place, so readers never observe a partial write and overlapping
/// writers never share a staging file.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ArtifactError> {
    let write_err = |source: io::Error| ArtifactError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut text = serde_json::to_string_pretty(value)?;
    text.push('\n');

    let parent = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => {
            fs::create_dir_all(parent).map_err(write_err)?;
            parent
        }
        None => Path::new("."),
    };

    let mut staged = NamedTempFile::new_in(parent).map_err(write_err)?;
    staged.write_all(text.as_bytes()).map_err(write_err)?;
    staged.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}
