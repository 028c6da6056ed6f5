//! Coverage artifact naming and persistence.
//!
//! Each completed test produces one `<token>.json` artifact under the
//! configured output directory. The snapshot is written verbatim — the
//! downstream report generator owns its interpretation.

use crate::result::{GuardarError, GuardarResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use uuid::Uuid;

/// Source of fresh artifact identifiers.
///
/// Uniqueness is delegated entirely to the implementation; Guardar only
/// requires that repeated calls never hand out the same token within a run.
pub trait IdSource: Send + Sync {
    /// Produce a fresh identifier token.
    fn next_id(&self) -> String;
}

/// Default identifier source backed by random v4 UUIDs.
#[derive(Debug, Default)]
pub struct UuidSource;

impl IdSource for UuidSource {
    fn next_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Identifier source returning a fixed token, for deterministic tests.
#[derive(Debug)]
pub struct FixedIdSource {
    token: String,
}

impl FixedIdSource {
    /// Create a source that always returns `token`.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl IdSource for FixedIdSource {
    fn next_id(&self) -> String {
        self.token.clone()
    }
}

/// Writer persisting a JSON value to a filesystem path.
///
/// Used synchronously inside the otherwise-asynchronous collection flow.
pub trait ArtifactWriter: Send + Sync {
    /// Serialize `data` as JSON and write it to `path`.
    fn write_json(&self, path: &Path, data: &Value) -> GuardarResult<()>;
}

/// Default writer backed by `std::fs`, creating intermediate directories.
#[derive(Debug, Default)]
pub struct JsonFileWriter;

impl ArtifactWriter for JsonFileWriter {
    fn write_json(&self, path: &Path, data: &Value) -> GuardarResult<()> {
        let describe = |e: &dyn std::fmt::Display| GuardarError::Write {
            path: path.display().to_string(),
            message: e.to_string(),
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| describe(&e))?;
        }
        let bytes = serde_json::to_vec(data).map_err(|e| describe(&e))?;
        fs::write(path, bytes).map_err(|e| describe(&e))?;
        Ok(())
    }
}

/// Mock writer recording every write, for unit testing.
#[derive(Debug, Default)]
pub struct MockWriter {
    writes: Mutex<Vec<(PathBuf, Value)>>,
    failure: Mutex<Option<String>>,
}

impl MockWriter {
    /// Create a new mock writer accepting all writes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail.
    pub fn fail_with(&self, message: impl Into<String>) {
        *self.failure.lock().expect("mock writer lock poisoned") = Some(message.into());
    }

    /// Recorded `(path, data)` pairs.
    #[must_use]
    pub fn writes(&self) -> Vec<(PathBuf, Value)> {
        self.writes.lock().expect("mock writer lock poisoned").clone()
    }
}

impl ArtifactWriter for MockWriter {
    fn write_json(&self, path: &Path, data: &Value) -> GuardarResult<()> {
        if let Some(message) = self.failure.lock().expect("mock writer lock poisoned").clone() {
            return Err(GuardarError::Write {
                path: path.display().to_string(),
                message,
            });
        }
        self.writes
            .lock()
            .expect("mock writer lock poisoned")
            .push((path.to_path_buf(), data.clone()));
        Ok(())
    }
}

/// Outcome of one coverage collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageArtifact {
    /// Full path of the written artifact
    pub path: PathBuf,
    /// Artifact file name (`<token>.json`)
    pub file_name: String,
    /// Human-readable success message emitted for the host
    pub message: String,
}
