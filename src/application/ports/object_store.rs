//! Object store port interface

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::storage::{NamedBlob, StorageLocation};

/// Storage operation errors
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("No storage location bound")]
    Unbound,

    #[error("Object not found: {name}")]
    ObjectNotFound { name: String },

    #[error("Storage transport failure: {0}")]
    Transport(String),

    #[error("Storage service error (HTTP {status}): {body}")]
    Api { status: u16, body: String },
}

/// Per-file upload outcome, reported to the caller for display only.
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    pub name: String,
    pub ok: bool,
    pub error: Option<String>,
}

impl UploadOutcome {
    pub fn success(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ok: true,
            error: None,
        }
    }

    pub fn failure(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ok: false,
            error: Some(error.into()),
        }
    }
}

/// Port for a directory-scoped blob store.
///
/// One instance is reused across the input and output phases of a run by
/// rebinding it to a new location. Rebinding is NOT safe while an
/// upload/list/download on the same instance is in flight.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Rebind the store to a new location.
    fn bind(&mut self, location: StorageLocation);

    /// Upload the given blobs into the bound directory with overwrite
    /// semantics. Each file's outcome is independent: one failure never
    /// aborts the rest. Outcomes are returned in input order.
    async fn upload(&self, files: Vec<NamedBlob>) -> Vec<UploadOutcome>;

    /// Enumerate all blobs under the bound directory, recursively,
    /// returning basenames only. Order is whatever the store yields.
    async fn list(&self) -> Result<Vec<String>, StorageError>;

    /// Download the full content of one blob.
    async fn download(&self, name: &str) -> Result<Vec<u8>, StorageError>;
}
