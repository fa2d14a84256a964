//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the application
//! and infrastructure layers.

pub mod config;
pub mod job_api;
pub mod object_store;

// Re-export common types
pub use config::ConfigStore;
pub use job_api::{JobApi, JobInitError, JobStartError, StatusFetchError};
pub use object_store::{ObjectStore, StorageError, UploadOutcome};
