//! Job API port interface

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::analytics::{JobHandle, JobParameters, JobStatus};

/// Errors from job initialization
#[derive(Debug, Clone, Error)]
pub enum JobInitError {
    #[error("Job init request failed: {0}")]
    RequestFailed(String),

    #[error("Job init rejected (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Failed to parse job init response: {0}")]
    ParseError(String),
}

/// Errors from starting a job
#[derive(Debug, Clone, Error)]
pub enum JobStartError {
    #[error("Job start request failed: {0}")]
    RequestFailed(String),

    #[error("Job start rejected (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },
}

/// Errors from fetching job status.
///
/// These are returned to the polling loop rather than thrown past it so
/// the loop can apply its own abort/retry policy.
#[derive(Debug, Clone, Error)]
pub enum StatusFetchError {
    #[error("Status request failed: {0}")]
    RequestFailed(String),

    #[error("Status endpoint returned HTTP {status}: {body}")]
    Unexpected { status: u16, body: String },

    #[error("Failed to parse status response: {0}")]
    ParseError(String),
}

/// Port for the remote analytics job API
#[async_trait]
pub trait JobApi: Send + Sync {
    /// Initialize a new job.
    ///
    /// # Returns
    /// A handle carrying the job id and the input/output storage URLs.
    /// Anything other than acceptance by the remote is a hard failure
    /// with the raw response body preserved as detail.
    async fn init(&self) -> Result<JobHandle, JobInitError>;

    /// Start a previously initialized job with the given parameters.
    async fn start(&self, job_id: &str, params: &JobParameters) -> Result<(), JobStartError>;

    /// Fetch the current status of a job.
    async fn status(&self, job_id: &str) -> Result<JobStatus, StatusFetchError>;
}
