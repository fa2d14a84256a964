//! Job entities and parameters

use crate::domain::analytics::Question;

/// Analytics model submitted with every job
pub const ANALYTICS_MODEL: &str = "saaras:v2";

/// Job state reported when a run finished successfully
pub const STATE_COMPLETED: &str = "Completed";

/// Job state reported when a run failed on the remote side
pub const STATE_FAILED: &str = "Failed";

/// Handle to one accepted job: its id plus the SAS-scoped storage URLs
/// designated for inputs and outputs. Immutable for the lifetime of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle {
    job_id: String,
    input_storage_path: String,
    output_storage_path: String,
}

impl JobHandle {
    pub fn new(
        job_id: impl Into<String>,
        input_storage_path: impl Into<String>,
        output_storage_path: impl Into<String>,
    ) -> Self {
        Self {
            job_id: job_id.into(),
            input_storage_path: input_storage_path.into(),
            output_storage_path: output_storage_path.into(),
        }
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// Storage URL the input files must be uploaded to
    pub fn input_storage_path(&self) -> &str {
        &self.input_storage_path
    }

    /// Storage URL the result files appear under
    pub fn output_storage_path(&self) -> &str {
        &self.output_storage_path
    }
}

/// Parameters sent when starting a job.
#[derive(Debug, Clone)]
pub struct JobParameters {
    pub model: &'static str,
    pub with_diarization: bool,
    pub num_speakers: u32,
    pub questions: Vec<Question>,
}

impl JobParameters {
    /// Build job parameters from caller-supplied settings.
    ///
    /// Questions with empty text are dropped; the speaker count is only
    /// meaningful when diarization is enabled but is always carried.
    pub fn new(with_diarization: bool, num_speakers: u32, questions: Vec<Question>) -> Self {
        Self {
            model: ANALYTICS_MODEL,
            with_diarization,
            num_speakers,
            questions: questions.into_iter().filter(Question::has_text).collect(),
        }
    }
}

/// Job status as reported by the status endpoint.
///
/// The state is an opaque string; only the two terminal values
/// "Completed" and "Failed" are given meaning here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobStatus {
    job_state: String,
}

impl JobStatus {
    pub fn new(job_state: impl Into<String>) -> Self {
        Self {
            job_state: job_state.into(),
        }
    }

    pub fn state(&self) -> &str {
        &self.job_state
    }

    pub fn is_completed(&self) -> bool {
        self.job_state == STATE_COMPLETED
    }

    pub fn is_failed(&self) -> bool {
        self.job_state == STATE_FAILED
    }

    /// Whether no further state transition will occur
    pub fn is_terminal(&self) -> bool {
        self.is_completed() || self.is_failed()
    }
}
