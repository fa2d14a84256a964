//! Batch analysis use case

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Notify;

use crate::domain::analytics::{AnalysisResult, JobParameters, Question};
use crate::domain::error::MalformedLocationError;
use crate::domain::interval::Interval;
use crate::domain::storage::{NamedBlob, StorageLocation};

use super::ports::{
    JobApi, JobInitError, JobStartError, ObjectStore, StatusFetchError, StorageError,
    UploadOutcome,
};

/// Phases of one batch run, in order of execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchPhase {
    Init,
    Uploading,
    Starting,
    Polling,
    Retrieving,
}

impl std::fmt::Display for BatchPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Init => "init",
            Self::Uploading => "uploading",
            Self::Starting => "starting",
            Self::Polling => "polling",
            Self::Retrieving => "retrieving",
        };
        write!(f, "{}", name)
    }
}

/// Errors from the batch analysis use case.
///
/// Each variant pins the failure to a phase so a caller can tell
/// "job never started" from "job ran but failed" from "job completed
/// but results could not be retrieved".
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("Job initialization failed: {0}")]
    Init(#[from] JobInitError),

    #[error("Storage location unusable: {0}")]
    Location(#[from] MalformedLocationError),

    #[error("Job start failed: {0}")]
    Start(#[from] JobStartError),

    #[error("Status polling aborted: {0}")]
    StatusFetch(#[from] StatusFetchError),

    #[error("Job {job_id} failed on the remote side")]
    JobFailed { job_id: String },

    #[error("Result retrieval failed: {0}")]
    Retrieval(#[from] StorageError),

    #[error("Run cancelled")]
    Cancelled,
}

impl BatchError {
    /// The phase this error belongs to
    pub fn phase(&self) -> BatchPhase {
        match self {
            Self::Init(_) => BatchPhase::Init,
            Self::Location(_) => BatchPhase::Uploading,
            Self::Start(_) => BatchPhase::Starting,
            Self::StatusFetch(_) | Self::JobFailed { .. } | Self::Cancelled => BatchPhase::Polling,
            Self::Retrieval(_) => BatchPhase::Retrieving,
        }
    }
}

/// Input parameters for one batch run
#[derive(Debug, Clone)]
pub struct BatchInput {
    /// Audio files to upload
    pub files: Vec<NamedBlob>,
    /// Whether to split the transcript by speaker
    pub with_diarization: bool,
    /// Number of speakers (meaningful only with diarization)
    pub num_speakers: u32,
    /// Questions to answer about each file
    pub questions: Vec<Question>,
}

/// A result file that was downloaded but could not be parsed
#[derive(Debug, Clone)]
pub struct SkippedResult {
    pub name: String,
    pub detail: String,
}

/// Output of a completed batch run
#[derive(Debug)]
pub struct BatchOutput {
    /// Remote job id
    pub job_id: String,
    /// Parsed results, in listing order
    pub results: Vec<AnalysisResult>,
    /// Per-file upload outcomes, in input order
    pub upload_outcomes: Vec<UploadOutcome>,
    /// Result files skipped because they were not valid result JSON
    pub skipped_results: Vec<SkippedResult>,
}

/// Callbacks for progress reporting
#[derive(Default)]
pub struct BatchCallbacks {
    /// Called when a phase begins
    pub on_phase: Option<Box<dyn Fn(BatchPhase) + Send + Sync>>,
    /// Called once per uploaded file with its outcome
    pub on_upload: Option<Box<dyn Fn(&UploadOutcome) + Send + Sync>>,
    /// Called after each successful status fetch with the raw job state
    pub on_status: Option<Box<dyn Fn(&str) + Send + Sync>>,
}

/// Handle for signaling cancellation of an in-flight run.
///
/// Cancelling interrupts the current poll wait; the run ends with
/// [`BatchError::Cancelled`] and open connections are dropped.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal cancellation
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Wait until cancellation is signaled
    async fn cancelled(&self) {
        let notified = self.notify.notified();
        tokio::pin!(notified);
        // Register interest before checking the flag so a concurrent
        // cancel() cannot slip between the check and the await.
        notified.as_mut().enable();
        if self.is_cancelled() {
            return;
        }
        notified.await;
    }
}

/// End-to-end batch analysis: init a job, upload the inputs, start the
/// job, poll it to a terminal state, then fetch and parse the results.
///
/// One job is in flight at a time per instance; the store binding moves
/// from the input location to the output location between the strictly
/// sequential upload and retrieval phases.
pub struct BatchAnalysisUseCase<J, S>
where
    J: JobApi,
    S: ObjectStore,
{
    job_api: J,
    store: S,
    poll_interval: Interval,
    status_retries: u32,
    cancel: CancelHandle,
}

impl<J, S> BatchAnalysisUseCase<J, S>
where
    J: JobApi,
    S: ObjectStore,
{
    /// Create a new use case instance.
    ///
    /// `status_retries` is the number of consecutive status-fetch
    /// failures tolerated before the run aborts; 0 aborts on the first.
    pub fn new(job_api: J, store: S, poll_interval: Interval, status_retries: u32) -> Self {
        Self {
            job_api,
            store,
            poll_interval,
            status_retries,
            cancel: CancelHandle::new(),
        }
    }

    /// Get a handle for cancelling the run from another task
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Execute one batch run.
    pub async fn execute(
        &mut self,
        input: BatchInput,
        callbacks: BatchCallbacks,
    ) -> Result<BatchOutput, BatchError> {
        let BatchInput {
            files,
            with_diarization,
            num_speakers,
            questions,
        } = input;

        // Init
        Self::notify_phase(&callbacks, BatchPhase::Init);
        let handle = self.job_api.init().await?;
        let job_id = handle.job_id().to_string();
        tracing::info!(job_id = %job_id, "job initialized");

        // Both locations come out of the handle; parse them before any
        // storage traffic so a bad URL cannot fail mid-run.
        let input_location = StorageLocation::parse(handle.input_storage_path())?;
        let output_location = StorageLocation::parse(handle.output_storage_path())?;

        // Uploading: best-effort, per-file failures do not block the
        // start call; the remote job surfaces missing inputs itself.
        Self::notify_phase(&callbacks, BatchPhase::Uploading);
        self.store.bind(input_location);
        let upload_outcomes = self.store.upload(files).await;
        for outcome in &upload_outcomes {
            if outcome.ok {
                tracing::info!(file = %outcome.name, "upload succeeded");
            } else {
                tracing::warn!(
                    file = %outcome.name,
                    error = outcome.error.as_deref().unwrap_or("unknown"),
                    "upload failed"
                );
            }
            if let Some(ref cb) = callbacks.on_upload {
                cb(outcome);
            }
        }

        // Starting
        Self::notify_phase(&callbacks, BatchPhase::Starting);
        let params = JobParameters::new(with_diarization, num_speakers, questions);
        self.job_api.start(&job_id, &params).await?;
        tracing::info!(job_id = %job_id, "job started");

        // Polling: strictly sequential status checks, one fixed-length
        // wait after every non-terminal answer.
        Self::notify_phase(&callbacks, BatchPhase::Polling);
        let mut consecutive_failures: u32 = 0;
        loop {
            if self.cancel.is_cancelled() {
                return Err(BatchError::Cancelled);
            }

            match self.job_api.status(&job_id).await {
                Ok(status) => {
                    consecutive_failures = 0;
                    tracing::debug!(job_id = %job_id, state = status.state(), "status fetched");
                    if let Some(ref cb) = callbacks.on_status {
                        cb(status.state());
                    }
                    if status.is_completed() {
                        break;
                    }
                    if status.is_failed() {
                        return Err(BatchError::JobFailed { job_id });
                    }
                }
                Err(e) => {
                    consecutive_failures += 1;
                    if consecutive_failures > self.status_retries {
                        return Err(BatchError::StatusFetch(e));
                    }
                    tracing::warn!(
                        job_id = %job_id,
                        error = %e,
                        attempt = consecutive_failures,
                        tolerated = self.status_retries,
                        "status fetch failed, will poll again"
                    );
                }
            }

            tokio::select! {
                _ = self.cancel.cancelled() => return Err(BatchError::Cancelled),
                _ = tokio::time::sleep(self.poll_interval.as_std()) => {}
            }
        }

        // Retrieving: parse failures skip the file rather than discard
        // the results that did parse.
        Self::notify_phase(&callbacks, BatchPhase::Retrieving);
        self.store.bind(output_location);

        let names = self.store.list().await?;
        let mut results = Vec::new();
        let mut skipped_results = Vec::new();
        for name in names.iter().filter(|n| n.ends_with(".json")) {
            let bytes = self.store.download(name).await?;
            match AnalysisResult::parse(name, &bytes) {
                Ok(result) => results.push(result),
                Err(e) => {
                    tracing::warn!(file = %name, error = %e, "skipping unparseable result file");
                    skipped_results.push(SkippedResult {
                        name: name.clone(),
                        detail: e.detail,
                    });
                }
            }
        }

        tracing::info!(
            job_id = %job_id,
            results = results.len(),
            skipped = skipped_results.len(),
            "batch run complete"
        );

        Ok(BatchOutput {
            job_id,
            results,
            upload_outcomes,
            skipped_results,
        })
    }

    fn notify_phase(callbacks: &BatchCallbacks, phase: BatchPhase) {
        if let Some(ref cb) = callbacks.on_phase {
            cb(phase);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::analytics::{AnswerKind, JobHandle, JobStatus};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    const INPUT_URL: &str = "https://acct.blob.core.windows.net/fs/in?sas";
    const OUTPUT_URL: &str = "https://acct.blob.core.windows.net/fs/out?sas";

    /// Job API mock fed with a scripted status sequence
    struct ScriptedJobApi {
        statuses: Mutex<VecDeque<Result<JobStatus, StatusFetchError>>>,
        status_calls: Mutex<u32>,
        start_called: Mutex<bool>,
        input_url: String,
    }

    impl ScriptedJobApi {
        fn new(statuses: Vec<Result<JobStatus, StatusFetchError>>) -> Self {
            Self {
                statuses: Mutex::new(statuses.into()),
                status_calls: Mutex::new(0),
                start_called: Mutex::new(false),
                input_url: INPUT_URL.to_string(),
            }
        }

        fn with_input_url(mut self, url: &str) -> Self {
            self.input_url = url.to_string();
            self
        }
    }

    #[async_trait]
    impl JobApi for Arc<ScriptedJobApi> {
        async fn init(&self) -> Result<JobHandle, JobInitError> {
            Ok(JobHandle::new("J1", &self.input_url, OUTPUT_URL))
        }

        async fn start(
            &self,
            _job_id: &str,
            _params: &JobParameters,
        ) -> Result<(), JobStartError> {
            *self.start_called.lock().unwrap() = true;
            Ok(())
        }

        async fn status(&self, _job_id: &str) -> Result<JobStatus, StatusFetchError> {
            *self.status_calls.lock().unwrap() += 1;
            self.statuses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(JobStatus::new("Running")))
        }
    }

    /// Store mock serving canned listings/downloads and recording calls
    struct FakeStore {
        outcomes: Vec<UploadOutcome>,
        listing: Vec<String>,
        objects: Vec<(String, Vec<u8>)>,
        upload_called: Arc<Mutex<bool>>,
        list_called: Arc<Mutex<bool>>,
    }

    impl FakeStore {
        fn empty() -> Self {
            Self {
                outcomes: vec![],
                listing: vec![],
                objects: vec![],
                upload_called: Arc::new(Mutex::new(false)),
                list_called: Arc::new(Mutex::new(false)),
            }
        }

        fn with_object(name: &str, bytes: &[u8]) -> Self {
            let mut store = Self::empty();
            store.listing = vec![name.to_string()];
            store.objects = vec![(name.to_string(), bytes.to_vec())];
            store
        }
    }

    #[async_trait]
    impl ObjectStore for FakeStore {
        fn bind(&mut self, _location: StorageLocation) {}

        async fn upload(&self, files: Vec<NamedBlob>) -> Vec<UploadOutcome> {
            *self.upload_called.lock().unwrap() = true;
            if self.outcomes.is_empty() {
                files
                    .iter()
                    .map(|f| UploadOutcome::success(f.name()))
                    .collect()
            } else {
                self.outcomes.clone()
            }
        }

        async fn list(&self) -> Result<Vec<String>, StorageError> {
            *self.list_called.lock().unwrap() = true;
            Ok(self.listing.clone())
        }

        async fn download(&self, name: &str) -> Result<Vec<u8>, StorageError> {
            self.objects
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, b)| b.clone())
                .ok_or_else(|| StorageError::ObjectNotFound {
                    name: name.to_string(),
                })
        }
    }

    fn fast_use_case(
        api: Arc<ScriptedJobApi>,
        store: FakeStore,
    ) -> BatchAnalysisUseCase<Arc<ScriptedJobApi>, FakeStore> {
        BatchAnalysisUseCase::new(api, store, Interval::from_millis(1), 0)
    }

    fn one_file_input() -> BatchInput {
        BatchInput {
            files: vec![NamedBlob::new("a.wav", vec![1, 2, 3])],
            with_diarization: true,
            num_speakers: 2,
            questions: vec![Question::new(
                "q1",
                "What is the issue?",
                AnswerKind::ShortAnswer,
            )],
        }
    }

    #[tokio::test]
    async fn completes_and_parses_results() {
        let api = Arc::new(ScriptedJobApi::new(vec![
            Ok(JobStatus::new("Running")),
            Ok(JobStatus::new("Completed")),
        ]));
        let store = FakeStore::with_object(
            "r1.json",
            br#"{"transcript":"hello","answers":[{"question":"What is the issue?","response":"billing","reasoning":"caller said billing"}]}"#,
        );

        let mut use_case = fast_use_case(Arc::clone(&api), store);
        let output = use_case
            .execute(one_file_input(), BatchCallbacks::default())
            .await
            .unwrap();

        assert_eq!(output.job_id, "J1");
        assert_eq!(output.results.len(), 1);
        assert_eq!(output.results[0].transcript, "hello");
        assert_eq!(output.results[0].answers[0].response, "billing");
        assert_eq!(*api.status_calls.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn polls_until_terminal_state() {
        let api = Arc::new(ScriptedJobApi::new(vec![
            Ok(JobStatus::new("Running")),
            Ok(JobStatus::new("Running")),
            Ok(JobStatus::new("Completed")),
        ]));
        let store = FakeStore::empty();
        let list_called = Arc::clone(&store.list_called);

        let mut use_case = fast_use_case(Arc::clone(&api), store);
        use_case
            .execute(one_file_input(), BatchCallbacks::default())
            .await
            .unwrap();

        // Two non-terminal answers, so exactly three polls and a retrieval
        assert_eq!(*api.status_calls.lock().unwrap(), 3);
        assert!(*list_called.lock().unwrap());
    }

    #[tokio::test]
    async fn failed_job_skips_retrieval() {
        let api = Arc::new(ScriptedJobApi::new(vec![
            Ok(JobStatus::new("Running")),
            Ok(JobStatus::new("Failed")),
        ]));
        let store = FakeStore::empty();
        let list_called = Arc::clone(&store.list_called);

        let mut use_case = fast_use_case(Arc::clone(&api), store);
        let err = use_case
            .execute(one_file_input(), BatchCallbacks::default())
            .await
            .unwrap_err();

        assert!(matches!(err, BatchError::JobFailed { ref job_id } if job_id == "J1"));
        assert_eq!(err.phase(), BatchPhase::Polling);
        assert!(!*list_called.lock().unwrap());
    }

    #[tokio::test]
    async fn status_fetch_error_aborts_without_retry() {
        let api = Arc::new(ScriptedJobApi::new(vec![Err(
            StatusFetchError::RequestFailed("connection reset".to_string()),
        )]));
        let store = FakeStore::empty();
        let list_called = Arc::clone(&store.list_called);

        let mut use_case = fast_use_case(Arc::clone(&api), store);
        let err = use_case
            .execute(one_file_input(), BatchCallbacks::default())
            .await
            .unwrap_err();

        assert!(matches!(err, BatchError::StatusFetch(_)));
        assert_eq!(*api.status_calls.lock().unwrap(), 1);
        assert!(!*list_called.lock().unwrap());
    }

    #[tokio::test]
    async fn status_retries_tolerate_transient_failures() {
        let api = Arc::new(ScriptedJobApi::new(vec![
            Err(StatusFetchError::RequestFailed("blip".to_string())),
            Ok(JobStatus::new("Completed")),
        ]));
        let store = FakeStore::empty();

        let mut use_case =
            BatchAnalysisUseCase::new(Arc::clone(&api), store, Interval::from_millis(1), 1);
        let output = use_case
            .execute(one_file_input(), BatchCallbacks::default())
            .await
            .unwrap();

        assert_eq!(output.job_id, "J1");
        assert_eq!(*api.status_calls.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn upload_failures_do_not_block_start() {
        let api = Arc::new(ScriptedJobApi::new(vec![Ok(JobStatus::new("Completed"))]));
        let mut store = FakeStore::empty();
        store.outcomes = vec![
            UploadOutcome::failure("a.wav", "boom"),
            UploadOutcome::success("b.wav"),
        ];

        let mut use_case = fast_use_case(Arc::clone(&api), store);
        let input = BatchInput {
            files: vec![
                NamedBlob::new("a.wav", vec![1]),
                NamedBlob::new("b.wav", vec![2]),
            ],
            with_diarization: false,
            num_speakers: 2,
            questions: vec![Question::new("q1", "q", AnswerKind::ShortAnswer)],
        };

        let output = use_case.execute(input, BatchCallbacks::default()).await.unwrap();

        assert!(*api.start_called.lock().unwrap());
        assert_eq!(output.upload_outcomes.len(), 2);
        assert!(!output.upload_outcomes[0].ok);
        assert!(output.upload_outcomes[1].ok);
    }

    #[tokio::test]
    async fn malformed_input_location_aborts_before_upload() {
        let api =
            Arc::new(ScriptedJobApi::new(vec![]).with_input_url("no scheme or container"));
        let store = FakeStore::empty();
        let upload_called = Arc::clone(&store.upload_called);

        let mut use_case = fast_use_case(Arc::clone(&api), store);
        let err = use_case
            .execute(one_file_input(), BatchCallbacks::default())
            .await
            .unwrap_err();

        assert!(matches!(err, BatchError::Location(_)));
        assert!(!*upload_called.lock().unwrap());
    }

    #[tokio::test]
    async fn unparseable_result_is_skipped_not_fatal() {
        let api = Arc::new(ScriptedJobApi::new(vec![Ok(JobStatus::new("Completed"))]));
        let mut store = FakeStore::empty();
        store.listing = vec!["bad.json".to_string(), "good.json".to_string()];
        store.objects = vec![
            ("bad.json".to_string(), b"not json".to_vec()),
            (
                "good.json".to_string(),
                br#"{"transcript":"ok","answers":[]}"#.to_vec(),
            ),
        ];

        let mut use_case = fast_use_case(Arc::clone(&api), store);
        let output = use_case
            .execute(one_file_input(), BatchCallbacks::default())
            .await
            .unwrap();

        assert_eq!(output.results.len(), 1);
        assert_eq!(output.results[0].transcript, "ok");
        assert_eq!(output.skipped_results.len(), 1);
        assert_eq!(output.skipped_results[0].name, "bad.json");
    }

    #[tokio::test]
    async fn non_json_files_are_ignored_during_retrieval() {
        let api = Arc::new(ScriptedJobApi::new(vec![Ok(JobStatus::new("Completed"))]));
        let mut store = FakeStore::empty();
        store.listing = vec!["a.wav".to_string(), "r1.json".to_string()];
        store.objects = vec![(
            "r1.json".to_string(),
            br#"{"transcript":"t","answers":[]}"#.to_vec(),
        )];

        let mut use_case = fast_use_case(Arc::clone(&api), store);
        let output = use_case
            .execute(one_file_input(), BatchCallbacks::default())
            .await
            .unwrap();

        assert_eq!(output.results.len(), 1);
    }

    #[tokio::test]
    async fn cancelled_run_stops_polling() {
        let api = Arc::new(ScriptedJobApi::new(vec![])); // always Running
        let store = FakeStore::empty();

        let mut use_case =
            BatchAnalysisUseCase::new(Arc::clone(&api), store, Interval::from_secs(60), 0);
        let cancel = use_case.cancel_handle();

        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            cancel.cancel();
        });

        let err = use_case
            .execute(one_file_input(), BatchCallbacks::default())
            .await
            .unwrap_err();

        assert!(matches!(err, BatchError::Cancelled));
    }

    #[tokio::test]
    async fn phase_callbacks_fire_in_order() {
        let api = Arc::new(ScriptedJobApi::new(vec![Ok(JobStatus::new("Completed"))]));
        let store = FakeStore::empty();

        let phases = Arc::new(Mutex::new(Vec::new()));
        let phases_cb = Arc::clone(&phases);
        let callbacks = BatchCallbacks {
            on_phase: Some(Box::new(move |p| phases_cb.lock().unwrap().push(p))),
            ..Default::default()
        };

        let mut use_case = fast_use_case(Arc::clone(&api), store);
        use_case.execute(one_file_input(), callbacks).await.unwrap();

        assert_eq!(
            *phases.lock().unwrap(),
            vec![
                BatchPhase::Init,
                BatchPhase::Uploading,
                BatchPhase::Starting,
                BatchPhase::Polling,
                BatchPhase::Retrieving,
            ]
        );
    }
}
