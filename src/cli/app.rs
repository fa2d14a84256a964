//! Main app runner for a batch analysis run

use std::env;
use std::path::Path;
use std::process::ExitCode;

use colored::*;
use serde::Deserialize;

use crate::application::ports::ConfigStore;
use crate::application::{BatchAnalysisUseCase, BatchCallbacks, BatchInput, BatchOutput, BatchPhase};
use crate::domain::analytics::{AnswerKind, Question};
use crate::domain::config::AppConfig;
use crate::domain::storage::NamedBlob;
use crate::infrastructure::{DataLakeStore, SarvamJobApi, XdgConfigStore};

use super::args::AnalyzeOptions;
use super::presenter::Presenter;

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

/// Environment variable carrying the API key
pub const API_KEY_ENV: &str = "SARVAM_API_KEY";

// Questions-file format: [[questions]] entries with text, optional
// id/type/description.

#[derive(Debug, Deserialize)]
struct QuestionsFile {
    #[serde(default)]
    questions: Vec<QuestionEntry>,
}

#[derive(Debug, Deserialize)]
struct QuestionEntry {
    id: Option<String>,
    text: String,
    #[serde(rename = "type")]
    kind: Option<String>,
    description: Option<String>,
}

/// Run one batch analysis
pub async fn run_analysis(options: AnalyzeOptions) -> ExitCode {
    let mut presenter = Presenter::new();

    // Load API key from config or environment
    let api_key = match get_api_key().await {
        Ok(key) => key,
        Err(e) => {
            presenter.error(&e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    // Read audio files up front so missing paths fail before any network call
    let mut blobs = Vec::with_capacity(options.files.len());
    for path in &options.files {
        match tokio::fs::read(path).await {
            Ok(bytes) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.to_string_lossy().into_owned());
                blobs.push(NamedBlob::new(name, bytes));
            }
            Err(e) => {
                presenter.error(&format!("Failed to read {}: {}", path.display(), e));
                return ExitCode::from(EXIT_ERROR);
            }
        }
    }

    // Create adapters
    let api = SarvamJobApi::with_options(api_key, &options.base_url, options.request_timeout);
    let store = DataLakeStore::new(options.request_timeout);

    // Create use case
    let mut use_case =
        BatchAnalysisUseCase::new(api, store, options.poll_interval, options.status_retries);

    // Ctrl-C cancels the run without leaving the job polling forever
    let cancel = use_case.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    let spinner = presenter.start_spinner("Initializing job...");
    let phase_spinner = spinner.clone();
    let upload_spinner = spinner.clone();
    let status_spinner = spinner;

    let callbacks = BatchCallbacks {
        on_phase: Some(Box::new(move |phase| {
            let message = match phase {
                BatchPhase::Init => "Initializing job...",
                BatchPhase::Uploading => "Uploading files...",
                BatchPhase::Starting => "Starting job...",
                BatchPhase::Polling => "Waiting for job to complete...",
                BatchPhase::Retrieving => "Retrieving results...",
            };
            phase_spinner.set_message(message);
        })),
        on_upload: Some(Box::new(move |outcome| {
            if outcome.ok {
                upload_spinner.println(format!("{} Uploaded {}", "✓".green(), outcome.name));
            } else {
                upload_spinner.println(format!(
                    "{} Upload failed for {}: {}",
                    "✗".red(),
                    outcome.name,
                    outcome.error.as_deref().unwrap_or("unknown error")
                ));
            }
        })),
        on_status: Some(Box::new(move |state| {
            status_spinner.set_message(format!("Job status: {}", state));
        })),
    };

    let input = BatchInput {
        files: blobs,
        with_diarization: options.diarization,
        num_speakers: options.speakers,
        questions: options.questions.clone(),
    };

    // Execute
    match use_case.execute(input, callbacks).await {
        Ok(output) => {
            presenter.spinner_success(&format!("Job {} completed", output.job_id));

            let failed_uploads = output.upload_outcomes.iter().filter(|o| !o.ok).count();
            if failed_uploads > 0 {
                presenter.warn(&format!("{} file(s) failed to upload", failed_uploads));
            }
            for skipped in &output.skipped_results {
                presenter.warn(&format!(
                    "Skipped unparseable result {}: {}",
                    skipped.name, skipped.detail
                ));
            }
            if output.results.is_empty() {
                presenter.warn("No results were returned");
            }

            for (index, result) in output.results.iter().enumerate() {
                presenter.render_result(index, result, options.diarization);
            }

            if let Some(dir) = &options.output_dir {
                match save_results(dir, &output).await {
                    Ok(count) => {
                        presenter.info(&format!("Saved {} file(s) to {}", count, dir.display()))
                    }
                    Err(e) => {
                        presenter.error(&format!("Failed to save results: {}", e));
                        return ExitCode::from(EXIT_ERROR);
                    }
                }
            }

            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            presenter.spinner_fail("Batch run did not complete");
            presenter.error(&format!("{} (phase: {})", e, e.phase()));
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Get API key from environment or config file
pub async fn get_api_key() -> Result<String, String> {
    // Check environment first
    if let Ok(key) = env::var(API_KEY_ENV) {
        if !key.is_empty() {
            return Ok(key);
        }
    }

    // Check config file
    let store = XdgConfigStore::new();
    let config = store.load().await.unwrap_or_else(|_| AppConfig::empty());

    config.api_key.ok_or_else(|| {
        format!(
            "Missing API key. Set {} environment variable or run 'batch-scribe config set api_key <key>'",
            API_KEY_ENV
        )
    })
}

/// Load and merge configuration from file, env, and CLI
pub async fn load_merged_config(cli_config: AppConfig) -> AppConfig {
    let store = XdgConfigStore::new();
    let file_config = store.load().await.unwrap_or_else(|_| AppConfig::empty());

    // Build env config
    let env_config = AppConfig {
        api_key: env::var(API_KEY_ENV).ok().filter(|s| !s.is_empty()),
        ..Default::default()
    };

    // Merge: defaults < file < env < cli
    AppConfig::defaults()
        .merge(file_config)
        .merge(env_config)
        .merge(cli_config)
}

/// Collect questions from repeated -q flags and an optional TOML file.
///
/// Flag questions come first as short-answer entries; missing ids are
/// assigned q1, q2, ... in order. Questions with empty text are kept
/// out here so usage validation sees the true count.
pub async fn collect_questions(
    flag_questions: &[String],
    questions_file: Option<&Path>,
) -> Result<Vec<Question>, String> {
    let mut questions: Vec<Question> = Vec::new();

    for text in flag_questions {
        let id = format!("q{}", questions.len() + 1);
        questions.push(Question::new(id, text.clone(), AnswerKind::ShortAnswer));
    }

    if let Some(path) = questions_file {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| format!("Failed to read questions file {}: {}", path.display(), e))?;

        let file: QuestionsFile = toml::from_str(&content)
            .map_err(|e| format!("Failed to parse questions file {}: {}", path.display(), e))?;

        for entry in file.questions {
            let kind = match entry.kind.as_deref() {
                Some(raw) => raw
                    .parse::<AnswerKind>()
                    .map_err(|e| format!("In {}: {}", path.display(), e))?,
                None => AnswerKind::ShortAnswer,
            };

            let id = entry
                .id
                .unwrap_or_else(|| format!("q{}", questions.len() + 1));
            let mut question = Question::new(id, entry.text, kind);
            if let Some(description) = entry.description.filter(|d| !d.is_empty()) {
                question = question.with_description(description);
            }
            questions.push(question);
        }
    }

    questions.retain(Question::has_text);
    Ok(questions)
}

/// Write raw result JSON and transcripts into the output directory.
/// Returns the number of files written.
async fn save_results(dir: &Path, output: &BatchOutput) -> std::io::Result<usize> {
    tokio::fs::create_dir_all(dir).await?;

    let mut written = 0;
    for (index, result) in output.results.iter().enumerate() {
        let n = index + 1;

        let json = serde_json::to_vec_pretty(result)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        tokio::fs::write(dir.join(format!("result_{}.json", n)), json).await?;
        written += 1;

        if !result.transcript.is_empty() {
            tokio::fs::write(dir.join(format!("transcript_{}.txt", n)), &result.transcript)
                .await?;
            written += 1;
        }

        if let Some(diarized) = result.diarized_transcript.as_deref() {
            if !diarized.is_empty() {
                tokio::fs::write(dir.join(format!("diarized_{}.txt", n)), diarized).await?;
                written += 1;
            }
        }
    }

    Ok(written)
}
