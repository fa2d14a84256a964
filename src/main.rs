//! BatchScribe CLI entry point

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use batch_scribe::cli::{
    app::{collect_questions, load_merged_config, run_analysis, EXIT_ERROR, EXIT_USAGE_ERROR},
    args::{AnalyzeOptions, Cli, Commands},
    config_cmd::handle_config_command,
    presenter::Presenter,
};
use batch_scribe::domain::config::AppConfig;
use batch_scribe::infrastructure::XdgConfigStore;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    // Library diagnostics go to stderr behind RUST_LOG; user-facing
    // output stays on the presenter.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let presenter = Presenter::new();

    // Handle subcommands
    if let Some(Commands::Config { action }) = cli.command {
        let store = XdgConfigStore::new();
        if let Err(e) = handle_config_command(action, &store, &presenter).await {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
        return ExitCode::SUCCESS;
    }

    // Build CLI config from args
    let cli_config = AppConfig {
        api_key: None, // API key comes from env/file only
        base_url: cli.base_url.clone(),
        poll_interval: cli.poll_interval.clone(),
        request_timeout: None,
        status_retries: None,
        diarization: if cli.diarization { Some(true) } else { None },
        speakers: cli.speakers,
    };

    // Merge config
    let config = load_merged_config(cli_config).await;

    // Validate run inputs
    if cli.files.is_empty() {
        presenter.error("No audio files given. Pass one or more wav/mp3 files.");
        return ExitCode::from(EXIT_USAGE_ERROR);
    }

    if let Some(raw) = config.poll_interval.as_ref() {
        if raw.parse::<batch_scribe::domain::Interval>().is_err() {
            presenter.error(&format!("Invalid poll-interval: \"{}\"", raw));
            return ExitCode::from(EXIT_USAGE_ERROR);
        }
    }

    let questions = match collect_questions(&cli.questions, cli.questions_file.as_deref()).await {
        Ok(questions) => questions,
        Err(e) => {
            presenter.error(&e);
            return ExitCode::from(EXIT_USAGE_ERROR);
        }
    };

    if questions.is_empty() {
        presenter.error("No questions given. Use -q/--question or --questions-file.");
        return ExitCode::from(EXIT_USAGE_ERROR);
    }

    let options = AnalyzeOptions {
        files: cli.files,
        questions,
        diarization: config.diarization_or_default(),
        speakers: config.speakers_or_default(),
        poll_interval: config.poll_interval_or_default(),
        request_timeout: config.request_timeout_or_default(),
        status_retries: config.status_retries_or_default(),
        base_url: config.base_url_or_default().to_string(),
        output_dir: cli.output_dir,
    };

    run_analysis(options).await
}
