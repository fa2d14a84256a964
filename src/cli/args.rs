//! CLI argument definitions using Clap

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::analytics::Question;
use crate::domain::interval::Interval;

/// BatchScribe - batch call analytics for audio files
#[derive(Parser, Debug)]
#[command(name = "batch-scribe")]
#[command(version)]
#[command(about = "Batch call analytics: transcribe audio files (wav, mp3) and answer questions about them")]
#[command(long_about = None)]
pub struct Cli {
    /// Audio files to analyze (wav, mp3)
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Question to ask about each file (repeatable, short-answer type)
    #[arg(short = 'q', long = "question", value_name = "TEXT")]
    pub questions: Vec<String>,

    /// TOML file with typed questions ([[questions]] entries)
    #[arg(long, value_name = "PATH")]
    pub questions_file: Option<PathBuf>,

    /// Split the transcript by speaker
    #[arg(short = 'd', long)]
    pub diarization: bool,

    /// Number of speakers (only meaningful with --diarization)
    #[arg(short = 's', long, value_name = "N", value_parser = clap::value_parser!(u32).range(2..=10))]
    pub speakers: Option<u32>,

    /// Status poll interval (e.g., 10s, 1m)
    #[arg(long, value_name = "TIME")]
    pub poll_interval: Option<String>,

    /// Job API base URL override
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Directory to save raw result JSON and transcripts into
    #[arg(short = 'o', long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Config subcommand
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config action subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}

/// Parsed analysis options
#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    pub files: Vec<PathBuf>,
    pub questions: Vec<Question>,
    pub diarization: bool,
    pub speakers: u32,
    pub poll_interval: Interval,
    pub request_timeout: Interval,
    pub status_retries: u32,
    pub base_url: String,
    pub output_dir: Option<PathBuf>,
}

/// Valid config keys
pub const VALID_CONFIG_KEYS: &[&str] = &[
    "api_key",
    "base_url",
    "poll_interval",
    "request_timeout",
    "status_retries",
    "diarization",
    "speakers",
];

/// Speaker count bounds accepted by the job API
pub const MIN_SPEAKERS: u32 = 2;
pub const MAX_SPEAKERS: u32 = 10;

/// Check if a config key is valid
pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_parses_defaults() {
        let cli = Cli::parse_from(["batch-scribe"]);
        assert!(cli.files.is_empty());
        assert!(cli.questions.is_empty());
        assert!(cli.questions_file.is_none());
        assert!(!cli.diarization);
        assert!(cli.speakers.is_none());
        assert!(cli.poll_interval.is_none());
        assert!(cli.output_dir.is_none());
    }

    #[test]
    fn cli_parses_files_and_questions() {
        let cli = Cli::parse_from([
            "batch-scribe",
            "a.wav",
            "b.mp3",
            "-q",
            "What is the issue?",
            "-q",
            "Was it resolved?",
        ]);
        assert_eq!(cli.files.len(), 2);
        assert_eq!(cli.questions.len(), 2);
        assert_eq!(cli.questions[0], "What is the issue?");
    }

    #[test]
    fn cli_parses_diarization_flags() {
        let cli = Cli::parse_from(["batch-scribe", "a.wav", "-q", "q", "-d", "-s", "3"]);
        assert!(cli.diarization);
        assert_eq!(cli.speakers, Some(3));
    }

    #[test]
    fn cli_rejects_speakers_out_of_range() {
        assert!(Cli::try_parse_from(["batch-scribe", "a.wav", "-s", "1"]).is_err());
        assert!(Cli::try_parse_from(["batch-scribe", "a.wav", "-s", "11"]).is_err());
    }

    #[test]
    fn cli_parses_poll_interval() {
        let cli = Cli::parse_from(["batch-scribe", "a.wav", "--poll-interval", "30s"]);
        assert_eq!(cli.poll_interval, Some("30s".to_string()));
    }

    #[test]
    fn cli_parses_config_init() {
        let cli = Cli::parse_from(["batch-scribe", "config", "init"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Config {
                action: ConfigAction::Init
            })
        ));
    }

    #[test]
    fn cli_parses_config_set() {
        let cli = Cli::parse_from(["batch-scribe", "config", "set", "speakers", "4"]);
        if let Some(Commands::Config {
            action: ConfigAction::Set { key, value },
        }) = cli.command
        {
            assert_eq!(key, "speakers");
            assert_eq!(value, "4");
        } else {
            panic!("Expected Config Set command");
        }
    }

    #[test]
    fn valid_config_keys() {
        assert!(is_valid_config_key("api_key"));
        assert!(is_valid_config_key("poll_interval"));
        assert!(is_valid_config_key("speakers"));
        assert!(!is_valid_config_key("invalid_key"));
    }

    #[test]
    fn verify_cli() {
        // Verify the CLI definition is valid
        Cli::command().debug_assert();
    }
}
