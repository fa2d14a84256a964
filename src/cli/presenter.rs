//! CLI presenter for output formatting

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::domain::analytics::AnalysisResult;

/// Presenter for CLI output formatting
pub struct Presenter {
    spinner: Option<ProgressBar>,
}

impl Presenter {
    /// Create a new presenter
    pub fn new() -> Self {
        Self { spinner: None }
    }

    /// Start a spinner with message and return a handle to it
    pub fn start_spinner(&mut self, message: &str) -> ProgressBar {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
                .template("{spinner:.cyan} {msg}")
                .unwrap(),
        );
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        self.spinner = Some(spinner.clone());
        spinner
    }

    /// Mark spinner as success and finish
    pub fn spinner_success(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_with_message(format!("{} {}", "✓".green(), message));
        }
    }

    /// Mark spinner as failed and finish
    pub fn spinner_fail(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_with_message(format!("{} {}", "✗".red(), message));
        }
    }

    /// Print info message to stderr
    pub fn info(&self, message: &str) {
        eprintln!("{} {}", "ℹ".cyan(), message);
    }

    /// Print success message to stderr
    pub fn success(&self, message: &str) {
        eprintln!("{} {}", "✓".green(), message);
    }

    /// Print warning message to stderr
    pub fn warn(&self, message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print error message to stderr
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Output text to stdout
    pub fn output(&self, text: &str) {
        println!("{}", text);
    }

    /// Print a key-value pair (for config list)
    pub fn key_value(&self, key: &str, value: &str) {
        println!("{}: {}", key.cyan(), value);
    }

    /// Render one parsed result to stdout
    pub fn render_result(&self, index: usize, result: &AnalysisResult, with_diarization: bool) {
        println!();
        println!("{}", format!("── Result {} ──", index + 1).bold());

        println!("{}", "Transcript".cyan().bold());
        if result.transcript.is_empty() {
            println!("(no transcript available)");
        } else {
            println!("{}", result.transcript);
        }

        if with_diarization {
            println!();
            println!("{}", "Diarized transcript".cyan().bold());
            match result.diarized_transcript.as_deref() {
                Some(text) if !text.is_empty() => println!("{}", text),
                _ => println!("(no diarized transcript available)"),
            }
        }

        if !result.answers.is_empty() {
            println!();
            println!("{}", "Answers".cyan().bold());
            for answer in &result.answers {
                println!("{} {}", "Q:".bold(), answer.question);
                println!("{} {}", "A:".bold(), answer.response);
                if !answer.reasoning.is_empty() {
                    println!("   {}", answer.reasoning.dimmed());
                }
            }
        }
    }
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new()
    }
}
