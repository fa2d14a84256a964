//! Analysis result value objects

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error when a downloaded result file is not valid result JSON
#[derive(Debug, Clone, Error)]
#[error("Failed to parse result file \"{file}\": {detail}")]
pub struct ResultParseError {
    pub file: String,
    pub detail: String,
}

/// One answered question from a result file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub reasoning: String,
}

/// Parsed content of one `.json` result file.
///
/// Missing fields are tolerated the way the result store delivers them:
/// a result without a diarized transcript is normal when diarization was
/// not requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default)]
    pub transcript: String,
    #[serde(default)]
    pub diarized_transcript: Option<String>,
    #[serde(default)]
    pub answers: Vec<Answer>,
}

impl AnalysisResult {
    /// Parse one downloaded result file (UTF-8 JSON).
    pub fn parse(file: &str, bytes: &[u8]) -> Result<Self, ResultParseError> {
        serde_json::from_slice(bytes).map_err(|e| ResultParseError {
            file: file.to_string(),
            detail: e.to_string(),
        })
    }
}
