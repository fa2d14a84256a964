//! Question value objects

use std::fmt;
use std::str::FromStr;

/// The kind of answer expected for a question.
///
/// The wire representation uses space-separated lowercase strings
/// ("short answer", "long answer", ...), exactly as the API expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AnswerKind {
    #[default]
    ShortAnswer,
    LongAnswer,
    Boolean,
    Enum,
    Number,
}

impl AnswerKind {
    /// Wire string for this answer kind
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ShortAnswer => "short answer",
            Self::LongAnswer => "long answer",
            Self::Boolean => "boolean",
            Self::Enum => "enum",
            Self::Number => "number",
        }
    }

    /// All valid wire strings
    pub const fn all() -> &'static [&'static str] {
        &["short answer", "long answer", "boolean", "enum", "number"]
    }
}

impl fmt::Display for AnswerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error when an answer kind string is not recognized
#[derive(Debug, Clone, thiserror::Error)]
#[error("Invalid answer kind: \"{input}\". Valid kinds are: short answer, long answer, boolean, enum, number")]
pub struct InvalidAnswerKindError {
    pub input: String,
}

impl FromStr for AnswerKind {
    type Err = InvalidAnswerKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "short answer" | "short-answer" | "short_answer" => Ok(Self::ShortAnswer),
            "long answer" | "long-answer" | "long_answer" => Ok(Self::LongAnswer),
            "boolean" => Ok(Self::Boolean),
            "enum" => Ok(Self::Enum),
            "number" => Ok(Self::Number),
            _ => Err(InvalidAnswerKindError {
                input: s.to_string(),
            }),
        }
    }
}

/// A caller-assigned question to ask about each audio file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    /// Stable, caller-assigned identifier (e.g. "q1")
    pub id: String,
    /// The question text; entries with empty text are dropped from job parameters
    pub text: String,
    /// Expected answer kind
    pub kind: AnswerKind,
    /// Optional extra context or instructions
    pub description: Option<String>,
}

impl Question {
    /// Create a question with the given id, text, and answer kind
    pub fn new(id: impl Into<String>, text: impl Into<String>, kind: AnswerKind) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            kind,
            description: None,
        }
    }

    /// Attach a description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Whether this question carries any text worth sending
    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_kind_wire_strings() {
        assert_eq!(AnswerKind::ShortAnswer.as_str(), "short answer");
        assert_eq!(AnswerKind::LongAnswer.as_str(), "long answer");
        assert_eq!(AnswerKind::Boolean.as_str(), "boolean");
        assert_eq!(AnswerKind::Enum.as_str(), "enum");
        assert_eq!(AnswerKind::Number.as_str(), "number");
    }

    #[test]
    fn answer_kind_parses_wire_strings() {
        assert_eq!(
            "short answer".parse::<AnswerKind>().unwrap(),
            AnswerKind::ShortAnswer
        );
        assert_eq!("boolean".parse::<AnswerKind>().unwrap(), AnswerKind::Boolean);
        assert_eq!("NUMBER".parse::<AnswerKind>().unwrap(), AnswerKind::Number);
    }

    #[test]
    fn answer_kind_parses_dashed_aliases() {
        assert_eq!(
            "short-answer".parse::<AnswerKind>().unwrap(),
            AnswerKind::ShortAnswer
        );
        assert_eq!(
            "long_answer".parse::<AnswerKind>().unwrap(),
            AnswerKind::LongAnswer
        );
    }

    #[test]
    fn answer_kind_rejects_unknown() {
        assert!("essay".parse::<AnswerKind>().is_err());
    }

    #[test]
    fn question_has_text() {
        let q = Question::new("q1", "What is the issue?", AnswerKind::ShortAnswer);
        assert!(q.has_text());

        let empty = Question::new("q2", "   ", AnswerKind::ShortAnswer);
        assert!(!empty.has_text());
    }

    #[test]
    fn question_with_description() {
        let q = Question::new("q1", "text", AnswerKind::Enum).with_description("pick one");
        assert_eq!(q.description.as_deref(), Some("pick one"));
    }
}
