//! Call-analytics value objects and entities

pub mod job;
pub mod question;
pub mod result;

pub use job::{JobHandle, JobParameters, JobStatus, ANALYTICS_MODEL};
pub use question::{AnswerKind, InvalidAnswerKindError, Question};
pub use result::{AnalysisResult, Answer, ResultParseError};
