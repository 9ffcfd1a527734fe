//! Error types for the survey pipeline.
//!
//! Validation failures are not errors: they come back as
//! [`ValidationResult`](crate::validate::ValidationResult) values so the
//! session can return to collecting. Everything here is either fatal to the
//! session (question store, scoring) or a misuse of the session API.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading the question file.
#[derive(Debug, Error)]
pub enum QuestionStoreError {
    /// The question file does not exist.
    #[error("question file not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// The file is not valid UTF-8 JSON of the expected shape.
    #[error("malformed question file {}: {message}", path.display())]
    MalformedData { path: PathBuf, message: String },

    /// A question parsed but is internally inconsistent.
    #[error("invalid question '{id}': {reason}")]
    InvalidQuestion { id: String, reason: String },

    /// Any other read failure.
    #[error("failed to read question file {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised by the scorer.
///
/// Both indicate inconsistent question data or a scorer called before
/// validation passed, and neither falls back to zero points.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoringError {
    #[error("question '{question_id}' has no point value for option '{letter}'")]
    UnknownOptionLetter { question_id: String, letter: String },

    #[error("question '{question_id}' has no answer")]
    MissingAnswer { question_id: String },
}

/// Errors from driving a [`SurveySession`](crate::session::SurveySession).
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("unknown question: {0}")]
    UnknownQuestion(String),

    #[error("question '{question_id}' has no option '{letter}'")]
    UnknownOption { question_id: String, letter: String },

    #[error("survey already submitted")]
    AlreadySubmitted,

    #[error(transparent)]
    Scoring(#[from] ScoringError),
}
