//! sjt-core: question store, validation, scoring and submission assembly.
//!
//! This crate defines the data model and the validate → score → assemble
//! pipeline for a single situational-judgement survey, plus the trait the
//! persistence gateways implement.

pub mod error;
pub mod model;
pub mod parser;
pub mod scoring;
pub mod session;
pub mod submission;
pub mod traits;
pub mod validate;

pub use error::{QuestionStoreError, ScoringError, SessionError};
pub use model::{AnswerSet, Points, Question, Respondent, RespondentField, Selection};
pub use parser::QuestionStore;
pub use session::{SessionState, SubmitOutcome, SurveySession};
pub use submission::{ColumnLayout, SubmissionRecord};
