//! Submission validation.

use std::fmt;

use crate::model::{AnswerSet, Question, Respondent, RespondentField};

/// Outcome of checking a submission attempt.
///
/// Missing respondent fields are reported first; the unanswered list is only
/// computed once the respondent is complete, and then covers every question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Ok,
    MissingRespondentFields(Vec<RespondentField>),
    UnansweredQuestions(Vec<String>),
}

impl ValidationResult {
    pub fn is_ok(&self) -> bool {
        matches!(self, ValidationResult::Ok)
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationResult::Ok => write!(f, "ok"),
            ValidationResult::MissingRespondentFields(fields) => {
                let names: Vec<&str> = fields.iter().map(|f| f.as_str()).collect();
                write!(f, "missing respondent fields: {}", names.join(", "))
            }
            ValidationResult::UnansweredQuestions(ids) => {
                write!(f, "unanswered questions: {}", ids.join(", "))
            }
        }
    }
}

/// Check respondent completeness, then that every question has a selection.
pub fn validate(
    respondent: &Respondent,
    answers: &AnswerSet,
    questions: &[Question],
) -> ValidationResult {
    let missing: Vec<RespondentField> = RespondentField::ALL
        .into_iter()
        .filter(|f| f.is_required())
        .filter(|f| !matches!(respondent.get(*f), Some(v) if !v.trim().is_empty()))
        .collect();
    if !missing.is_empty() {
        return ValidationResult::MissingRespondentFields(missing);
    }

    let unanswered: Vec<String> = questions
        .iter()
        .filter(|q| answers.letter(&q.id).is_none())
        .map(|q| q.id.clone())
        .collect();
    if !unanswered.is_empty() {
        return ValidationResult::UnansweredQuestions(unanswered);
    }

    ValidationResult::Ok
}
