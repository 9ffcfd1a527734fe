//! Weighted scoring of a validated answer set.

use serde::{Deserialize, Serialize};

use crate::error::ScoringError;
use crate::model::{AnswerSet, Points, Question};

/// Points earned on one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionScore {
    pub question_id: String,
    pub letter: String,
    pub points: Points,
}

/// Total plus per-question breakdown, in canonical question order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scorecard {
    pub total: Points,
    pub details: Vec<QuestionScore>,
}

/// Score an answer set that has already passed validation.
///
/// The total is the exact sum of each selected option's point value.
pub fn score(answers: &AnswerSet, questions: &[Question]) -> Result<Scorecard, ScoringError> {
    let details = questions
        .iter()
        .map(|q| {
            let letter = answers
                .letter(&q.id)
                .ok_or_else(|| ScoringError::MissingAnswer {
                    question_id: q.id.clone(),
                })?;
            let points =
                q.points_for(letter)
                    .ok_or_else(|| ScoringError::UnknownOptionLetter {
                        question_id: q.id.clone(),
                        letter: letter.to_string(),
                    })?;
            Ok(QuestionScore {
                question_id: q.id.clone(),
                letter: letter.to_string(),
                points,
            })
        })
        .collect::<Result<Vec<_>, ScoringError>>()?;

    let total = details.iter().map(|d| d.points).sum();
    tracing::debug!("scored {} questions, total {}", details.len(), total);

    Ok(Scorecard { total, details })
}
