//! Survey session orchestrator.
//!
//! Drives one respondent through validate → score → assemble → submit and
//! keeps the captured answers across rejected and failed attempts.

use chrono::NaiveDateTime;

use crate::error::SessionError;
use crate::model::{AnswerSet, Points, Question, Respondent};
use crate::scoring::{score, Scorecard};
use crate::submission::{assemble, ColumnLayout, SubmissionRecord};
use crate::traits::PersistenceGateway;
use crate::validate::{validate, ValidationResult};

/// Where a session stands between submission attempts.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Collecting,
    /// The last attempt reached the gateway and failed; answers are kept.
    SubmissionFailed { error: String },
    Submitted { total: Points },
}

/// A successful submission.
#[derive(Debug, Clone)]
pub struct Receipt {
    pub scorecard: Scorecard,
    pub record: SubmissionRecord,
}

impl Receipt {
    pub fn total(&self) -> Points {
        self.scorecard.total
    }
}

/// Result of one submission attempt.
#[derive(Debug)]
pub enum SubmitOutcome {
    /// Validation failed; back to collecting.
    Rejected(ValidationResult),
    /// The gateway refused or could not be reached.
    Failed(anyhow::Error),
    Submitted(Receipt),
}

/// One respondent's survey.
pub struct SurveySession {
    questions: Vec<Question>,
    layout: ColumnLayout,
    respondent: Respondent,
    answers: AnswerSet,
    state: SessionState,
    attempts: u32,
}

impl SurveySession {
    pub fn new(questions: Vec<Question>, layout: ColumnLayout) -> Self {
        Self {
            questions,
            layout,
            respondent: Respondent::default(),
            answers: AnswerSet::new(),
            state: SessionState::Collecting,
            attempts: 0,
        }
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn layout(&self) -> &ColumnLayout {
        &self.layout
    }

    pub fn respondent(&self) -> &Respondent {
        &self.respondent
    }

    pub fn respondent_mut(&mut self) -> &mut Respondent {
        &mut self.respondent
    }

    pub fn answers(&self) -> &AnswerSet {
        &self.answers
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Number of submission attempts that got past validation.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Record a selection. The letter is trimmed and upper-cased.
    pub fn select(&mut self, question_id: &str, letter: &str) -> Result<(), SessionError> {
        self.ensure_open()?;
        let question = self.question(question_id)?;
        let letter = letter.trim().to_uppercase();
        if !question.has_option(&letter) {
            return Err(SessionError::UnknownOption {
                question_id: question_id.to_string(),
                letter,
            });
        }
        self.answers.select(question_id, letter);
        Ok(())
    }

    pub fn clear(&mut self, question_id: &str) -> Result<(), SessionError> {
        self.ensure_open()?;
        self.question(question_id)?;
        self.answers.clear(question_id);
        Ok(())
    }

    /// Apply every entry of a collected answer set, checking each one.
    pub fn set_answers(&mut self, answers: &AnswerSet) -> Result<(), SessionError> {
        for (id, selection) in answers.iter() {
            match selection.letter() {
                Some(letter) => self.select(id, letter)?,
                None => self.clear(id)?,
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> ValidationResult {
        validate(&self.respondent, &self.answers, &self.questions)
    }

    /// Attempt a submission stamped with `timestamp`.
    ///
    /// Scoring errors are returned as `Err` and mean the question data is
    /// inconsistent; everything the respondent can fix comes back as an
    /// outcome.
    pub async fn submit(
        &mut self,
        gateway: &dyn PersistenceGateway,
        timestamp: NaiveDateTime,
    ) -> Result<SubmitOutcome, SessionError> {
        self.ensure_open()?;

        let validation = self.validate();
        if !validation.is_ok() {
            tracing::warn!("submission rejected: {validation}");
            self.state = SessionState::Collecting;
            return Ok(SubmitOutcome::Rejected(validation));
        }

        let scorecard = score(&self.answers, &self.questions).inspect_err(|e| {
            tracing::error!("scoring failed, question data is inconsistent: {e}");
        })?;
        let record = assemble(&self.layout, timestamp, &self.respondent, &scorecard);

        self.attempts += 1;
        match gateway.append_row(&record).await {
            Ok(()) => {
                tracing::info!(
                    "submission appended via {} (total {}, attempt {})",
                    gateway.name(),
                    scorecard.total,
                    self.attempts
                );
                self.state = SessionState::Submitted {
                    total: scorecard.total,
                };
                Ok(SubmitOutcome::Submitted(Receipt { scorecard, record }))
            }
            Err(e) => {
                tracing::warn!("submission via {} failed: {e:#}", gateway.name());
                self.state = SessionState::SubmissionFailed {
                    error: format!("{e:#}"),
                };
                Ok(SubmitOutcome::Failed(e))
            }
        }
    }

    /// [`submit`](Self::submit) stamped with the local wall clock.
    pub async fn submit_now(
        &mut self,
        gateway: &dyn PersistenceGateway,
    ) -> Result<SubmitOutcome, SessionError> {
        let now = chrono::Local::now().naive_local();
        self.submit(gateway, now).await
    }

    fn question(&self, question_id: &str) -> Result<&Question, SessionError> {
        self.questions
            .iter()
            .find(|q| q.id == question_id)
            .ok_or_else(|| SessionError::UnknownQuestion(question_id.to_string()))
    }

    fn ensure_open(&self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Submitted { .. } => Err(SessionError::AlreadySubmitted),
            _ => Ok(()),
        }
    }
}
