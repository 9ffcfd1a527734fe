//! Submission record assembly.
//!
//! The record is appended to the remote sheet as a positional value list, so
//! its field order has to match the sheet's header row exactly. The order is
//! fixed by a [`ColumnLayout`] chosen at startup:
//!
//! ```text
//! timestamp | respondent fields... | total | Q1 answer | Q1 points | Q2 answer | ...
//! ```
//!
//! [`ColumnLayout::headers`] renders the matching header row.

use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

use crate::model::{Points, Question, Respondent, RespondentField};
use crate::scoring::{QuestionScore, Scorecard};

const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format `ts`, or `None` when the format needs data a naive timestamp
/// does not carry.
fn try_format(ts: &NaiveDateTime, format: &str) -> Option<String> {
    let mut out = String::new();
    write!(out, "{}", ts.format(format)).ok()?;
    Some(out)
}

/// One respondent column and its header text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RespondentColumn {
    pub field: RespondentField,
    pub header: String,
}

impl RespondentColumn {
    pub fn new(field: RespondentField, header: impl Into<String>) -> Self {
        Self {
            field,
            header: header.into(),
        }
    }
}

/// Column order and header names of the target sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnLayout {
    pub timestamp_header: String,
    /// chrono format string used when the timestamp is written out.
    pub timestamp_format: String,
    pub respondent_columns: Vec<RespondentColumn>,
    pub total_header: String,
    /// Appended to the question id for the answer column (`Q1_Jwb`).
    pub answer_suffix: String,
    /// Appended to the question id for the points column (`Q1_Poin`).
    pub points_suffix: String,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            timestamp_header: "Timestamp".into(),
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.into(),
            respondent_columns: vec![
                RespondentColumn::new(RespondentField::Name, "Nama"),
                RespondentColumn::new(RespondentField::Institution, "Sekolah"),
                RespondentColumn::new(RespondentField::Experience, "Pengalaman"),
            ],
            total_header: "Total_Skor".into(),
            answer_suffix: "_Jwb".into(),
            points_suffix: "_Poin".into(),
        }
    }
}

impl ColumnLayout {
    /// Header row for the given questions, in submission order.
    pub fn headers(&self, questions: &[Question]) -> Vec<String> {
        let mut headers = Vec::with_capacity(self.column_count(questions.len()));
        headers.push(self.timestamp_header.clone());
        headers.extend(self.respondent_columns.iter().map(|c| c.header.clone()));
        headers.push(self.total_header.clone());
        for q in questions {
            headers.push(self.answer_header(&q.id));
            headers.push(self.points_header(&q.id));
        }
        headers
    }

    pub fn column_count(&self, question_count: usize) -> usize {
        2 + self.respondent_columns.len() + 2 * question_count
    }

    pub fn answer_header(&self, question_id: &str) -> String {
        format!("{question_id}{}", self.answer_suffix)
    }

    pub fn points_header(&self, question_id: &str) -> String {
        format!("{question_id}{}", self.points_suffix)
    }

    /// Problems that would make headers ambiguous.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        for (i, col) in self.respondent_columns.iter().enumerate() {
            if self.respondent_columns[..i].iter().any(|c| c.field == col.field) {
                problems.push(format!("respondent field '{}' listed twice", col.field));
            }
        }
        if self.answer_suffix == self.points_suffix {
            problems.push("answer and points suffixes must differ".into());
        }
        if StrftimeItems::new(&self.timestamp_format).any(|item| matches!(item, Item::Error)) {
            problems.push(format!("invalid timestamp format: {}", self.timestamp_format));
        } else if NaiveDate::from_ymd_opt(2000, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .is_some_and(|sample| try_format(&sample, &self.timestamp_format).is_none())
        {
            // Parses, but asks for something a naive timestamp lacks (e.g. `%z`).
            problems.push(format!(
                "timestamp format cannot be applied to a local time: {}",
                self.timestamp_format
            ));
        }

        let mut fixed: Vec<&str> = vec![self.timestamp_header.as_str()];
        fixed.extend(self.respondent_columns.iter().map(|c| c.header.as_str()));
        fixed.push(self.total_header.as_str());
        for (i, header) in fixed.iter().enumerate() {
            if fixed[..i].contains(header) {
                problems.push(format!("header '{header}' used twice"));
            }
            let suffixes = [&self.answer_suffix, &self.points_suffix];
            if suffixes
                .iter()
                .any(|suffix| !suffix.is_empty() && header.ends_with(suffix.as_str()))
            {
                problems.push(format!(
                    "header '{header}' ends like a question column and could be mistaken for one"
                ));
            }
        }
        problems
    }
}

/// A single cell of the submitted row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    Timestamp(NaiveDateTime),
    Text(String),
    Points(Points),
    Empty,
}

/// The ordered row handed to the persistence gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    fields: Vec<(String, Cell)>,
    timestamp_format: String,
}

/// The values a record was assembled from.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionParts {
    pub timestamp: NaiveDateTime,
    pub respondent: Respondent,
    pub total: Points,
    pub details: Vec<QuestionScore>,
}

impl SubmissionRecord {
    pub fn fields(&self) -> &[(String, Cell)] {
        &self.fields
    }

    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(h, _)| h.as_str())
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.fields.iter().map(|(_, c)| c)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Positional row values as JSON: timestamps formatted, points numeric,
    /// empty cells as `""`.
    pub fn row_values(&self) -> Vec<JSValue> {
        self.cells()
            .map(|cell| match cell {
                Cell::Timestamp(ts) => JSValue::String(
                    try_format(ts, &self.timestamp_format)
                        .unwrap_or_else(|| ts.format(DEFAULT_TIMESTAMP_FORMAT).to_string()),
                ),
                Cell::Text(s) => JSValue::String(s.clone()),
                Cell::Points(Points::Int(i)) => JSValue::from(*i),
                Cell::Points(Points::Real(r)) => JSValue::from(*r),
                Cell::Empty => JSValue::String(String::new()),
            })
            .collect()
    }

    /// Read the record back by declared order.
    ///
    /// Returns `None` if the record does not have the shape `layout` produces.
    pub fn decompose(&self, layout: &ColumnLayout) -> Option<SubmissionParts> {
        let mut cells = self.fields.iter();

        let timestamp = match cells.next()? {
            (_, Cell::Timestamp(ts)) => *ts,
            _ => return None,
        };

        let mut respondent = Respondent::default();
        for col in &layout.respondent_columns {
            let value = match cells.next()? {
                (_, Cell::Text(s)) => Some(s.clone()),
                (_, Cell::Empty) => None,
                _ => return None,
            };
            respondent.set(col.field, value);
        }

        let total = match cells.next()? {
            (_, Cell::Points(p)) => *p,
            _ => return None,
        };

        let mut details = Vec::new();
        while let Some((answer_header, answer)) = cells.next() {
            let question_id = answer_header.strip_suffix(&layout.answer_suffix)?;
            let letter = match answer {
                Cell::Text(l) => l.clone(),
                _ => return None,
            };
            let points = match cells.next()? {
                (_, Cell::Points(p)) => *p,
                _ => return None,
            };
            details.push(QuestionScore {
                question_id: question_id.to_string(),
                letter,
                points,
            });
        }

        Some(SubmissionParts {
            timestamp,
            respondent,
            total,
            details,
        })
    }
}

/// Flatten a scored submission into the layout's column order.
pub fn assemble(
    layout: &ColumnLayout,
    timestamp: NaiveDateTime,
    respondent: &Respondent,
    scorecard: &Scorecard,
) -> SubmissionRecord {
    let mut fields = Vec::with_capacity(layout.column_count(scorecard.details.len()));

    fields.push((layout.timestamp_header.clone(), Cell::Timestamp(timestamp)));
    for col in &layout.respondent_columns {
        let cell = match respondent.get(col.field) {
            Some(value) => Cell::Text(value.to_string()),
            None => Cell::Empty,
        };
        fields.push((col.header.clone(), cell));
    }
    fields.push((layout.total_header.clone(), Cell::Points(scorecard.total)));
    for detail in &scorecard.details {
        fields.push((
            layout.answer_header(&detail.question_id),
            Cell::Text(detail.letter.clone()),
        ));
        fields.push((
            layout.points_header(&detail.question_id),
            Cell::Points(detail.points),
        ));
    }

    SubmissionRecord {
        fields,
        timestamp_format: layout.timestamp_format.clone(),
    }
}
