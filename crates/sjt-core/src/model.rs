//! Core data model types for sjt.
//!
//! These are the fundamental types the whole pipeline passes around:
//! questions as loaded from the question file, the respondent, the answer
//! set produced by a collector, and the numeric point values.

use std::collections::BTreeMap;
use std::fmt;
use std::iter::Sum;
use std::ops::Add;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A single situational-judgement question.
///
/// Field names on the wire follow the question file format (`dimensi`,
/// `skenario`, `pertanyaan`, `opsi`, `poin`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Unique identifier (e.g. "Q1").
    pub id: String,
    /// Dimension or category the question measures.
    #[serde(rename = "dimensi", default)]
    pub dimension: String,
    /// Scenario text shown before the prompt.
    #[serde(rename = "skenario", default)]
    pub scenario: String,
    /// The prompt itself.
    #[serde(rename = "pertanyaan")]
    pub prompt: String,
    /// Option letter to option text.
    #[serde(rename = "opsi")]
    pub options: BTreeMap<String, String>,
    /// Option letter to point value.
    #[serde(rename = "poin")]
    pub points: BTreeMap<String, Points>,
}

impl Question {
    /// Point value for the given option letter, if the point table has one.
    pub fn points_for(&self, letter: &str) -> Option<Points> {
        self.points.get(letter).copied()
    }

    /// Whether `letter` is one of this question's options.
    pub fn has_option(&self, letter: &str) -> bool {
        self.options.contains_key(letter)
    }
}

/// A point value: integer or real.
///
/// Integer arithmetic stays integral; a real operand promotes the result to
/// real. Values are never rounded or clamped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Points {
    Int(i64),
    Real(f64),
}

impl Points {
    pub const ZERO: Points = Points::Int(0);

    pub fn as_f64(self) -> f64 {
        match self {
            Points::Int(i) => i as f64,
            Points::Real(r) => r,
        }
    }

    pub fn is_negative(self) -> bool {
        self.as_f64() < 0.0
    }
}

impl Default for Points {
    fn default() -> Self {
        Points::ZERO
    }
}

impl Add for Points {
    type Output = Points;

    fn add(self, rhs: Points) -> Points {
        match (self, rhs) {
            (Points::Int(a), Points::Int(b)) => match a.checked_add(b) {
                Some(sum) => Points::Int(sum),
                None => Points::Real(a as f64 + b as f64),
            },
            (a, b) => Points::Real(a.as_f64() + b.as_f64()),
        }
    }
}

impl Sum for Points {
    fn sum<I: Iterator<Item = Points>>(iter: I) -> Self {
        iter.fold(Points::ZERO, Add::add)
    }
}

impl From<i64> for Points {
    fn from(value: i64) -> Self {
        Points::Int(value)
    }
}

impl From<f64> for Points {
    fn from(value: f64) -> Self {
        Points::Real(value)
    }
}

impl fmt::Display for Points {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Points::Int(i) => write!(f, "{i}"),
            Points::Real(r) => write!(f, "{r}"),
        }
    }
}

/// The person completing the survey.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Respondent {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub institution: Option<String>,
    /// Experience or tenure category (e.g. semester band).
    #[serde(default)]
    pub experience: Option<String>,
}

impl Respondent {
    pub fn new(name: impl Into<String>, institution: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            institution: Some(institution.into()),
            experience: None,
        }
    }

    pub fn with_experience(mut self, experience: impl Into<String>) -> Self {
        self.experience = Some(experience.into());
        self
    }

    /// Raw value of a respondent field.
    pub fn get(&self, field: RespondentField) -> Option<&str> {
        match field {
            RespondentField::Name => self.name.as_deref(),
            RespondentField::Institution => self.institution.as_deref(),
            RespondentField::Experience => self.experience.as_deref(),
        }
    }

    pub fn set(&mut self, field: RespondentField, value: Option<String>) {
        match field {
            RespondentField::Name => self.name = value,
            RespondentField::Institution => self.institution = value,
            RespondentField::Experience => self.experience = value,
        }
    }
}

/// The respondent fields that can appear in a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RespondentField {
    Name,
    Institution,
    Experience,
}

impl RespondentField {
    pub const ALL: [RespondentField; 3] = [
        RespondentField::Name,
        RespondentField::Institution,
        RespondentField::Experience,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RespondentField::Name => "name",
            RespondentField::Institution => "institution",
            RespondentField::Experience => "experience",
        }
    }

    /// Whether a submission is rejected when this field is blank.
    pub fn is_required(self) -> bool {
        matches!(self, RespondentField::Name | RespondentField::Institution)
    }
}

impl fmt::Display for RespondentField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RespondentField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "name" => Ok(RespondentField::Name),
            "institution" => Ok(RespondentField::Institution),
            "experience" => Ok(RespondentField::Experience),
            other => Err(format!("unknown respondent field: {other}")),
        }
    }
}

/// A collector's answer for one question.
///
/// On the wire this is a letter or `null`; an empty string is read as no
/// selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum Selection {
    Chosen(String),
    NoSelection,
}

impl Selection {
    pub fn letter(&self) -> Option<&str> {
        match self {
            Selection::Chosen(letter) => Some(letter),
            Selection::NoSelection => None,
        }
    }
}

impl From<Option<String>> for Selection {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(letter) if !letter.trim().is_empty() => Selection::Chosen(letter),
            _ => Selection::NoSelection,
        }
    }
}

impl From<Selection> for Option<String> {
    fn from(value: Selection) -> Self {
        match value {
            Selection::Chosen(letter) => Some(letter),
            Selection::NoSelection => None,
        }
    }
}

/// Question id to selection, as handed over by a response collector.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSet(BTreeMap<String, Selection>);

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, question_id: impl Into<String>, letter: impl Into<String>) {
        self.0
            .insert(question_id.into(), Selection::Chosen(letter.into()));
    }

    /// Reset a question to the no-selection sentinel.
    pub fn clear(&mut self, question_id: impl Into<String>) {
        self.0.insert(question_id.into(), Selection::NoSelection);
    }

    /// The selected letter, or `None` when absent or unanswered.
    pub fn letter(&self, question_id: &str) -> Option<&str> {
        self.0.get(question_id).and_then(Selection::letter)
    }

    pub fn get(&self, question_id: &str) -> Option<&Selection> {
        self.0.get(question_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Selection)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, L: Into<String>> FromIterator<(K, L)> for AnswerSet {
    fn from_iter<T: IntoIterator<Item = (K, L)>>(iter: T) -> Self {
        let mut answers = AnswerSet::new();
        for (id, letter) in iter {
            answers.select(id, letter);
        }
        answers
    }
}
