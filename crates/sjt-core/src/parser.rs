//! Question store.
//!
//! Loads the ordered question list from a JSON file and checks it for
//! consistency. The order of the file is the canonical order used for
//! scoring and for the submission column layout.

use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::QuestionStoreError;
use crate::model::Question;

/// Option letters every question must define unless configured otherwise.
pub const DEFAULT_OPTION_LETTERS: [&str; 4] = ["A", "B", "C", "D"];

const UTF8_BOM: char = '\u{feff}';

/// A question file on disk.
#[derive(Debug, Clone)]
pub struct QuestionStore {
    path: PathBuf,
    required_letters: Vec<String>,
}

impl QuestionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            required_letters: DEFAULT_OPTION_LETTERS.iter().map(|l| l.to_string()).collect(),
        }
    }

    /// Override the option letters every question must define.
    pub fn with_required_letters(mut self, letters: Vec<String>) -> Self {
        self.required_letters = letters;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and check the question file.
    pub fn load(&self) -> Result<Vec<Question>, QuestionStoreError> {
        let bytes = std::fs::read(&self.path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => QuestionStoreError::NotFound {
                path: self.path.clone(),
            },
            _ => QuestionStoreError::Io {
                path: self.path.clone(),
                source: e,
            },
        })?;

        let questions = parse_questions_bytes(&bytes, &self.path, &self.required_letters)?;
        tracing::info!(
            "loaded {} questions from {}",
            questions.len(),
            self.path.display()
        );
        Ok(questions)
    }
}

/// Parse question file content (useful for testing).
///
/// A leading UTF-8 byte-order mark is skipped.
pub fn parse_questions_bytes(
    bytes: &[u8],
    source_path: &Path,
    required_letters: &[String],
) -> Result<Vec<Question>, QuestionStoreError> {
    let content = std::str::from_utf8(bytes).map_err(|e| QuestionStoreError::MalformedData {
        path: source_path.to_path_buf(),
        message: format!("invalid UTF-8: {e}"),
    })?;
    parse_questions_str(content, source_path, required_letters)
}

/// Parse question file text.
pub fn parse_questions_str(
    content: &str,
    source_path: &Path,
    required_letters: &[String],
) -> Result<Vec<Question>, QuestionStoreError> {
    let content = match content.strip_prefix(UTF8_BOM) {
        Some(rest) => {
            tracing::debug!("skipping byte-order mark in {}", source_path.display());
            rest
        }
        None => content,
    };

    let questions: Vec<Question> =
        serde_json::from_str(content).map_err(|e| QuestionStoreError::MalformedData {
            path: source_path.to_path_buf(),
            message: e.to_string(),
        })?;

    if questions.is_empty() {
        return Err(QuestionStoreError::MalformedData {
            path: source_path.to_path_buf(),
            message: "file contains no questions".into(),
        });
    }

    check_questions(&questions, required_letters)?;
    Ok(questions)
}

/// Check ids and option/point tables.
///
/// Every question needs a non-empty unique id, every required letter among
/// its options, and a point table whose letters are all options.
pub fn check_questions(
    questions: &[Question],
    required_letters: &[String],
) -> Result<(), QuestionStoreError> {
    let mut seen_ids = HashSet::new();

    for (index, q) in questions.iter().enumerate() {
        if q.id.trim().is_empty() {
            return Err(QuestionStoreError::InvalidQuestion {
                id: format!("#{}", index + 1),
                reason: "empty id".into(),
            });
        }
        if !seen_ids.insert(q.id.as_str()) {
            return Err(QuestionStoreError::InvalidQuestion {
                id: q.id.clone(),
                reason: "duplicate id".into(),
            });
        }

        let missing: Vec<&str> = required_letters
            .iter()
            .filter(|l| !q.options.contains_key(l.as_str()))
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            return Err(QuestionStoreError::InvalidQuestion {
                id: q.id.clone(),
                reason: format!("missing options: {}", missing.join(", ")),
            });
        }

        let stray: Vec<&str> = q
            .points
            .keys()
            .filter(|l| !q.options.contains_key(l.as_str()))
            .map(String::as_str)
            .collect();
        if !stray.is_empty() {
            return Err(QuestionStoreError::InvalidQuestion {
                id: q.id.clone(),
                reason: format!("points given for undefined options: {}", stray.join(", ")),
            });
        }
    }

    Ok(())
}

/// A non-fatal observation about a question file.
#[derive(Debug, Clone)]
pub struct LintWarning {
    pub question_id: String,
    pub message: String,
}

/// Look for things that load fine but will likely bite at submission time.
pub fn lint_questions(questions: &[Question]) -> Vec<LintWarning> {
    let mut warnings = Vec::new();

    for q in questions {
        // Selecting one of these fails scoring.
        for letter in q.options.keys() {
            if !q.points.contains_key(letter) {
                warnings.push(LintWarning {
                    question_id: q.id.clone(),
                    message: format!("option {letter} has no point value"),
                });
            }
        }
        if q.prompt.trim().is_empty() {
            warnings.push(LintWarning {
                question_id: q.id.clone(),
                message: "prompt is empty".into(),
            });
        }
        if q.scenario.trim().is_empty() {
            warnings.push(LintWarning {
                question_id: q.id.clone(),
                message: "scenario is empty".into(),
            });
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Points;

    const VALID_JSON: &str = r#"[
  {
    "id": "Q1",
    "dimensi": "Pedagogy",
    "skenario": "Your class uses a chatbot to draft essays.",
    "pertanyaan": "What is your first step?",
    "opsi": {"A": "Set usage rules", "B": "Ban it", "C": "Ignore it", "D": "Report students"},
    "poin": {"A": 3, "B": 1, "C": 0, "D": -2}
  },
  {
    "id": "Q2",
    "dimensi": "Data literacy",
    "skenario": "A grading tool flags an outlier.",
    "pertanyaan": "How do you respond?",
    "opsi": {"A": "Accept it", "B": "Check the data", "C": "Ask a colleague", "D": "Drop the tool"},
    "poin": {"A": 0, "B": 2, "C": 2, "D": 0}
  }
]"#;

    fn letters() -> Vec<String> {
        DEFAULT_OPTION_LETTERS.iter().map(|l| l.to_string()).collect()
    }

    fn parse(content: &str) -> Result<Vec<Question>, QuestionStoreError> {
        parse_questions_str(content, Path::new("sjt_questions.json"), &letters())
    }

    #[test]
    fn parse_valid_file_in_order() {
        let questions = parse(VALID_JSON).unwrap();
        let ids: Vec<&str> = questions.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids, vec!["Q1", "Q2"]);
        assert_eq!(questions[0].points_for("D"), Some(Points::Int(-2)));
    }

    #[test]
    fn byte_order_mark_is_skipped() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(VALID_JSON.as_bytes());
        let questions =
            parse_questions_bytes(&bytes, Path::new("bom.json"), &letters()).unwrap();
        assert_eq!(questions[0].id, "Q1");
    }

    #[test]
    fn invalid_utf8_is_malformed() {
        let bytes = [b'[', 0xFF, 0xFE, b']'];
        let err = parse_questions_bytes(&bytes, Path::new("bad.json"), &letters()).unwrap_err();
        assert!(matches!(err, QuestionStoreError::MalformedData { .. }));
    }

    #[test]
    fn syntax_error_is_malformed() {
        let err = parse("[{\"id\": \"Q1\",").unwrap_err();
        assert!(matches!(err, QuestionStoreError::MalformedData { .. }));
    }

    #[test]
    fn wrong_shape_is_malformed() {
        let err = parse(r#"{"questions": []}"#).unwrap_err();
        assert!(matches!(err, QuestionStoreError::MalformedData { .. }));
        let err = parse("[]").unwrap_err();
        assert!(err.to_string().contains("no questions"));
    }

    #[test]
    fn points_for_undefined_option_rejected() {
        let json = r#"[{
            "id": "Q1", "pertanyaan": "?",
            "opsi": {"A": "a", "B": "b", "C": "c", "D": "d"},
            "poin": {"A": 1, "E": 4}
        }]"#;
        let err = parse(json).unwrap_err();
        match err {
            QuestionStoreError::InvalidQuestion { id, reason } => {
                assert_eq!(id, "Q1");
                assert!(reason.contains('E'), "reason: {reason}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_required_option_rejected() {
        let json = r#"[{
            "id": "Q1", "pertanyaan": "?",
            "opsi": {"A": "a", "B": "b", "C": "c"},
            "poin": {"A": 1}
        }]"#;
        let err = parse(json).unwrap_err();
        assert!(err.to_string().contains("missing options: D"));
    }

    #[test]
    fn custom_letters_allow_more_options() {
        let json = r#"[{
            "id": "Q1", "pertanyaan": "?",
            "opsi": {"A": "a", "B": "b", "C": "c", "D": "d", "E": "e"},
            "poin": {"A": 1, "B": 0, "C": 0, "D": 0, "E": 5}
        }]"#;
        let five: Vec<String> = ["A", "B", "C", "D", "E"].iter().map(|l| l.to_string()).collect();
        let questions = parse_questions_str(json, Path::new("q.json"), &five).unwrap();
        assert_eq!(questions[0].points_for("E"), Some(Points::Int(5)));
    }

    #[test]
    fn duplicate_ids_rejected() {
        let json = r#"[
            {"id": "Q1", "pertanyaan": "?", "opsi": {"A": "a", "B": "b", "C": "c", "D": "d"}, "poin": {}},
            {"id": "Q1", "pertanyaan": "?", "opsi": {"A": "a", "B": "b", "C": "c", "D": "d"}, "poin": {}}
        ]"#;
        let err = parse(json).unwrap_err();
        assert!(err.to_string().contains("duplicate id"));
    }

    #[test]
    fn lint_reports_options_without_points() {
        let json = r#"[{
            "id": "Q1", "skenario": "", "pertanyaan": "?",
            "opsi": {"A": "a", "B": "b", "C": "c", "D": "d"},
            "poin": {"A": 1, "B": 0, "C": 0}
        }]"#;
        let questions = parse(json).unwrap();
        let warnings = lint_questions(&questions);
        assert!(warnings.iter().any(|w| w.message == "option D has no point value"));
        assert!(warnings.iter().any(|w| w.message == "scenario is empty"));
    }

    #[test]
    fn load_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = QuestionStore::new(dir.path().join("absent.json"));
        assert!(matches!(
            store.load().unwrap_err(),
            QuestionStoreError::NotFound { .. }
        ));
    }

    #[test]
    fn load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sjt_questions.json");
        std::fs::write(&path, VALID_JSON).unwrap();

        let questions = QuestionStore::new(&path).load().unwrap();
        assert_eq!(questions.len(), 2);
    }
}
