//! The `sjt validate` command.

use std::path::PathBuf;

use anyhow::Result;

use sjt_core::parser::{lint_questions, QuestionStore};
use sjt_gateway::config::load_config_from;

pub fn execute(questions_path: PathBuf, config_path: Option<PathBuf>) -> Result<()> {
    let mut store = QuestionStore::new(&questions_path);
    // Only an explicit config changes the required option letters.
    if config_path.is_some() {
        let config = load_config_from(config_path.as_deref())?;
        store = store.with_required_letters(config.option_letters);
    }

    let questions = store.load()?;
    println!(
        "Question file: {} ({} questions)",
        questions_path.display(),
        questions.len()
    );

    let warnings = lint_questions(&questions);
    for w in &warnings {
        println!("  [{}] WARNING: {}", w.question_id, w.message);
    }

    if warnings.is_empty() {
        println!("All questions valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
