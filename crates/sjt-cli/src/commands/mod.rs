pub mod headers;
pub mod init;
pub mod submit;
pub mod take;
pub mod validate;

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use sjt_core::model::Question;
use sjt_core::session::Receipt;
use sjt_gateway::config::{load_config_from, SurveyConfig};

/// Load the configuration and its question file.
///
/// `--questions` takes precedence over the config's `questions_file`.
pub(crate) fn load_survey(
    config_path: Option<PathBuf>,
    questions_path: Option<PathBuf>,
) -> Result<(SurveyConfig, Vec<Question>)> {
    let mut config = load_config_from(config_path.as_deref())?;
    if let Some(path) = questions_path {
        config.questions_file = path;
    }
    let questions = config
        .question_store()
        .load()
        .context("failed to load questions")?;
    Ok((config, questions))
}

/// Print the per-question breakdown and the total.
pub(crate) fn print_scorecard(
    out: &mut impl Write,
    questions: &[Question],
    receipt: &Receipt,
) -> Result<()> {
    let mut table = Table::new();
    table.set_header(vec!["Question", "Dimension", "Answer", "Points"]);

    for detail in &receipt.scorecard.details {
        let dimension = questions
            .iter()
            .find(|q| q.id == detail.question_id)
            .map(|q| q.dimension.as_str())
            .unwrap_or_default();
        table.add_row(vec![
            Cell::new(&detail.question_id),
            Cell::new(dimension),
            Cell::new(&detail.letter),
            Cell::new(detail.points),
        ]);
    }

    writeln!(out, "{table}")?;
    writeln!(out, "Total score: {}", receipt.total())?;
    Ok(())
}
