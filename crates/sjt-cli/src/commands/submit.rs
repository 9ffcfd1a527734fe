//! The `sjt submit` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use sjt_core::model::{AnswerSet, Respondent};
use sjt_core::session::{SubmitOutcome, SurveySession};
use sjt_gateway::config::create_gateway;

use super::{load_survey, print_scorecard};

/// Respondent details passed on the command line.
pub struct RespondentArgs {
    pub name: String,
    pub institution: String,
    pub experience: Option<String>,
}

pub async fn execute(
    answers_path: PathBuf,
    respondent: RespondentArgs,
    config_path: Option<PathBuf>,
    questions_path: Option<PathBuf>,
) -> Result<()> {
    let (config, questions) = load_survey(config_path, questions_path)?;

    let content = std::fs::read_to_string(&answers_path)
        .with_context(|| format!("failed to read answers: {}", answers_path.display()))?;
    let answers: AnswerSet = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse answers: {}", answers_path.display()))?;
    tracing::debug!("read {} answers from {}", answers.len(), answers_path.display());

    let gateway = create_gateway(config.gateway.as_ref())?;

    let mut session = SurveySession::new(questions, config.layout);
    let mut details = Respondent::new(respondent.name, respondent.institution);
    if let Some(experience) = respondent.experience {
        details = details.with_experience(experience);
    }
    *session.respondent_mut() = details;
    session.set_answers(&answers)?;

    match session.submit_now(gateway.as_ref()).await? {
        SubmitOutcome::Rejected(validation) => {
            anyhow::bail!("submission rejected: {validation}")
        }
        SubmitOutcome::Failed(e) => Err(e.context("submission failed, answers were not saved")),
        SubmitOutcome::Submitted(receipt) => {
            let mut stdout = std::io::stdout().lock();
            print_scorecard(&mut stdout, session.questions(), &receipt)?;
            Ok(())
        }
    }
}
