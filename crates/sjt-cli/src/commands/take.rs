//! The `sjt take` command: an interactive terminal collector.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::Result;

use sjt_core::model::{Question, RespondentField};
use sjt_core::session::{SubmitOutcome, SurveySession};
use sjt_core::traits::PersistenceGateway;
use sjt_core::validate::ValidationResult;
use sjt_gateway::config::{create_gateway, SurveyConfig};

use super::{load_survey, print_scorecard};

pub async fn execute(config_path: Option<PathBuf>, questions_path: Option<PathBuf>) -> Result<()> {
    let (config, questions) = load_survey(config_path, questions_path)?;
    let gateway = create_gateway(config.gateway.as_ref())?;
    let mut session = SurveySession::new(questions, config.layout.clone());

    let stdin = std::io::stdin();
    let mut prompter = Prompter {
        input: stdin.lock(),
        output: std::io::stdout().lock(),
    };
    run(&mut prompter, &config, &mut session, gateway.as_ref()).await
}

struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    /// Print `label` and read one trimmed line. Closed input is an error.
    fn ask(&mut self, label: &str) -> Result<String> {
        write!(self.output, "{label}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            anyhow::bail!("input closed before the survey was submitted");
        }
        Ok(line.trim().to_string())
    }
}

/// Collect, submit, and re-ask until the session is submitted or the
/// respondent declines a retry.
async fn run<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    config: &SurveyConfig,
    session: &mut SurveySession,
    gateway: &dyn PersistenceGateway,
) -> Result<()> {
    writeln!(prompter.output, "{}", config.title)?;
    if !config.subtitle.is_empty() {
        writeln!(prompter.output, "{}", config.subtitle)?;
    }
    writeln!(prompter.output)?;

    for field in RespondentField::ALL {
        ask_field(prompter, config, session, field)?;
    }
    let ids: Vec<String> = session.questions().iter().map(|q| q.id.clone()).collect();
    for id in &ids {
        ask_question(prompter, session, id)?;
    }

    loop {
        match session.submit_now(gateway).await? {
            SubmitOutcome::Submitted(receipt) => {
                writeln!(prompter.output, "\nThank you, your answers were saved.")?;
                print_scorecard(&mut prompter.output, session.questions(), &receipt)?;
                return Ok(());
            }
            SubmitOutcome::Rejected(ValidationResult::MissingRespondentFields(fields)) => {
                writeln!(prompter.output, "\nPlease fill in: {}", join(&fields))?;
                for field in fields {
                    ask_field(prompter, config, session, field)?;
                }
            }
            SubmitOutcome::Rejected(ValidationResult::UnansweredQuestions(ids)) => {
                writeln!(
                    prompter.output,
                    "\n{} question(s) still unanswered: {}",
                    ids.len(),
                    ids.join(", ")
                )?;
                for id in &ids {
                    ask_question(prompter, session, id)?;
                }
            }
            SubmitOutcome::Rejected(ValidationResult::Ok) => {
                anyhow::bail!("submission rejected without a reason")
            }
            SubmitOutcome::Failed(e) => {
                writeln!(prompter.output, "\nSubmission failed: {e:#}")?;
                let reply = prompter.ask("Your answers are kept. Retry? [Y/n] ")?;
                if reply.eq_ignore_ascii_case("n") || reply.eq_ignore_ascii_case("no") {
                    return Err(e.context("submission abandoned, answers were not saved"));
                }
            }
        }
    }
}

fn join(fields: &[RespondentField]) -> String {
    let names: Vec<&str> = fields.iter().map(|f| f.as_str()).collect();
    names.join(", ")
}

fn ask_field<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    config: &SurveyConfig,
    session: &mut SurveySession,
    field: RespondentField,
) -> Result<()> {
    let value = match field {
        RespondentField::Name => prompter.ask("Full name: ")?,
        RespondentField::Institution => prompter.ask("Institution: ")?,
        RespondentField::Experience if config.experience_choices.is_empty() => {
            prompter.ask("Experience (optional): ")?
        }
        RespondentField::Experience => choose_experience(prompter, &config.experience_choices)?,
    };
    let value = (!value.is_empty()).then_some(value);
    session.respondent_mut().set(field, value);
    Ok(())
}

/// Accepts a choice number, the choice text, or blank.
fn choose_experience<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    choices: &[String],
) -> Result<String> {
    writeln!(prompter.output, "Experience (optional):")?;
    for (i, choice) in choices.iter().enumerate() {
        writeln!(prompter.output, "  {}) {choice}", i + 1)?;
    }
    loop {
        let reply = prompter.ask("Choice: ")?;
        if reply.is_empty() {
            return Ok(reply);
        }
        if let Some(choice) = reply
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| choices.get(i))
        {
            return Ok(choice.clone());
        }
        if let Some(choice) = choices.iter().find(|c| c.eq_ignore_ascii_case(&reply)) {
            return Ok(choice.clone());
        }
        writeln!(prompter.output, "Pick a number from 1 to {}.", choices.len())?;
    }
}

fn ask_question<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    session: &mut SurveySession,
    question_id: &str,
) -> Result<()> {
    let Some(question) = session
        .questions()
        .iter()
        .find(|q| q.id == question_id)
        .cloned()
    else {
        anyhow::bail!("unknown question: {question_id}");
    };
    print_question(&mut prompter.output, &question)?;

    loop {
        let reply = prompter.ask("Answer (blank to skip): ")?;
        if reply.is_empty() {
            session.clear(question_id)?;
            return Ok(());
        }
        if question.has_option(&reply.to_uppercase()) {
            session.select(question_id, &reply)?;
            return Ok(());
        }
        let letters: Vec<&str> = question.options.keys().map(String::as_str).collect();
        writeln!(prompter.output, "Choose one of {}.", letters.join(", "))?;
    }
}

fn print_question(out: &mut impl Write, question: &Question) -> Result<()> {
    writeln!(out)?;
    if question.dimension.is_empty() {
        writeln!(out, "[{}]", question.id)?;
    } else {
        writeln!(out, "[{}] {}", question.id, question.dimension)?;
    }
    if !question.scenario.is_empty() {
        writeln!(out, "{}", question.scenario)?;
    }
    writeln!(out, "{}", question.prompt)?;
    for (letter, text) in &question.options {
        writeln!(out, "  {letter}) {text}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::io::Cursor;
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;
    use sjt_core::model::Points;
    use sjt_core::session::SessionState;
    use sjt_core::submission::{ColumnLayout, SubmissionRecord};
    use sjt_gateway::mock::MockGateway;

    fn question(id: &str) -> Question {
        let letters = ["A", "B", "C", "D"];
        Question {
            id: id.into(),
            dimension: "Literasi AI".into(),
            scenario: "A scenario".into(),
            prompt: "What do you do?".into(),
            options: letters
                .iter()
                .map(|l| (l.to_string(), format!("option {l}")))
                .collect::<BTreeMap<_, _>>(),
            points: letters
                .iter()
                .zip([3, 2, 1, 0])
                .map(|(l, p)| (l.to_string(), Points::Int(p)))
                .collect(),
        }
    }

    fn session() -> SurveySession {
        SurveySession::new(vec![question("Q1"), question("Q2")], ColumnLayout::default())
    }

    async fn take(
        input: &str,
        config: &SurveyConfig,
        session: &mut SurveySession,
        gateway: &MockGateway,
    ) -> (Result<()>, String) {
        let mut prompter = Prompter {
            input: Cursor::new(input.as_bytes().to_vec()),
            output: Vec::new(),
        };
        let result = run(&mut prompter, config, session, gateway).await;
        (result, String::from_utf8(prompter.output).unwrap())
    }

    #[tokio::test]
    async fn complete_run_submits_once() {
        let gateway = MockGateway::new();
        let mut s = session();
        let (result, output) = take(
            "Sari\nUPI\n\nb\nA\n",
            &SurveyConfig::default(),
            &mut s,
            &gateway,
        )
        .await;

        result.unwrap();
        assert_eq!(gateway.call_count(), 1);
        assert_eq!(s.state(), &SessionState::Submitted { total: Points::Int(5) });
        assert!(output.contains("Total score: 5"));
    }

    #[tokio::test]
    async fn only_missing_items_are_asked_again() {
        let gateway = MockGateway::new();
        let mut s = session();
        // Name and Q2 left blank; the name is re-asked first, then Q2.
        let (result, output) = take(
            "\nUPI\n\nA\n\nSari\nX\nC\n",
            &SurveyConfig::default(),
            &mut s,
            &gateway,
        )
        .await;

        result.unwrap();
        assert!(output.contains("Please fill in: name"));
        assert!(output.contains("1 question(s) still unanswered: Q2"));
        assert!(output.contains("Choose one of A, B, C, D."));
        assert_eq!(s.respondent().name.as_deref(), Some("Sari"));
        assert_eq!(s.answers().letter("Q2"), Some("C"));
        assert_eq!(gateway.call_count(), 1);
    }

    /// Fails the first append, then records rows.
    struct FailsOnce {
        inner: MockGateway,
        failed: AtomicBool,
    }

    #[async_trait]
    impl PersistenceGateway for FailsOnce {
        fn name(&self) -> &str {
            "fails-once"
        }

        async fn append_row(&self, record: &SubmissionRecord) -> anyhow::Result<()> {
            if !self.failed.swap(true, Ordering::SeqCst) {
                anyhow::bail!("sheet unavailable");
            }
            self.inner.append_row(record).await
        }
    }

    #[tokio::test]
    async fn failed_submission_retries_with_same_answers() {
        let gateway = FailsOnce {
            inner: MockGateway::new(),
            failed: AtomicBool::new(false),
        };
        let mut s = session();
        let mut prompter = Prompter {
            input: Cursor::new(b"Sari\nUPI\n\nA\nA\n\n".to_vec()),
            output: Vec::new(),
        };
        run(&mut prompter, &SurveyConfig::default(), &mut s, &gateway)
            .await
            .unwrap();

        let output = String::from_utf8(prompter.output).unwrap();
        assert!(output.contains("Submission failed: sheet unavailable"));
        assert!(output.contains("Total score: 6"));
        assert_eq!(s.attempts(), 2);
        assert_eq!(gateway.inner.rows().len(), 1);
    }

    #[tokio::test]
    async fn declining_retry_returns_the_gateway_error() {
        let gateway = MockGateway::failing("sheet unavailable");
        let mut s = session();
        let (result, output) = take(
            "Sari\nUPI\n\nA\nB\nn\n",
            &SurveyConfig::default(),
            &mut s,
            &gateway,
        )
        .await;

        let err = result.unwrap_err();
        assert!(format!("{err:#}").contains("sheet unavailable"));
        assert!(output.contains("Your answers are kept"));
        assert_eq!(s.answers().letter("Q2"), Some("B"));
    }

    #[tokio::test]
    async fn experience_choice_by_number() {
        let gateway = MockGateway::new();
        let config = SurveyConfig {
            experience_choices: vec!["< 5 Semester".into(), "3-6".into(), "> 6 Semester".into()],
            ..SurveyConfig::default()
        };
        let mut s = session();
        let (result, _) = take("Sari\nUPI\n9\n3\nA\nA\n", &config, &mut s, &gateway).await;

        result.unwrap();
        assert_eq!(s.respondent().experience.as_deref(), Some("> 6 Semester"));
    }
}
