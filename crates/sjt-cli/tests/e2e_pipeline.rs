//! End-to-end pipeline tests against a mock Sheets endpoint.
//!
//! These load the shared question fixture and push a submission through
//! validate → score → assemble → append, checking the exact row that
//! reaches the spreadsheet API.

use assert_cmd::assert::OutputAssertExt;
use chrono::NaiveDate;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use sjt_core::model::{Points, Respondent};
use sjt_core::parser::QuestionStore;
use sjt_core::session::{SessionState, SubmitOutcome, SurveySession};
use sjt_core::submission::ColumnLayout;
use sjt_gateway::sheets::SheetsGateway;

const QUESTIONS: &str = "../../question-sets/sjt_questions.json";
const APPEND_PATH: &str = "/v4/spreadsheets/sheet-123/values/Sheet1:append";

fn session() -> SurveySession {
    let questions = QuestionStore::new(QUESTIONS).load().unwrap();
    SurveySession::new(questions, ColumnLayout::default())
}

fn answer_all(session: &mut SurveySession) {
    for (id, letter) in [("Q1", "A"), ("Q2", "B"), ("Q3", "D"), ("Q4", "C"), ("Q5", "C")] {
        session.select(id, letter).unwrap();
    }
}

#[tokio::test]
async fn e2e_row_reaches_sheet_in_column_order() {
    let server = MockServer::start().await;
    let expected = serde_json::json!({
        "majorDimension": "ROWS",
        "values": [[
            "2025-03-14 09:05:00", "Sari", "UPI", "> 6 Semester", 10.5,
            "A", 3, "B", 3, "D", 2, "C", 1, "C", 1.5
        ]]
    });

    Mock::given(method("POST"))
        .and(path(APPEND_PATH))
        .and(header("Authorization", "Bearer e2e-token"))
        .and(body_json(&expected))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "updates": {"updatedRange": "Sheet1!A2:O2", "updatedCells": 15}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = SheetsGateway::new("e2e-token", "sheet-123", None, Some(server.uri())).unwrap();
    let mut s = session();
    *s.respondent_mut() = Respondent::new("Sari", "UPI").with_experience("> 6 Semester");
    answer_all(&mut s);

    let ts = NaiveDate::from_ymd_opt(2025, 3, 14)
        .unwrap()
        .and_hms_opt(9, 5, 0)
        .unwrap();
    let outcome = s.submit(&gateway, ts).await.unwrap();
    let SubmitOutcome::Submitted(receipt) = outcome else {
        panic!("expected a submitted outcome");
    };
    assert_eq!(receipt.total(), Points::Real(10.5));
    assert_eq!(receipt.record.len(), 15);
}

#[tokio::test]
async fn e2e_rejected_session_never_calls_sheet() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let gateway = SheetsGateway::new("e2e-token", "sheet-123", None, Some(server.uri())).unwrap();
    let mut s = session();
    *s.respondent_mut() = Respondent::new("Sari", "");
    answer_all(&mut s);

    let outcome = s.submit_now(&gateway).await.unwrap();
    assert!(matches!(outcome, SubmitOutcome::Rejected(_)));
    assert_eq!(s.state(), &SessionState::Collecting);
}

#[tokio::test]
async fn e2e_sheet_error_keeps_session_open_for_retry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(APPEND_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_json(serde_json::json!({
            "error": {"code": 503, "message": "The service is currently unavailable."}
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(APPEND_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;

    let gateway = SheetsGateway::new("e2e-token", "sheet-123", None, Some(server.uri())).unwrap();
    let mut s = session();
    *s.respondent_mut() = Respondent::new("Sari", "UPI");
    answer_all(&mut s);

    let SubmitOutcome::Failed(err) = s.submit_now(&gateway).await.unwrap() else {
        panic!("first attempt should fail");
    };
    assert!(err.to_string().contains("currently unavailable"));
    assert!(matches!(s.state(), SessionState::SubmissionFailed { .. }));

    let outcome = s.submit_now(&gateway).await.unwrap();
    assert!(matches!(outcome, SubmitOutcome::Submitted(_)));
    assert_eq!(s.attempts(), 2);
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn e2e_cli_submit_appends_one_row() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(APPEND_PATH))
        .and(header("Authorization", "Bearer env-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("sjt.toml");
    std::fs::write(
        &config,
        format!(
            "[gateway]\ntype = \"sheets\"\nspreadsheet_id = \"sheet-123\"\nbase_url = \"{}\"\n",
            server.uri()
        ),
    )
    .unwrap();
    let answers = dir.path().join("answers.json");
    std::fs::write(
        &answers,
        r#"{"Q1": "A", "Q2": "B", "Q3": "D", "Q4": "C", "Q5": "C"}"#,
    )
    .unwrap();

    let output = tokio::task::spawn_blocking(move || {
        #[allow(deprecated)]
        let mut cmd = assert_cmd::Command::cargo_bin("sjt").unwrap();
        cmd.env("SJT_SHEETS_TOKEN", "env-token")
            .arg("submit")
            .arg("--answers")
            .arg(&answers)
            .args(["--name", "Sari", "--institution", "UPI"])
            .arg("--config")
            .arg(&config)
            .arg("--questions")
            .arg(QUESTIONS)
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    output
        .assert()
        .success()
        .stdout(predicates::str::contains("Total score: 10.5"));
}
