//! Mock gateway for testing.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use sjt_core::submission::SubmissionRecord;
use sjt_core::traits::PersistenceGateway;

use crate::error::GatewayError;

/// A gateway that keeps appended rows in memory.
///
/// Can be told to fail so the submission-failed path can be exercised
/// without a network.
#[derive(Default)]
pub struct MockGateway {
    rows: Mutex<Vec<SubmissionRecord>>,
    failure: Mutex<Option<String>>,
    call_count: AtomicU32,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock whose appends fail with a network error.
    pub fn failing(message: &str) -> Self {
        let gateway = Self::default();
        gateway.set_failure(Some(message.to_string()));
        gateway
    }

    /// Fail subsequent appends with `message`, or succeed again with `None`.
    pub fn set_failure(&self, message: Option<String>) {
        *self.failure.lock().unwrap_or_else(PoisonError::into_inner) = message;
    }

    /// Rows appended so far.
    pub fn rows(&self) -> Vec<SubmissionRecord> {
        self.rows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of append calls, failed ones included.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl PersistenceGateway for MockGateway {
    fn name(&self) -> &str {
        "mock"
    }

    async fn append_row(&self, record: &SubmissionRecord) -> anyhow::Result<()> {
        self.call_count.fetch_add(1, Ordering::Relaxed);

        let failure = self
            .failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(message) = failure {
            return Err(GatewayError::NetworkError(message).into());
        }

        self.rows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use sjt_core::model::{Points, Respondent};
    use sjt_core::scoring::Scorecard;
    use sjt_core::submission::{assemble, ColumnLayout};

    fn record() -> SubmissionRecord {
        let ts = NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let card = Scorecard {
            total: Points::Int(0),
            details: vec![],
        };
        assemble(&ColumnLayout::default(), ts, &Respondent::new("a", "b"), &card)
    }

    #[tokio::test]
    async fn records_rows() {
        let gateway = MockGateway::new();
        gateway.append_row(&record()).await.unwrap();
        gateway.append_row(&record()).await.unwrap();
        assert_eq!(gateway.rows().len(), 2);
        assert_eq!(gateway.call_count(), 2);
    }

    #[tokio::test]
    async fn failing_then_recovering() {
        let gateway = MockGateway::failing("connection reset");
        let err = gateway.append_row(&record()).await.unwrap_err();
        assert!(err.to_string().contains("connection reset"));
        assert!(gateway.rows().is_empty());

        gateway.set_failure(None);
        gateway.append_row(&record()).await.unwrap();
        assert_eq!(gateway.rows().len(), 1);
        assert_eq!(gateway.call_count(), 2);
    }
}
