//! Demo gateway used when no destination is configured.

use async_trait::async_trait;

use sjt_core::submission::SubmissionRecord;
use sjt_core::traits::PersistenceGateway;

/// Logs the row instead of persisting it, and always succeeds.
pub struct DemoGateway;

#[async_trait]
impl PersistenceGateway for DemoGateway {
    fn name(&self) -> &str {
        "demo"
    }

    async fn append_row(&self, record: &SubmissionRecord) -> anyhow::Result<()> {
        let row: Vec<String> = record
            .headers()
            .zip(record.row_values())
            .map(|(header, value)| format!("{header}={value}"))
            .collect();
        tracing::info!("demo mode, row not persisted: {}", row.join(", "));
        Ok(())
    }
}
