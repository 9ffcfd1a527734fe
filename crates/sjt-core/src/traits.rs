//! Trait definitions for the persistence collaborator.
//!
//! Implemented by the `sjt-gateway` crate.

use async_trait::async_trait;

use crate::submission::SubmissionRecord;

/// Appends submission rows to a remote tabular store.
///
/// Every call is a blind append: implementations never read the
/// destination first and never retry on their own.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// Human-readable gateway name (e.g. "sheets").
    fn name(&self) -> &str;

    /// Append one row, in the record's field order.
    async fn append_row(&self, record: &SubmissionRecord) -> anyhow::Result<()>;
}
