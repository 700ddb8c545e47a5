//! Mail source collaborator trait.

use async_trait::async_trait;

use crate::error::MailError;
use crate::types::MailMessage;

/// Source of recent mailbox messages, already parsed into header lists.
///
/// Ordering precondition: implementations must deliver messages in a
/// stable, caller-visible order across a pass (Gmail returns newest
/// first). The reconciliation aggregator's last-write-wins fold depends
/// on that order — it does not re-sort by the `Date` header.
#[async_trait]
pub trait MailSource: Send + Sync {
    async fn fetch_recent_messages(&self, limit: u32) -> Result<Vec<MailMessage>, MailError>;
}
