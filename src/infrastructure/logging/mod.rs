pub mod in_memory;

use crate::core::errors::LedgerError;
use crate::core::models::audit::AppLog;
use async_trait::async_trait;

/// One state change, as seen by the application log.
#[derive(Clone, Debug)]
pub struct LogEvent<'a> {
    pub action: &'a str,
    /// Set for changes that belong to a group's audit trail.
    pub group_id: Option<&'a str>,
    pub member_id: Option<&'a str>,
    pub details: serde_json::Value,
}

#[async_trait]
pub trait LoggingService: Send + Sync {
    /// Stores the event and returns the entry as recorded.
    async fn record(&self, event: LogEvent<'_>) -> Result<AppLog, LedgerError>;
    /// Entries performed by `member_id`, oldest first.
    async fn logs_for_member(&self, member_id: &str) -> Result<Vec<AppLog>, LedgerError>;
}
