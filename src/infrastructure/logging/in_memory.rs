use crate::constants::MAX_RETAINED_LOGS;
use crate::core::errors::LedgerError;
use crate::core::models::audit::AppLog;
use crate::infrastructure::logging::{LogEvent, LoggingService};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

/// Bounded application log. Once `capacity` entries are held the oldest is
/// dropped; group audits live in storage and are not affected.
#[derive(Clone)]
pub struct InMemoryLogging {
    entries: Arc<RwLock<VecDeque<AppLog>>>,
    capacity: usize,
}

impl Default for InMemoryLogging {
    fn default() -> Self {
        InMemoryLogging::with_capacity(MAX_RETAINED_LOGS)
    }
}

impl InMemoryLogging {
    pub fn new() -> Self {
        InMemoryLogging::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        InMemoryLogging {
            entries: Arc::new(RwLock::new(VecDeque::new())),
            capacity: capacity.max(1),
        }
    }
}

#[async_trait]
impl LoggingService for InMemoryLogging {
    async fn record(&self, event: LogEvent<'_>) -> Result<AppLog, LedgerError> {
        let entry = AppLog {
            id: Uuid::new_v4().to_string(),
            action: event.action.to_string(),
            group_id: event.group_id.map(String::from),
            member_id: event.member_id.map(String::from),
            details: serde_json::from_value(event.details)
                .map_err(|e| LedgerError::LoggingError(format!("Log details must be an object: {}", e)))?,
            timestamp: Utc::now(),
        };
        info!(
            target: "tally::audit",
            action = %entry.action,
            group_id = entry.group_id.as_deref().unwrap_or("-"),
            member_id = entry.member_id.as_deref().unwrap_or("-"),
            "recorded"
        );

        let mut entries = self.entries.write().await;
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry.clone());
        Ok(entry)
    }

    async fn logs_for_member(&self, member_id: &str) -> Result<Vec<AppLog>, LedgerError> {
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .filter(|e| e.member_id.as_deref() == Some(member_id))
            .cloned()
            .collect())
    }
}
