use async_trait::async_trait;
use tracing::warn;

use crate::{error::SinkError, session::ClaimRecord};

/// External system of record for completed claims.
///
/// Only success or failure matters to the caller; response bodies are not
/// inspected.
#[async_trait]
pub trait RecordSink: Send + Sync {
    async fn submit(&self, record: &ClaimRecord) -> Result<(), SinkError>;
}

/// Sink used when no record endpoint is configured: the claim only reaches
/// the logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

#[async_trait]
impl RecordSink for LogSink {
    async fn submit(&self, record: &ClaimRecord) -> Result<(), SinkError> {
        warn!(
            user_id = %record.user_id,
            machine_number = %record.machine_number,
            "Record sink URL not configured, claim kept in logs only"
        );
        Err(SinkError::NotConfigured)
    }
}
