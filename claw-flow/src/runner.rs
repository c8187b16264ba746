//! FlowRunner: locks a user's session, executes exactly **one** conversation
//! step, and hands any completed claim to the record sink.
//!
//! Services create one `FlowRunner` at startup and share it across requests:
//!
//! ```rust,ignore
//! let reply = state.flow_runner.handle(&user_id, &text).await?;
//! ```
//!
//! The session lock is held for the whole turn, so two messages from the
//! same user never read the same pre-turn state. Different users run
//! concurrently.

use std::sync::Arc;

use tracing::{error, info};

use crate::{
    error::Result,
    graph::{ExecutionStatus, Graph},
    message::OutboundMessage,
    session::ClaimRecord,
    sink::RecordSink,
    storage::SessionStorage,
};

/// High-level helper for the _lock → execute → submit_ pattern.
#[derive(Clone)]
pub struct FlowRunner {
    graph: Arc<Graph>,
    storage: Arc<dyn SessionStorage>,
    sink: Arc<dyn RecordSink>,
}

impl FlowRunner {
    pub fn new(
        graph: Arc<Graph>,
        storage: Arc<dyn SessionStorage>,
        sink: Arc<dyn RecordSink>,
    ) -> Self {
        Self {
            graph,
            storage,
            sink,
        }
    }

    pub fn storage(&self) -> &Arc<dyn SessionStorage> {
        &self.storage
    }

    /// Handle one inbound text for `user_id` and return the reply.
    ///
    /// Only a storage failure is an `Err`; a failed turn yields the generic
    /// restart prompt.
    pub async fn handle(&self, user_id: &str, text: &str) -> Result<OutboundMessage> {
        let mut session = self.storage.get_or_create(user_id).await?;
        let result = self.graph.execute_or_restart(&mut session, text);
        session.touch();
        drop(session);

        if result.status == ExecutionStatus::Completed {
            info!(user_id = %user_id, "Conversation completed, session reset");
        }

        if let Some(record) = result.submission {
            self.submit_detached(record);
        }

        Ok(result.message)
    }

    /// Fire-and-forget submission. The reply path never awaits this task;
    /// a failure is logged once and the claim is not retried.
    fn submit_detached(&self, record: ClaimRecord) {
        let sink = self.sink.clone();
        tokio::spawn(async move {
            match sink.submit(&record).await {
                Ok(()) => info!(
                    user_id = %record.user_id,
                    machine_number = %record.machine_number,
                    "Claim saved to record sink"
                ),
                Err(e) => error!(
                    user_id = %record.user_id,
                    machine_number = %record.machine_number,
                    error = %e,
                    "Failed to save claim to record sink"
                ),
            }
        });
    }
}
