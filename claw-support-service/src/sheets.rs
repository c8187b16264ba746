use async_trait::async_trait;
use claw_flow::{ClaimRecord, RecordSink, SinkError};
use tracing::debug;

/// Appends claims to a spreadsheet through a Google Apps Script web app.
#[derive(Clone)]
pub struct AppsScriptSink {
    http: reqwest::Client,
    url: String,
}

impl AppsScriptSink {
    pub fn new(http: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }
}

#[async_trait]
impl RecordSink for AppsScriptSink {
    async fn submit(&self, record: &ClaimRecord) -> Result<(), SinkError> {
        let response = self
            .http
            .post(&self.url)
            .json(record)
            .send()
            .await
            .map_err(|e| SinkError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SinkError::Rejected(status.as_u16()));
        }

        if let Ok(body) = response.text().await {
            debug!(user_id = %record.user_id, response = %body, "Apps Script response");
        }
        Ok(())
    }
}
