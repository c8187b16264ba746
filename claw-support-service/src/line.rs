//! LINE Messaging API plumbing: webhook signature check, webhook payload
//! types and the reply client.

use anyhow::{Context, Result, anyhow, bail};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use claw_flow::OutboundMessage;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::{debug, warn};

pub const SIGNATURE_HEADER: &str = "x-line-signature";
const REPLY_PATH: &str = "/v2/bot/message/reply";

type HmacSha256 = Hmac<Sha256>;

/// Check `signature_b64` against base64(HMAC-SHA256(secret, body)).
pub fn verify_signature(body: &[u8], signature_b64: &str, secret: &str) -> Result<()> {
    let signature = STANDARD
        .decode(signature_b64.trim())
        .context("signature is not valid base64")?;
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| anyhow!("invalid channel secret: {e}"))?;
    mac.update(body);
    mac.verify_slice(&signature)
        .map_err(|_| anyhow!("signature mismatch"))
}

#[cfg(test)]
pub(crate) fn sign(body: &[u8], secret: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("hmac accepts any key");
    mac.update(body);
    STANDARD.encode(mac.finalize().into_bytes())
}

#[derive(Debug, Deserialize)]
pub struct WebhookBody {
    #[serde(default)]
    pub events: Vec<WebhookEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub reply_token: Option<String>,
    #[serde(default)]
    pub source: Option<EventSource>,
    #[serde(default)]
    pub message: Option<EventMessage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSource {
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EventMessage {
    #[serde(rename = "type")]
    pub message_type: String,
    #[serde(default)]
    pub text: Option<String>,
}

/// A text message with everything needed to answer it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEvent {
    pub user_id: String,
    pub reply_token: String,
    pub text: String,
}

impl WebhookEvent {
    /// `None` for anything that is not a replyable text message from a user.
    pub fn as_text_event(&self) -> Option<TextEvent> {
        if self.event_type != "message" {
            return None;
        }
        let message = self.message.as_ref()?;
        if message.message_type != "text" {
            return None;
        }
        Some(TextEvent {
            user_id: self.source.as_ref()?.user_id.clone()?,
            reply_token: self.reply_token.clone()?,
            text: message.text.clone()?,
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplyRequest<'a> {
    reply_token: &'a str,
    messages: [&'a OutboundMessage; 1],
}

#[derive(Clone)]
pub struct LineClient {
    http: reqwest::Client,
    api_base: String,
    access_token: Option<String>,
}

impl LineClient {
    pub fn new(http: reqwest::Client, api_base: &str, access_token: Option<String>) -> Self {
        Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            access_token,
        }
    }

    pub async fn reply(&self, reply_token: &str, message: &OutboundMessage) -> Result<()> {
        let Some(token) = self.access_token.as_deref() else {
            warn!("LINE_CHANNEL_ACCESS_TOKEN not set, reply skipped");
            return Ok(());
        };

        let body = ReplyRequest {
            reply_token,
            messages: [message],
        };
        let response = self
            .http
            .post(format!("{}{}", self.api_base, REPLY_PATH))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .context("failed to reach LINE reply API")?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            bail!("LINE reply API returned {status}: {detail}");
        }
        debug!(reply_token = %reply_token, "Reply sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use claw_flow::QuickReply;
    use httpmock::prelude::*;
    use serde_json::json;

    #[test]
    fn signature_round_trip_and_mismatch() {
        let body = br#"{"events":[]}"#;
        let signature = sign(body, "secret");
        assert!(verify_signature(body, &signature, "secret").is_ok());
        assert!(verify_signature(body, &signature, "other").is_err());
        assert!(verify_signature(b"tampered", &signature, "secret").is_err());
        assert!(verify_signature(body, "not base64!", "secret").is_err());
    }

    #[test]
    fn only_text_messages_from_users_are_consumed() {
        let body: WebhookBody = serde_json::from_value(json!({
            "destination": "U0",
            "events": [
                {
                    "type": "message",
                    "replyToken": "r1",
                    "source": { "type": "user", "userId": "U1" },
                    "message": { "type": "text", "id": "1", "text": "สวัสดี" }
                },
                {
                    "type": "message",
                    "replyToken": "r2",
                    "source": { "type": "user", "userId": "U1" },
                    "message": { "type": "sticker", "id": "2" }
                },
                { "type": "follow", "replyToken": "r3", "source": { "userId": "U2" } },
                {
                    "type": "message",
                    "source": { "type": "user", "userId": "U3" },
                    "message": { "type": "text", "id": "3", "text": "no token" }
                }
            ]
        }))
        .unwrap();

        let events: Vec<TextEvent> = body
            .events
            .iter()
            .filter_map(WebhookEvent::as_text_event)
            .collect();
        assert_eq!(
            events,
            vec![TextEvent {
                user_id: "U1".into(),
                reply_token: "r1".into(),
                text: "สวัสดี".into(),
            }]
        );
    }

    #[test]
    fn missing_events_field_is_an_empty_batch() {
        let body: WebhookBody = serde_json::from_str(r#"{"destination":"U0"}"#).unwrap();
        assert!(body.events.is_empty());
    }

    #[tokio::test]
    async fn reply_posts_token_and_message() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v2/bot/message/reply")
                    .header("authorization", "Bearer token-1")
                    .json_body_includes(
                        json!({
                            "replyToken": "reply-1",
                            "messages": [{
                                "type": "text",
                                "text": "hello",
                                "quickReply": { "items": [{
                                    "type": "action",
                                    "action": { "type": "message", "label": "ok", "text": "ok" }
                                }]}
                            }]
                        })
                        .to_string(),
                    );
                then.status(200).json_body(json!({}));
            })
            .await;

        let client = LineClient::new(
            reqwest::Client::new(),
            &server.base_url(),
            Some("token-1".into()),
        );
        let message = OutboundMessage::text("hello").with_quick_replies(vec![QuickReply::new("ok", "ok")]);
        client.reply("reply-1", &message).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn reply_fails_on_error_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v2/bot/message/reply");
                then.status(400).body("Invalid reply token");
            })
            .await;

        let client = LineClient::new(reqwest::Client::new(), &server.base_url(), Some("t".into()));
        let err = client
            .reply("expired", &OutboundMessage::text("hi"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("400"));
    }

    #[tokio::test]
    async fn reply_without_token_is_skipped() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/v2/bot/message/reply");
                then.status(200);
            })
            .await;

        let client = LineClient::new(reqwest::Client::new(), &server.base_url(), None);
        client.reply("r", &OutboundMessage::text("hi")).await.unwrap();
        mock.assert_calls_async(0).await;
    }
}
