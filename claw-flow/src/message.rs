use serde::ser::{SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};

/// A tappable shortcut that submits `text` as if the user had typed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickReply {
    pub label: String,
    pub text: String,
}

impl QuickReply {
    pub fn new(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
        }
    }
}

/// What the bot sends back for one inbound text.
///
/// Serializes to the LINE text message object; `quickReply` is emitted only
/// when there are suggestions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub text: String,
    pub quick_replies: Vec<QuickReply>,
}

impl OutboundMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quick_replies: Vec::new(),
        }
    }

    pub fn with_quick_replies(mut self, quick_replies: Vec<QuickReply>) -> Self {
        self.quick_replies = quick_replies;
        self
    }
}

#[derive(Serialize)]
struct QuickReplyPayload<'a> {
    items: Vec<QuickReplyItem<'a>>,
}

#[derive(Serialize)]
struct QuickReplyItem<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    action: MessageAction<'a>,
}

#[derive(Serialize)]
struct MessageAction<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    label: &'a str,
    text: &'a str,
}

impl Serialize for OutboundMessage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let fields = if self.quick_replies.is_empty() { 2 } else { 3 };
        let mut state = serializer.serialize_struct("OutboundMessage", fields)?;
        state.serialize_field("type", "text")?;
        state.serialize_field("text", &self.text)?;
        if !self.quick_replies.is_empty() {
            let payload = QuickReplyPayload {
                items: self
                    .quick_replies
                    .iter()
                    .map(|reply| QuickReplyItem {
                        kind: "action",
                        action: MessageAction {
                            kind: "message",
                            label: &reply.label,
                            text: &reply.text,
                        },
                    })
                    .collect(),
            };
            state.serialize_field("quickReply", &payload)?;
        }
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plain_text_has_no_quick_reply_key() {
        let value = serde_json::to_value(OutboundMessage::text("hello")).unwrap();
        assert_eq!(value, json!({"type": "text", "text": "hello"}));
    }

    #[test]
    fn quick_replies_use_message_actions() {
        let message = OutboundMessage::text("pick")
            .with_quick_replies(vec![QuickReply::new("Yes", "แก้ได้")]);
        let value = serde_json::to_value(message).unwrap();
        assert_eq!(
            value["quickReply"]["items"][0],
            json!({"type": "action", "action": {"type": "message", "label": "Yes", "text": "แก้ได้"}})
        );
    }
}
