//! Stored message types

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How a stored message is sent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Pre-approved gateway template
    Template,
    /// Plain text
    #[default]
    Text,
    /// Image, document, video, audio or sticker
    Media,
    /// Interactive (reply buttons)
    Interactive,
}

/// An outgoing message as persisted in the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    /// Unique key
    pub key: String,

    #[serde(default)]
    pub kind: MessageKind,

    /// Body text, may contain `{name}` placeholders
    #[serde(default)]
    pub text: Option<String>,

    /// Gateway template name (template messages)
    #[serde(default)]
    pub template_name: Option<String>,

    /// Parsed JSON whose shape depends on `kind`
    #[serde(default)]
    pub message_variables: Value,

    /// `(id, title)` pairs offered as reply buttons
    #[serde(default)]
    pub quick_reply: Vec<(String, String)>,

    /// Interactive sub-type, e.g. "quick_reply"
    #[serde(default, rename = "type")]
    pub message_type: Option<String>,
}

impl OutgoingMessage {
    /// Create a plain text message
    pub fn text(key: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            kind: MessageKind::Text,
            text: Some(text.into()),
            template_name: None,
            message_variables: Value::Null,
            quick_reply: Vec::new(),
            message_type: None,
        }
    }

    /// Titles of the quick reply buttons in order
    pub fn quick_reply_titles(&self) -> Vec<&str> {
        self.quick_reply.iter().map(|(_, title)| title.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_full_message() {
        let raw = json!({
            "key": "menu",
            "kind": "interactive",
            "text": "Hi {name}",
            "message_variables": {"body": {"variables": {"name": "first_name"}}},
            "quick_reply": [["yes", "Yes"], ["no", "No"]],
            "type": "quick_reply"
        });
        let message: OutgoingMessage = serde_json::from_value(raw).unwrap();

        assert_eq!(message.kind, MessageKind::Interactive);
        assert_eq!(message.message_type.as_deref(), Some("quick_reply"));
        assert_eq!(message.quick_reply_titles(), vec!["Yes", "No"]);
        assert!(message.message_variables["body"].is_object());
    }

    #[test]
    fn test_deserialize_minimal_message() {
        let message: OutgoingMessage = serde_json::from_value(json!({"key": "bye"})).unwrap();
        assert_eq!(message.kind, MessageKind::Text);
        assert!(message.text.is_none());
        assert!(message.message_variables.is_null());
        assert!(message.quick_reply.is_empty());
    }

    #[test]
    fn test_text_constructor() {
        let message = OutgoingMessage::text("unknown", "Sorry?");
        assert_eq!(message.key, "unknown");
        assert_eq!(message.text.as_deref(), Some("Sorry?"));
        assert_eq!(message.kind, MessageKind::Text);
    }
}
