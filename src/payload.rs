//! Gateway JSON payload builders
//!
//! Each builder produces the exact JSON body the gateway's `/messages`
//! endpoint expects for one message type.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Media type plus the type-specific object sent under that key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaData {
    /// Gateway media type ("image", "document", "video", ...)
    pub media_type: String,

    /// Object placed under the media type key (`link` or `id`, optional `caption`)
    pub payload: Value,
}

/// Build a template message.
///
/// `lang_code` overrides `default_lang` when given.
pub fn template_message(
    to: &str,
    template_name: &str,
    components: Value,
    lang_code: Option<&str>,
    default_lang: &str,
) -> Value {
    let code = lang_code.unwrap_or(default_lang);
    let message = json!({
        "to": to,
        "type": "template",
        "template": {
            "language": {
                "policy": "deterministic",
                "code": code,
            },
            "name": template_name,
            "components": components,
        },
    });

    tracing::debug!(%message, "template message");
    message
}

/// Build a media message
pub fn media_message(to: &str, media: &MediaData) -> Value {
    let mut message = json!({
        "recipient_type": "individual",
        "to": to,
        "type": media.media_type,
    });
    message[media.media_type.as_str()] = media.payload.clone();

    tracing::debug!(%message, "media message");
    message
}

/// Build a plain text message
pub fn text_message(to: &str, text: &str) -> Value {
    let message = json!({
        "to": to,
        "type": "text",
        "text": {
            "body": text,
        },
    });

    tracing::debug!(%message, "text message");
    message
}

/// Build an interactive message around already assembled `parts`
pub fn interactive_message(parts: Value, to: &str) -> Value {
    let message = json!({
        "recipient_type": "individual",
        "to": to,
        "type": "interactive",
        "interactive": parts,
    });

    tracing::debug!(%message, "interactive message");
    message
}

/// Build a reply button for an interactive message
pub fn create_button(id: &str, title: &str) -> Value {
    json!({
        "type": "reply",
        "reply": {
            "id": id,
            "title": title,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_message_default_language() {
        let components = json!([{"type": "body", "parameters": []}]);
        let message = template_message("972500000000", "welcome", components.clone(), None, "he");

        assert_eq!(
            message,
            json!({
                "to": "972500000000",
                "type": "template",
                "template": {
                    "language": {"policy": "deterministic", "code": "he"},
                    "name": "welcome",
                    "components": components,
                }
            })
        );
    }

    #[test]
    fn test_template_message_explicit_language() {
        let message = template_message("1", "welcome", json!([]), Some("en_US"), "he");
        assert_eq!(message["template"]["language"]["code"], "en_US");
        assert_eq!(message["template"]["language"]["policy"], "deterministic");
    }

    #[test]
    fn test_media_message_uses_type_as_key() {
        let media = MediaData {
            media_type: "image".to_string(),
            payload: json!({"link": "https://example.com/a.png", "caption": "hi"}),
        };
        let message = media_message("972500000000", &media);

        assert_eq!(
            message,
            json!({
                "recipient_type": "individual",
                "to": "972500000000",
                "type": "image",
                "image": {"link": "https://example.com/a.png", "caption": "hi"},
            })
        );
    }

    #[test]
    fn test_text_message() {
        let message = text_message("972500000000", "hello");
        assert_eq!(
            message,
            json!({"to": "972500000000", "type": "text", "text": {"body": "hello"}})
        );
    }

    #[test]
    fn test_interactive_message() {
        let parts = json!({"type": "button", "body": {"text": "Pick one"}});
        let message = interactive_message(parts.clone(), "972500000000");

        assert_eq!(message["recipient_type"], "individual");
        assert_eq!(message["type"], "interactive");
        assert_eq!(message["to"], "972500000000");
        assert_eq!(message["interactive"], parts);
    }

    #[test]
    fn test_create_button() {
        assert_eq!(
            create_button("yes", "Yes"),
            json!({"type": "reply", "reply": {"id": "yes", "title": "Yes"}})
        );
    }
}
