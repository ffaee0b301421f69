//! Outbound message orchestration
//!
//! The [`Messenger`] takes a stored [`OutgoingMessage`] and a [`Recipient`],
//! fills in the recipient's variables, builds the gateway payload for the
//! message type and sends it. Every operation is a single pass with no
//! retries: a gateway rejection is returned as `Error::Gateway`.

use crate::config::MessagesConfig;
use crate::error::{Error, Result};
use crate::gateway::{MediaResponse, MessageGateway};
use crate::payload::{self, MediaData};
use crate::recipient::{resolve_variables, Recipient};
use crate::store::{MessageKind, MessageStore, OutgoingMessage};
use crate::template::{display_value, render};
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// Stored message sent for input the bot does not understand
pub const UNKNOWN_MESSAGE_KEY: &str = "unknown";

/// Stored message sent when input fails validation without a custom reply
pub const WRONG_FORMAT_MESSAGE_KEY: &str = "wrong_format";

/// A user-facing validation failure
#[derive(Debug, Clone, Default)]
pub struct ReplyError {
    /// Error text, or the key of a stored reply when `custom_message` is set
    pub message: String,

    /// Extra parameters; `custom_message` marks a tailored reply
    pub params: Map<String, Value>,
}

impl ReplyError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            params: Map::new(),
        }
    }

    /// Mark this error as carrying its own reply
    pub fn custom(message: impl Into<String>) -> Self {
        let mut error = Self::new(message);
        error.params.insert("custom_message".to_string(), Value::Bool(true));
        error
    }

    /// Whether `custom_message` is set to a truthy value
    pub fn is_custom_message(&self) -> bool {
        self.params.get("custom_message").is_some_and(is_truthy)
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// An empty override falls back to the stored text
fn pick_text<'a>(message_text: Option<&'a str>, message: &'a OutgoingMessage) -> Option<&'a str> {
    message_text
        .filter(|t| !t.is_empty())
        .or(message.text.as_deref())
}

/// Non-empty JSON object, or `None`
fn non_empty_object(value: Option<&Value>) -> Option<&Map<String, Value>> {
    value.and_then(Value::as_object).filter(|m| !m.is_empty())
}

/// Formats stored messages for a recipient and sends them through the gateway
pub struct Messenger {
    gateway: Arc<dyn MessageGateway>,
    store: Arc<dyn MessageStore>,
    config: MessagesConfig,
}

impl Messenger {
    /// Create a new messenger
    pub fn new(
        gateway: Arc<dyn MessageGateway>,
        store: Arc<dyn MessageStore>,
        config: MessagesConfig,
    ) -> Self {
        Self {
            gateway,
            store,
            config,
        }
    }

    /// Send a stored message using the sender for its kind
    pub async fn send(&self, user: &dyn Recipient, message: &OutgoingMessage) -> Result<()> {
        match message.kind {
            MessageKind::Template => self.send_template_message(user, message).await,
            MessageKind::Text => self.send_text_message(user, message, None).await,
            MessageKind::Media => self.send_media_message(user, message, None).await,
            MessageKind::Interactive => self.send_interactive_message(user, message, None).await,
        }
    }

    /// Send a template message.
    ///
    /// `message_variables` holds the template components. Each parameter
    /// names a recipient `variable`; it is replaced by the resolved value
    /// under the parameter's `type` key.
    pub async fn send_template_message(
        &self,
        user: &dyn Recipient,
        message: &OutgoingMessage,
    ) -> Result<()> {
        let template_name = message.template_name.as_deref().ok_or_else(|| {
            Error::InvalidMessage(format!("Template message '{}' has no template_name", message.key))
        })?;

        let components = fill_components(user, &message.message_variables)?;
        tracing::debug!(%components, "Template components");

        let mut payload = payload::template_message(
            user.number(),
            template_name,
            components,
            None,
            &self.config.template_lang_code,
        );

        if self.config.demo_mode {
            tracing::info!("Demo mode, replacing template message: {}", payload);
            payload = payload::text_message(user.number(), &demo_text(message));
        }

        self.dispatch(&payload).await
    }

    /// Send a media message with an optional caption.
    ///
    /// `message_variables.media` holds `type` and `payload`; an optional
    /// `message_variables.caption` maps caption placeholders to variables.
    pub async fn send_media_message(
        &self,
        user: &dyn Recipient,
        message: &OutgoingMessage,
        message_text: Option<&str>,
    ) -> Result<()> {
        let mut text = pick_text(message_text, message)
            .unwrap_or_default()
            .to_string();

        if !text.is_empty() {
            if let Some(caption) = non_empty_object(message.message_variables.get("caption")) {
                let variables = resolve_variables(user, caption)?;
                text = render(&text, &variables)?;
            }
        }

        let media = message.message_variables.get("media").ok_or_else(|| {
            Error::InvalidMessage(format!("Media message '{}' has no media block", message.key))
        })?;
        let media_type = media.get("type").and_then(Value::as_str).ok_or_else(|| {
            Error::InvalidMessage(format!("Media message '{}' has no media type", message.key))
        })?;

        let mut media_payload = media.get("payload").cloned().unwrap_or_else(|| json!({}));
        if !text.is_empty() {
            let object = media_payload.as_object_mut().ok_or_else(|| {
                Error::InvalidMessage(format!(
                    "Media payload of '{}' must be an object",
                    message.key
                ))
            })?;
            object.insert("caption".to_string(), Value::String(text));
        }

        let media_data = MediaData {
            media_type: media_type.to_string(),
            payload: media_payload,
        };

        let payload = payload::media_message(user.number(), &media_data);
        self.dispatch(&payload).await
    }

    /// Send an interactive message.
    ///
    /// `message_variables` is the interactive object. When it has a `body`,
    /// its `variables` mapping is resolved into the body text; quick reply
    /// messages get one reply button per stored quick reply.
    pub async fn send_interactive_message(
        &self,
        user: &dyn Recipient,
        message: &OutgoingMessage,
        message_text: Option<&str>,
    ) -> Result<()> {
        let text = pick_text(message_text, message).ok_or_else(|| {
            Error::InvalidMessage(format!("Interactive message '{}' has no text", message.key))
        })?;

        let mut parts = match &message.message_variables {
            Value::Object(map) => map.clone(),
            Value::Null => Map::new(),
            other => {
                return Err(Error::InvalidMessage(format!(
                    "Interactive message '{}' variables must be an object, got {}",
                    message.key, other
                )))
            }
        };

        match parts.get_mut("body").and_then(Value::as_object_mut) {
            Some(body) => {
                let mapping = match body.remove("variables") {
                    Some(Value::Object(mapping)) => mapping,
                    _ => Map::new(),
                };
                let variables = resolve_variables(user, &mapping)?;
                body.insert("text".to_string(), Value::String(render(text, &variables)?));
            }
            None => {
                parts.insert("body".to_string(), json!({ "text": text }));
            }
        }

        // Other interactive types pass through as stored
        if let Some("quick_reply") = message.message_type.as_deref() {
            let buttons: Vec<Value> = message
                .quick_reply
                .iter()
                .map(|(id, title)| payload::create_button(id, title))
                .collect();
            parts.insert("type".to_string(), json!("button"));
            parts.insert("action".to_string(), json!({ "buttons": buttons }));
        }

        let payload = payload::interactive_message(Value::Object(parts), user.number());
        self.dispatch(&payload).await
    }

    /// Send a text message, rendering variables when the message defines any
    pub async fn send_text_message(
        &self,
        user: &dyn Recipient,
        message: &OutgoingMessage,
        message_text: Option<&str>,
    ) -> Result<()> {
        let mut text = pick_text(message_text, message)
            .ok_or_else(|| {
                Error::InvalidMessage(format!("Text message '{}' has no text", message.key))
            })?
            .to_string();

        if let Some(mapping) = non_empty_object(Some(&message.message_variables)) {
            let variables = resolve_variables(user, mapping)?;
            text = render(&text, &variables)?;
        }

        let payload = payload::text_message(user.number(), &text);
        self.dispatch(&payload).await
    }

    /// Send the stored "unknown" reply
    pub async fn send_unknown_message(&self, user: &dyn Recipient) -> Result<()> {
        let message = self.store.get(UNKNOWN_MESSAGE_KEY).await?;
        self.send_text_message(user, &message, None).await
    }

    /// Reply to a failed input.
    ///
    /// Custom errors use the stored message keyed by the error text, falling
    /// back to the raw text. Anything else gets the "wrong_format" reply.
    pub async fn send_error_message(
        &self,
        user: &dyn Recipient,
        error: Option<&ReplyError>,
    ) -> Result<()> {
        match error {
            Some(error) if error.is_custom_message() => {
                match self.store.find(&error.message).await? {
                    Some(message) => self.send_text_message(user, &message, None).await,
                    None => {
                        let payload = payload::text_message(user.number(), &error.message);
                        self.dispatch(&payload).await
                    }
                }
            }
            _ => {
                let message = self.store.get(WRONG_FORMAT_MESSAGE_KEY).await?;
                self.send_text_message(user, &message, None).await
            }
        }
    }

    /// Fetch inbound media by id
    pub async fn get_media(&self, media_id: &str) -> Result<MediaResponse> {
        self.gateway.get_media(media_id).await
    }

    async fn dispatch(&self, payload: &Value) -> Result<()> {
        let id = self.gateway.send_message(payload).await?;
        tracing::debug!(message_id = id.as_deref().unwrap_or("-"), "Message accepted");
        Ok(())
    }
}

/// Copy template components, resolving each parameter's `variable`
fn fill_components(user: &dyn Recipient, variables: &Value) -> Result<Value> {
    let mut components = match variables {
        Value::Null => return Ok(json!([])),
        Value::Array(components) => components.clone(),
        other => {
            return Err(Error::InvalidMessage(format!(
                "Template components must be an array, got {}",
                other
            )))
        }
    };

    for component in &mut components {
        let Some(parameters) = component.get_mut("parameters").and_then(Value::as_array_mut)
        else {
            continue;
        };

        for parameter in parameters {
            let parameter = parameter.as_object_mut().ok_or_else(|| {
                Error::InvalidMessage("Template parameter must be an object".to_string())
            })?;

            let variable = match parameter.remove("variable") {
                Some(Value::String(variable)) => variable,
                _ => {
                    return Err(Error::InvalidMessage(
                        "Template parameter has no variable name".to_string(),
                    ))
                }
            };
            let param_type = parameter
                .get("type")
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    Error::InvalidMessage(format!(
                        "Template parameter for '{}' has no type",
                        variable
                    ))
                })?
                .to_string();

            let value = user.get_data(&variable)?;
            parameter.insert(param_type, Value::String(display_value(&value)));
        }
    }

    Ok(Value::Array(components))
}

/// Text sent in place of a template in demo mode
fn demo_text(message: &OutgoingMessage) -> String {
    if message.quick_reply.is_empty() {
        message.key.clone()
    } else {
        format!("{}: [{}]", message.key, message.quick_reply_titles().join(", "))
    }
}
