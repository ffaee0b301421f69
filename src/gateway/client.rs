//! HTTP client for the 360dialog WhatsApp Business gateway

use super::{MediaResponse, MessageGateway};
use crate::config::GatewayConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use std::time::Duration;

/// Header carrying the gateway API key
const API_KEY_HEADER: &str = "D360-API-KEY";

/// Gateway HTTP client
pub struct GatewayClient {
    client: Client,
    messages_url: String,
    media_url: Url,
    api_key: String,
}

impl GatewayClient {
    /// Create a client for `base_url` authenticating with `api_key`
    pub fn new(base_url: &str, api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base = base_url.trim_end_matches('/');
        let media_url = Url::parse(&format!("{}/media", base)).map_err(|e| {
            Error::Config(format!("Invalid gateway base URL '{}': {}", base_url, e))
        })?;
        if media_url.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "Gateway base URL '{}' cannot carry a path",
                base_url
            )));
        }

        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            messages_url: format!("{}/messages", base),
            media_url,
            api_key: api_key.into(),
        })
    }

    /// Create a client from configuration, resolving the API key from the environment
    pub fn from_config(config: &GatewayConfig) -> Result<Self> {
        let api_key = config.resolve_api_key()?;
        Self::new(
            &config.base_url,
            api_key,
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// URL outbound messages are posted to
    pub fn messages_url(&self) -> &str {
        &self.messages_url
    }

    /// URL for one media id, with the id encoded as a single path segment
    fn media_url_for(&self, media_id: &str) -> Result<Url> {
        let mut url = self.media_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Config("Gateway media URL cannot carry a path".to_string()))?
            .push(media_id);
        Ok(url)
    }
}

/// First `messages[].id` of an accepted send, if the body reports one
fn sent_message_id(body: &str) -> Option<String> {
    let value = serde_json::from_str::<Value>(body).ok()?;
    value
        .get("messages")?
        .get(0)?
        .get("id")?
        .as_str()
        .map(str::to_string)
}

#[async_trait]
impl MessageGateway for GatewayClient {
    async fn send_message(&self, message: &Value) -> Result<Option<String>> {
        tracing::debug!(url = %self.messages_url, %message, "Sending message to gateway");

        let response = self
            .client
            .post(&self.messages_url)
            .header(API_KEY_HEADER, &self.api_key)
            .header(CONTENT_TYPE, "application/json")
            .json(message)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        tracing::debug!(%status, body = %text, "Gateway response");

        if status != StatusCode::CREATED {
            let body = serde_json::from_str::<Value>(&text).unwrap_or(Value::String(text));
            tracing::error!(%status, %body, "Gateway rejected message");
            return Err(Error::Gateway {
                status: status.as_u16(),
                body,
            });
        }

        // 201 means accepted, whatever the body holds
        let id = sent_message_id(&text);
        if id.is_none() {
            tracing::warn!(body = %text, "Gateway accepted message without reporting an id");
        }
        Ok(id)
    }

    async fn get_media(&self, media_id: &str) -> Result<MediaResponse> {
        let url = self.media_url_for(media_id)?;

        let response = self
            .client
            .get(url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?;

        tracing::info!(
            media_id,
            status,
            content_type = content_type.as_deref().unwrap_or("-"),
            len = body.len(),
            "Fetched media from gateway"
        );

        Ok(MediaResponse {
            status,
            content_type,
            body,
        })
    }
}
