//! Messaging gateway access
//!
//! The gateway accepts outbound message payloads on `/messages` and serves
//! inbound media on `/media/{id}`.

mod client;

pub use client::GatewayClient;

use crate::error::Result;
use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;

/// Raw media fetched from the gateway
#[derive(Debug, Clone)]
pub struct MediaResponse {
    /// HTTP status returned by the gateway
    pub status: u16,

    /// `Content-Type` header, when present
    pub content_type: Option<String>,

    /// Response body
    pub body: Bytes,
}

impl MediaResponse {
    /// Whether the gateway returned a 2xx status
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Outbound side of the messaging gateway
#[async_trait]
pub trait MessageGateway: Send + Sync {
    /// Send a built payload, returning the gateway message id when reported
    async fn send_message(&self, message: &Value) -> Result<Option<String>>;

    /// Fetch inbound media by id
    async fn get_media(&self, media_id: &str) -> Result<MediaResponse>;
}
