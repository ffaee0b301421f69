//! Outgoing message store
//!
//! Stored messages carry the text, template name and variable mappings the
//! messenger needs to build a gateway payload for one recipient.

pub mod file;
pub mod types;

pub use file::FileMessageStore;
pub use types::{MessageKind, OutgoingMessage};

use crate::error::Result;
use async_trait::async_trait;

/// Read access to stored outgoing messages
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Get a message by key, failing with `Error::NotFound` when absent
    async fn get(&self, key: &str) -> Result<OutgoingMessage>;

    /// Look up a message by key
    async fn find(&self, key: &str) -> Result<Option<OutgoingMessage>>;
}
