//! Wabot - WhatsApp Business message dispatch
//!
//! Wabot formats outbound chat messages and sends them to a 360dialog
//! WhatsApp Business gateway. It also fetches inbound media by id.
//!
//! ## Architecture
//!
//! ```text
//!  ┌──────────────┐      ┌──────────────────────────────────────┐
//!  │ MessageStore │─────►│              Messenger               │
//!  └──────────────┘      │  - resolve recipient variables       │
//!  ┌──────────────┐      │  - render `{name}` placeholders      │
//!  │  Recipient   │─────►│  - build payload per message type    │
//!  └──────────────┘      └──────────────────┬───────────────────┘
//!                                           │ JSON payload
//!                        ┌──────────────────▼───────────────────┐
//!                        │    MessageGateway (GatewayClient)    │
//!                        │  POST /messages   GET /media/{id}    │
//!                        └──────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`messenger`]: Template, text, media and interactive senders
//! - [`payload`]: Gateway JSON payload builders
//! - [`template`]: Placeholder substitution
//! - [`recipient`]: Recipient attribute resolution
//! - [`store`]: Stored outgoing messages
//! - [`gateway`]: HTTP access to the messaging gateway
//! - [`config`]: Configuration management

pub mod config;
pub mod error;
pub mod gateway;
pub mod messenger;
pub mod payload;
pub mod recipient;
pub mod store;
pub mod template;

pub use config::WabotConfig;
pub use error::{Error, Result};
pub use gateway::{GatewayClient, MediaResponse, MessageGateway};
pub use messenger::{Messenger, ReplyError};
pub use recipient::{Profile, Recipient};
pub use store::{FileMessageStore, MessageKind, MessageStore, OutgoingMessage};
