//! Wabot - WhatsApp Business message dispatch
//!
//! Command line front end for sending stored messages and fetching media.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wabot::{
    FileMessageStore, GatewayClient, MessageStore, Messenger, Profile, ReplyError, WabotConfig,
};

#[derive(Parser)]
#[command(name = "wabot")]
#[command(version)]
#[command(about = "WhatsApp Business message dispatch")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "WABOT_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a stored message
    Send {
        /// Stored message key
        #[arg(short, long)]
        key: String,

        /// Recipient phone number
        #[arg(short = 't', long)]
        to: String,

        /// Recipient attribute as name=value (repeatable)
        #[arg(short, long = "attr", value_parser = parse_attr)]
        attrs: Vec<(String, String)>,

        /// Text used instead of the stored text
        #[arg(long)]
        text: Option<String>,
    },

    /// Send the stored "unknown" reply
    Unknown {
        /// Recipient phone number
        #[arg(short = 't', long)]
        to: String,
    },

    /// Send an error reply
    Error {
        /// Recipient phone number
        #[arg(short = 't', long)]
        to: String,

        /// Error text or stored reply key
        #[arg(short, long)]
        message: Option<String>,

        /// Treat the error as carrying its own reply
        #[arg(long)]
        custom: bool,
    },

    /// Fetch inbound media by id
    Media {
        /// Media id
        #[arg(long)]
        id: String,

        /// Write the media to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show configuration
    Config {
        /// Show default configuration
        #[arg(long)]
        default: bool,
    },
}

fn parse_attr(raw: &str) -> std::result::Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected name=value, got '{}'", raw))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("wabot={}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let mut config = match &cli.config {
        Some(path) => WabotConfig::load(path)?,
        None => WabotConfig::default(),
    };
    config.apply_env_overrides();

    match cli.command {
        Commands::Send {
            key,
            to,
            attrs,
            text,
        } => {
            let (messenger, store) = build_messenger(&config).await?;
            let user = profile(to, attrs);
            let message = store.get(&key).await?;
            match text.as_deref() {
                Some(text) => send_with_text(&messenger, &user, &message, text).await?,
                None => messenger.send(&user, &message).await?,
            }
            tracing::info!("Sent '{}' to {}", key, user.number);
        }
        Commands::Unknown { to } => {
            let (messenger, _) = build_messenger(&config).await?;
            messenger.send_unknown_message(&Profile::new(to)).await?;
        }
        Commands::Error {
            to,
            message,
            custom,
        } => {
            let (messenger, _) = build_messenger(&config).await?;
            let error = message.map(|m| {
                if custom {
                    ReplyError::custom(m)
                } else {
                    ReplyError::new(m)
                }
            });
            messenger
                .send_error_message(&Profile::new(to), error.as_ref())
                .await?;
        }
        Commands::Media { id, output } => {
            let client = GatewayClient::from_config(&config.gateway)?;
            let media = wabot::MessageGateway::get_media(&client, &id).await?;
            if !media.is_success() {
                anyhow::bail!("Gateway returned {} for media {}", media.status, id);
            }
            match output {
                Some(path) => {
                    tokio::fs::write(&path, &media.body)
                        .await
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!(
                        "{} ({} bytes, {})",
                        path.display(),
                        media.body.len(),
                        media.content_type.as_deref().unwrap_or("unknown type")
                    );
                }
                None => println!(
                    "{} bytes, {}",
                    media.body.len(),
                    media.content_type.as_deref().unwrap_or("unknown type")
                ),
            }
        }
        Commands::Config { default } => {
            show_config(if default { None } else { Some(&config) })?;
        }
    }

    Ok(())
}

async fn build_messenger(config: &WabotConfig) -> Result<(Messenger, Arc<FileMessageStore>)> {
    let gateway = Arc::new(GatewayClient::from_config(&config.gateway)?);
    let store = Arc::new(FileMessageStore::open(&config.store.path).await?);
    let messenger = Messenger::new(gateway, store.clone(), config.messages.clone());
    Ok((messenger, store))
}

fn profile(number: String, attrs: Vec<(String, String)>) -> Profile {
    attrs
        .into_iter()
        .fold(Profile::new(number), |p, (k, v)| p.with_attribute(k, v))
}

async fn send_with_text(
    messenger: &Messenger,
    user: &Profile,
    message: &wabot::OutgoingMessage,
    text: &str,
) -> wabot::Result<()> {
    match message.kind {
        wabot::MessageKind::Text => messenger.send_text_message(user, message, Some(text)).await,
        wabot::MessageKind::Media => messenger.send_media_message(user, message, Some(text)).await,
        wabot::MessageKind::Interactive => {
            messenger
                .send_interactive_message(user, message, Some(text))
                .await
        }
        wabot::MessageKind::Template => {
            tracing::warn!("Template messages ignore --text");
            messenger.send_template_message(user, message).await
        }
    }
}

fn show_config(config: Option<&WabotConfig>) -> Result<()> {
    let config = config.cloned().unwrap_or_default();
    let toml = toml::to_string_pretty(&config)?;
    println!("{}", toml);
    Ok(())
}
