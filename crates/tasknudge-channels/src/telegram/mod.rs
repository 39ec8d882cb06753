//! Telegram Bot API channel.
//!
//! Uses long polling via `getUpdates`, `sendMessage` / `editMessageText`
//! with inline keyboards, and `answerCallbackQuery` for button presses.
//! Docs: <https://core.telegram.org/bots/api>

mod polling;
pub(crate) mod send;
pub(crate) mod types;


use std::sync::Arc;
use tasknudge_core::config::TelegramConfig;
use tokio::{sync::Mutex, task::JoinHandle};

/// Telegram channel using the Bot API with long polling.
pub struct TelegramChannel {
    client: reqwest::Client,
    base_url: String,
    /// Tracks the last update_id to avoid reprocessing.
    last_update_id: Arc<Mutex<Option<i64>>>,
    /// Background long-poll task, aborted on `stop()`.
    poller: Mutex<Option<JoinHandle<()>>>,
}

impl TelegramChannel {
    /// Create a new Telegram channel from config.
    pub fn new(config: &TelegramConfig) -> Self {
        Self::with_base_url(format!("https://api.telegram.org/bot{}", config.bot_token))
    }

    /// Create a channel against a custom Bot API endpoint (self-hosted API
    /// server or tests). `base_url` already includes the `/bot<token>` part.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            last_update_id: Arc::new(Mutex::new(None)),
            poller: Mutex::new(None),
        }
    }
}
