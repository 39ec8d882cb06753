//! Long-polling update loop and Channel trait implementation.

use super::types::{TgResponse, TgUpdate};
use super::TelegramChannel;
use async_trait::async_trait;
use std::time::Duration;
use tasknudge_core::{
    error::NudgeError,
    message::{IncomingEvent, InlineKeyboard, MessageRef, OutgoingMessage},
    traits::Channel,
};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

/// Server-side long-poll wait, in seconds.
const POLL_TIMEOUT_SECS: u64 = 30;
const MAX_BACKOFF_SECS: u64 = 60;

#[async_trait]
impl Channel for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn start(&self) -> Result<mpsc::Receiver<IncomingEvent>, NudgeError> {
        self.register_commands().await;

        let (tx, rx) = mpsc::channel(64);
        let client = self.client.clone();
        let base_url = self.base_url.clone();
        let last_update_id = self.last_update_id.clone();

        info!("Telegram channel starting long polling...");

        let handle = tokio::spawn(async move {
            let mut backoff_secs: u64 = 1;

            loop {
                let offset = last_update_id.lock().await.map(|id| id + 1);

                let mut query = vec![
                    ("timeout", POLL_TIMEOUT_SECS.to_string()),
                    (
                        "allowed_updates",
                        r#"["message","callback_query"]"#.to_string(),
                    ),
                ];
                if let Some(off) = offset {
                    query.push(("offset", off.to_string()));
                }

                let resp = match client
                    .get(format!("{base_url}/getUpdates"))
                    .query(&query)
                    .timeout(Duration::from_secs(POLL_TIMEOUT_SECS + 5))
                    .send()
                    .await
                {
                    Ok(r) => r,
                    Err(e) => {
                        error!("telegram poll error (retry in {backoff_secs}s): {e}");
                        tokio::time::sleep(Duration::from_secs(backoff_secs)).await;
                        backoff_secs = (backoff_secs * 2).min(MAX_BACKOFF_SECS);
                        continue;
                    }
                };

                let body: TgResponse<Vec<TgUpdate>> = match resp.json().await {
                    Ok(b) => b,
                    Err(e) => {
                        error!("telegram parse error (retry in {backoff_secs}s): {e}");
                        tokio::time::sleep(Duration::from_secs(backoff_secs)).await;
                        backoff_secs = (backoff_secs * 2).min(MAX_BACKOFF_SECS);
                        continue;
                    }
                };

                if !body.ok {
                    error!(
                        "telegram API error (retry in {backoff_secs}s): {}",
                        body.description.unwrap_or_default()
                    );
                    tokio::time::sleep(Duration::from_secs(backoff_secs)).await;
                    backoff_secs = (backoff_secs * 2).min(MAX_BACKOFF_SECS);
                    continue;
                }

                backoff_secs = 1;

                let updates = body.result.unwrap_or_default();
                if let Some(last_update) = updates.last() {
                    *last_update_id.lock().await = Some(last_update.update_id);
                }

                for update in updates {
                    let update_id = update.update_id;
                    let Some(event) = update.into_event() else {
                        debug!(update_id, "skipping update without text or callback data");
                        continue;
                    };
                    if tx.send(event).await.is_err() {
                        info!("Telegram receiver dropped, stopping polling");
                        return;
                    }
                }
            }
        });

        if let Some(previous) = self.poller.lock().await.replace(handle) {
            previous.abort();
        }

        Ok(rx)
    }

    async fn send(&self, message: OutgoingMessage) -> Result<MessageRef, NudgeError> {
        self.send_text(message.chat_id, &message.text, message.keyboard.as_ref())
            .await
    }

    async fn edit(
        &self,
        target: &MessageRef,
        text: &str,
        keyboard: Option<&InlineKeyboard>,
    ) -> Result<(), NudgeError> {
        self.edit_text(target, text, keyboard).await
    }

    async fn answer_callback(
        &self,
        callback_id: &str,
        alert: Option<&str>,
    ) -> Result<(), NudgeError> {
        self.answer_callback_query(callback_id, alert).await
    }

    async fn stop(&self) -> Result<(), NudgeError> {
        if let Some(handle) = self.poller.lock().await.take() {
            handle.abort();
        }
        info!("Telegram channel stopped");
        Ok(())
    }
}
