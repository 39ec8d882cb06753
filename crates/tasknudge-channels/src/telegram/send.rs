//! Outgoing calls: send, edit, callback answers, and command registration.

use super::types::{TgMessage, TgResponse};
use super::TelegramChannel;
use crate::utils::split_message;
use serde::de::DeserializeOwned;
use tasknudge_core::{
    error::NudgeError,
    message::{InlineKeyboard, MessageRef},
};
use tracing::{debug, info, warn};

/// Telegram's per-message text limit.
pub(crate) const MAX_MESSAGE_LEN: usize = 4096;

impl TelegramChannel {
    /// POST a Bot API method and unwrap its `{ok, result}` envelope.
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: &serde_json::Value,
    ) -> Result<T, NudgeError> {
        let url = format!("{}/{method}", self.base_url);
        let resp = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| NudgeError::Channel(format!("telegram {method} failed: {e}")))?;

        let status = resp.status();
        let envelope: TgResponse<T> = resp.json().await.map_err(|e| {
            NudgeError::Channel(format!("telegram {method} failed ({status}): {e}"))
        })?;

        if !envelope.ok {
            return Err(NudgeError::Channel(format!(
                "telegram {method} failed ({status}): {}",
                envelope.description.unwrap_or_default()
            )));
        }

        envelope
            .result
            .ok_or_else(|| NudgeError::Channel(format!("telegram {method}: empty result")))
    }

    /// Send a text message, splitting it at the length limit. The keyboard
    /// rides on the last chunk, whose handle is returned.
    pub(crate) async fn send_text(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<&InlineKeyboard>,
    ) -> Result<MessageRef, NudgeError> {
        let chunks = split_message(text, MAX_MESSAGE_LEN);
        let last = chunks.len() - 1;
        let mut sent = None;

        for (i, chunk) in chunks.into_iter().enumerate() {
            let mut body = serde_json::json!({
                "chat_id": chat_id,
                "text": chunk,
            });
            if let Some(kb) = keyboard.filter(|_| i == last) {
                body["reply_markup"] = serde_json::to_value(kb)?;
            }

            let msg: TgMessage = self.call("sendMessage", &body).await?;
            sent = Some(MessageRef {
                chat_id: msg.chat.id,
                message_id: msg.message_id,
            });
        }

        sent.ok_or_else(|| NudgeError::Channel("telegram sendMessage: nothing sent".into()))
    }

    /// Replace a message's text. Without a keyboard the existing one is removed.
    pub(crate) async fn edit_text(
        &self,
        target: &MessageRef,
        text: &str,
        keyboard: Option<&InlineKeyboard>,
    ) -> Result<(), NudgeError> {
        let mut body = serde_json::json!({
            "chat_id": target.chat_id,
            "message_id": target.message_id,
            "text": text,
        });
        if let Some(kb) = keyboard {
            body["reply_markup"] = serde_json::to_value(kb)?;
        }

        // Result is the edited Message, or `true` for inline messages.
        match self.call::<serde_json::Value>("editMessageText", &body).await {
            Ok(_) => Ok(()),
            Err(NudgeError::Channel(e)) if e.contains("message is not modified") => {
                debug!(message_id = target.message_id, "edit skipped, message unchanged");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Acknowledge a button press, optionally as a visible alert.
    pub(crate) async fn answer_callback_query(
        &self,
        callback_id: &str,
        alert: Option<&str>,
    ) -> Result<(), NudgeError> {
        let mut body = serde_json::json!({ "callback_query_id": callback_id });
        if let Some(text) = alert {
            body["text"] = serde_json::Value::from(text);
            body["show_alert"] = serde_json::Value::Bool(true);
        }
        let _: bool = self.call("answerCallbackQuery", &body).await?;
        Ok(())
    }

    /// Register bot commands with Telegram so users see an autocomplete menu.
    /// Best-effort: logs failures but does not propagate errors.
    pub(crate) async fn register_commands(&self) {
        let commands = serde_json::json!({
            "commands": [
                { "command": "tasks", "description": "Show today's uncompleted tasks" },
                { "command": "tomorrow", "description": "Show tasks due tomorrow" },
                { "command": "prioritize", "description": "Prioritize tomorrow's tasks" },
                { "command": "help", "description": "Show available commands" },
            ]
        });

        match self.call::<bool>("setMyCommands", &commands).await {
            Ok(_) => info!("registered Telegram bot commands"),
            Err(e) => warn!("failed to register Telegram bot commands: {e}"),
        }
    }
}
