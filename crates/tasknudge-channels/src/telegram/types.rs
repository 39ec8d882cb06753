//! Telegram Bot API deserialization types.

use serde::Deserialize;
use tasknudge_core::message::{IncomingCallback, IncomingEvent, IncomingMessage, MessageRef};

#[derive(Debug, Deserialize)]
pub(crate) struct TgResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TgUpdate {
    pub update_id: i64,
    pub message: Option<TgMessage>,
    pub callback_query: Option<TgCallbackQuery>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TgMessage {
    pub message_id: i64,
    pub from: Option<TgUser>,
    pub chat: TgChat,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TgUser {
    pub id: i64,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TgChat {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TgCallbackQuery {
    pub id: String,
    pub from: TgUser,
    /// Message with the pressed button. Absent for inline-mode messages.
    pub message: Option<TgMessage>,
    pub data: Option<String>,
}

impl TgUser {
    pub fn display_name(&self) -> String {
        if let Some(ref un) = self.username {
            format!("@{un}")
        } else if let Some(ref ln) = self.last_name {
            format!("{} {ln}", self.first_name)
        } else {
            self.first_name.clone()
        }
    }
}

impl TgUpdate {
    /// Convert to a channel event. Updates without text or callback data
    /// are dropped.
    pub fn into_event(self) -> Option<IncomingEvent> {
        if let Some(query) = self.callback_query {
            let data = query.data?;
            let message = query.message.as_ref().map(|m| MessageRef {
                chat_id: m.chat.id,
                message_id: m.message_id,
            });
            // Without the message, fall back to the user's private chat.
            let chat_id = message.map(|m| m.chat_id).unwrap_or(query.from.id);
            return Some(IncomingEvent::Callback(IncomingCallback {
                id: query.id,
                chat_id,
                sender_id: query.from.id,
                data,
                message,
            }));
        }

        let msg = self.message?;
        let text = msg.text?;
        Some(IncomingEvent::Message(IncomingMessage {
            chat_id: msg.chat.id,
            message_id: msg.message_id,
            sender_id: msg.from.as_ref().map(|u| u.id),
            sender_name: msg.from.as_ref().map(TgUser::display_name),
            text,
        }))
    }
}
