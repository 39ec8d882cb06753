use serde::{Deserialize, Serialize};

/// A text message (usually a command) received from the chat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingMessage {
    /// Chat the message was posted in; replies go here.
    pub chat_id: i64,
    pub message_id: i64,
    /// Platform user id of the sender, when known.
    pub sender_id: Option<i64>,
    /// Human-readable sender name.
    pub sender_name: Option<String>,
    pub text: String,
}

/// A press on an inline keyboard button.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingCallback {
    /// Callback query id, needed to answer the press.
    pub id: String,
    pub chat_id: i64,
    pub sender_id: i64,
    /// Raw callback payload attached to the button.
    pub data: String,
    /// The message carrying the keyboard, if the platform reported it.
    pub message: Option<MessageRef>,
}

/// Anything the channel delivers to the gateway.
#[derive(Debug, Clone)]
pub enum IncomingEvent {
    Message(IncomingMessage),
    Callback(IncomingCallback),
}

impl IncomingEvent {
    pub fn chat_id(&self) -> i64 {
        match self {
            IncomingEvent::Message(m) => m.chat_id,
            IncomingEvent::Callback(c) => c.chat_id,
        }
    }
}

/// Handle to a delivered message, used for later edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRef {
    pub chat_id: i64,
    pub message_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineButton {
    pub text: String,
    pub callback_data: String,
}

impl InlineButton {
    pub fn new(text: impl Into<String>, callback_data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            callback_data: callback_data.into(),
        }
    }
}

/// Inline keyboard, serialized in the Telegram `reply_markup` shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineKeyboard {
    #[serde(rename = "inline_keyboard")]
    pub rows: Vec<Vec<InlineButton>>,
}

impl InlineKeyboard {
    pub fn new(rows: Vec<Vec<InlineButton>>) -> Self {
        Self { rows }
    }

    /// Every button, row by row.
    pub fn buttons(&self) -> impl Iterator<Item = &InlineButton> {
        self.rows.iter().flatten()
    }
}

/// A message to deliver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub chat_id: i64,
    pub text: String,
    pub keyboard: Option<InlineKeyboard>,
}

impl OutgoingMessage {
    pub fn text(chat_id: i64, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
            keyboard: None,
        }
    }

    pub fn with_keyboard(mut self, keyboard: InlineKeyboard) -> Self {
        self.keyboard = Some(keyboard);
        self
    }
}
