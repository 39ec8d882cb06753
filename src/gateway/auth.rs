//! Single-chat access control.

use super::Gateway;
use tasknudge_core::message::IncomingEvent;
use tracing::{error, warn};

impl Gateway {
    /// Only the configured chat may use the bot.
    pub(super) fn check_auth(&self, event: &IncomingEvent) -> bool {
        event.chat_id() == self.chat_id
    }

    /// Reject an event from another chat.
    pub(super) async fn deny(&self, event: &IncomingEvent) {
        warn!(
            chat_id = event.chat_id(),
            allowed_chat_id = self.chat_id,
            "unauthorized chat access blocked"
        );
        let deny = self.auth_config.deny_message.as_str();
        match event {
            IncomingEvent::Message(msg) => self.send_text(msg.chat_id, deny).await,
            IncomingEvent::Callback(cb) => {
                if let Err(e) = self.channel.answer_callback(&cb.id, Some(deny)).await {
                    error!(chat_id = cb.chat_id, "failed to answer callback: {e}");
                }
            }
        }
    }
}
