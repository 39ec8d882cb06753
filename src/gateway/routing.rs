//! Routing of authorized messages and button presses.

use super::Gateway;
use crate::commands::{self, Command, CommandContext, Response};
use crate::prioritize::{CallbackError, CallbackEvent, Reply};
use tasknudge_core::{
    error::NudgeError,
    message::{IncomingCallback, IncomingMessage, OutgoingMessage},
};
use tracing::{debug, info};

impl Gateway {
    pub(super) async fn handle_message(&self, msg: IncomingMessage) -> Result<(), NudgeError> {
        let Some(cmd) = Command::parse(&msg.text) else {
            debug!(chat_id = msg.chat_id, "ignoring non-command message");
            return Ok(());
        };
        info!(
            chat_id = msg.chat_id,
            sender = msg.sender_name.as_deref().unwrap_or("unknown"),
            command = ?cmd,
            "received command"
        );

        let ctx = CommandContext {
            tasks: &self.tasks,
            prioritizer: &self.prioritizer,
        };
        match commands::handle(cmd, &ctx).await? {
            Response::Text(text) => {
                self.channel
                    .send(OutgoingMessage::text(msg.chat_id, text))
                    .await?;
            }
            Response::Dialogs(prompts) => self.deliver_dialogs(msg.chat_id, prompts).await?,
        }
        Ok(())
    }

    pub(super) async fn handle_callback(&self, cb: IncomingCallback) -> Result<(), NudgeError> {
        let event = match CallbackEvent::parse(&cb.data) {
            Ok(event) => event,
            Err(CallbackError::Foreign) => {
                debug!(data = %cb.data, "ignoring foreign callback");
                return self.channel.answer_callback(&cb.id, None).await;
            }
            Err(e) => {
                debug!(data = %cb.data, error = %e, "rejecting callback");
                return self.channel.answer_callback(&cb.id, Some(&e.to_string())).await;
            }
        };

        match self.prioritizer.handle(event).await {
            Reply::Alert(text) => self.channel.answer_callback(&cb.id, Some(&text)).await,
            Reply::Edit { text, keyboard } => {
                self.channel.answer_callback(&cb.id, None).await?;
                match cb.message {
                    Some(target) => self.channel.edit(&target, &text, keyboard.as_ref()).await,
                    None => {
                        let mut out = OutgoingMessage::text(cb.chat_id, text);
                        out.keyboard = keyboard;
                        self.channel.send(out).await.map(|_| ())
                    }
                }
            }
        }
    }
}
