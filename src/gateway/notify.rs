//! Outgoing notifications: today's tasks and prioritization dialogs.

use super::Gateway;
use crate::prioritize::{self, DialogPrompt};
use tasknudge_core::{error::NudgeError, message::OutgoingMessage, render::render_tasks};
use tracing::{debug, error, info};

impl Gateway {
    /// Send today's time-gated tasks to the configured chat. Nothing is sent
    /// when the list is empty.
    pub async fn notify_today(&self) -> Result<(), NudgeError> {
        let tasks = self.tasks.today_tasks(true).await?;
        let text = render_tasks(&tasks);
        if text.is_empty() {
            debug!("no tasks to send");
            return Ok(());
        }
        self.channel
            .send(OutgoingMessage::text(self.chat_id, text))
            .await?;
        info!(count = tasks.len(), "tasks sent successfully");
        Ok(())
    }

    /// Open prioritization dialogs on schedule. Silent when nothing needs it.
    pub async fn prioritize_scheduled(&self) -> Result<(), NudgeError> {
        let prompts = self.prioritizer.start_dialogs().await?;
        if prompts.is_empty() {
            info!("no unprioritized tasks for tomorrow");
            return Ok(());
        }
        self.deliver_dialogs(self.chat_id, prompts).await
    }

    /// Intro, then one message per dialog. A failed dialog message is
    /// logged and skipped.
    pub(super) async fn deliver_dialogs(
        &self,
        chat_id: i64,
        prompts: Vec<DialogPrompt>,
    ) -> Result<(), NudgeError> {
        self.channel
            .send(OutgoingMessage::text(chat_id, prioritize::intro(prompts.len())))
            .await?;

        for prompt in prompts {
            let msg = OutgoingMessage::text(chat_id, prompt.text).with_keyboard(prompt.keyboard);
            if let Err(e) = self.channel.send(msg).await {
                error!(task_id = %prompt.task_id, error = %e, "failed to send priority selection");
            }
        }
        Ok(())
    }
}
