use crate::{
    error::NudgeError,
    message::{IncomingEvent, InlineKeyboard, MessageRef, OutgoingMessage},
    task::{Project, Task, TaskUpdate},
};
use async_trait::async_trait;

/// Task backend — where to-do items come from and go back to.
///
/// Implementations perform network I/O and may be slow or fail; callers
/// bound every call with a timeout.
#[async_trait]
pub trait TaskSource: Send + Sync {
    /// Fetch tasks, optionally including completed ones.
    async fn fetch_tasks(&self, include_completed: bool) -> Result<Vec<Task>, NudgeError>;

    /// Fetch every project.
    async fn fetch_projects(&self) -> Result<Vec<Project>, NudgeError>;

    /// Overwrite a task's priority and labels, returning the updated task.
    async fn update_task(&self, task_id: &str, update: &TaskUpdate) -> Result<Task, NudgeError>;
}

/// Messaging Channel trait.
///
/// The chat platform (Telegram) implements this to receive commands and
/// button presses and to send, edit, and acknowledge messages.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Human-readable channel name.
    fn name(&self) -> &str;

    /// Start listening. Returns a receiver that yields incoming events.
    async fn start(&self) -> Result<tokio::sync::mpsc::Receiver<IncomingEvent>, NudgeError>;

    /// Deliver a message, optionally with an inline keyboard.
    async fn send(&self, message: OutgoingMessage) -> Result<MessageRef, NudgeError>;

    /// Replace the text (and keyboard) of a delivered message.
    /// `None` removes the keyboard.
    async fn edit(
        &self,
        target: &MessageRef,
        text: &str,
        keyboard: Option<&InlineKeyboard>,
    ) -> Result<(), NudgeError>;

    /// Acknowledge a button press. `Some(text)` shows it as an alert.
    async fn answer_callback(&self, callback_id: &str, alert: Option<&str>)
        -> Result<(), NudgeError>;

    /// Graceful shutdown.
    async fn stop(&self) -> Result<(), NudgeError>;
}
