//! Built-in bot commands.


use crate::prioritize::{DialogPrompt, Prioritizer};
use crate::tasks::TaskService;
use tasknudge_core::{
    error::NudgeError,
    render::{render_tasks, render_tasks_with_header, TOMORROW_HEADER},
};

pub const NO_TASKS_TODAY: &str = "No tasks for today! 🎉";
pub const NO_TASKS_TOMORROW: &str = "No tasks for tomorrow.";
pub const ALL_PRIORITIZED: &str = "All tasks for tomorrow are prioritized! 🎉";

const HELP: &str = "Available commands:\n\
    /tasks - Show today's uncompleted tasks\n\
    /tomorrow - Show tasks due tomorrow\n\
    /prioritize - Prioritize tomorrow's tasks\n\
    /help - Show this message";

/// Grouped context for command execution.
pub struct CommandContext<'a> {
    pub tasks: &'a TaskService,
    pub prioritizer: &'a Prioritizer,
}

/// Known bot commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Tasks,
    Tomorrow,
    Prioritize,
    Help,
}

/// What a command wants delivered.
#[derive(Debug)]
pub enum Response {
    Text(String),
    /// Intro plus one message per dialog.
    Dialogs(Vec<DialogPrompt>),
}

impl Command {
    /// Parse a command from message text. Returns `None` for anything that
    /// is not one of ours.
    pub fn parse(text: &str) -> Option<Self> {
        let first = text.split_whitespace().next()?;
        // Strip @botname suffix (e.g. "/tasks@nudge_bot" → "/tasks").
        let cmd = first.split('@').next().unwrap_or(first);
        match cmd {
            "/tasks" => Some(Self::Tasks),
            "/tomorrow" => Some(Self::Tomorrow),
            "/prioritize" => Some(Self::Prioritize),
            "/help" | "/start" => Some(Self::Help),
            _ => None,
        }
    }
}

/// Handle a command and return what to send back.
pub async fn handle(cmd: Command, ctx: &CommandContext<'_>) -> Result<Response, NudgeError> {
    let response = match cmd {
        Command::Tasks => {
            let tasks = ctx.tasks.today_tasks(true).await?;
            Response::Text(or_else(render_tasks(&tasks), NO_TASKS_TODAY))
        }
        Command::Tomorrow => {
            let tasks = ctx.tasks.tomorrow_tasks().await?;
            Response::Text(or_else(
                render_tasks_with_header(TOMORROW_HEADER, &tasks),
                NO_TASKS_TOMORROW,
            ))
        }
        Command::Prioritize => {
            let prompts = ctx.prioritizer.start_dialogs().await?;
            if prompts.is_empty() {
                Response::Text(ALL_PRIORITIZED.to_string())
            } else {
                Response::Dialogs(prompts)
            }
        }
        Command::Help => Response::Text(HELP.to_string()),
    };
    Ok(response)
}

fn or_else(rendered: String, fallback: &str) -> String {
    if rendered.is_empty() {
        fallback.to_string()
    } else {
        rendered
    }
}
