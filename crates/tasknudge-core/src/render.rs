//! Plain-text rendering of task lists for chat delivery.

use crate::task::Task;

/// Header used for the scheduled and `/tasks` notifications.
pub const TODAY_HEADER: &str = "Uncompleted tasks for today:";

/// Header used for `/tomorrow`.
pub const TOMORROW_HEADER: &str = "Tasks for tomorrow:";

/// Render today's tasks. An empty string means there is nothing to send.
pub fn render_tasks(tasks: &[Task]) -> String {
    render_tasks_with_header(TODAY_HEADER, tasks)
}

/// Render `tasks` in the given order, one `- <glyph> <content>` line each.
pub fn render_tasks_with_header(header: &str, tasks: &[Task]) -> String {
    if tasks.is_empty() {
        return String::new();
    }

    let mut out = String::with_capacity(header.len() + tasks.len() * 32);
    out.push_str(header);
    out.push('\n');
    for task in tasks {
        out.push_str(&format!("- {} {}\n", task.priority.glyph(), task.content));
    }
    out
}
