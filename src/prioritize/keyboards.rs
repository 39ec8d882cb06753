//! Dialog texts and inline keyboards.

use super::callback::{CallbackEvent, ProjectChoice};
use super::state::PrioritizationState;
use tasknudge_core::{
    message::{InlineButton, InlineKeyboard},
    task::{Priority, Project, TimeMarker},
};

pub const STATE_EXPIRED: &str = "Task state expired. Please start again.";
pub const PROJECTS_FAILED: &str = "Failed to load projects. Please try again.";
pub const UPDATE_FAILED: &str = "Failed to update task. Please try again.";

pub fn intro(count: usize) -> String {
    format!("Found {count} task(s) for tomorrow that need prioritization:")
}

fn button(text: &str, event: CallbackEvent) -> InlineButton {
    InlineButton::new(text, event.encode())
}

/// "📋 Task: …\nPriority: 🔴\nTime: 12pm" header shared by later steps.
fn summary(state: &PrioritizationState, time: Option<&str>) -> String {
    let mut out = format!(
        "📋 Task: {}\nPriority: {}",
        state.content,
        state.priority.glyph()
    );
    if let Some(time) = time {
        out.push_str(&format!("\nTime: {time}"));
    }
    out
}

pub fn priority_prompt(task_id: &str, content: &str) -> (String, InlineKeyboard) {
    let choose = |label: &str, priority: Priority| {
        button(
            label,
            CallbackEvent::PriorityChosen {
                task_id: task_id.to_string(),
                priority,
            },
        )
    };
    let keyboard = InlineKeyboard::new(vec![
        vec![choose("🔴 P1", Priority::P1), choose("🟠 P2", Priority::P2)],
        vec![choose("🔵 P3", Priority::P3), choose("⚪ P4", Priority::P4)],
    ]);
    (format!("📋 Task: {content}\n\nSelect priority:"), keyboard)
}

/// Offered only for P1 (noon) and P4 (evening).
pub fn time_prompt(state: &PrioritizationState) -> (String, InlineKeyboard) {
    let (label, marker) = match state.priority {
        Priority::P1 => ("🕛 12PM", TimeMarker::Noon),
        _ => ("🕘 9PM", TimeMarker::Night),
    };
    let choose = |label: &str, marker: Option<TimeMarker>| {
        button(
            label,
            CallbackEvent::TimeLabelChosen {
                task_id: state.task_id.clone(),
                label: marker,
            },
        )
    };
    let keyboard = InlineKeyboard::new(vec![vec![
        choose(label, Some(marker)),
        choose("⏭️ None", None),
    ]]);
    (format!("{}\n\nSelect time:", summary(state, None)), keyboard)
}

/// Tasks that went through the time step show "Time: None" when skipped.
pub fn move_prompt(state: &PrioritizationState) -> (String, InlineKeyboard) {
    let time = match (state.time_label, state.priority) {
        (Some(marker), _) => Some(marker.as_str()),
        (None, Priority::P1 | Priority::P4) => Some("None"),
        (None, _) => None,
    };
    let decide = |label: &str, move_project: bool| {
        button(
            label,
            CallbackEvent::ProjectMoveDecided {
                task_id: state.task_id.clone(),
                move_project,
            },
        )
    };
    let keyboard = InlineKeyboard::new(vec![vec![decide("✅ Yes", true), decide("⏭️ No", false)]]);
    (format!("{}\n\nMove to project?", summary(state, time)), keyboard)
}

/// Projects two per row, then a "keep current" row.
pub fn project_prompt(
    state: &PrioritizationState,
    projects: &[Project],
) -> (String, InlineKeyboard) {
    let select = |label: &str, project: ProjectChoice| {
        button(
            label,
            CallbackEvent::ProjectSelected {
                task_id: state.task_id.clone(),
                project,
            },
        )
    };
    let mut rows: Vec<Vec<InlineButton>> = projects
        .chunks(2)
        .map(|pair| {
            pair.iter()
                .map(|p| select(&p.name, ProjectChoice::Project(p.id.clone())))
                .collect()
        })
        .collect();
    rows.push(vec![select("⏭️ Keep Current", ProjectChoice::KeepCurrent)]);

    let time = state.time_label.map(TimeMarker::as_str);
    (
        format!("{}\n\nSelect project:", summary(state, time)),
        InlineKeyboard::new(rows),
    )
}

pub fn confirmation(state: &PrioritizationState) -> String {
    let time = state.time_label.map(TimeMarker::as_str);
    format!("✅ Task updated successfully!\n\n{}", summary(state, time))
}
