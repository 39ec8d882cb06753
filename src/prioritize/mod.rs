//! Interactive prioritization of tomorrow's tasks.
//!
//! Each unprioritized task gets its own dialog:
//! priority, then a time label (P1 and P4 only), then whether to move it to
//! another project, then the project. Answers arrive as [`CallbackEvent`]s
//! and every step works on the [`StateStore`] entry for that task.

pub mod callback;
mod keyboards;
pub mod state;

#[cfg(test)]
mod tests;

pub use callback::{CallbackError, CallbackEvent, ProjectChoice};
pub use keyboards::intro;
pub use state::{PrioritizationState, Stage, StateStore};

use crate::tasks::TaskService;
use chrono::{DateTime, Duration};
use chrono_tz::Tz;
use std::sync::Arc;
use tasknudge_core::{error::NudgeError, message::InlineKeyboard, task::Priority};
use tracing::{debug, error, info};

/// First message of a dialog.
#[derive(Debug, Clone)]
pub struct DialogPrompt {
    pub task_id: String,
    pub text: String,
    pub keyboard: InlineKeyboard,
}

/// What to show after a button press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Replace the dialog message. `None` removes the keyboard.
    Edit {
        text: String,
        keyboard: Option<InlineKeyboard>,
    },
    /// Leave the message alone and show an alert.
    Alert(String),
}

impl Reply {
    fn edit((text, keyboard): (String, InlineKeyboard)) -> Self {
        Self::Edit {
            text,
            keyboard: Some(keyboard),
        }
    }

    fn alert(text: &str) -> Self {
        Self::Alert(text.to_string())
    }
}

fn needs_time_label(priority: Priority) -> bool {
    matches!(priority, Priority::P1 | Priority::P4)
}

pub struct Prioritizer {
    tasks: Arc<TaskService>,
    states: StateStore,
}

impl Prioritizer {
    pub fn new(tasks: Arc<TaskService>, state_timeout: Duration) -> Self {
        Self {
            tasks,
            states: StateStore::new(state_timeout),
        }
    }

    pub fn states(&self) -> &StateStore {
        &self.states
    }

    /// Open a dialog for every unprioritized task due tomorrow.
    pub async fn start_dialogs(&self) -> Result<Vec<DialogPrompt>, NudgeError> {
        debug!("checking unprioritized tasks for tomorrow");
        let tasks = self.tasks.tomorrow_unprioritized().await?;
        let now = self.tasks.clock().now();

        let prompts: Vec<DialogPrompt> = tasks
            .into_iter()
            .map(|task| {
                let (text, keyboard) = keyboards::priority_prompt(&task.id, &task.content);
                self.states.save(PrioritizationState {
                    task_id: task.id.clone(),
                    content: task.content,
                    project_id: task.project_id,
                    priority: task.priority,
                    time_label: None,
                    stage: Stage::AwaitingPriority,
                    created_at: now,
                });
                DialogPrompt {
                    task_id: task.id,
                    text,
                    keyboard,
                }
            })
            .collect();

        if !prompts.is_empty() {
            info!(count = prompts.len(), "found unprioritized tasks");
        }
        Ok(prompts)
    }

    /// Advance the dialog the event belongs to.
    pub async fn handle(&self, event: CallbackEvent) -> Reply {
        let now = self.tasks.clock().now();
        let swept = self.states.sweep_expired(now);
        if swept > 0 {
            debug!(count = swept, "swept expired prioritization states");
        }

        match event {
            CallbackEvent::PriorityChosen { task_id, priority } => {
                self.on_priority(&task_id, priority, now)
            }
            CallbackEvent::TimeLabelChosen { task_id, label } => {
                let state = self.states.update(&task_id, now, |s| {
                    if let Some(marker) = label {
                        s.time_label = Some(marker);
                    }
                    s.stage = Stage::AwaitingProjectMoveDecision;
                });
                match state {
                    Some(state) => Reply::edit(keyboards::move_prompt(&state)),
                    None => Reply::alert(keyboards::STATE_EXPIRED),
                }
            }
            CallbackEvent::ProjectMoveDecided {
                task_id,
                move_project,
            } => {
                if move_project {
                    self.on_move(&task_id, now).await
                } else {
                    self.finalize(&task_id, now).await
                }
            }
            CallbackEvent::ProjectSelected { task_id, project } => {
                let selected = self.states.update(&task_id, now, |s| {
                    if let ProjectChoice::Project(id) = project {
                        s.project_id = id;
                    }
                });
                if selected.is_none() {
                    return Reply::alert(keyboards::STATE_EXPIRED);
                }
                self.finalize(&task_id, now).await
            }
        }
    }

    fn on_priority(&self, task_id: &str, priority: Priority, now: DateTime<Tz>) -> Reply {
        let state = self.states.update(task_id, now, |s| {
            s.priority = priority;
            s.stage = if needs_time_label(priority) {
                Stage::AwaitingTimeLabel
            } else {
                Stage::AwaitingProjectMoveDecision
            };
        });
        let Some(state) = state else {
            return Reply::alert(keyboards::STATE_EXPIRED);
        };

        if needs_time_label(priority) {
            Reply::edit(keyboards::time_prompt(&state))
        } else {
            Reply::edit(keyboards::move_prompt(&state))
        }
    }

    async fn on_move(&self, task_id: &str, now: DateTime<Tz>) -> Reply {
        if self.states.get(task_id, now).is_none() {
            return Reply::alert(keyboards::STATE_EXPIRED);
        }

        let projects = match self.tasks.projects().await {
            Ok(projects) => projects,
            Err(e) => {
                error!(task_id, error = %e, "failed to get projects");
                return Reply::alert(keyboards::PROJECTS_FAILED);
            }
        };

        match self
            .states
            .update(task_id, now, |s| s.stage = Stage::AwaitingProjectChoice)
        {
            Some(state) => Reply::edit(keyboards::project_prompt(&state, &projects)),
            None => Reply::alert(keyboards::STATE_EXPIRED),
        }
    }

    /// Write priority and labels back. The state survives a failed update
    /// so the user can press the button again.
    async fn finalize(&self, task_id: &str, now: DateTime<Tz>) -> Reply {
        let Some(state) = self.states.get(task_id, now) else {
            return Reply::alert(keyboards::STATE_EXPIRED);
        };

        // A chosen time label replaces the task's labels; no label leaves them as they are.
        let labels: Vec<String> = state
            .time_label
            .map(|m| vec![m.as_str().to_string()])
            .unwrap_or_default();

        if let Err(e) = self
            .tasks
            .update_task(task_id, state.priority, labels)
            .await
        {
            error!(task_id, error = %e, "failed to update task");
            return Reply::alert(keyboards::UPDATE_FAILED);
        }

        self.states.delete(task_id);
        info!(
            task_id,
            priority = %state.priority,
            time_label = state.time_label.map(|m| m.as_str()).unwrap_or(""),
            project_id = %state.project_id,
            "task prioritized successfully"
        );

        Reply::Edit {
            text: keyboards::confirmation(&state),
            keyboard: None,
        }
    }
}
