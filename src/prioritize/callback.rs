//! Callback payload codec: `prio|<action>|<task id>|<arg>`.
//!
//! Raw payloads are decoded into [`CallbackEvent`] here so the dialog code
//! only ever sees typed events.

use tasknudge_core::task::{Priority, TimeMarker};

pub const CALLBACK_PREFIX: &str = "prio";

const ACTION_PRIORITY: &str = "priority";
const ACTION_TIME: &str = "time";
const ACTION_PROJECT: &str = "project";
const ACTION_PROJECT_SELECT: &str = "project_select";

const ARG_NONE: &str = "none";
const ARG_YES: &str = "yes";
const ARG_NO: &str = "no";
const ARG_KEEP_CURRENT: &str = "current";

/// Why a payload could not be turned into an event.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CallbackError {
    /// Not ours (other prefix or unknown action). Ignored.
    #[error("not a prioritization callback")]
    Foreign,
    #[error("Invalid callback data")]
    Malformed,
    #[error("Invalid priority value")]
    InvalidPriority,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectChoice {
    KeepCurrent,
    Project(String),
}

/// One answer in the prioritization dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackEvent {
    PriorityChosen {
        task_id: String,
        priority: Priority,
    },
    /// `None` means "no time label".
    TimeLabelChosen {
        task_id: String,
        label: Option<TimeMarker>,
    },
    ProjectMoveDecided {
        task_id: String,
        move_project: bool,
    },
    ProjectSelected {
        task_id: String,
        project: ProjectChoice,
    },
}

impl CallbackEvent {
    pub fn task_id(&self) -> &str {
        match self {
            Self::PriorityChosen { task_id, .. }
            | Self::TimeLabelChosen { task_id, .. }
            | Self::ProjectMoveDecided { task_id, .. }
            | Self::ProjectSelected { task_id, .. } => task_id,
        }
    }

    /// Decode a raw button payload.
    pub fn parse(data: &str) -> Result<Self, CallbackError> {
        let parts: Vec<&str> = data.splitn(4, '|').collect();
        if parts.len() < 3 || parts[0] != CALLBACK_PREFIX {
            return Err(CallbackError::Foreign);
        }
        let (action, task_id) = (parts[1], parts[2].to_string());
        if ![ACTION_PRIORITY, ACTION_TIME, ACTION_PROJECT, ACTION_PROJECT_SELECT].contains(&action)
        {
            return Err(CallbackError::Foreign);
        }
        if task_id.is_empty() {
            return Err(CallbackError::Malformed);
        }
        let arg = parts.get(3).copied().ok_or(CallbackError::Malformed)?;

        match action {
            ACTION_PRIORITY => {
                let value: u8 = arg.parse().map_err(|_| CallbackError::InvalidPriority)?;
                let priority =
                    Priority::try_from(value).map_err(|_| CallbackError::InvalidPriority)?;
                Ok(Self::PriorityChosen { task_id, priority })
            }
            ACTION_TIME => {
                let label = match arg {
                    ARG_NONE => None,
                    other => Some(TimeMarker::parse(other).ok_or(CallbackError::Malformed)?),
                };
                Ok(Self::TimeLabelChosen { task_id, label })
            }
            ACTION_PROJECT => {
                let move_project = match arg {
                    ARG_YES => true,
                    ARG_NO => false,
                    _ => return Err(CallbackError::Malformed),
                };
                Ok(Self::ProjectMoveDecided {
                    task_id,
                    move_project,
                })
            }
            _ => {
                let project = match arg {
                    "" => return Err(CallbackError::Malformed),
                    ARG_KEEP_CURRENT => ProjectChoice::KeepCurrent,
                    id => ProjectChoice::Project(id.to_string()),
                };
                Ok(Self::ProjectSelected { task_id, project })
            }
        }
    }

    /// Encode as a button payload.
    pub fn encode(&self) -> String {
        let (action, arg) = match self {
            Self::PriorityChosen { priority, .. } => (ACTION_PRIORITY, priority.value().to_string()),
            Self::TimeLabelChosen { label, .. } => (
                ACTION_TIME,
                label.map_or(ARG_NONE, TimeMarker::as_str).to_string(),
            ),
            Self::ProjectMoveDecided { move_project, .. } => (
                ACTION_PROJECT,
                if *move_project { ARG_YES } else { ARG_NO }.to_string(),
            ),
            Self::ProjectSelected { project, .. } => (
                ACTION_PROJECT_SELECT,
                match project {
                    ProjectChoice::KeepCurrent => ARG_KEEP_CURRENT.to_string(),
                    ProjectChoice::Project(id) => id.clone(),
                },
            ),
        };
        format!("{CALLBACK_PREFIX}|{action}|{}|{arg}", self.task_id())
    }
}
