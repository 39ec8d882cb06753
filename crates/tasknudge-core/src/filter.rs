//! Task filtering engine: decides which tasks are relevant "now".
//!
//! Everything here is pure. Callers pass `now` already converted to the
//! configured timezone, so calendar-day comparisons happen in local time.

use crate::task::{Priority, Task};
use chrono::{DateTime, Timelike};
use chrono_tz::Tz;

/// Tasks due on `now`'s calendar day. With `filter_by_time`, each task must
/// also pass [`should_show_task`].
pub fn filter_today(tasks: &[Task], now: &DateTime<Tz>, filter_by_time: bool) -> Vec<Task> {
    let today = now.date_naive();
    let mut res: Vec<Task> = tasks
        .iter()
        .filter(|t| t.due_date() == Some(today))
        .filter(|t| !filter_by_time || should_show_task(t, now))
        .cloned()
        .collect();
    sort_tasks(&mut res);
    res
}

/// Tasks due on the calendar day after `now`. No time or priority gating.
pub fn filter_tomorrow(tasks: &[Task], now: &DateTime<Tz>) -> Vec<Task> {
    let Some(tomorrow) = now.date_naive().succ_opt() else {
        return Vec::new();
    };
    let mut res: Vec<Task> = tasks
        .iter()
        .filter(|t| t.due_date() == Some(tomorrow))
        .cloned()
        .collect();
    sort_tasks(&mut res);
    res
}

/// Tasks that still need attention: default priority and no time marker.
pub fn filter_unprioritized(tasks: &[Task]) -> Vec<Task> {
    let mut res: Vec<Task> = tasks
        .iter()
        .filter(|t| t.priority == Priority::P4 && !t.has_time_marker())
        .cloned()
        .collect();
    sort_tasks(&mut res);
    res
}

/// Visibility of a task at the hour of `now`.
///
/// Time markers win over priority. Markers are checked in the order
/// 12pm, 3pm, 6pm, 9pm and the first one whose hour has not been reached
/// hides the task. Without markers, P1 and P4 always show, P2 from 15:00
/// and P3 from 18:00.
pub fn should_show_task(task: &Task, now: &DateTime<Tz>) -> bool {
    let hour = now.hour();
    let markers = task.time_markers();

    if !markers.is_empty() {
        for marker in markers {
            if hour < marker.threshold_hour() {
                return false;
            }
        }
        return true;
    }

    match task.priority {
        Priority::P1 | Priority::P4 => true,
        Priority::P2 => hour >= 15,
        Priority::P3 => hour >= 18,
        Priority::Unknown(_) => false,
    }
}

/// Priority descending, then project id ascending. Stable for equal keys.
pub fn sort_tasks(tasks: &mut [Task]) {
    tasks.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then_with(|| a.project_id.cmp(&b.project_id))
    });
}
