//! In-memory store of prioritization dialogs in progress, keyed by task id.

use chrono::{DateTime, Duration};
use chrono_tz::Tz;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tasknudge_core::task::{Priority, TimeMarker};
use tracing::debug;

/// Where a dialog currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    AwaitingPriority,
    AwaitingTimeLabel,
    AwaitingProjectMoveDecision,
    AwaitingProjectChoice,
}

/// Working copy of one task while the user answers the dialog.
#[derive(Debug, Clone, PartialEq)]
pub struct PrioritizationState {
    pub task_id: String,
    pub content: String,
    pub project_id: String,
    pub priority: Priority,
    pub time_label: Option<TimeMarker>,
    pub stage: Stage,
    pub created_at: DateTime<Tz>,
}

/// Dialog states behind a single lock. Entries older than `timeout` are
/// never returned, swept or not.
pub struct StateStore {
    states: RwLock<HashMap<String, PrioritizationState>>,
    timeout: Duration,
}

impl StateStore {
    pub fn new(timeout: Duration) -> Self {
        Self {
            states: RwLock::new(HashMap::new()),
            timeout,
        }
    }

    /// Insert or overwrite the state for its task.
    pub fn save(&self, state: PrioritizationState) {
        self.write().insert(state.task_id.clone(), state);
    }

    /// Live state for `task_id`, if any.
    pub fn get(&self, task_id: &str, now: DateTime<Tz>) -> Option<PrioritizationState> {
        self.read()
            .get(task_id)
            .filter(|s| !self.is_expired(s, now))
            .cloned()
    }

    /// Mutate a live state in place and return the result.
    pub fn update<F>(&self, task_id: &str, now: DateTime<Tz>, f: F) -> Option<PrioritizationState>
    where
        F: FnOnce(&mut PrioritizationState),
    {
        let mut states = self.write();
        let state = states.get_mut(task_id)?;
        if self.is_expired(state, now) {
            return None;
        }
        f(state);
        Some(state.clone())
    }

    pub fn delete(&self, task_id: &str) {
        self.write().remove(task_id);
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn sweep_expired(&self, now: DateTime<Tz>) -> usize {
        let mut states = self.write();
        let before = states.len();
        states.retain(|task_id, state| {
            let keep = !self.is_expired(state, now);
            if !keep {
                debug!(task_id = %task_id, "cleaned up expired state");
            }
            keep
        });
        before - states.len()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_expired(&self, state: &PrioritizationState, now: DateTime<Tz>) -> bool {
        now - state.created_at > self.timeout
    }

    // A panicking handler never leaves the map half-written, so poisoning is ignored.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, PrioritizationState>> {
        self.states.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, PrioritizationState>> {
        self.states.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::at;
    use std::sync::Arc;

    fn state(task_id: &str, created_at: DateTime<Tz>) -> PrioritizationState {
        PrioritizationState {
            task_id: task_id.to_string(),
            content: format!("Task {task_id}"),
            project_id: "p0".to_string(),
            priority: Priority::P4,
            time_label: None,
            stage: Stage::AwaitingPriority,
            created_at,
        }
    }

    #[test]
    fn test_get_after_delete_is_absent() {
        let store = StateStore::new(Duration::hours(24));
        let now = at(2026, 3, 10, 9);
        store.save(state("t1", now));
        assert!(store.get("t1", now).is_some());

        store.delete("t1");
        assert!(store.get("t1", now).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_sweep_boundaries() {
        let store = StateStore::new(Duration::hours(24));
        let created = at(2026, 3, 10, 9);
        store.save(state("t1", created));

        assert_eq!(store.sweep_expired(created + Duration::hours(23)), 0);
        assert_eq!(store.len(), 1);

        assert_eq!(store.sweep_expired(created + Duration::hours(25)), 1);
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_expired_state_hidden_before_sweep() {
        let store = StateStore::new(Duration::hours(24));
        let created = at(2026, 3, 10, 9);
        store.save(state("t1", created));

        let later = created + Duration::hours(25);
        assert!(store.get("t1", later).is_none());
        assert!(store.update("t1", later, |s| s.priority = Priority::P1).is_none());
        // Still physically present until swept.
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_save_overwrites() {
        let store = StateStore::new(Duration::hours(24));
        let now = at(2026, 3, 10, 9);
        store.save(state("t1", now));
        let mut replaced = state("t1", now);
        replaced.priority = Priority::P2;
        store.save(replaced);

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("t1", now).unwrap().priority, Priority::P2);
    }

    #[test]
    fn test_update_mutates_in_place() {
        let store = StateStore::new(Duration::hours(24));
        let now = at(2026, 3, 10, 9);
        store.save(state("t1", now));

        let updated = store
            .update("t1", now, |s| {
                s.priority = Priority::P1;
                s.stage = Stage::AwaitingTimeLabel;
            })
            .unwrap();
        assert_eq!(updated.priority, Priority::P1);
        assert_eq!(store.get("t1", now).unwrap().stage, Stage::AwaitingTimeLabel);
        assert!(store.update("missing", now, |_| {}).is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_cycles_on_distinct_keys() {
        let store = Arc::new(StateStore::new(Duration::hours(24)));
        let now = at(2026, 3, 10, 9);

        let mut handles = Vec::new();
        for worker in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let id = format!("task-{worker}");
                for round in 0..200u32 {
                    let mut s = state(&id, now);
                    s.content = format!("{id} round {round}");
                    store.save(s);
                    let read = store.get(&id, now).unwrap();
                    assert_eq!(read.content, format!("{id} round {round}"));
                    if round % 3 == 0 {
                        store.delete(&id);
                        assert!(store.get(&id, now).is_none());
                    }
                    tokio::task::yield_now().await;
                }
                store.save(state(&id, now));
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        assert_eq!(store.len(), 16);
        for worker in 0..16 {
            let s = store.get(&format!("task-{worker}"), now).unwrap();
            assert_eq!(s.content, format!("Task task-{worker}"));
        }
    }
}
