//! Task service: the task source plus filtering, bound to the clock.

use std::sync::Arc;
use std::time::Duration;
use tasknudge_core::{
    cache::TtlCache,
    clock::Clock,
    error::NudgeError,
    filter::{filter_today, filter_tomorrow, filter_unprioritized},
    task::{Priority, Project, Task, TaskUpdate},
    traits::TaskSource,
};
use tracing::debug;

/// Answers "which tasks matter now" for commands and scheduled jobs.
pub struct TaskService {
    source: Arc<dyn TaskSource>,
    clock: Arc<dyn Clock>,
    projects: TtlCache<Vec<Project>>,
}

impl TaskService {
    pub fn new(source: Arc<dyn TaskSource>, clock: Arc<dyn Clock>, project_ttl: Duration) -> Self {
        Self {
            source,
            clock,
            projects: TtlCache::new(project_ttl),
        }
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Uncompleted tasks due today, optionally gated by time of day.
    pub async fn today_tasks(&self, filter_by_time: bool) -> Result<Vec<Task>, NudgeError> {
        let all = self.source.fetch_tasks(false).await?;
        let now = self.clock.now();
        let tasks = filter_today(&all, &now, filter_by_time);
        debug!(total = all.len(), count = tasks.len(), filter_by_time, "filtered today's tasks");
        Ok(tasks)
    }

    /// Uncompleted tasks due tomorrow.
    pub async fn tomorrow_tasks(&self) -> Result<Vec<Task>, NudgeError> {
        let all = self.source.fetch_tasks(false).await?;
        Ok(filter_tomorrow(&all, &self.clock.now()))
    }

    /// Tomorrow's tasks still at the default priority without a time marker.
    pub async fn tomorrow_unprioritized(&self) -> Result<Vec<Task>, NudgeError> {
        let tomorrow = self.tomorrow_tasks().await?;
        Ok(filter_unprioritized(&tomorrow))
    }

    /// All projects, served from cache while fresh.
    pub async fn projects(&self) -> Result<Vec<Project>, NudgeError> {
        self.projects
            .get_or_fetch(|| self.source.fetch_projects())
            .await
    }

    pub async fn update_task(
        &self,
        task_id: &str,
        priority: Priority,
        labels: Vec<String>,
    ) -> Result<Task, NudgeError> {
        self.source
            .update_task(task_id, &TaskUpdate { priority, labels })
            .await
    }
}
