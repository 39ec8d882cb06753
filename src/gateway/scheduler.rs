//! Cron-driven jobs: the periodic notification and, optionally, the
//! prioritization prompt.

use super::Gateway;
use chrono::DateTime;
use chrono_tz::Tz;
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy)]
pub(super) enum Job {
    Notify,
    Prioritize,
}

/// Next time `schedule` fires strictly after `now`, in `now`'s timezone.
pub fn next_fire(schedule: &cron::Schedule, now: &DateTime<Tz>) -> Option<DateTime<Tz>> {
    schedule.after(now).next()
}

impl Gateway {
    /// Sleep until each fire time and run `job` under the job timeout.
    pub(super) async fn scheduler_loop(self: Arc<Self>, job: Job, schedule: cron::Schedule) {
        loop {
            let now = self.tasks.clock().now();
            let Some(next) = next_fire(&schedule, &now) else {
                warn!(?job, "schedule has no upcoming runs, stopping");
                return;
            };
            info!(?job, next = %next, "next scheduled run");

            let wait = (next - now).to_std().unwrap_or_default();
            tokio::time::sleep(wait).await;

            let run = async {
                match job {
                    Job::Notify => self.notify_today().await,
                    Job::Prioritize => self.prioritize_scheduled().await,
                }
            };
            match tokio::time::timeout(self.job_timeout, run).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => error!(?job, error = %e, "scheduled job failed"),
                Err(_) => error!(
                    ?job,
                    "scheduled job timed out after {}s",
                    self.job_timeout.as_secs()
                ),
            }
        }
    }
}
