//! Gateway — the main event loop connecting the chat channel, the task
//! service, and the prioritization dialogs.
//!
//! Includes: auth enforcement, per-handler timeouts, panic isolation,
//! scheduled jobs, and graceful shutdown.

mod auth;
mod notify;
mod routing;
mod scheduler;


pub use scheduler::next_fire;

use crate::prioritize::Prioritizer;
use crate::tasks::TaskService;
use chrono_tz::Tz;
use std::sync::Arc;
use std::time::Duration;
use tasknudge_core::{
    config::{parse_schedule, AuthConfig, Config, SchedulerConfig},
    error::NudgeError,
    message::{IncomingEvent, OutgoingMessage},
    traits::Channel,
};
use tokio::task::JoinHandle;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

pub(crate) const DEFAULT_ERROR: &str = "Something went wrong. Please try again later.";

/// Routes channel events to commands and dialogs, and runs scheduled jobs.
pub struct Gateway {
    pub(super) channel: Arc<dyn Channel>,
    pub(super) tasks: Arc<TaskService>,
    pub(super) prioritizer: Prioritizer,
    pub(super) auth_config: AuthConfig,
    pub(super) scheduler_config: SchedulerConfig,
    /// The only chat served.
    pub(super) chat_id: i64,
    pub(super) timezone: Tz,
    pub(super) handler_timeout: Duration,
    pub(super) job_timeout: Duration,
}

impl Gateway {
    pub fn new(
        channel: Arc<dyn Channel>,
        tasks: Arc<TaskService>,
        config: &Config,
    ) -> Result<Self, NudgeError> {
        let prioritizer = Prioritizer::new(tasks.clone(), config.state_timeout());
        Ok(Self {
            channel,
            tasks,
            prioritizer,
            auth_config: config.auth.clone(),
            scheduler_config: config.scheduler.clone(),
            chat_id: config.channel.telegram.chat_id,
            timezone: config.timezone()?,
            handler_timeout: config.handler_timeout(),
            job_timeout: config.job_timeout(),
        })
    }

    /// Run the main event loop until Ctrl-C.
    pub async fn run(self: Arc<Self>) -> anyhow::Result<()> {
        info!(
            "tasknudge gateway running | channel: {} | chat: {} | timezone: {}",
            self.channel.name(),
            self.chat_id,
            self.timezone,
        );

        let mut rx = self
            .channel
            .start()
            .await
            .map_err(|e| anyhow::anyhow!("failed to start channel {}: {e}", self.channel.name()))?;

        let mut background: Vec<JoinHandle<()>> = Vec::new();
        if self.scheduler_config.enabled {
            let schedule = parse_schedule(&self.scheduler_config.schedule)?;
            background.push(tokio::spawn(
                self.clone().scheduler_loop(scheduler::Job::Notify, schedule),
            ));

            if !self.scheduler_config.prioritize_schedule.trim().is_empty() {
                let schedule = parse_schedule(&self.scheduler_config.prioritize_schedule)?;
                background.push(tokio::spawn(
                    self.clone().scheduler_loop(scheduler::Job::Prioritize, schedule),
                ));
            }
        } else {
            info!("scheduler disabled");
        }

        loop {
            tokio::select! {
                event = rx.recv() => {
                    let Some(event) = event else {
                        warn!("channel closed, stopping gateway");
                        break;
                    };
                    let gw = self.clone();
                    tokio::spawn(async move {
                        gw.dispatch(event).await;
                    });
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Received shutdown signal");
                    break;
                }
            }
        }

        self.shutdown(&background).await;
        Ok(())
    }

    /// Handle one event in its own task so a panic stays contained.
    pub(super) async fn dispatch(self: Arc<Self>, event: IncomingEvent) {
        let chat_id = event.chat_id();
        let span = info_span!("event", id = %Uuid::new_v4(), chat_id);
        let gw = self.clone();
        let outcome = tokio::spawn(async move { gw.handle_event(event).await }.instrument(span)).await;
        if let Err(e) = outcome {
            if e.is_panic() {
                error!(chat_id, "handler panicked: {e}");
            } else {
                warn!(chat_id, "handler cancelled: {e}");
            }
        }
    }

    /// Auth check, then the handler under its time budget. Failures are
    /// logged and answered with a generic message.
    pub(super) async fn handle_event(&self, event: IncomingEvent) {
        if !self.check_auth(&event) {
            self.deny(&event).await;
            return;
        }

        let chat_id = event.chat_id();
        let (kind, result) = match event {
            IncomingEvent::Message(msg) => (
                "message",
                tokio::time::timeout(self.handler_timeout, self.handle_message(msg)).await,
            ),
            IncomingEvent::Callback(cb) => (
                "callback",
                tokio::time::timeout(self.handler_timeout, self.handle_callback(cb)).await,
            ),
        };

        let err = match result {
            Ok(Ok(())) => return,
            Ok(Err(e)) => e.to_string(),
            Err(_) => format!("timed out after {}s", self.handler_timeout.as_secs()),
        };
        error!(chat_id, kind, error = %err, "error occurred");
        self.send_text(chat_id, DEFAULT_ERROR).await;
    }

    /// Send a plain text message, logging failures.
    pub(super) async fn send_text(&self, chat_id: i64, text: &str) {
        if let Err(e) = self.channel.send(OutgoingMessage::text(chat_id, text)).await {
            error!(chat_id, "failed to send message: {e}");
        }
    }

    async fn shutdown(&self, background: &[JoinHandle<()>]) {
        info!("Shutting down...");
        for handle in background {
            handle.abort();
        }
        if let Err(e) = self.channel.stop().await {
            warn!("failed to stop channel {}: {e}", self.channel.name());
        }
        info!(
            pending_dialogs = self.prioritizer.states().len(),
            "Shutdown complete."
        );
    }
}
