//! In-memory doubles for the task source and the chat channel.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone};
use chrono_tz::Tz;
use std::sync::Mutex;
use tasknudge_core::{
    error::NudgeError,
    message::{IncomingEvent, InlineKeyboard, MessageRef, OutgoingMessage},
    task::{Priority, Project, Task, TaskDue, TaskUpdate},
    traits::{Channel, TaskSource},
};
use tokio::sync::mpsc;

pub const TZ: Tz = chrono_tz::Europe::Kyiv;

/// Local time in the test timezone, on the hour.
pub fn at(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Tz> {
    TZ.with_ymd_and_hms(year, month, day, hour, 0, 0).unwrap()
}

pub fn task_due(id: &str, date: &str, priority: Priority, labels: &[&str]) -> Task {
    Task {
        id: id.to_string(),
        project_id: "p0".to_string(),
        content: format!("Task {id}"),
        priority,
        due: Some(TaskDue {
            date: date.to_string(),
        }),
        labels: labels.iter().map(|l| l.to_string()).collect(),
    }
}

#[derive(Default)]
struct SourceState {
    tasks: Vec<Task>,
    projects: Vec<Project>,
    fail_fetches: bool,
    fail_projects: bool,
    fail_updates: bool,
    project_fetches: usize,
    updates: Vec<(String, TaskUpdate)>,
}

/// Task source backed by a vector. Updates are applied and recorded.
#[derive(Default)]
pub struct FakeTaskSource {
    state: Mutex<SourceState>,
}

impl FakeTaskSource {
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        let source = Self::default();
        source.state.lock().unwrap().tasks = tasks;
        source
    }

    pub fn set_projects(&self, projects: Vec<Project>) {
        self.state.lock().unwrap().projects = projects;
    }

    pub fn fail_fetches(&self, fail: bool) {
        self.state.lock().unwrap().fail_fetches = fail;
    }

    pub fn fail_projects(&self, fail: bool) {
        self.state.lock().unwrap().fail_projects = fail;
    }

    pub fn fail_updates(&self, fail: bool) {
        self.state.lock().unwrap().fail_updates = fail;
    }

    pub fn project_fetches(&self) -> usize {
        self.state.lock().unwrap().project_fetches
    }

    pub fn updates(&self) -> Vec<(String, TaskUpdate)> {
        self.state.lock().unwrap().updates.clone()
    }
}

#[async_trait]
impl TaskSource for FakeTaskSource {
    async fn fetch_tasks(&self, _include_completed: bool) -> Result<Vec<Task>, NudgeError> {
        let state = self.state.lock().unwrap();
        if state.fail_fetches {
            return Err(NudgeError::TaskSource("unexpected status code: 500".into()));
        }
        Ok(state.tasks.clone())
    }

    async fn fetch_projects(&self) -> Result<Vec<Project>, NudgeError> {
        let mut state = self.state.lock().unwrap();
        state.project_fetches += 1;
        if state.fail_projects {
            return Err(NudgeError::TaskSource("unexpected status code: 503".into()));
        }
        Ok(state.projects.clone())
    }

    async fn update_task(&self, task_id: &str, update: &TaskUpdate) -> Result<Task, NudgeError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_updates {
            return Err(NudgeError::TaskSource("unexpected status code: 500".into()));
        }
        state.updates.push((task_id.to_string(), update.clone()));
        let task = state
            .tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or_else(|| NudgeError::TaskSource(format!("task {task_id} not found")))?;
        task.priority = update.priority;
        task.labels = update.labels.clone();
        Ok(task.clone())
    }
}

#[derive(Default)]
struct ChannelState {
    sent: Vec<OutgoingMessage>,
    edits: Vec<(MessageRef, String, Option<InlineKeyboard>)>,
    answers: Vec<(String, Option<String>)>,
    next_message_id: i64,
    fail_sends_containing: Option<String>,
    inbox: Option<mpsc::Sender<IncomingEvent>>,
}

/// Channel that records everything it is asked to do.
#[derive(Default)]
pub struct FakeChannel {
    state: Mutex<ChannelState>,
}

impl FakeChannel {
    pub fn sent(&self) -> Vec<OutgoingMessage> {
        self.state.lock().unwrap().sent.clone()
    }

    pub fn sent_texts(&self) -> Vec<String> {
        self.sent().into_iter().map(|m| m.text).collect()
    }

    pub fn edits(&self) -> Vec<(MessageRef, String, Option<InlineKeyboard>)> {
        self.state.lock().unwrap().edits.clone()
    }

    pub fn answers(&self) -> Vec<(String, Option<String>)> {
        self.state.lock().unwrap().answers.clone()
    }

    /// Make `send` fail for messages whose text contains `needle`.
    pub fn fail_sends_containing(&self, needle: &str) {
        self.state.lock().unwrap().fail_sends_containing = Some(needle.to_string());
    }

    /// Deliver an event to whoever called `start`, waiting for it if needed.
    pub async fn inject(&self, event: IncomingEvent) {
        loop {
            let tx = self.state.lock().unwrap().inbox.clone();
            if let Some(tx) = tx {
                tx.send(event).await.unwrap();
                return;
            }
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait]
impl Channel for FakeChannel {
    fn name(&self) -> &str {
        "fake"
    }

    async fn start(&self) -> Result<mpsc::Receiver<IncomingEvent>, NudgeError> {
        let (tx, rx) = mpsc::channel(16);
        self.state.lock().unwrap().inbox = Some(tx);
        Ok(rx)
    }

    async fn send(&self, message: OutgoingMessage) -> Result<MessageRef, NudgeError> {
        let mut state = self.state.lock().unwrap();
        if let Some(needle) = &state.fail_sends_containing {
            if message.text.contains(needle.as_str()) {
                return Err(NudgeError::Channel("telegram sendMessage failed".into()));
            }
        }
        state.next_message_id += 1;
        let sent = MessageRef {
            chat_id: message.chat_id,
            message_id: state.next_message_id,
        };
        state.sent.push(message);
        Ok(sent)
    }

    async fn edit(
        &self,
        target: &MessageRef,
        text: &str,
        keyboard: Option<&InlineKeyboard>,
    ) -> Result<(), NudgeError> {
        self.state
            .lock()
            .unwrap()
            .edits
            .push((*target, text.to_string(), keyboard.cloned()));
        Ok(())
    }

    async fn answer_callback(
        &self,
        callback_id: &str,
        alert: Option<&str>,
    ) -> Result<(), NudgeError> {
        self.state
            .lock()
            .unwrap()
            .answers
            .push((callback_id.to_string(), alert.map(str::to_string)));
        Ok(())
    }

    async fn stop(&self) -> Result<(), NudgeError> {
        self.state.lock().unwrap().inbox = None;
        Ok(())
    }
}
