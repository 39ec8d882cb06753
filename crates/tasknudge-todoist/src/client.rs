use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tasknudge_core::{
    config::TodoistConfig,
    error::NudgeError,
    task::{Project, Task, TaskUpdate},
    traits::TaskSource,
};
use tracing::{debug, warn};

/// Todoist API client with a bounded retry loop on transport errors.
pub struct TodoistClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
    retries: u32,
    retry_delay: Duration,
}

impl TodoistClient {
    /// Create a client from config.
    pub fn new(config: &TodoistConfig) -> Result<Self, NudgeError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| NudgeError::TaskSource(format!("failed to build http client: {e}")))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.api_token.clone(),
            retries: config.retries.max(1),
            retry_delay: config.retry_delay(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{path}", self.base_url))
            .bearer_auth(&self.token)
    }

    /// Send, retrying only when the request never got a response.
    async fn send_with_retry(&self, req: RequestBuilder) -> Result<Response, NudgeError> {
        let mut last_err = None;

        for attempt in 1..=self.retries {
            let Some(attempt_req) = req.try_clone() else {
                break;
            };
            match attempt_req.send().await {
                Ok(resp) => return Ok(resp),
                Err(e) => {
                    warn!("todoist request failed (attempt {attempt}/{}): {e}", self.retries);
                    last_err = Some(e);
                    if attempt < self.retries {
                        tokio::time::sleep(self.retry_delay).await;
                    }
                }
            }
        }

        Err(NudgeError::TaskSource(match last_err {
            Some(e) => format!("request failed after {} attempts: {e}", self.retries),
            None => "request body cannot be retried".to_string(),
        }))
    }

    async fn fetch_json<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, NudgeError> {
        let resp = self.send_with_retry(req).await?;
        let status = resp.status();
        if status != StatusCode::OK {
            let body = resp.text().await.unwrap_or_default();
            let preview: String = body.chars().take(1024).collect();
            warn!("todoist returned unexpected status {status}");
            debug!("todoist response payload: {preview}");
            return Err(NudgeError::TaskSource(format!(
                "unexpected status code: {}",
                status.as_u16()
            )));
        }

        resp.json::<T>()
            .await
            .map_err(|e| NudgeError::TaskSource(format!("decode response: {e}")))
    }
}

#[async_trait]
impl TaskSource for TodoistClient {
    async fn fetch_tasks(&self, include_completed: bool) -> Result<Vec<Task>, NudgeError> {
        debug!("fetching tasks (is_completed={include_completed})");
        let req = self
            .request(Method::GET, "/v2/tasks")
            .query(&[("is_completed", include_completed.to_string())]);
        self.fetch_json(req).await
    }

    async fn fetch_projects(&self) -> Result<Vec<Project>, NudgeError> {
        debug!("fetching projects");
        self.fetch_json(self.request(Method::GET, "/v2/projects"))
            .await
    }

    async fn update_task(&self, task_id: &str, update: &TaskUpdate) -> Result<Task, NudgeError> {
        debug!(
            task_id,
            priority = update.priority.value(),
            labels = ?update.labels,
            "updating task"
        );
        let req = self
            .request(Method::POST, &format!("/v2/tasks/{task_id}"))
            .json(update);
        self.fetch_json(req).await
    }
}
