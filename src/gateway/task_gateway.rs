use reqwest::{Response, StatusCode};
use validator::Validate;

use crate::error::{ClientError, Result};
use crate::task::task_dto::{CreateTaskRequest, DeleteCompletedResponse, UpdateDescriptionRequest};
use crate::task::task_models::{DayOfWeek, Task, TaskStatistics};

/// Typed boundary to the backend's `/tasks` resource collection.
///
/// Each operation performs exactly one network round trip; there are no
/// retries and no caching here. Non-success responses are translated
/// uniformly into [`ClientError::Api`].
#[derive(Clone)]
pub struct TaskGateway {
    http: reqwest::Client,
    base_url: String,
}

impl TaskGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn list_all(&self) -> Result<Vec<Task>> {
        tracing::debug!("GET /tasks");
        let response = self.http.get(self.url("/tasks")).send().await?;
        Ok(into_success("list tasks", response).await?.json().await?)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Task> {
        tracing::debug!("GET /tasks/{}", id);
        let response = self.http.get(self.url(&format!("/tasks/{id}"))).send().await?;
        Ok(into_success("get task", response).await?.json().await?)
    }

    pub async fn list_completed(&self) -> Result<Vec<Task>> {
        tracing::debug!("GET /tasks/completed");
        let response = self.http.get(self.url("/tasks/completed")).send().await?;
        Ok(into_success("list completed tasks", response)
            .await?
            .json()
            .await?)
    }

    pub async fn list_incomplete(&self) -> Result<Vec<Task>> {
        tracing::debug!("GET /tasks/incomplete");
        let response = self.http.get(self.url("/tasks/incomplete")).send().await?;
        Ok(into_success("list incomplete tasks", response)
            .await?
            .json()
            .await?)
    }

    pub async fn list_by_day(&self, day: DayOfWeek) -> Result<Vec<Task>> {
        tracing::debug!("GET /tasks/day/{}", day);
        let response = self
            .http
            .get(self.url(&format!("/tasks/day/{day}")))
            .send()
            .await?;
        Ok(into_success("list tasks by day", response)
            .await?
            .json()
            .await?)
    }

    /// Create a task. The payload is validated before anything is sent, so
    /// an invalid description never reaches the wire.
    pub async fn create(&self, payload: &CreateTaskRequest) -> Result<Task> {
        payload.validate()?;
        tracing::debug!("POST /tasks description={:?}", payload.description);
        let response = self
            .http
            .post(self.url("/tasks"))
            .json(payload)
            .send()
            .await?;
        Ok(into_success("create task", response).await?.json().await?)
    }

    pub async fn update_description(
        &self,
        id: i64,
        payload: &UpdateDescriptionRequest,
    ) -> Result<Task> {
        payload.validate()?;
        tracing::debug!("PATCH /tasks/{}/description", id);
        let response = self
            .http
            .patch(self.url(&format!("/tasks/{id}/description")))
            .json(payload)
            .send()
            .await?;
        Ok(into_success("update description", response)
            .await?
            .json()
            .await?)
    }

    /// Mark a task completed. The backend treats a repeat call on an
    /// already-completed task as a no-op, so this is idempotent.
    pub async fn complete(&self, id: i64) -> Result<()> {
        tracing::debug!("PATCH /tasks/{}/complete", id);
        let response = self
            .http
            .patch(self.url(&format!("/tasks/{id}/complete")))
            .send()
            .await?;
        into_success("complete task", response).await?;
        Ok(())
    }

    /// Clear a task's completed state. Idempotent, same as [`Self::complete`].
    pub async fn uncomplete(&self, id: i64) -> Result<()> {
        tracing::debug!("PATCH /tasks/{}/uncomplete", id);
        let response = self
            .http
            .patch(self.url(&format!("/tasks/{id}/uncomplete")))
            .send()
            .await?;
        into_success("uncomplete task", response).await?;
        Ok(())
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        tracing::debug!("DELETE /tasks/{}", id);
        let response = self
            .http
            .delete(self.url(&format!("/tasks/{id}")))
            .send()
            .await?;
        into_success("delete task", response).await?;
        Ok(())
    }

    pub async fn delete_completed(&self) -> Result<DeleteCompletedResponse> {
        tracing::debug!("DELETE /tasks/completed");
        let response = self.http.delete(self.url("/tasks/completed")).send().await?;
        Ok(into_success("delete completed tasks", response)
            .await?
            .json()
            .await?)
    }

    pub async fn get_statistics(&self) -> Result<TaskStatistics> {
        tracing::debug!("GET /tasks/statistics");
        let response = self.http.get(self.url("/tasks/statistics")).send().await?;
        Ok(into_success("load statistics", response)
            .await?
            .json()
            .await?)
    }
}

/// Pass a successful response through, or translate it into an API failure
/// with whatever message the backend's error body carries.
async fn into_success(operation: &'static str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = error_message(status, response).await;
    tracing::debug!("{} failed: {} {}", operation, status, message);
    Err(ClientError::Api {
        operation,
        status,
        message,
    })
}

/// The backend reports failures as JSON with a `message` or `error` field;
/// fall back to the canonical status reason for anything else.
async fn error_message(status: StatusCode, response: Response) -> String {
    if let Ok(body) = response.json::<serde_json::Value>().await {
        for key in ["message", "error"] {
            if let Some(message) = body.get(key).and_then(|v| v.as_str()) {
                if !message.is_empty() {
                    return message.to_owned();
                }
            }
        }
    }
    status.canonical_reason().unwrap_or("unknown error").to_owned()
}
