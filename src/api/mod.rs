//! Thin client for the remote REST-style to-do API.
//!
//! One HTTP call per operation against the `/todos` collection:
//!
//! | Operation | Method | Path          |
//! |-----------|--------|---------------|
//! | list      | GET    | `/todos`      |
//! | get       | GET    | `/todos/{id}` |
//! | create    | POST   | `/todos`      |
//! | update    | PATCH  | `/todos/{id}` |
//! | delete    | DELETE | `/todos/{id}` |
//!
//! No retries, no explicit timeouts, no cancellation. Any transport
//! failure or non-2xx status collapses into a single opaque [`ApiError`]
//! naming the attempted operation; the underlying cause goes to the debug
//! log only.

pub mod types;

use tracing::debug;

pub use types::{NewTask, Task, TaskId, TaskPatch};

/// The one error kind the client produces: "failed to <operation>".
///
/// Carries no status code or payload detail. The collaborator's error
/// bodies are not part of its contract, so nothing downstream may depend
/// on them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to {op}")]
pub struct ApiError {
    op: &'static str,
}

impl ApiError {
    fn new(op: &'static str) -> Self {
        Self { op }
    }

    /// Record the underlying cause in the debug log, then collapse it.
    fn because(op: &'static str, cause: &dyn std::fmt::Display) -> Self {
        debug!(cause = %cause, "{op} failed");
        Self::new(op)
    }

    /// The operation that failed, e.g. `"fetch tasks"`.
    pub fn operation(&self) -> &str {
        self.op
    }
}

/// Client for the remote to-do collection.
///
/// Cheap to clone — the underlying `reqwest::Client` is a shared handle.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Read the whole collection.
    pub async fn list_tasks(&self) -> Result<Vec<Task>, ApiError> {
        const OP: &str = "fetch tasks";
        let resp = self
            .http
            .get(self.url("/todos"))
            .send()
            .await
            .map_err(|e| ApiError::because(OP, &e))?;
        if !resp.status().is_success() {
            return Err(ApiError::because(OP, &resp.status()));
        }
        resp.json().await.map_err(|e| ApiError::because(OP, &e))
    }

    /// Read a single task.
    pub async fn get_task(&self, id: TaskId) -> Result<Task, ApiError> {
        const OP: &str = "fetch task";
        let resp = self
            .http
            .get(self.url(&format!("/todos/{id}")))
            .send()
            .await
            .map_err(|e| ApiError::because(OP, &e))?;
        if !resp.status().is_success() {
            return Err(ApiError::because(OP, &resp.status()));
        }
        resp.json().await.map_err(|e| ApiError::because(OP, &e))
    }

    /// Create a task. The server's representation (submitted fields plus a
    /// fresh id) is returned as-is, trusted without validation.
    pub async fn create_task(&self, task: &NewTask) -> Result<Task, ApiError> {
        const OP: &str = "create task";
        let resp = self
            .http
            .post(self.url("/todos"))
            .json(task)
            .send()
            .await
            .map_err(|e| ApiError::because(OP, &e))?;
        if !resp.status().is_success() {
            return Err(ApiError::because(OP, &resp.status()));
        }
        resp.json().await.map_err(|e| ApiError::because(OP, &e))
    }

    /// Partially update a task; only the patch's present fields are sent.
    pub async fn update_task(&self, id: TaskId, patch: &TaskPatch) -> Result<Task, ApiError> {
        const OP: &str = "update task";
        let resp = self
            .http
            .patch(self.url(&format!("/todos/{id}")))
            .json(patch)
            .send()
            .await
            .map_err(|e| ApiError::because(OP, &e))?;
        if !resp.status().is_success() {
            return Err(ApiError::because(OP, &resp.status()));
        }
        resp.json().await.map_err(|e| ApiError::because(OP, &e))
    }

    /// Delete a task.
    ///
    /// The response body is discarded: the collaborator does not reliably
    /// echo the deleted id, so reconciliation is keyed by the id the caller
    /// submitted.
    pub async fn delete_task(&self, id: TaskId) -> Result<(), ApiError> {
        const OP: &str = "delete task";
        let resp = self
            .http
            .delete(self.url(&format!("/todos/{id}")))
            .send()
            .await
            .map_err(|e| ApiError::because(OP, &e))?;
        if !resp.status().is_success() {
            return Err(ApiError::because(OP, &resp.status()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_names_only_the_operation() {
        let err = ApiError::new("update task");
        assert_eq!(err.to_string(), "failed to update task");
        assert_eq!(err.operation(), "update task");
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let client = ApiClient::new("http://localhost:9/");
        assert_eq!(client.url("/todos"), "http://localhost:9/todos");
    }
}
