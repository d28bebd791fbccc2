//! Wire types for the remote to-do collection.
//!
//! The collaborator assigns `id` on create; it never changes afterwards.
//! Responses may carry extra fields (the default collaborator adds
//! `userId`) — those are ignored on deserialize.

use serde::{Deserialize, Serialize};

/// Server-assigned task identifier.
pub type TaskId = u64;

/// A task as the remote collaborator represents it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub completed: bool,
}

/// Body of a create request. The server echoes these fields back plus
/// a fresh `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewTask {
    pub title: String,
    pub completed: bool,
}

/// Body of a partial-update request. `None` fields are omitted from the
/// serialized JSON entirely, so the server only sees the changed keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl TaskPatch {
    /// Patch that flips only the `completed` flag.
    pub fn set_completed(completed: bool) -> Self {
        Self {
            title: None,
            completed: Some(completed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_serializes_only_present_fields() {
        let patch = TaskPatch::set_completed(true);
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({ "completed": true }));

        let empty = TaskPatch::default();
        assert_eq!(serde_json::to_value(&empty).unwrap(), serde_json::json!({}));
    }

    #[test]
    fn task_ignores_unknown_response_fields() {
        let task: Task = serde_json::from_str(
            r#"{"userId": 1, "id": 7, "title": "delectus aut autem", "completed": false}"#,
        )
        .unwrap();
        assert_eq!(task.id, 7);
        assert_eq!(task.title, "delectus aut autem");
        assert!(!task.completed);
    }
}
