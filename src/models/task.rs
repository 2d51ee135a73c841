use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use validator::Validate;

/// One entry of a task's to-do list.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TodoItem {
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

/// Represents a task entity as stored and returned by the API.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier for the task (UUID v4).
    pub id: Uuid,
    pub title: String,
    pub description: String,
    /// Free-form body text.
    pub body: String,
    /// Ordered sub-items.
    pub todo_list: Vec<TodoItem>,
    /// Pinned tasks are listed before unpinned ones.
    pub is_pinned: bool,
    /// Identifier of the owning user. Set at creation and never reassigned.
    #[serde(rename = "user")]
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for `POST /api/tasks`.
#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    /// Must be between 1 and 200 characters.
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 1000))]
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub body: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub todo_list: Vec<TodoItem>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_pinned: bool,
}

/// An explicit `null` reads the same as an omitted field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Payload for `PUT /api/tasks/{id}`.
///
/// Every field is optional. Text fields treat an empty string the same as an
/// absent field. `is_pinned` is applied whenever it is present, so an explicit
/// `false` unpins the task while an omitted flag leaves it alone.
#[derive(Debug, Serialize, Deserialize, Validate, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[validate(length(max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    pub body: Option<String>,
    pub todo_list: Option<Vec<TodoItem>>,
    pub is_pinned: Option<bool>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl TaskPatch {
    pub fn title(&self) -> Option<&str> {
        non_empty(&self.title)
    }

    pub fn description(&self) -> Option<&str> {
        non_empty(&self.description)
    }

    pub fn body(&self) -> Option<&str> {
        non_empty(&self.body)
    }

    /// Merges the provided fields into `task` and bumps `updated_at`.
    pub fn apply(&self, task: &mut Task, now: DateTime<Utc>) {
        if let Some(title) = self.title() {
            task.title = title.to_string();
        }
        if let Some(description) = self.description() {
            task.description = description.to_string();
        }
        if let Some(body) = self.body() {
            task.body = body.to_string();
        }
        if let Some(todo_list) = &self.todo_list {
            task.todo_list = todo_list.clone();
        }
        if let Some(is_pinned) = self.is_pinned {
            task.is_pinned = is_pinned;
        }
        task.updated_at = now;
    }
}

impl Task {
    /// Creates a new `Task` owned by `owner_id` with a fresh id and timestamps.
    pub fn new(input: NewTask, owner_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: input.title,
            description: input.description,
            body: input.body,
            todo_list: input.todo_list,
            is_pinned: input.is_pinned,
            owner_id,
            created_at: now,
            updated_at: now,
        }
    }
}
