//! Persistence seams for users and tasks.
//!
//! Handlers only see the `CredentialStore` and `TaskStore` traits. Two
//! realizations exist: `postgres` for deployments and `memory` for tests and
//! local runs. Both enforce username/email uniqueness at write time rather than
//! relying on a prior lookup.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{NewTask, NewUser, Task, TaskPatch, User};

pub use memory::{InMemoryTaskStore, InMemoryUserStore};
pub use postgres::{PgTaskStore, PgUserStore};

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Fails with `AppError::NotFound` when no user has this email.
    async fn find_by_email(&self, email: &str) -> Result<User, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<User, AppError>;

    /// Fails with `AppError::DuplicateKey` if the username or email is taken.
    async fn create(&self, user: NewUser) -> Result<User, AppError>;

    /// Adds `task_id` to the user's task set. Adding twice is a no-op.
    async fn add_task_ref(&self, user_id: Uuid, task_id: Uuid) -> Result<(), AppError>;

    /// Removes `task_id` from the user's task set. Removing an absent id is a no-op.
    async fn remove_task_ref(&self, user_id: Uuid, task_id: Uuid) -> Result<(), AppError>;
}

#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn create(&self, fields: NewTask, owner_id: Uuid) -> Result<Task, AppError>;

    /// Fails with `AppError::NotFound` when the task does not exist.
    async fn find_by_id(&self, id: Uuid) -> Result<Task, AppError>;

    /// All tasks of `owner_id`, pinned first. The order is stable between calls.
    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Task>, AppError>;

    /// Merges the fields present in `patch`; the owner never changes.
    async fn update(&self, id: Uuid, patch: &TaskPatch) -> Result<Task, AppError>;

    /// Removes the task. The caller drops the owner's back-reference.
    async fn delete(&self, id: Uuid) -> Result<(), AppError>;
}

pub(crate) fn task_not_found() -> AppError {
    AppError::NotFound("Task not found".into())
}

pub(crate) fn user_not_found() -> AppError {
    AppError::NotFound("User not found".into())
}
