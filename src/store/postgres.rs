//! Postgres-backed stores using sqlx.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::{task_not_found, user_not_found, CredentialStore, TaskStore};
use crate::config::Config;
use crate::error::AppError;
use crate::models::{NewTask, NewUser, Task, TaskPatch, TodoItem, User};

const USER_COLUMNS: &str =
    "id, username, email, password_hash, first_name, last_name, task_ids, created_at, updated_at";

const TASK_COLUMNS: &str =
    "id, title, description, body, todo_list, is_pinned, user_id, created_at, updated_at";

/// Opens the connection pool and applies pending migrations.
pub async fn connect(config: &Config) -> Result<PgPool, AppError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| AppError::Internal(format!("Migration failed: {}", e)))?;

    Ok(pool)
}

#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(user_not_found)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(user_not_found)
    }

    /// The unique constraints on `username` and `email` are the authority;
    /// a violation surfaces as `AppError::DuplicateKey`.
    async fn create(&self, user: NewUser) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (id, username, email, password_hash, first_name, last_name)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(user.username)
        .bind(user.email)
        .bind(user.password_hash)
        .bind(user.first_name)
        .bind(user.last_name)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    async fn add_task_ref(&self, user_id: Uuid, task_id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE users
             SET task_ids = CASE WHEN $2 = ANY(task_ids) THEN task_ids
                                 ELSE array_append(task_ids, $2) END,
                 updated_at = NOW()
             WHERE id = $1",
        )
        .bind(user_id)
        .bind(task_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(user_not_found());
        }
        Ok(())
    }

    async fn remove_task_ref(&self, user_id: Uuid, task_id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE users
             SET task_ids = array_remove(task_ids, $2),
                 updated_at = NOW()
             WHERE id = $1",
        )
        .bind(user_id)
        .bind(task_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(user_not_found());
        }
        Ok(())
    }
}

#[derive(FromRow)]
struct TaskRow {
    id: Uuid,
    title: String,
    description: String,
    body: String,
    todo_list: Json<Vec<TodoItem>>,
    is_pinned: bool,
    user_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TaskRow> for Task {
    fn from(row: TaskRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            body: row.body,
            todo_list: row.todo_list.0,
            is_pinned: row.is_pinned,
            owner_id: row.user_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Clone)]
pub struct PgTaskStore {
    pool: PgPool,
}

impl PgTaskStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskStore for PgTaskStore {
    async fn create(&self, fields: NewTask, owner_id: Uuid) -> Result<Task, AppError> {
        let task = Task::new(fields, owner_id);

        let row = sqlx::query_as::<_, TaskRow>(&format!(
            "INSERT INTO tasks (id, title, description, body, todo_list, is_pinned, user_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {}",
            TASK_COLUMNS
        ))
        .bind(task.id)
        .bind(task.title)
        .bind(task.description)
        .bind(task.body)
        .bind(Json(task.todo_list))
        .bind(task.is_pinned)
        .bind(task.owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Task, AppError> {
        sqlx::query_as::<_, TaskRow>(&format!("SELECT {} FROM tasks WHERE id = $1", TASK_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Task::from)
            .ok_or_else(task_not_found)
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Task>, AppError> {
        let rows = sqlx::query_as::<_, TaskRow>(&format!(
            "SELECT {} FROM tasks WHERE user_id = $1
             ORDER BY is_pinned DESC, created_at ASC, id ASC",
            TASK_COLUMNS
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Task::from).collect())
    }

    /// A single statement merges the patch; absent fields bind as NULL and
    /// `COALESCE` keeps the stored value.
    async fn update(&self, id: Uuid, patch: &TaskPatch) -> Result<Task, AppError> {
        sqlx::query_as::<_, TaskRow>(&format!(
            "UPDATE tasks
             SET title = COALESCE($2, title),
                 description = COALESCE($3, description),
                 body = COALESCE($4, body),
                 todo_list = COALESCE($5, todo_list),
                 is_pinned = COALESCE($6, is_pinned),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            TASK_COLUMNS
        ))
        .bind(id)
        .bind(patch.title().map(str::to_owned))
        .bind(patch.description().map(str::to_owned))
        .bind(patch.body().map(str::to_owned))
        .bind(patch.todo_list.clone().map(Json))
        .bind(patch.is_pinned)
        .fetch_optional(&self.pool)
        .await?
        .map(Task::from)
        .ok_or_else(task_not_found)
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(task_not_found());
        }
        Ok(())
    }
}
