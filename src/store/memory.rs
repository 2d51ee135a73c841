//! In-process stores backed by `tokio::sync::RwLock`.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{task_not_found, user_not_found, CredentialStore, TaskStore};
use crate::error::AppError;
use crate::models::{NewTask, NewUser, Task, TaskPatch, User};

#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<Vec<User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for InMemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<User, AppError> {
        let users = self.users.read().await;
        users
            .iter()
            .find(|u| u.email == email)
            .cloned()
            .ok_or_else(user_not_found)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<User, AppError> {
        let users = self.users.read().await;
        users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or_else(user_not_found)
    }

    async fn create(&self, user: NewUser) -> Result<User, AppError> {
        let mut users = self.users.write().await;
        if users
            .iter()
            .any(|u| u.email == user.email || u.username == user.username)
        {
            return Err(AppError::DuplicateKey);
        }
        let user = User::new(user);
        users.push(user.clone());
        Ok(user)
    }

    async fn add_task_ref(&self, user_id: Uuid, task_id: Uuid) -> Result<(), AppError> {
        let mut users = self.users.write().await;
        let user = users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or_else(user_not_found)?;
        if !user.task_ids.contains(&task_id) {
            user.task_ids.push(task_id);
            user.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn remove_task_ref(&self, user_id: Uuid, task_id: Uuid) -> Result<(), AppError> {
        let mut users = self.users.write().await;
        let user = users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or_else(user_not_found)?;
        if user.task_ids.contains(&task_id) {
            user.task_ids.retain(|id| *id != task_id);
            user.updated_at = Utc::now();
        }
        Ok(())
    }
}

/// Tasks are kept in insertion order, which is the tie-break for listing.
#[derive(Default)]
pub struct InMemoryTaskStore {
    tasks: RwLock<Vec<Task>>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn create(&self, fields: NewTask, owner_id: Uuid) -> Result<Task, AppError> {
        let task = Task::new(fields, owner_id);
        self.tasks.write().await.push(task.clone());
        Ok(task)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Task, AppError> {
        let tasks = self.tasks.read().await;
        tasks
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(task_not_found)
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Task>, AppError> {
        let tasks = self.tasks.read().await;
        let mut owned: Vec<Task> = tasks
            .iter()
            .filter(|t| t.owner_id == owner_id)
            .cloned()
            .collect();
        // sort_by_key is stable, so insertion order survives within each group
        owned.sort_by_key(|t| !t.is_pinned);
        Ok(owned)
    }

    async fn update(&self, id: Uuid, patch: &TaskPatch) -> Result<Task, AppError> {
        let mut tasks = self.tasks.write().await;
        let task = tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(task_not_found)?;
        patch.apply(task, Utc::now());
        Ok(task.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let mut tasks = self.tasks.write().await;
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        if tasks.len() == before {
            return Err(task_not_found());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            first_name: "First".to_string(),
            last_name: "Last".to_string(),
        }
    }

    fn new_task(title: &str, is_pinned: bool) -> NewTask {
        NewTask {
            title: title.to_string(),
            description: "desc".to_string(),
            body: String::new(),
            todo_list: Vec::new(),
            is_pinned,
        }
    }

    #[actix_rt::test]
    async fn test_create_and_find_user() {
        let store = InMemoryUserStore::new();
        let created = store.create(new_user("alice", "alice@example.com")).await.unwrap();

        let by_email = store.find_by_email("alice@example.com").await.unwrap();
        assert_eq!(by_email.id, created.id);
        let by_id = store.find_by_id(created.id).await.unwrap();
        assert_eq!(by_id.username, "alice");

        assert!(matches!(
            store.find_by_email("nobody@example.com").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[actix_rt::test]
    async fn test_duplicate_email_or_username_rejected() {
        let store = InMemoryUserStore::new();
        store.create(new_user("alice", "alice@example.com")).await.unwrap();

        assert!(matches!(
            store.create(new_user("alice2", "alice@example.com")).await,
            Err(AppError::DuplicateKey)
        ));
        assert!(matches!(
            store.create(new_user("alice", "other@example.com")).await,
            Err(AppError::DuplicateKey)
        ));
    }

    #[actix_rt::test]
    async fn test_task_refs_are_idempotent() {
        let store = InMemoryUserStore::new();
        let user = store.create(new_user("bob", "bob@example.com")).await.unwrap();
        let task_id = Uuid::new_v4();

        store.add_task_ref(user.id, task_id).await.unwrap();
        store.add_task_ref(user.id, task_id).await.unwrap();
        assert_eq!(store.find_by_id(user.id).await.unwrap().task_ids, vec![task_id]);

        store.remove_task_ref(user.id, task_id).await.unwrap();
        store.remove_task_ref(user.id, task_id).await.unwrap();
        assert!(store.find_by_id(user.id).await.unwrap().task_ids.is_empty());
    }

    #[actix_rt::test]
    async fn test_list_by_owner_is_scoped_and_pinned_first() {
        let store = InMemoryTaskStore::new();
        let owner = Uuid::new_v4();
        let other = Uuid::new_v4();

        store.create(new_task("first", false), owner).await.unwrap();
        store.create(new_task("second", true), owner).await.unwrap();
        store.create(new_task("foreign", true), other).await.unwrap();
        store.create(new_task("third", false), owner).await.unwrap();
        store.create(new_task("fourth", true), owner).await.unwrap();

        let listed = store.list_by_owner(owner).await.unwrap();
        let titles: Vec<&str> = listed.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["second", "fourth", "first", "third"]);
        assert!(listed.iter().all(|t| t.owner_id == owner));

        let again = store.list_by_owner(owner).await.unwrap();
        assert_eq!(listed, again);
    }

    #[actix_rt::test]
    async fn test_update_keeps_owner_and_omitted_fields() {
        let store = InMemoryTaskStore::new();
        let owner = Uuid::new_v4();
        let task = store.create(new_task("original", true), owner).await.unwrap();

        let patch = TaskPatch {
            title: Some("renamed".to_string()),
            ..TaskPatch::default()
        };
        let updated = store.update(task.id, &patch).await.unwrap();
        assert_eq!(updated.title, "renamed");
        assert_eq!(updated.description, "desc");
        assert!(updated.is_pinned);
        assert_eq!(updated.owner_id, owner);
        assert!(updated.updated_at >= task.updated_at);

        let unpin = TaskPatch {
            is_pinned: Some(false),
            ..TaskPatch::default()
        };
        assert!(!store.update(task.id, &unpin).await.unwrap().is_pinned);
    }

    #[actix_rt::test]
    async fn test_delete_and_missing_task() {
        let store = InMemoryTaskStore::new();
        let task = store.create(new_task("doomed", false), Uuid::new_v4()).await.unwrap();

        store.delete(task.id).await.unwrap();
        assert!(matches!(store.find_by_id(task.id).await, Err(AppError::NotFound(_))));
        assert!(matches!(store.delete(task.id).await, Err(AppError::NotFound(_))));
        assert!(matches!(
            store.update(task.id, &TaskPatch::default()).await,
            Err(AppError::NotFound(_))
        ));
    }
}
