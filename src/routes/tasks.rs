use crate::{
    auth::{authorize, AuthenticatedUserId},
    error::AppError,
    models::{NewTask, TaskPatch},
    state::AppState,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

/// Retrieves the authenticated user's tasks.
///
/// The query is scoped to the caller, so no ownership check is needed.
/// Pinned tasks come first.
///
/// ## Responses:
/// - `200 OK`: a JSON array of `Task` objects.
/// - `401 Unauthorized`: missing, invalid or expired token.
#[get("")]
pub async fn get_tasks(
    state: web::Data<AppState>,
    user: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    let tasks = state.tasks.list_by_owner(user.0).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Creates a new task owned by the authenticated user.
///
/// After the task is stored its id is added to the owner's task set. The two
/// writes are not atomic: if the second fails the task exists without a
/// back-reference, the failure is logged with both ids and returned.
///
/// ## Responses:
/// - `201 Created`: the new `Task`.
/// - `400 Bad Request`: missing or invalid fields.
/// - `401 Unauthorized`: missing, invalid or expired token.
#[post("")]
pub async fn create_task(
    state: web::Data<AppState>,
    task_data: web::Json<NewTask>,
    user: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let task = state.tasks.create(task_data.into_inner(), user.0).await?;

    if let Err(e) = state.users.add_task_ref(user.0, task.id).await {
        log::error!(
            "Task {} stored but not linked to user {}: {}",
            task.id,
            user.0,
            e
        );
        return Err(e);
    }

    log::info!("User {} created task {}", user.0, task.id);
    Ok(HttpResponse::Created().json(task))
}

/// Retrieves a specific task by its ID.
///
/// ## Responses:
/// - `200 OK`: the `Task`.
/// - `401 Unauthorized`: bad token, or the task belongs to someone else.
/// - `404 Not Found`: no task with this id.
#[get("/{id}")]
pub async fn get_task(
    state: web::Data<AppState>,
    task_id: web::Path<Uuid>,
    user: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    let task = state.tasks.find_by_id(task_id.into_inner()).await?;
    authorize(&task, user.0)?;
    Ok(HttpResponse::Ok().json(task))
}

/// Partially updates a task.
///
/// Only fields present in the body are changed. Text fields sent as an empty
/// string are ignored; `isPinned` is applied whenever it is present, including
/// `false`.
///
/// ## Responses:
/// - `200 OK`: the updated `Task`.
/// - `400 Bad Request`: invalid fields.
/// - `401 Unauthorized`: bad token, or the task belongs to someone else.
/// - `404 Not Found`: no task with this id.
#[put("/{id}")]
pub async fn update_task(
    state: web::Data<AppState>,
    task_id: web::Path<Uuid>,
    patch: web::Json<TaskPatch>,
    user: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    patch.validate()?;
    let task_id = task_id.into_inner();

    let existing = state.tasks.find_by_id(task_id).await?;
    authorize(&existing, user.0)?;

    let task = state.tasks.update(task_id, &patch).await?;
    log::info!("User {} updated task {}", user.0, task.id);
    Ok(HttpResponse::Ok().json(task))
}

/// Deletes a task and drops it from the owner's task set.
///
/// ## Responses:
/// - `200 OK`: `{"message": "Task removed"}`.
/// - `401 Unauthorized`: bad token, or the task belongs to someone else.
/// - `404 Not Found`: no task with this id.
#[delete("/{id}")]
pub async fn delete_task(
    state: web::Data<AppState>,
    task_id: web::Path<Uuid>,
    user: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    let task_id = task_id.into_inner();

    let task = state.tasks.find_by_id(task_id).await?;
    authorize(&task, user.0)?;

    state.tasks.delete(task_id).await?;

    if let Err(e) = state.users.remove_task_ref(task.owner_id, task_id).await {
        log::error!(
            "Task {} deleted but still referenced by user {}: {}",
            task_id,
            task.owner_id,
            e
        );
        return Err(e);
    }

    log::info!("User {} deleted task {}", user.0, task_id);
    Ok(HttpResponse::Ok().json(json!({ "message": "Task removed" })))
}

#[cfg(test)]
mod tests {
    use crate::models::{NewTask, TaskPatch};
    use validator::Validate;

    #[test]
    fn test_task_input_validation() {
        let empty_title: NewTask = serde_json::from_str(r#"{"title":""}"#).unwrap();
        assert!(
            empty_title.validate().is_err(),
            "Validation should fail for empty title."
        );

        let long_description: NewTask = serde_json::from_value(serde_json::json!({
            "title": "Valid title for desc test",
            "description": "b".repeat(1001)
        }))
        .unwrap();
        assert!(
            long_description.validate().is_err(),
            "Validation should fail for overly long description."
        );

        let long_patch_title = TaskPatch {
            title: Some("a".repeat(201)),
            ..TaskPatch::default()
        };
        assert!(
            long_patch_title.validate().is_err(),
            "Validation should fail for overly long patch title."
        );

        assert!(
            TaskPatch::default().validate().is_ok(),
            "An empty patch is valid."
        );
    }
}
