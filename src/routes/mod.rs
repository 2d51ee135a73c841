pub mod auth;
pub mod health;
pub mod tasks;

use actix_web::{error, web};

use crate::auth::AuthMiddleware;
use crate::error::AppError;

/// Mounts the `/auth` and `/tasks` scopes. Expected under `/api`.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(path_config())
        .service(
            web::scope("/auth")
                .service(auth::login)
                .service(auth::register),
        )
        .service(
            web::scope("/tasks")
                .wrap(AuthMiddleware)
                .service(tasks::get_tasks)
                .service(tasks::create_task)
                .service(tasks::get_task)
                .service(tasks::update_task)
                .service(tasks::delete_task),
        );
}

/// Malformed bodies and missing required fields become a 400 `{message}`.
/// Parser messages can quote submitted values, so only the error category
/// and position are logged.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, req| {
        match &err {
            error::JsonPayloadError::Deserialize(e) => log::debug!(
                "Rejected body on {}: {:?} error at line {} column {}",
                req.path(),
                e.classify(),
                e.line(),
                e.column()
            ),
            other => log::debug!("Rejected body on {}: {}", req.path(), other),
        }
        AppError::Validation("Invalid request body".into()).into()
    })
}

/// A task id that is not a UUID cannot name an existing task.
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err: error::PathError, _req| {
        log::debug!("Rejected path: {}", err);
        AppError::NotFound("Task not found".into()).into()
    })
}
