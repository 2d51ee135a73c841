pub mod task;
pub mod user;

pub use task::{NewTask, Task, TaskPatch, TodoItem};
pub use user::{NewUser, User, UserResponse};
