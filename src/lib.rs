#![doc = "The `taskvault` library crate."]
#![doc = ""]
#![doc = "Authentication (bcrypt passwords, stateless JWT sessions, a bearer-token gate),"]
#![doc = "owner-only task access, the user and task stores, and the HTTP routes that tie"]
#![doc = "them together. The binary in `main.rs` loads configuration and serves the routes."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;

pub use crate::error::AppError;
pub use crate::state::AppState;
