use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::{PasswordHasher, TokenService};
use crate::config::Config;
use crate::store::{
    CredentialStore, InMemoryTaskStore, InMemoryUserStore, PgTaskStore, PgUserStore, TaskStore,
};

/// Shared, read-only handles every handler receives through `web::Data`.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn CredentialStore>,
    pub tasks: Arc<dyn TaskStore>,
    pub tokens: TokenService,
    pub hasher: PasswordHasher,
}

impl AppState {
    pub fn new(
        users: Arc<dyn CredentialStore>,
        tasks: Arc<dyn TaskStore>,
        tokens: TokenService,
        hasher: PasswordHasher,
    ) -> Self {
        Self {
            users,
            tasks,
            tokens,
            hasher,
        }
    }

    pub fn postgres(pool: PgPool, config: &Config) -> Self {
        Self::new(
            Arc::new(PgUserStore::new(pool.clone())),
            Arc::new(PgTaskStore::new(pool)),
            TokenService::new(config.jwt_secret.as_bytes()),
            PasswordHasher::new(config.bcrypt_cost),
        )
    }

    /// State backed by empty in-memory stores.
    pub fn in_memory(jwt_secret: &str, bcrypt_cost: u32) -> Self {
        Self::new(
            Arc::new(InMemoryUserStore::new()),
            Arc::new(InMemoryTaskStore::new()),
            TokenService::new(jwt_secret.as_bytes()),
            PasswordHasher::new(bcrypt_cost),
        )
    }
}
