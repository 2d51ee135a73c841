use uuid::Uuid;

use crate::error::AppError;
use crate::models::Task;

/// A resource with exactly one owning user.
pub trait Owned {
    fn owner_id(&self) -> Uuid;
}

impl Owned for Task {
    fn owner_id(&self) -> Uuid {
        self.owner_id
    }
}

/// Allows access only when `requester` owns `resource`.
///
/// Applied before every read-by-id, update and delete. Listing does not go
/// through here because its query is already filtered by owner.
pub fn authorize<R: Owned + ?Sized>(resource: &R, requester: Uuid) -> Result<(), AppError> {
    if resource.owner_id() == requester {
        Ok(())
    } else {
        log::warn!(
            "User {} denied access to a resource owned by {}",
            requester,
            resource.owner_id()
        );
        Err(AppError::Forbidden)
    }
}
