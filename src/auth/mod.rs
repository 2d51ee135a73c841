pub mod extractors;
pub mod middleware;
pub mod ownership;
pub mod password;
pub mod token;

use std::borrow::Cow;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::UserResponse;

// Re-export necessary items
pub use extractors::AuthenticatedUserId;
pub use middleware::AuthMiddleware;
pub use ownership::{authorize, Owned};
pub use password::{PasswordHasher, MAX_PASSWORD_BYTES};
pub use token::{Claims, SessionKind, TokenService};

lazy_static! {
    // Any visible characters; whitespace is the only thing refused
    static ref USERNAME_REGEX: regex::Regex = regex::Regex::new(r"^\S+$").unwrap();
}

fn validate_password_bytes(password: &str) -> Result<(), ValidationError> {
    if password.len() > MAX_PASSWORD_BYTES {
        let mut err = ValidationError::new("password_too_long");
        err.message = Some(Cow::from("Password must be at most 72 bytes"));
        return Err(err);
    }
    Ok(())
}

/// Represents the payload for a user login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Must be a valid email format.
    #[validate(email(message = "Email is not valid"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Represents the payload for a new user registration request.
///
/// Every field is required. Beyond that only the email format, the absence of
/// whitespace in the username, and bcrypt's input limit on the password are
/// checked.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(
        length(min = 1, max = 64, message = "Username must be 1 to 64 characters"),
        regex(path = "USERNAME_REGEX", message = "Username must not contain whitespace")
    )]
    pub username: String,
    #[validate(email(message = "Email is not valid"))]
    pub email: String,
    #[validate(
        length(min = 1, message = "Password is required"),
        custom = "validate_password_bytes"
    )]
    pub password: String,
    #[validate(length(min = 1, max = 100, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "Last name is required"))]
    pub last_name: String,
}

/// Response structure after successful registration or login.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    /// The signed session token.
    pub token: String,
    /// The authenticated user, without any password material.
    pub user: UserResponse,
}
