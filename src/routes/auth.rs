use crate::{
    auth::{AuthResponse, LoginRequest, RegisterRequest, SessionKind},
    error::AppError,
    models::{NewUser, UserResponse},
    state::AppState,
};
use actix_web::{post, web, HttpResponse, Responder};
use validator::Validate;

/// Register a new user
///
/// Creates a new user account and returns a 24-hour session token together with
/// the user's public representation.
///
/// ## Responses:
/// - `201 Created`: `{ token, user }`.
/// - `400 Bad Request`: invalid payload, or the email/username is already registered.
#[post("/register")]
pub async fn register(
    state: web::Data<AppState>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;
    let RegisterRequest {
        username,
        email,
        password,
        first_name,
        last_name,
    } = register_data.into_inner();

    // Fast path only; the store's uniqueness check on insert is authoritative.
    match state.users.find_by_email(&email).await {
        Ok(_) => return Err(AppError::DuplicateKey),
        Err(AppError::NotFound(_)) => {}
        Err(e) => return Err(e),
    }

    let hasher = state.hasher;
    let password_hash = web::block(move || hasher.hash(&password)).await??;

    let user = state
        .users
        .create(NewUser {
            username,
            email,
            password_hash,
            first_name,
            last_name,
        })
        .await?;

    let token = state
        .tokens
        .issue(user.id, SessionKind::Registration.ttl())?;

    log::info!("Registered user {}", user.id);
    Ok(HttpResponse::Created().json(AuthResponse {
        token,
        user: UserResponse::from(&user),
    }))
}

/// Login user
///
/// Authenticates a user by email and password and returns a 1-hour session token.
///
/// ## Responses:
/// - `200 OK`: `{ token, user }`.
/// - `400 Bad Request`: invalid payload, or `Invalid credentials` for both an
///   unknown email and a wrong password.
#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    login_data.validate()?;
    let LoginRequest { email, password } = login_data.into_inner();

    let user = match state.users.find_by_email(&email).await {
        Ok(user) => user,
        Err(AppError::NotFound(_)) => return Err(AppError::InvalidCredentials),
        Err(e) => return Err(e),
    };

    let hasher = state.hasher;
    let hashed = user.password_hash.clone();
    let verified = web::block(move || hasher.verify(&password, &hashed)).await?;
    if !verified {
        log::debug!("Failed login attempt for user {}", user.id);
        return Err(AppError::InvalidCredentials);
    }

    let token = state.tokens.issue(user.id, SessionKind::Login.ttl())?;

    log::info!("User {} logged in", user.id);
    Ok(HttpResponse::Ok().json(AuthResponse {
        token,
        user: UserResponse::from(&user),
    }))
}
