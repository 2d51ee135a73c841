//! Shared setup for the HTTP integration tests.
//!
//! The app is assembled exactly as in `main.rs` but on in-memory stores, so the
//! tests need no database.
#![allow(dead_code)]

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::middleware::Logger;
use actix_web::{http::header, test, web, App};
use serde_json::json;
use taskvault::auth::AuthResponse;
use taskvault::routes;
use taskvault::routes::health;
use taskvault::AppState;

pub const TEST_SECRET: &str = "integration-test-secret";

pub fn test_state() -> web::Data<AppState> {
    // Cost 4 is bcrypt's minimum and keeps registration fast.
    web::Data::new(AppState::in_memory(TEST_SECRET, 4))
}

pub async fn init_app(
    state: web::Data<AppState>,
) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error> {
    test::init_service(
        App::new()
            .app_data(state)
            .wrap(Logger::default())
            .service(health::health)
            .service(web::scope("/api").configure(routes::config)),
    )
    .await
}

pub struct TestUser {
    pub id: uuid::Uuid,
    pub token: String,
}

pub async fn register_user(
    app: &impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>,
    username: &str,
    email: &str,
    password: &str,
) -> TestUser {
    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({
            "username": username,
            "email": email,
            "password": password,
            "firstName": "Test",
            "lastName": "User"
        }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(
        resp.status(),
        actix_web::http::StatusCode::CREATED,
        "Failed to register {}",
        email
    );
    let auth: AuthResponse = test::read_body_json(resp).await;
    TestUser {
        id: auth.user.id,
        token: auth.token,
    }
}

pub fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {}", token))
}
