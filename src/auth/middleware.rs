use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    web, Error, HttpMessage, ResponseError,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::auth::extractors::AuthenticatedUserId;
use crate::error::AppError;
use crate::state::AppState;

/// Guards a scope behind a bearer token.
///
/// On success the caller's id is stored in the request extensions as
/// `AuthenticatedUserId`. On failure the request never reaches the handler and a
/// 401 JSON response is returned. The user store is not consulted: the signed
/// claim is trusted until it expires.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        match authenticate(&req) {
            Ok(user_id) => {
                req.extensions_mut().insert(user_id);
                let fut = self.service.call(req);
                Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
            }
            Err(app_err) => {
                let response = app_err.error_response().map_into_right_body();
                Box::pin(ready(Ok(req.into_response(response))))
            }
        }
    }
}

fn authenticate(req: &ServiceRequest) -> Result<AuthenticatedUserId, AppError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| AppError::Internal("AppState is not registered".into()))?;

    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthenticated("Missing token".into()))?;

    let claims = state.tokens.verify(token).map_err(|err| {
        log::debug!("Rejected bearer token on {}: {}", req.path(), err);
        match err {
            AppError::ExpiredToken => AppError::Unauthenticated("Token expired".into()),
            _ => AppError::Unauthenticated("Invalid token".into()),
        }
    })?;

    Ok(AuthenticatedUserId(claims.sub))
}
