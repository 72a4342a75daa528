use axum::{
    extract::{FromRequestParts, Path, State},
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;
use utoipa::ToSchema;

use crate::errors::{AppError, Envelope};
use crate::metrics::USERS_TOTAL;
use crate::models::user::{
    LoginRequest, RegisterRequest, UpdateUserRequest, UserStatusRequest, UserView,
};
use crate::responder::ValidatedJson;
use crate::users::UserStore;

lazy_static::lazy_static! {
    static ref START_TIME: Instant = Instant::now();
}

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub users: UserStore,
    pub instance_id: String,
}

type ApiResult<T> = Result<Json<Envelope<T>>, AppError>;

/// Account id path segment; a non-numeric id is a `BadRequest`
#[derive(Debug, Clone, Copy, Deserialize, FromRequestParts)]
#[from_request(via(Path), rejection(AppError))]
#[serde(transparent)]
pub struct UserId(pub u64);

// Concrete envelope types for OpenAPI generation
/// Envelope carrying a user
#[derive(Debug, Serialize, ToSchema)]
pub struct UserEnvelope {
    /// 200 on success
    pub code: u16,
    /// "success" or the error message
    pub message: String,
    /// Account (present on success only)
    pub data: Option<UserView>,
}

/// Envelope returned for every failure
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorEnvelope {
    /// 404 for missing entities, 400 otherwise
    pub code: u16,
    /// Human-readable error message
    pub message: String,
}

/// Envelope with no payload beyond the message
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageEnvelope {
    pub code: u16,
    pub message: String,
    pub data: Option<String>,
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = serde_json::Value)
    )
)]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "error-responder",
        "version": env!("CARGO_PKG_VERSION"),
        "instance_id": state.instance_id,
        "build": {
            "profile": if cfg!(debug_assertions) { "debug" } else { "release" },
        },
        "uptime_seconds": START_TIME.elapsed().as_secs(),
    }))
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/api/users",
    tag = "users",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Account created", body = UserEnvelope),
        (status = 400, description = "Validation failed or account exists", body = ErrorEnvelope)
    )
)]
pub async fn register_user(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> ApiResult<UserView> {
    info!("Register request: username='{}'", req.username);

    let user = state.users.register(req).await?;
    USERS_TOTAL.set(state.users.count().await as i64);

    Ok(Json(Envelope::ok(user)))
}

/// Get an account by id
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "users",
    params(
        ("id" = u64, Path, description = "Account id")
    ),
    responses(
        (status = 200, description = "Account found", body = UserEnvelope),
        (status = 404, description = "Account not found", body = ErrorEnvelope)
    )
)]
pub async fn get_user(State(state): State<AppState>, UserId(id): UserId) -> ApiResult<UserView> {
    info!("Get user request: id={}", id);

    let user = state.users.get(id).await?;
    Ok(Json(Envelope::ok(user)))
}

/// Change an account's nickname
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    tag = "users",
    params(
        ("id" = u64, Path, description = "Account id")
    ),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Account updated", body = UserEnvelope),
        (status = 400, description = "Validation failed", body = ErrorEnvelope),
        (status = 404, description = "Account not found", body = ErrorEnvelope)
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    UserId(id): UserId,
    ValidatedJson(req): ValidatedJson<UpdateUserRequest>,
) -> ApiResult<UserView> {
    info!("Update user request: id={}", id);

    let user = state.users.rename(id, req.nickname).await?;
    Ok(Json(Envelope::ok(user)))
}

/// Enable or disable an account
#[utoipa::path(
    put,
    path = "/api/users/{id}/status",
    tag = "users",
    params(
        ("id" = u64, Path, description = "Account id")
    ),
    request_body = UserStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = UserEnvelope),
        (status = 400, description = "Status change refused", body = ErrorEnvelope),
        (status = 404, description = "Account not found", body = ErrorEnvelope)
    )
)]
pub async fn set_user_status(
    State(state): State<AppState>,
    UserId(id): UserId,
    ValidatedJson(req): ValidatedJson<UserStatusRequest>,
) -> ApiResult<UserView> {
    info!("Set user status request: id={}, enabled={}", id, req.enabled);

    let user = state.users.set_enabled(id, req.enabled).await?;
    Ok(Json(Envelope::ok(user)))
}

/// Delete an account
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    tag = "users",
    params(
        ("id" = u64, Path, description = "Account id")
    ),
    responses(
        (status = 200, description = "Account deleted", body = MessageEnvelope),
        (status = 400, description = "Deletion refused", body = ErrorEnvelope),
        (status = 404, description = "Account not found", body = ErrorEnvelope)
    )
)]
pub async fn delete_user(State(state): State<AppState>, UserId(id): UserId) -> ApiResult<String> {
    info!("Delete user request: id={}", id);

    state.users.delete(id).await?;
    USERS_TOTAL.set(state.users.count().await as i64);

    Ok(Json(Envelope::ok(format!("user {} deleted", id))))
}

/// Check a username and password
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Credentials accepted", body = UserEnvelope),
        (status = 400, description = "Credentials rejected", body = ErrorEnvelope)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> ApiResult<UserView> {
    info!("Login request: username='{}'", req.username);

    let user = state.users.authenticate(&req.username, &req.password).await?;
    Ok(Json(Envelope::ok(user)))
}

/// Any route that does not exist
pub async fn fallback(uri: axum::http::Uri) -> AppError {
    AppError::EntityNotFound(format!("No handler found for {}", uri.path()))
}
