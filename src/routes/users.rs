use crate::{
    error::{AppError, Result},
    models::user::{EditUserRequest, LoginRequest, SignupRequest},
    services::auth::AuthUser,
    state::AppState,
    utils::validation,
};
use axum::{
    extract::State,
    http::header::SET_COOKIE,
    response::{AppendHeaders, IntoResponse, Json},
    routing::{get, patch, post},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;
use validator::Validate;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/logout", get(logout))
        .route("/edit-user", patch(edit_user))
        .route("/get-user", get(get_user))
}

/// POST /api/v1/users/signup
async fn signup(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SignupRequest>,
) -> Result<impl IntoResponse> {
    request.validate().map_err(AppError::ValidatorError)?;

    let password_hash = state.auth_service.hash_password(&request.password)?;
    let user = state
        .user_service
        .create(&request.username, &password_hash)
        .await?;

    let token = state.auth_service.issue_token(&user.id)?;
    let cookie = state.auth_service.session_cookie(&token);

    info!("User signed up: {}", user.username);

    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(json!({
            "message": "User created successfully",
            "user": user.to_response(),
        })),
    ))
}

/// POST /api/v1/users/login
async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse> {
    validation::require_non_blank(&request.username, "All fields are required")?;
    validation::require_non_blank(&request.password, "All fields are required")?;

    // Unknown username and wrong password are indistinguishable to callers.
    let user = state
        .user_service
        .find_by_username(&request.username)
        .await?
        .ok_or_else(|| AppError::validation("Invalid credentials"))?;

    if !state
        .auth_service
        .verify_password(&request.password, &user.password)
    {
        return Err(AppError::validation("Invalid credentials"));
    }

    let token = state.auth_service.issue_token(&user.id)?;
    let cookie = state.auth_service.session_cookie(&token);

    info!("User logged in: {}", user.username);

    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(json!({
            "message": "User logged in successfully",
            "user": user.to_response(),
        })),
    ))
}

/// GET /api/v1/users/logout
async fn logout(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse> {
    let cookie = state.auth_service.expired_session_cookie();

    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(json!({
            "message": "User logged out successfully",
        })),
    ))
}

/// PATCH /api/v1/users/edit-user
async fn edit_user(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(request): Json<EditUserRequest>,
) -> Result<Json<Value>> {
    let updated = state
        .user_service
        .update_profile_pic(&user.id, &request.profile_pic)
        .await?;

    Ok(Json(json!({
        "message": "User updated successfully",
        "user": updated.to_response(),
    })))
}

/// GET /api/v1/users/get-user
async fn get_user(AuthUser(user): AuthUser) -> Result<Json<Value>> {
    Ok(Json(serde_json::to_value(user.to_response())?))
}
