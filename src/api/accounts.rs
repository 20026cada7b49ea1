//! Account endpoints

use axum::extract::{Path, State};
use axum::response::Json;

use super::dto::{
    LoginRequest, LoginResponse, MessageResponse, RegisterRequest, RegisterResponse,
    UpdateProfileRequest, UserSummary,
};
use super::extract::ApiJson;
use crate::AppState;
use crate::error::AppError;

/// POST /api/register
pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<Json<RegisterResponse>, AppError> {
    let user = state
        .accounts
        .register(&req.name, &req.email, &req.password)
        .await?;

    Ok(Json(RegisterResponse {
        success: true,
        message: format!("Hello, {}! Welcome to our platform.", user.name),
        user: UserSummary::from(&user),
    }))
}

/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let user = state.accounts.login(&req.email, &req.password).await?;

    Ok(Json(LoginResponse {
        success: true,
        message: format!("Hello, {}! Welcome back.", user.name),
        user,
    }))
}

/// POST /api/signout
pub async fn signout(State(state): State<AppState>) -> Json<MessageResponse> {
    state.accounts.signout();
    Json(MessageResponse::ok("Signout successful"))
}

/// PUT /api/user/:user_id
pub async fn update_profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    ApiJson(req): ApiJson<UpdateProfileRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    state
        .accounts
        .update_profile(&user_id, &req.name, &req.email)
        .await?;

    Ok(Json(MessageResponse::ok("User profile updated successfully")))
}
