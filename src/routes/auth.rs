use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::constants::MIN_PASSWORD_LEN;
use crate::error::{AppError, Result};
use crate::store::Store;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
}

/// Register a new account.
///
/// Returns 409 Conflict when the email is already taken.
pub async fn register<S: Store>(
    State(state): State<AppState<S>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>)> {
    if payload.username.trim().is_empty() {
        return Err(AppError::InvalidInput("username must not be empty".into()));
    }
    if !payload.email.contains('@') {
        return Err(AppError::InvalidInput("invalid email address".into()));
    }
    if payload.password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::InvalidInput(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let user_id = state
        .auth
        .register(payload.username, payload.email, payload.password)
        .await?;

    Ok((StatusCode::CREATED, Json(RegisterResponse { user_id })))
}

/// Exchange credentials for a bearer token.
pub async fn login<S: Store>(
    State(state): State<AppState<S>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let outcome = state.auth.login(&payload.email, &payload.password).await?;
    Ok(Json(LoginResponse {
        token: outcome.token,
        username: outcome.username,
    }))
}
