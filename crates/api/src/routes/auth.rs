//! Registration and login.

use axum::{Json, extract::State, extract::rejection::JsonRejection, http::StatusCode};
use serde::Deserialize;

use super::{optional, payload};
use crate::error::{AppError, Result};
use crate::models::user::User;
use crate::services::auth::{AuthService, Registration};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// `POST /api/register`
pub async fn register(
    State(state): State<AppState>,
    body: std::result::Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<User>)> {
    let req = payload(body)?;

    let user = AuthService::new(state.provisioner())
        .register(Registration {
            email: &req.email,
            password: &req.password,
            display_name: optional(req.display_name),
            avatar_url: optional(req.avatar_url),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// `POST /api/login`
pub async fn login(
    State(state): State<AppState>,
    body: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<User>> {
    let req = payload(body)?;
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(AppError::BadRequest(
            "email and password are required".to_string(),
        ));
    }

    let user = AuthService::new(state.provisioner())
        .login(&req.email, &req.password)
        .await?;
    Ok(Json(user))
}
