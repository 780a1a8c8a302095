use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::bookings::BookingResponse;
use super::extract::{CurrentSession, JsonBody};
use crate::db::queries::{self, TIMESTAMP_FORMAT};
use crate::errors::AppError;
use crate::models::User;
use crate::services::auth::{self, Signup};
use crate::state::AppState;

#[derive(Serialize)]
pub struct UserResponse {
    id: i64,
    name: String,
    email: String,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
        }
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

// POST /api/signup
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
}

pub async fn signup(
    State(state): State<Arc<AppState>>,
    JsonBody(body): JsonBody<SignupRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let (Some(name), Some(email), Some(password)) = (
        present(&body.full_name),
        present(&body.email),
        body.password.as_deref().filter(|p| !p.is_empty()),
    ) else {
        return Err(AppError::Validation(
            "Full name, email and password are required".into(),
        ));
    };

    let input = Signup {
        name,
        email,
        password,
        confirm_password: body.confirm_password.as_deref().unwrap_or_default(),
    };

    let user_id = {
        let conn = state.conn()?;
        auth::signup(&conn, &input)?
    };

    Ok(Json(serde_json::json!({
        "message": "User registered successfully",
        "id": user_id,
    })))
}

// POST /api/login
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    JsonBody(body): JsonBody<LoginRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let (Some(email), Some(password)) = (
        present(&body.email),
        body.password.as_deref().filter(|p| !p.is_empty()),
    ) else {
        return Err(AppError::Validation(
            "Email and password are required".into(),
        ));
    };

    let (user, session) = {
        let conn = state.conn()?;
        auth::login(&conn, email, password, state.config.session_ttl_hours)?
    };

    Ok(Json(serde_json::json!({
        "message": "Login successful",
        "token": session.token,
        "expires_at": session.expires_at.format(TIMESTAMP_FORMAT).to_string(),
        "user": UserResponse::from(user),
    })))
}

// POST /api/logout
pub async fn logout(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
) -> Result<Json<serde_json::Value>, AppError> {
    {
        let conn = state.conn()?;
        auth::logout(&conn, &session)?;
    }
    Ok(Json(serde_json::json!({ "message": "Logged out" })))
}

// GET /api/me
#[derive(Serialize)]
pub struct MeResponse {
    user: UserResponse,
    bookings: Vec<BookingResponse>,
}

pub async fn me(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
) -> Result<Json<MeResponse>, AppError> {
    let (user, bookings) = {
        let conn = state.conn()?;
        let user = queries::get_user_by_id(&conn, session.user_id)?
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;
        let bookings = queries::get_bookings_for_user(&conn, session.user_id)?;
        (user, bookings)
    };

    Ok(Json(MeResponse {
        user: user.into(),
        bookings: bookings.into_iter().map(BookingResponse::from).collect(),
    }))
}
