use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::request::Parts;
use axum::http::{header, HeaderMap};

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::models::Session;
use crate::services::auth;
use crate::state::AppState;

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// A JSON request body. Unlike `axum::Json`, a malformed body, wrong field
/// type or missing content type is reported as a 400 `{"error"}` response.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    axum::Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(AppError::Validation(rejection.body_text())),
        }
    }
}

/// The caller's session. Rejects with 401 when the bearer token is missing,
/// unknown or expired.
pub struct CurrentSession(pub Session);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for CurrentSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| AppError::Unauthorized("login required".into()))?;

        let session = {
            let conn = state.conn()?;
            auth::resolve_session(&conn, token)?
        };

        session
            .map(CurrentSession)
            .ok_or_else(|| AppError::Unauthorized("session expired or invalid".into()))
    }
}

/// Session for endpoints that also serve guests. No `Authorization` header
/// means a guest; a header that does not resolve to a live session is a 401.
pub struct OptionalSession(pub Option<Session>);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for OptionalSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        if !parts.headers.contains_key(header::AUTHORIZATION) {
            return Ok(OptionalSession(None));
        }

        let CurrentSession(session) = CurrentSession::from_request_parts(parts, state).await?;
        Ok(OptionalSession(Some(session)))
    }
}

/// Admin endpoints are open unless an admin token is configured.
pub fn require_admin(headers: &HeaderMap, config: &AppConfig) -> Result<(), AppError> {
    let Some(expected) = config.admin_token.as_deref() else {
        return Ok(());
    };

    if bearer_token(headers) != Some(expected) {
        return Err(AppError::Unauthorized("unauthorized".into()));
    }
    Ok(())
}
