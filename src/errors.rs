use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::db::queries::InvalidRecord;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("internal error: {0}")]
    Internal(anyhow::Error),

    #[error("invalid stored data: {0}")]
    DataFormat(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Conflict(String),
}

/// Query helpers return `anyhow::Result`; recover the concrete failure so it
/// maps to the right status.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        let err = match err.downcast::<InvalidRecord>() {
            Ok(invalid) => return AppError::DataFormat(invalid.to_string()),
            Err(err) => err,
        };
        match err.downcast::<rusqlite::Error>() {
            Ok(db_err) => AppError::Database(db_err),
            Err(err) => AppError::Internal(err),
        }
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Database(_) | AppError::Internal(_) | AppError::DataFormat(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Server-side failures are logged in full but reported generically.
        let message = match &self {
            AppError::Database(_) | AppError::Internal(_) => {
                tracing::error!(error = %self, "request failed");
                "internal server error".to_string()
            }
            AppError::DataFormat(_) => {
                tracing::error!(error = %self, "stored record could not be decoded");
                self.to_string()
            }
            _ => self.to_string(),
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        assert_eq!(
            AppError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Unauthorized("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AppError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Conflict("x".into()).status_code(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::Internal(anyhow::anyhow!("boom")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn decode_failures_map_to_data_format() {
        let err: anyhow::Error = InvalidRecord {
            table: "bookings",
            id: 7,
            reason: "items: expected value".to_string(),
        }
        .into();
        assert!(matches!(AppError::from(err), AppError::DataFormat(_)));

        let err: anyhow::Error = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(AppError::from(err), AppError::Database(_)));
    }

    #[test]
    fn client_errors_keep_their_message() {
        let err = AppError::Validation("Passwords do not match".into());
        assert_eq!(err.to_string(), "Passwords do not match");
    }
}
