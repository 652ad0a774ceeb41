//! HTTP error mapping.
//!
//! Every handler returns `Result<_, ApiError>`; conversions from the core
//! error taxonomy and the auth layer pick the status code, so handlers stay
//! free of status-code arithmetic.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use medledger_contracts::LedgerError;

use crate::auth::AuthError;

/// JSON body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    /// Offending payload fields, present for validation failures only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
}

/// A status code plus a JSON error body.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                error: error.into(),
                fields: None,
            },
        }
    }

    /// 401 for callers the registry does not know.
    pub fn unknown_user(user_id: &str) -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            format!("unknown user '{user_id}'"),
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        let status = match &err {
            LedgerError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            LedgerError::AlreadyExists { .. } => StatusCode::CONFLICT,
            LedgerError::NotFound { .. } => StatusCode::NOT_FOUND,
            LedgerError::StoreUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            LedgerError::ChainIntegrity { .. } | LedgerError::Config { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let fields = match &err {
            LedgerError::Validation { fields } => Some(fields.clone()),
            _ => None,
        };

        Self {
            status,
            body: ErrorBody {
                error: err.to_string(),
                fields,
            },
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        let status = match &err {
            AuthError::Taken { .. } => StatusCode::CONFLICT,
            AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::MissingCredentials => StatusCode::UNPROCESSABLE_ENTITY,
        };
        Self::new(status, err.to_string())
    }
}
