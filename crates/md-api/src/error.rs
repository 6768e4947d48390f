//! API error handling
//!
//! Every failure is rendered as `{"detail": "<message>"}` with the matching
//! status code.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use md_core::error::{MdError, ValidationErrors};
use serde::Serialize;

/// API error types
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    Validation(ValidationErrors),
    BadRequest(String),
    Conflict(String),
    Internal(String),
}

impl ApiError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        ApiError::NotFound(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        ApiError::BadRequest(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        ApiError::Conflict(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        ApiError::Internal(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn detail(&self) -> String {
        match self {
            ApiError::Validation(errors) => errors.to_string(),
            ApiError::NotFound(msg)
            | ApiError::BadRequest(msg)
            | ApiError::Conflict(msg)
            | ApiError::Internal(msg) => msg.clone(),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(detail = %self.detail(), "Request failed");
        }
        (status, Json(ErrorBody { detail: self.detail() })).into_response()
    }
}

impl From<MdError> for ApiError {
    fn from(err: MdError) -> Self {
        match err {
            MdError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            MdError::Validation(errors) => ApiError::Validation(errors),
            MdError::BusinessRule { message } => ApiError::BadRequest(message),
            MdError::Conflict { message } => ApiError::Conflict(message),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<md_documents::DocumentError> for ApiError {
    fn from(err: md_documents::DocumentError) -> Self {
        MdError::from(err).into()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection.status() {
            StatusCode::UNPROCESSABLE_ENTITY => {
                let mut errors = ValidationErrors::new();
                errors.add_base(rejection.body_text());
                ApiError::Validation(errors)
            }
            _ => ApiError::BadRequest(rejection.body_text()),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
