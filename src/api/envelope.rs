//! The two response families the portal's API grew over time.
//!
//! Routes keep the family their clients already parse; [`Family`] decides
//! which shape an error produced by the gateway takes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::models::{SimpleError, StandardEnvelope};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    /// `{"error": "..."}` (auth, mfa, bookmarks, reading history, fact-check, translate).
    Simple,
    /// `{"status":"error","message":...,"data":null,"error":{"code":...}}` (dashboard resources).
    Standard,
}

impl Family {
    /// Render an error body for this family. `code` is only used by
    /// [`Family::Standard`]; when absent it is derived from `status`.
    pub fn error(
        self,
        status: StatusCode,
        message: impl Into<String>,
        code: Option<String>,
    ) -> Response {
        let message = message.into();
        match self {
            Family::Simple => (status, Json(SimpleError { error: message })).into_response(),
            Family::Standard => {
                let code = code.unwrap_or_else(|| error_code(status).to_string());
                (status, Json(StandardEnvelope::failure(message, code))).into_response()
            }
        }
    }

    pub fn unauthorized(self) -> Response {
        let message = match self {
            Family::Simple => "Unauthorized",
            Family::Standard => "Authentication required",
        };
        self.error(StatusCode::UNAUTHORIZED, message, None)
    }
}

/// Error code reported in standard envelopes for a given status.
pub fn error_code(status: StatusCode) -> &'static str {
    match status {
        StatusCode::BAD_REQUEST => "BAD_REQUEST",
        StatusCode::UNAUTHORIZED => "UNAUTHORIZED",
        StatusCode::FORBIDDEN => "FORBIDDEN",
        StatusCode::NOT_FOUND => "NOT_FOUND",
        StatusCode::CONFLICT => "CONFLICT",
        StatusCode::UNPROCESSABLE_ENTITY => "VALIDATION_ERROR",
        StatusCode::TOO_MANY_REQUESTS => "RATE_LIMITED",
        s if s.is_client_error() => "REQUEST_FAILED",
        _ => "INTERNAL_ERROR",
    }
}
