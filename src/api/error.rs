use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use super::envelope::Family;
use crate::backend::ClientError;

/// Message returned in place of any internal failure detail.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Everything that can go wrong while serving one proxied request.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid JSON body: {0}")]
    InvalidBody(String),

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Backend(#[from] ClientError),

    #[error("Unexpected backend payload: {0}")]
    UnexpectedPayload(String),
}

impl GatewayError {
    /// Render into the envelope of `family`.
    ///
    /// Backend rejections keep their status and message. Transport, decode
    /// and payload failures are logged in full and answered with a generic
    /// 500 so clients never see internal details.
    pub fn into_response_for(self, family: Family) -> Response {
        match self {
            Self::Unauthorized => family.unauthorized(),
            Self::InvalidBody(detail) => {
                tracing::warn!("Rejected request body: {}", detail);
                family.error(StatusCode::BAD_REQUEST, "Invalid JSON body", None)
            }
            Self::BadRequest(message) => family.error(StatusCode::BAD_REQUEST, message, None),
            Self::Backend(ClientError::Rejected {
                status,
                message,
                code,
            }) => {
                tracing::warn!("Backend returned {}: {}", status, message);
                family.error(status, message, code)
            }
            other => {
                tracing::error!("Internal error: {}", other);
                family.error(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE, None)
            }
        }
    }

    /// Pair the error with the family it should be rendered in.
    pub fn within(self, family: Family) -> RouteError {
        RouteError {
            family,
            error: self,
        }
    }
}

/// A [`GatewayError`] bound to a response family, usable with `?` in handlers.
#[derive(Debug)]
pub struct RouteError {
    pub family: Family,
    pub error: GatewayError,
}

impl IntoResponse for RouteError {
    fn into_response(self) -> Response {
        self.error.into_response_for(self.family)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_keeps_backend_status() {
        let err = GatewayError::Backend(ClientError::Rejected {
            status: StatusCode::CONFLICT,
            message: "Category exists".into(),
            code: None,
        });
        let response = err.into_response_for(Family::Standard);
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn decode_failure_is_internal() {
        let err = GatewayError::Backend(ClientError::Decode("expected value".into()));
        let response = err.into_response_for(Family::Simple);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn invalid_body_is_bad_request() {
        let response = GatewayError::InvalidBody("eof".into())
            .within(Family::Standard)
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
