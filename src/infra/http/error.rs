use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::error;

use crate::application::error::{ExportError, FailureKind};

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub message: String,
}

/// The only failure shape the HTTP surface emits. The classified sentence
/// is the whole story for the caller; the internal detail goes to the log.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: &'static str,
    detail: String,
}

impl From<ExportError> for ApiError {
    fn from(error: ExportError) -> Self {
        let status = match error.kind() {
            FailureKind::Security => StatusCode::UNAUTHORIZED,
            FailureKind::NotFound | FailureKind::NoContent => StatusCode::NOT_FOUND,
            FailureKind::MissingCapability => StatusCode::NOT_IMPLEMENTED,
            FailureKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
            FailureKind::RemoteFetchFailure => StatusCode::BAD_GATEWAY,
            FailureKind::Memory | FailureKind::Permission | FailureKind::Generic => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            message: error.user_message(),
            detail: error.detail().to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!(
            target = "infra::http",
            status = self.status.as_u16(),
            detail = %self.detail,
            "request failed"
        );
        (
            self.status,
            Json(ApiErrorBody {
                message: self.message.to_string(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_follows_failure_kind() {
        let cases = [
            (ExportError::security(), StatusCode::UNAUTHORIZED),
            (ExportError::not_found(), StatusCode::NOT_FOUND),
            (ExportError::no_content(), StatusCode::NOT_FOUND),
            (ExportError::missing_capability(), StatusCode::NOT_IMPLEMENTED),
            (
                ExportError::classified("operation timed out"),
                StatusCode::GATEWAY_TIMEOUT,
            ),
            (
                ExportError::classified("boom"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (export_error, expected) in cases {
            let api_error = ApiError::from(export_error);
            assert_eq!(api_error.status, expected);
        }
    }

    #[test]
    fn internal_detail_never_becomes_the_message() {
        let api_error = ApiError::from(ExportError::classified("engine.c:42 segfault"));
        assert!(!api_error.message.contains("engine.c"));
        assert_eq!(api_error.detail, "engine.c:42 segfault");
    }
}
