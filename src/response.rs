use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::services::daily_session::DailySessionError;
use crate::services::generator::GenerationError;
use crate::srs::ReviewError;
use crate::store::StoreError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub success: bool,
    pub code: String,
    pub message: String,
    pub trace_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppError {
    pub status: StatusCode,
    pub code: String,
    pub message: String,
    pub is_operational: bool,
}

impl AppError {
    fn operational(status: StatusCode, code: &str, message: &str) -> Self {
        Self {
            status,
            code: code.to_string(),
            message: message.to_string(),
            is_operational: true,
        }
    }

    pub fn bad_request(code: &str, message: &str) -> Self {
        Self::operational(StatusCode::BAD_REQUEST, code, message)
    }

    pub fn not_found(message: &str) -> Self {
        Self::operational(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    pub fn conflict(code: &str, message: &str) -> Self {
        Self::operational(StatusCode::CONFLICT, code, message)
    }

    /// The upstream generation service failed; the client may retry.
    pub fn bad_gateway(code: &str, message: &str) -> Self {
        Self::operational(StatusCode::BAD_GATEWAY, code, message)
    }

    pub fn service_unavailable(code: &str, message: &str) -> Self {
        Self::operational(StatusCode::SERVICE_UNAVAILABLE, code, message)
    }

    pub fn internal(message: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "INTERNAL_ERROR".to_string(),
            message: message.to_string(),
            is_operational: false,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let exposed_message = if self.is_operational {
            self.message.clone()
        } else {
            "Internal server error".to_string()
        };

        if self.is_operational {
            tracing::warn!(status = %self.status, code = %self.code, error = %self.message, "API error");
        } else {
            tracing::error!(status = %self.status, code = %self.code, error = %self.message, "Internal API error");
        }

        (
            self.status,
            Json(ErrorBody {
                success: false,
                code: self.code,
                message: exposed_message,
                trace_id: None,
            }),
        )
            .into_response()
    }
}

// Validation, not-found and conflict carry user-facing messages. Everything
// else is an internal failure and gets redacted in `into_response`.
impl From<StoreError> for AppError {
    fn from(value: StoreError) -> Self {
        match &value {
            StoreError::Validation(msg) => AppError::bad_request("VALIDATION_ERROR", msg),
            StoreError::NotFound { entity, key } => {
                AppError::not_found(&format!("{entity} '{key}' not found"))
            }
            StoreError::Conflict { entity, key } => {
                AppError::conflict("CONFLICT", &format!("{entity} '{key}' already exists"))
            }
            _ => AppError::internal(&value.to_string()),
        }
    }
}

impl From<GenerationError> for AppError {
    fn from(value: GenerationError) -> Self {
        match value {
            GenerationError::Disabled => {
                AppError::service_unavailable("GENERATION_DISABLED", "Word generation is disabled")
            }
            GenerationError::Config(msg) => AppError::internal(&msg),
            other => AppError::bad_gateway(
                "GENERATION_FAILED",
                &format!("Failed to fetch new words, please try again later ({other})"),
            ),
        }
    }
}

impl From<DailySessionError> for AppError {
    fn from(value: DailySessionError) -> Self {
        match value {
            DailySessionError::InvalidCount => {
                AppError::bad_request("INVALID_COUNT", "count must be at least 1")
            }
            DailySessionError::Generation(e) => e.into(),
            e @ DailySessionError::InsufficientWords { .. } => {
                AppError::bad_gateway("GENERATION_FAILED", &e.to_string())
            }
            // A concurrent selection won the race; the client can simply retry.
            DailySessionError::Store(StoreError::Conflict { .. }) => AppError::conflict(
                "SESSION_BUSY",
                "Another request is selecting today's words, please retry",
            ),
            DailySessionError::Store(e) => e.into(),
        }
    }
}

impl From<ReviewError> for AppError {
    fn from(value: ReviewError) -> Self {
        match &value {
            ReviewError::InvalidTransition { .. } => {
                AppError::conflict("INVALID_TRANSITION", &value.to_string())
            }
            ReviewError::AlreadyChosen => AppError::conflict("ALREADY_CHOSEN", &value.to_string()),
            ReviewError::UnknownOption(_) => {
                AppError::bad_request("UNKNOWN_OPTION", &value.to_string())
            }
            ReviewError::MissingCard { .. } => AppError::internal(&value.to_string()),
        }
    }
}

pub fn ok<T: Serialize>(data: T) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(ApiResponse {
            success: true,
            data,
        }),
    )
}

pub fn created<T: Serialize>(data: T) -> impl IntoResponse {
    (
        StatusCode::CREATED,
        Json(ApiResponse {
            success: true,
            data,
        }),
    )
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use axum::response::IntoResponse;

    use super::*;

    async fn body_json(resp: Response) -> serde_json::Value {
        let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn internal_error_is_redacted() {
        let resp = AppError::internal("db crash").into_response();
        let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(!text.contains("db crash"));
        assert!(text.contains("Internal server error"));
    }

    #[tokio::test]
    async fn bad_request_keeps_message() {
        let resp = AppError::bad_request("BAD_INPUT", "invalid rating").into_response();
        let json = body_json(resp).await;
        assert_eq!(json["code"], "BAD_INPUT");
        assert_eq!(json["message"], "invalid rating");
        assert_eq!(json["success"], false);
    }

    #[test]
    fn store_errors_map_to_status() {
        let conflict: AppError = StoreError::conflict("vocabulary", "lucid").into();
        assert_eq!(conflict.status, StatusCode::CONFLICT);
        let missing: AppError = StoreError::not_found("vocabulary", "lucid").into();
        assert_eq!(missing.status, StatusCode::NOT_FOUND);
        let migration: AppError = StoreError::Migration {
            version: 1,
            message: "boom".into(),
        }
        .into();
        assert_eq!(migration.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!migration.is_operational);
    }

    #[test]
    fn generation_failure_is_bad_gateway() {
        let err: AppError = DailySessionError::Generation(GenerationError::Timeout).into();
        assert_eq!(err.status, StatusCode::BAD_GATEWAY);
        assert_eq!(err.code, "GENERATION_FAILED");
    }

    #[test]
    fn corrupt_session_is_internal() {
        let err: AppError = ReviewError::MissingCard { index: 9 }.into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.is_operational);
    }

    #[test]
    fn invalid_transition_is_conflict() {
        let err: AppError = ReviewError::InvalidTransition {
            action: "rate",
            state: "notStarted",
        }
        .into();
        assert_eq!(err.status, StatusCode::CONFLICT);
        assert_eq!(err.code, "INVALID_TRANSITION");
    }
}
