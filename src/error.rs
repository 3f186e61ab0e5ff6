// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
///
/// The flow variants carry a human-readable `message` and the `action`
/// (the step that failed) so the caller can show both to the user.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("{message} (while {action})")]
    AuthExchange { message: String, action: &'static str },

    #[error("{message} (while {action})")]
    VehicleInfo { message: String, action: &'static str },

    #[error("{message} (while {action})")]
    LocationFetch { message: String, action: &'static str },

    #[error("{message} (while {action})")]
    DistanceQuery { message: String, action: &'static str },

    #[error("{message} (while {action})")]
    Command { message: String, action: &'static str },

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub const EXCHANGE_ACTION: &'static str = "exchanging authorization code for access token";
    pub const VEHICLE_INFO_ACTION: &'static str = "fetching vehicle info";
    pub const LOCATION_ACTION: &'static str = "fetching vehicle location";
    pub const DISTANCE_ACTION: &'static str = "querying drive durations";

    /// Human-readable message and failed step, for flow errors only.
    pub fn report(&self) -> Option<(&str, &'static str)> {
        match self {
            AppError::AuthExchange { message, action }
            | AppError::VehicleInfo { message, action }
            | AppError::LocationFetch { message, action }
            | AppError::DistanceQuery { message, action }
            | AppError::Command { message, action } => Some((message.as_str(), action)),
            _ => None,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::Unauthorized => "unauthorized",
            AppError::NotFound(_) => "not_found",
            AppError::BadRequest(_) => "bad_request",
            AppError::AuthExchange { .. } => "auth_exchange_error",
            AppError::VehicleInfo { .. } => "vehicle_info_error",
            AppError::LocationFetch { .. } => "location_fetch_error",
            AppError::DistanceQuery { .. } => "distance_query_error",
            AppError::Command { .. } => "command_error",
            AppError::Internal(_) => "internal_error",
        }
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    action: Option<&'static str>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, action) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, None, None),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, Some(msg.clone()), None),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, Some(msg.clone()), None),
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, None, None)
            }
            flow => {
                let (message, action) = flow.report().unwrap_or(("", ""));
                tracing::warn!(error = flow.code(), %message, action, "Request flow failed");
                (
                    StatusCode::BAD_GATEWAY,
                    Some(message.to_string()),
                    Some(action),
                )
            }
        };

        let body = ErrorResponse {
            error: self.code(),
            message,
            action,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_flow_error_body_has_message_and_action() {
        let err = AppError::LocationFetch {
            message: "Vehicle is offline".to_string(),
            action: AppError::LOCATION_ACTION,
        };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let body = axum::body::to_bytes(response.into_body(), 1024)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "location_fetch_error");
        assert_eq!(json["message"], "Vehicle is offline");
        assert_eq!(json["action"], "fetching vehicle location");
    }

    #[tokio::test]
    async fn test_internal_error_hides_detail() {
        let err = AppError::Internal(anyhow::anyhow!("mutex poisoned at line 42"));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), 1024)
            .await
            .unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(!text.contains("mutex"));
    }
}
