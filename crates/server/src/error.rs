//! HTTP error envelope for engine failures.
//!
//! Every failure becomes a JSON body `{ "success": false, "error": ... }`
//! with a status that reflects the failure class: caller mistakes are
//! 4xx, upstream Shopify trouble is 502. Remote status and body are
//! attached as `details` for diagnosis.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kundeshop_engine::{EngineError, ErrorBody};
use serde_json::json;

/// Wrapper so engine errors can be returned straight from handlers.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct AppError(#[from] pub EngineError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error = &self.0;

        let status = match error {
            EngineError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            EngineError::CollectNotFound { .. } => StatusCode::NOT_FOUND,
            EngineError::Config(_)
            | EngineError::Json(_)
            | EngineError::InvalidMetafieldValue { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            EngineError::Transport(_)
            | EngineError::RemoteApi { .. }
            | EngineError::CollectionCreationFailed { .. }
            | EngineError::MetafieldFetch { .. }
            | EngineError::MetafieldSave { .. } => StatusCode::BAD_GATEWAY,
        };

        if status.is_server_error() {
            tracing::error!(%error, "request failed");
        } else {
            tracing::info!(%error, "request rejected");
        }

        let mut body = json!({
            "success": false,
            "error": error.to_string(),
        });

        if let Some(remote_status) = error.status() {
            body["details"] = json!({ "shopify_status": remote_status });
            if let EngineError::RemoteApi { body: remote, .. } = error {
                body["details"]["shopify_body"] = match remote {
                    ErrorBody::Json(value) => value.clone(),
                    ErrorBody::Raw(text) => json!(text),
                };
            }
        }

        (status, Json(body)).into_response()
    }
}
