use axum::Json;
use serde::Serialize;

use crate::error::ApiError;

/// Handlers return bare JSON on success; failures render through `ApiError`.
pub type ApiResult<T> = Result<Json<T>, ApiError>;

/// `{status, message}` acknowledgement for write endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct StatusMessage {
    pub status: &'static str,
    pub message: String,
}

impl StatusMessage {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: "success",
            message: message.into(),
        }
    }
}
