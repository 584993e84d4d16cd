//! Shared HTTP building blocks: response envelope, error mapping and
//! request extractors.

mod api_error;
mod extract;

pub use api_error::ApiError;
pub use extract::{ApiPath, ApiQuery, BadRequest, ValidatedJson};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Standard API response envelope.
///
/// On success: `{"success": true, "data": {...}}`.
/// On failure: `{"success": false, "data": null, "code": "overlap", "error": "..."}`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    /// Payload, `null` on failure
    pub data: Option<T>,
    /// Machine-readable error kind, omitted on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Human-readable error description, omitted on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            code: None,
            error: None,
        }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            code: Some(code.into()),
            error: Some(message.into()),
        }
    }
}
