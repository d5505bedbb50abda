//! Data transfer objects for web requests and responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::domain::ReportKind;

/// Query string of the report endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    /// Comma-separated station codes
    #[serde(default)]
    pub icao: String,

    /// Render reports as `<pre>` blocks instead of JSON
    #[serde(default)]
    pub raw: bool,
}

impl ReportQuery {
    /// The requested codes, split on commas. Never empty.
    pub fn codes(&self) -> Vec<&str> {
        self.icao.split(',').collect()
    }
}

/// Outcome classes of an API call, each with its envelope code and HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiStatus {
    Success,
    ParamError,
    NotFound(ReportKind),
    RateLimitExceeded,
    ServerError,
}

impl ApiStatus {
    /// Machine-readable code carried in the envelope.
    pub fn code(&self) -> &'static str {
        match self {
            ApiStatus::Success => "SUCCESS",
            ApiStatus::ParamError => "PARAM_ERROR",
            ApiStatus::NotFound(_) => "NOT_FOUND",
            ApiStatus::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            ApiStatus::ServerError => "SERVER_ERROR",
        }
    }

    pub fn message(&self) -> String {
        match self {
            ApiStatus::Success => "Success".to_string(),
            ApiStatus::ParamError => "Invalid parameter".to_string(),
            ApiStatus::NotFound(kind) => format!("{} not found", kind.label()),
            ApiStatus::RateLimitExceeded => "Rate limit exceeded".to_string(),
            ApiStatus::ServerError => "Server error".to_string(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiStatus::Success => StatusCode::OK,
            ApiStatus::ParamError => StatusCode::BAD_REQUEST,
            ApiStatus::NotFound(_) => StatusCode::NOT_FOUND,
            ApiStatus::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            ApiStatus::ServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON envelope returned by every API endpoint.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    #[serde(skip)]
    pub status: StatusCode,

    pub code: &'static str,
    pub message: String,

    /// Payload; `null` on failure
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Envelope with a payload.
    pub fn success(data: T) -> Self {
        Self::new(ApiStatus::Success, Some(data))
    }

    /// Envelope with a `null` payload.
    pub fn failure(status: ApiStatus) -> Self {
        Self::new(status, None)
    }

    fn new(status: ApiStatus, data: Option<T>) -> Self {
        Self {
            status: status.status_code(),
            code: status.code(),
            message: status.message(),
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}
