//! Transport-agnostic response values.

use http::StatusCode;
use serde_json::Value;

use crate::error::ApiError;

/// Outcome of one API operation, ready for a binding layer to write out.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: StatusCode,
    /// Canonical resource URI, set on 201 Created.
    pub location: Option<String>,
    /// JSON body; absent on 204 No Content.
    pub body: Option<Value>,
}

impl ApiResponse {
    /// 200 OK with a JSON body.
    pub fn ok(body: Value) -> Self {
        Self {
            status: StatusCode::OK,
            location: None,
            body: Some(body),
        }
    }

    /// 201 Created with a `Location` header and a JSON body.
    pub fn created(location: impl Into<String>, body: Value) -> Self {
        Self {
            status: StatusCode::CREATED,
            location: Some(location.into()),
            body: Some(body),
        }
    }

    /// 204 No Content.
    pub fn no_content() -> Self {
        Self {
            status: StatusCode::NO_CONTENT,
            location: None,
            body: None,
        }
    }

    /// Error response: the error's status with its wire document as body.
    pub fn error(error: &ApiError) -> Self {
        Self {
            status: error.status(),
            location: None,
            body: Some(error.to_document()),
        }
    }
}
