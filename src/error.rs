//! Error types for order API operations.
//!
//! Every client-visible failure is an [`ApiError`]: a machine-readable code from
//! a closed enumeration, a human-readable message, and an optional list of
//! nested sub-errors for multi-field validation failures. The wire shape is
//! `{"code": ..., "message": ..., "details": [...]}`.
//!
//! Unexpected storage faults are not `ApiError`s. They surface as
//! [`BackendError`] and propagate out of the request handler as `Err`, so the
//! binding layer can answer with a 500-level response instead of the crate
//! silently mapping them onto a client-error code.

use http::StatusCode;
use serde_json::{Value, json};

/// Machine-readable error codes exposed to API clients.
///
/// The set is closed: every failure the API can report maps to exactly one of
/// these codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiErrorCode {
    ResourceNotFound,
    ResourceAlreadyExists,
    InvalidConditionalHeader,
    InvalidJsonBody,
    InvalidRouteValue,
    ETagMismatch,
}

impl ApiErrorCode {
    /// The code's wire name, as it appears in the error body.
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiErrorCode::ResourceNotFound => "ResourceNotFound",
            ApiErrorCode::ResourceAlreadyExists => "ResourceAlreadyExists",
            ApiErrorCode::InvalidConditionalHeader => "InvalidConditionalHeader",
            ApiErrorCode::InvalidJsonBody => "InvalidJsonBody",
            ApiErrorCode::InvalidRouteValue => "InvalidRouteValue",
            ApiErrorCode::ETagMismatch => "ETagMismatch",
        }
    }
}

/// Structured error returned to API clients.
///
/// Constructed per request and never stored. The HTTP status is carried
/// alongside the code because the same code can map to more than one status
/// (`InvalidConditionalHeader` is 400 for malformed headers but 428 when no
/// conditional header was supplied at all).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
    pub details: Vec<ApiError>,
    status: StatusCode,
}

impl ApiError {
    fn new(code: ApiErrorCode, status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: Vec::new(),
            status,
        }
    }

    /// 404: no resource exists with the given id.
    pub fn resource_not_found(kind: &str, id: impl std::fmt::Display) -> Self {
        Self::new(
            ApiErrorCode::ResourceNotFound,
            StatusCode::NOT_FOUND,
            format!("No {kind} resource exists with id '{id}'"),
        )
    }

    /// 409: a create was attempted for an id that is already taken.
    pub fn already_exists(kind: &str, id: impl std::fmt::Display) -> Self {
        Self::new(
            ApiErrorCode::ResourceAlreadyExists,
            StatusCode::CONFLICT,
            format!("A {kind} resource with id '{id}' already exists"),
        )
    }

    /// 412: the supplied entity tag no longer names the current revision.
    pub fn etag_mismatch() -> Self {
        Self::new(
            ApiErrorCode::ETagMismatch,
            StatusCode::PRECONDITION_FAILED,
            "The supplied ETag does not match the current resource revision; \
             fetch the resource again and retry with the fresh ETag",
        )
    }

    /// 400: the conditional headers are present but malformed.
    pub fn invalid_conditional_header(message: impl Into<String>) -> Self {
        Self::new(
            ApiErrorCode::InvalidConditionalHeader,
            StatusCode::BAD_REQUEST,
            message,
        )
    }

    /// 428: no conditional header was supplied where one is required.
    pub fn precondition_required(message: impl Into<String>) -> Self {
        Self::new(
            ApiErrorCode::InvalidConditionalHeader,
            StatusCode::PRECONDITION_REQUIRED,
            message,
        )
    }

    /// 400: the request body is missing, not JSON, or failed validation.
    pub fn invalid_json_body(message: impl Into<String>) -> Self {
        Self::new(
            ApiErrorCode::InvalidJsonBody,
            StatusCode::BAD_REQUEST,
            message,
        )
    }

    /// 400: a path segment or query parameter could not be parsed.
    pub fn invalid_route_value(message: impl Into<String>) -> Self {
        Self::new(
            ApiErrorCode::InvalidRouteValue,
            StatusCode::BAD_REQUEST,
            message,
        )
    }

    /// Field-level validation failure, nested under an `invalid_json_body`.
    pub fn invalid_field(field: impl std::fmt::Display, detail: impl std::fmt::Display) -> Self {
        Self::invalid_json_body(format!("'{field}' {detail}"))
    }

    /// Attach nested sub-errors.
    pub fn with_details(mut self, details: Vec<ApiError>) -> Self {
        self.details = details;
        self
    }

    /// Fold several independent request failures into one error.
    ///
    /// A single failure is returned unchanged. Multiple failures become one
    /// error carrying each component in `details`; the combined code and
    /// message come from the first component, and the combined status is 400
    /// whenever any component is a 400 (428 is the only other status a
    /// component can carry). An empty input degenerates to a generic 400.
    pub fn combine(mut errors: Vec<ApiError>) -> ApiError {
        match errors.len() {
            0 => Self::invalid_json_body("The request failed validation"),
            1 => errors.remove(0),
            _ => {
                let status = if errors.iter().any(|e| e.status == StatusCode::BAD_REQUEST) {
                    StatusCode::BAD_REQUEST
                } else {
                    errors[0].status
                };
                ApiError {
                    code: errors[0].code,
                    message: "The request failed validation".to_string(),
                    details: errors,
                    status,
                }
            }
        }
    }

    /// HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Wire representation: `{"code": ..., "message": ..., "details": [...]}`.
    pub fn to_document(&self) -> Value {
        json!({
            "code": self.code.as_str(),
            "message": self.message,
            "details": self.details.iter().map(ApiError::to_document).collect::<Vec<_>>(),
        })
    }
}

/// Unexpected fault in the storage backend.
///
/// Wraps whatever error the backend produced. Request handlers propagate this
/// verbatim; it is never translated into an [`ApiError`].
#[derive(Debug, thiserror::Error)]
#[error("storage backend failure: {0}")]
pub struct BackendError(#[source] pub Box<dyn std::error::Error + Send + Sync>);

impl BackendError {
    pub fn new<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self(Box::new(error))
    }

    /// A backend failure described only by a message.
    pub fn msg(message: impl Into<String>) -> Self {
        Self(message.into().into())
    }
}

/// Result alias for request-handler outcomes.
pub type BackendResult<T> = Result<T, BackendError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(
            ApiError::resource_not_found("order", "abc").status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::already_exists("order", "abc").status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::etag_mismatch().status(),
            StatusCode::PRECONDITION_FAILED
        );
        assert_eq!(
            ApiError::invalid_conditional_header("x").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::precondition_required("x").status(),
            StatusCode::PRECONDITION_REQUIRED
        );
    }

    #[test]
    fn wire_shape() {
        let err = ApiError::invalid_json_body("The request body failed validation")
            .with_details(vec![ApiError::invalid_field("pizzas", "is required")]);
        let doc = err.to_document();
        assert_eq!(doc["code"], "InvalidJsonBody");
        assert_eq!(doc["message"], "The request body failed validation");
        assert_eq!(doc["details"][0]["code"], "InvalidJsonBody");
        assert_eq!(doc["details"][0]["message"], "'pizzas' is required");
        assert_eq!(doc["details"][0]["details"].as_array().map(Vec::len), Some(0));
    }

    #[test]
    fn combine_single_error_passes_through() {
        let combined = ApiError::combine(vec![ApiError::etag_mismatch()]);
        assert_eq!(combined.code, ApiErrorCode::ETagMismatch);
        assert!(combined.details.is_empty());
    }

    #[test]
    fn combine_prefers_bad_request_status() {
        let combined = ApiError::combine(vec![
            ApiError::precondition_required("one of If-Match or If-None-Match must be specified"),
            ApiError::invalid_route_value("ID must be a valid GUID."),
        ]);
        assert_eq!(combined.status(), StatusCode::BAD_REQUEST);
        assert_eq!(combined.code, ApiErrorCode::InvalidConditionalHeader);
        assert_eq!(combined.details.len(), 2);
    }
}
