//! Conditional header resolution for create-or-replace requests.
//!
//! A PUT against the order API must carry exactly one of the two HTTP
//! conditional headers, and that header selects the operation:
//!
//! * `If-None-Match: *` — create the resource, which must not exist yet.
//! * `If-Match: <etag>` — replace the resource, which must still be at the
//!   named revision.
//!
//! [`resolve_conditional_headers`] is a total, pure function over the header
//! multisets; it performs no I/O and either yields a
//! [`ConditionalHeaderAction`] or rejects the request.

use crate::error::ApiError;
use crate::etag::ETag;

/// The operation a request's conditional headers selected.
///
/// Derived purely from the headers and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionalHeaderAction {
    /// `If-None-Match: *` — create; no prior revision may exist.
    Create,
    /// `If-Match: <etag>` — replace; the prior revision must carry this tag.
    Update(ETag),
}

/// Decide between create and replace from the request's conditional headers.
///
/// The rules are checked in order; the first match wins:
///
/// 1. Both headers present — 400.
/// 2. Exactly one `If-Match` value — `Update` with that tag.
/// 3. More than one `If-Match` value — 400.
/// 4. Exactly one `If-None-Match` value equal to `*` — `Create`.
/// 5. More than one `If-None-Match` value — 400.
/// 6. One `If-None-Match` value that is not `*` — 400.
/// 7. Neither header — 428 Precondition Required.
pub fn resolve_conditional_headers(
    if_match: &[String],
    if_none_match: &[String],
) -> Result<ConditionalHeaderAction, ApiError> {
    match (if_match, if_none_match) {
        ([_, ..], [_, ..]) => Err(ApiError::invalid_conditional_header(
            "Cannot specify both If-Match and If-None-Match headers",
        )),
        ([value], []) => {
            let etag = value.parse::<ETag>().map_err(|_| {
                ApiError::invalid_conditional_header(
                    "If-Match header must carry a non-empty entity tag",
                )
            })?;
            Ok(ConditionalHeaderAction::Update(etag))
        }
        ([_, _, ..], []) => Err(ApiError::invalid_conditional_header(
            "Can only specify one If-Match header",
        )),
        ([], [wildcard]) if wildcard == "*" => Ok(ConditionalHeaderAction::Create),
        ([], [_, _, ..]) => Err(ApiError::invalid_conditional_header(
            "Can only specify one If-None-Match header",
        )),
        ([], [_]) => Err(ApiError::invalid_conditional_header(
            "If-None-Match header must be '*'",
        )),
        ([], []) => Err(ApiError::precondition_required(
            "One of If-Match or If-None-Match must be specified",
        )),
    }
}
