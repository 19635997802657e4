//! List-request paging: query parsing, field projection, page assembly.
//!
//! A list request carries up to five query parameters: `skip`, `top`,
//! `maxPageSize`, `select` (a comma-separated column allow-list), and
//! `continuationToken` (an opaque resume marker minted by the store). The
//! response document is `{"value": [...], "nextLink"?: "..."}` where
//! `nextLink` is the current request URI with the fresh continuation token
//! swapped in — paging resumes by following the link verbatim.

use serde_json::{Value, json};

use crate::error::ApiError;

/// Opaque cursor for resuming a list operation.
///
/// Minted by the store, echoed back by the client via the `continuationToken`
/// query parameter. The crate never interprets its contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContinuationToken(String);

impl ContinuationToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Paging parameters handed to the store's list operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageQuery {
    /// Resources to skip past before the page starts.
    pub skip: Option<usize>,
    /// Requested page size.
    pub top: Option<usize>,
    /// Upper bound on the page size, whatever `top` asks for.
    pub max_page_size: Option<usize>,
    /// Resume marker from a previous page's `nextLink`.
    pub continuation: Option<ContinuationToken>,
}

/// Everything parsed out of a list request's query string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListParams {
    pub page: PageQuery,
    pub select: Option<SelectProjection>,
}

/// Case-insensitive top-level field allow-list from the `select` parameter.
///
/// Applied after serialization: the codec always produces the complete
/// document, and projection strips top-level keys afterwards. The `eTag`
/// field is always retained.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectProjection {
    fields: Vec<String>,
}

impl SelectProjection {
    /// Parse a comma-separated field list. Blank entries are dropped; a list
    /// with no usable entries means no projection at all.
    pub fn parse(raw: &str) -> Option<Self> {
        let fields: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_string)
            .collect();
        if fields.is_empty() { None } else { Some(Self { fields }) }
    }

    /// Strip every top-level key not selected (and not `eTag`).
    pub fn apply(&self, document: &mut Value) {
        if let Some(obj) = document.as_object_mut() {
            obj.retain(|key, _| {
                key.eq_ignore_ascii_case("etag")
                    || self.fields.iter().any(|f| f.eq_ignore_ascii_case(key))
            });
        }
    }
}

/// Parse the decoded query pairs of a list request.
///
/// Malformed numeric parameters are client errors; every bad parameter is
/// reported, folded into one 400 when there are several. Unknown parameters
/// are ignored. A repeated parameter's last occurrence wins.
pub fn parse_list_params(query: &[(String, String)]) -> Result<ListParams, ApiError> {
    let mut errors = Vec::new();
    let mut params = ListParams::default();

    for (name, value) in query {
        match name.as_str() {
            "skip" => params.page.skip = parse_count("skip", value, &mut errors),
            "top" => params.page.top = parse_count("top", value, &mut errors),
            "maxPageSize" => {
                params.page.max_page_size = parse_count("maxPageSize", value, &mut errors)
            }
            "continuationToken" => {
                if !value.is_empty() {
                    params.page.continuation = Some(ContinuationToken::new(value.clone()));
                }
            }
            "select" => params.select = SelectProjection::parse(value),
            _ => {}
        }
    }

    if errors.is_empty() {
        Ok(params)
    } else {
        Err(ApiError::combine(errors))
    }
}

fn parse_count(name: &str, value: &str, errors: &mut Vec<ApiError>) -> Option<usize> {
    match value.parse::<usize>() {
        Ok(count) => Some(count),
        Err(_) => {
            errors.push(ApiError::invalid_route_value(format!(
                "Query parameter '{name}' must be a non-negative integer, got '{value}'"
            )));
            None
        }
    }
}

/// Build the list response document from already-serialized items.
pub fn assemble_page(
    items: Vec<Value>,
    continuation: Option<&ContinuationToken>,
    request_uri: &str,
) -> Value {
    match continuation {
        Some(token) => json!({
            "value": items,
            "nextLink": with_continuation(request_uri, token),
        }),
        None => json!({ "value": items }),
    }
}

/// The current request URI with `continuationToken` replaced (or appended).
///
/// Other query parameters are carried over verbatim, so the link repeats the
/// caller's `top`/`select`/etc. Token values are URL-safe by construction.
pub fn with_continuation(request_uri: &str, token: &ContinuationToken) -> String {
    let (path, query) = match request_uri.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (request_uri, None),
    };

    let mut result = format!("{path}?");
    for param in query.into_iter().flat_map(|q| q.split('&')) {
        if param.is_empty() || param.split('=').next() == Some("continuationToken") {
            continue;
        }
        result.push_str(param);
        result.push('&');
    }
    result.push_str("continuationToken=");
    result.push_str(token.as_str());
    result
}
