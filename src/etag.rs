//! Entity tags for optimistic concurrency control.
//!
//! An [`ETag`] is an opaque, non-empty revision token. The store mints a fresh
//! random tag on every successful create or replace, so a stale tag presented
//! in `If-Match` reliably detects a lost-update race.
//!
//! Parsing accepts the raw token as well as the RFC 7232 header forms, so a
//! binding layer can hand `If-Match` values through unmodified:
//!
//! ```rust
//! use order_server::etag::ETag;
//!
//! let bare: ETag = "abc123".parse().unwrap();
//! let strong: ETag = "\"abc123\"".parse().unwrap();
//! let weak: ETag = "W/\"abc123\"".parse().unwrap();
//! assert_eq!(bare, strong);
//! assert_eq!(bare, weak);
//! ```

use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Opaque revision token for a stored resource.
///
/// Two tags are equal exactly when their opaque values are equal; nothing else
/// about the value carries meaning.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ETag(String);

impl ETag {
    /// Wrap an existing opaque value. Rejects empty (or all-whitespace) input.
    pub fn new(value: impl Into<String>) -> Result<Self, ETagError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ETagError::Empty);
        }
        Ok(Self(value))
    }

    /// Mint a fresh random tag for a new resource revision.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// The opaque token value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ETag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ETag {
    type Err = ETagError;

    /// Parse a bare token or an RFC 7232 header form (`"abc"`, `W/"abc"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ETagError::Empty);
        }

        let unprefixed = trimmed.strip_prefix("W/").unwrap_or(trimmed);
        if unprefixed.starts_with('"') || trimmed.len() != unprefixed.len() {
            // Quoted (or weak-prefixed) forms must be properly quoted.
            let inner = unprefixed
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .ok_or_else(|| ETagError::Malformed(s.to_string()))?;
            if inner.is_empty() {
                return Err(ETagError::Malformed(s.to_string()));
            }
            return Ok(Self(inner.to_string()));
        }

        Ok(Self(unprefixed.to_string()))
    }
}

/// Errors produced when constructing or parsing entity tags.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ETagError {
    #[error("ETag value cannot be empty")]
    Empty,

    #[error("malformed ETag header value: {0}")]
    Malformed(String),
}
