//! Resource identity and the per-kind codec seam.
//!
//! A resource kind plugs into the request handler through two small traits:
//! [`ApiResource`] names the kind and exposes its identifier, and
//! [`ResourceCodec`] converts between the domain value and its JSON document.
//! Everything else in the crate — conditional dispatch, store access, paging —
//! is generic over these, so adding a resource kind means implementing the two
//! traits, not duplicating the protocol.

pub mod order;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::error::ApiError;

/// Opaque unique key identifying one resource instance.
///
/// Supplied by the client in the request path, never generated server-side,
/// and immutable once assigned. Serializes as the hyphenated UUID string.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ResourceId(Uuid);

impl ResourceId {
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Parse a route segment into an identifier.
    pub fn parse(segment: &str) -> Result<Self, ResourceIdError> {
        segment.parse()
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }

    /// The all-zero placeholder id, used while validating a body whose route
    /// identifier already failed to parse.
    pub(crate) fn nil() -> Self {
        Self(Uuid::nil())
    }
}

impl FromStr for ResourceId {
    type Err = ResourceIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| ResourceIdError::InvalidGuid)
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Failure to parse a route segment as a resource identifier.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ResourceIdError {
    #[error("ID must be a valid GUID.")]
    InvalidGuid,
}

/// A resource kind exposed through the API.
pub trait ApiResource: Clone + Send + Sync + 'static {
    /// Singular kind name used in error messages, e.g. `"order"`.
    const KIND: &'static str;

    /// The instance's identifier.
    fn id(&self) -> ResourceId;
}

/// Converts a resource kind to and from its JSON document.
///
/// `deserialize` is applicative: every field is validated independently and
/// all failures are collected into one [`ApiError`] whose `details` list the
/// per-field errors. `serialize` is total and is the structural inverse of
/// `deserialize` for every valid resource.
pub trait ResourceCodec<R>: Send + Sync {
    /// Validate a document against the kind's model, binding it to the
    /// identifier taken from the request route.
    fn deserialize(&self, id: ResourceId, document: &Value) -> Result<R, ApiError>;

    /// Serialize the complete resource. Field projection, if any, is applied
    /// by the caller afterwards.
    fn serialize(&self, resource: &R) -> Value;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_canonical_uuid() {
        let id = ResourceId::parse("8f8b7a36-6a1c-4f8f-9a6f-3d2f6a1c4f8f").unwrap();
        assert_eq!(id.to_string(), "8f8b7a36-6a1c-4f8f-9a6f-3d2f6a1c4f8f");
    }

    #[test]
    fn rejects_non_uuid_segments() {
        assert_eq!(
            ResourceId::parse("not-a-guid"),
            Err(ResourceIdError::InvalidGuid)
        );
        assert_eq!(ResourceId::parse(""), Err(ResourceIdError::InvalidGuid));
        assert_eq!(
            ResourceIdError::InvalidGuid.to_string(),
            "ID must be a valid GUID."
        );
    }

    #[test]
    fn trims_surrounding_whitespace() {
        let id = ResourceId::parse(" 8f8b7a36-6a1c-4f8f-9a6f-3d2f6a1c4f8f ").unwrap();
        assert_eq!(id.to_string(), "8f8b7a36-6a1c-4f8f-9a6f-3d2f6a1c4f8f");
    }
}
