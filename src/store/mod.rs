//! Storage abstraction for versioned resources.
//!
//! The store owns the authoritative resource-to-revision mapping and is the
//! only shared mutable state in the system. The [`ResourceStore`] trait keeps
//! the contract small: five operations keyed by resource identifier, each an
//! atomic, single-roundtrip async call. Everything protocol-shaped — header
//! resolution, validation, status mapping — stays out of the store.
//!
//! # Concurrency contract
//!
//! For a single identifier, implementations must serialize concurrent create
//! and replace attempts so that at most one writer wins per revision: every
//! successful mutation mints a fresh [`ETag`], and a replace presented with a
//! stale tag must fail with [`ReplaceError::EtagMismatch`] rather than
//! overwrite. Callers treat each operation as the unit of cancellation;
//! dropping the future must not leave a partial mutation behind.

pub mod in_memory;

pub use in_memory::InMemoryStore;

use std::future::Future;

use crate::error::BackendError;
use crate::etag::ETag;
use crate::paging::{ContinuationToken, PageQuery};
use crate::resource::{ApiResource, ResourceId};

/// One page of list results: resources with their current revision tags, plus
/// a resume marker when more remain.
#[derive(Debug, Clone)]
pub struct Page<R> {
    pub items: Vec<(R, ETag)>,
    pub continuation: Option<ContinuationToken>,
}

/// Typed failure of a create operation.
#[derive(Debug, thiserror::Error)]
pub enum CreateError {
    /// A resource with the given id already exists.
    #[error("a resource with the given id already exists")]
    AlreadyExists,

    /// Unexpected storage fault; surfaces as a 500-level failure.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Typed failure of a replace operation.
#[derive(Debug, thiserror::Error)]
pub enum ReplaceError {
    /// No resource exists with the given id.
    #[error("no resource exists with the given id")]
    NotFound,

    /// The expected tag no longer names the current revision.
    #[error("the expected entity tag does not match the current revision")]
    EtagMismatch,

    /// Unexpected storage fault; surfaces as a 500-level failure.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Backing store for one resource kind.
///
/// Injected into the request handler at construction time; the handler never
/// reaches a store any other way.
pub trait ResourceStore<R: ApiResource>: Send + Sync {
    /// Store a new resource under its id.
    ///
    /// Fails with [`CreateError::AlreadyExists`] when the id is taken; on
    /// success the returned tag names the initial revision.
    fn create(&self, resource: R) -> impl Future<Output = Result<ETag, CreateError>> + Send;

    /// Replace an existing resource, guarded by its expected revision tag.
    ///
    /// Fails with [`ReplaceError::NotFound`] when the id is absent and
    /// [`ReplaceError::EtagMismatch`] when `expected` is stale; on success the
    /// returned tag names the new revision and never repeats an earlier one.
    fn replace(
        &self,
        expected: &ETag,
        resource: R,
    ) -> impl Future<Output = Result<ETag, ReplaceError>> + Send;

    /// Fetch a resource and its current revision tag.
    fn find(
        &self,
        id: ResourceId,
    ) -> impl Future<Output = Result<Option<(R, ETag)>, BackendError>> + Send;

    /// Remove a resource. Idempotent: deleting an absent id is not an error
    /// and reports nothing about prior existence.
    fn delete(&self, id: ResourceId) -> impl Future<Output = Result<(), BackendError>> + Send;

    /// List a page of resources in a stable order.
    ///
    /// The page honors `skip`/`top`/`maxPageSize` and resumes after the
    /// query's continuation token; a token is returned exactly when more
    /// resources remain past the page.
    fn list(
        &self,
        query: &PageQuery,
    ) -> impl Future<Output = Result<Page<R>, BackendError>> + Send;
}
