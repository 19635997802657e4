//! In-memory store implementation.
//!
//! Thread-safe map-backed [`ResourceStore`] used in tests and demos. Every
//! mutation happens inside one tokio `RwLock` write-lock critical section, so
//! concurrent writers against the same identifier are serialized and at most
//! one wins per revision. Listing iterates in identifier order, which keeps
//! pages stable across requests; the continuation token is the base64url of
//! the last-returned identifier and resumption starts strictly after it.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use log::debug;
use tokio::sync::RwLock;

use crate::error::BackendError;
use crate::etag::ETag;
use crate::paging::{ContinuationToken, PageQuery};
use crate::resource::{ApiResource, ResourceId};
use crate::store::{CreateError, Page, ReplaceError, ResourceStore};

/// Page size used when a list request names neither `top` nor `maxPageSize`.
const DEFAULT_PAGE_SIZE: usize = 50;

/// Map-backed store keyed by resource identifier.
#[derive(Clone)]
pub struct InMemoryStore<R> {
    data: Arc<RwLock<BTreeMap<ResourceId, (R, ETag)>>>,
}

impl<R> InMemoryStore<R> {
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    /// Number of stored resources.
    pub async fn len(&self) -> usize {
        self.data.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.data.read().await.is_empty()
    }

    /// Drop all stored resources.
    pub async fn clear(&self) {
        self.data.write().await.clear();
    }
}

impl<R> Default for InMemoryStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

fn encode_token(id: ResourceId) -> ContinuationToken {
    ContinuationToken::new(URL_SAFE_NO_PAD.encode(id.to_string()))
}

fn decode_token(token: &ContinuationToken) -> Result<ResourceId, BackendError> {
    let malformed = || BackendError::msg("malformed continuation token");
    let bytes = URL_SAFE_NO_PAD.decode(token.as_str()).map_err(|_| malformed())?;
    let text = String::from_utf8(bytes).map_err(|_| malformed())?;
    ResourceId::parse(&text).map_err(|_| malformed())
}

impl<R: ApiResource> ResourceStore<R> for InMemoryStore<R> {
    async fn create(&self, resource: R) -> Result<ETag, CreateError> {
        let mut data = self.data.write().await;
        let id = resource.id();
        if data.contains_key(&id) {
            return Err(CreateError::AlreadyExists);
        }
        let etag = ETag::generate();
        data.insert(id, (resource, etag.clone()));
        debug!("created {} {id} at revision {etag}", R::KIND);
        Ok(etag)
    }

    async fn replace(&self, expected: &ETag, resource: R) -> Result<ETag, ReplaceError> {
        let mut data = self.data.write().await;
        let id = resource.id();
        match data.get_mut(&id) {
            None => Err(ReplaceError::NotFound),
            Some((_, current)) if current != expected => {
                debug!(
                    "replace of {} {id} rejected: expected revision {expected}, current {current}",
                    R::KIND
                );
                Err(ReplaceError::EtagMismatch)
            }
            Some(entry) => {
                let etag = ETag::generate();
                *entry = (resource, etag.clone());
                debug!("replaced {} {id}, new revision {etag}", R::KIND);
                Ok(etag)
            }
        }
    }

    async fn find(&self, id: ResourceId) -> Result<Option<(R, ETag)>, BackendError> {
        Ok(self.data.read().await.get(&id).cloned())
    }

    async fn delete(&self, id: ResourceId) -> Result<(), BackendError> {
        let existed = self.data.write().await.remove(&id).is_some();
        debug!("deleted {} {id} (existed: {existed})", R::KIND);
        Ok(())
    }

    async fn list(&self, query: &PageQuery) -> Result<Page<R>, BackendError> {
        let data = self.data.read().await;

        let lower = match &query.continuation {
            Some(token) => Bound::Excluded(decode_token(token)?),
            None => Bound::Unbounded,
        };

        let size = query.top.unwrap_or(DEFAULT_PAGE_SIZE);
        let size = query.max_page_size.map_or(size, |cap| size.min(cap));
        if size == 0 {
            return Ok(Page {
                items: Vec::new(),
                continuation: None,
            });
        }

        let mut range = data
            .range((lower, Bound::Unbounded))
            .skip(query.skip.unwrap_or(0));
        let items: Vec<(R, ETag)> = range
            .by_ref()
            .take(size)
            .map(|(_, (resource, etag))| (resource.clone(), etag.clone()))
            .collect();
        let continuation = if range.next().is_some() {
            items.last().map(|(resource, _)| encode_token(resource.id()))
        } else {
            None
        };

        Ok(Page {
            items,
            continuation,
        })
    }
}
