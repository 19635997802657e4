//! The request orchestrator: the state machine at the center of the API.
//!
//! [`ResourceHandler`] ties together identifier parsing, conditional-header
//! resolution, body validation, store dispatch, and response construction.
//! It is framework-agnostic: a binding layer hands it structured request
//! values and writes out the returned [`ApiResponse`]; routing, content
//! negotiation, and OpenAPI stay outside.
//!
//! A create-or-replace request runs its three parsing stages independently —
//! route identifier, conditional headers, body — and gathers every failure
//! into one combined error, so a client fixing a request sees all problems at
//! once. Store dispatch happens only when all three stages succeed.
//!
//! Unexpected storage faults are returned as `Err(BackendError)` and are the
//! binding layer's 500; every enumerated outcome is an `Ok(ApiResponse)`.
//! Handler futures are cancel-safe: dropping one abandons the in-flight store
//! call, which is the unit of cancellation.

pub mod response;

pub use response::ApiResponse;

use std::marker::PhantomData;

use log::{debug, info, warn};
use serde_json::Value;

use crate::conditional::{ConditionalHeaderAction, resolve_conditional_headers};
use crate::error::{ApiError, BackendResult};
use crate::etag::ETag;
use crate::paging;
use crate::resource::{ApiResource, ResourceCodec, ResourceId};
use crate::store::{CreateError, ReplaceError, ResourceStore};

/// A create-or-replace request (`PUT /{id}`).
#[derive(Debug, Clone)]
pub struct PutRequest<'a> {
    /// The id path segment (the last segment of the request path).
    pub id_segment: &'a str,
    /// All `If-Match` header values, in order.
    pub if_match: &'a [String],
    /// All `If-None-Match` header values, in order.
    pub if_none_match: &'a [String],
    /// Raw request body text, if any was sent.
    pub body: Option<&'a str>,
    /// The request URI; becomes the `Location` of a 201.
    pub request_uri: &'a str,
}

/// A single-resource fetch (`GET /{id}`).
#[derive(Debug, Clone)]
pub struct GetRequest<'a> {
    pub id_segment: &'a str,
}

/// An idempotent delete (`DELETE /{id}`).
#[derive(Debug, Clone)]
pub struct DeleteRequest<'a> {
    pub id_segment: &'a str,
}

/// A paged list (`GET /`).
#[derive(Debug, Clone)]
pub struct ListRequest<'a> {
    /// Decoded query pairs, in order of appearance.
    pub query: &'a [(String, String)],
    /// The request URI including its query string; `nextLink` is derived
    /// from it.
    pub request_uri: &'a str,
}

/// Request orchestrator for one resource kind.
///
/// Generic over the resource kind, its store, and its codec; the store and
/// codec are injected at construction time.
pub struct ResourceHandler<R, S, C> {
    store: S,
    codec: C,
    _resource: PhantomData<fn() -> R>,
}

impl<R, S, C> ResourceHandler<R, S, C>
where
    R: ApiResource,
    S: ResourceStore<R>,
    C: ResourceCodec<R>,
{
    pub fn new(store: S, codec: C) -> Self {
        Self {
            store,
            codec,
            _resource: PhantomData,
        }
    }

    /// Create-or-replace, selected by the request's conditional headers.
    pub async fn put(&self, request: PutRequest<'_>) -> BackendResult<ApiResponse> {
        let id = ResourceId::parse(request.id_segment)
            .map_err(|e| ApiError::invalid_route_value(e.to_string()));
        let action = resolve_conditional_headers(request.if_match, request.if_none_match);
        let resource = self.parse_body(&id, request.body);

        let (id, action, resource) = match (id, action, resource) {
            (Ok(id), Ok(action), Ok(resource)) => (id, action, resource),
            (id, action, resource) => {
                // Combined code/status follow the header failure first: the
                // conditional-header contract holds regardless of body or id
                // validity.
                let errors: Vec<ApiError> = [action.err(), id.err(), resource.err()]
                    .into_iter()
                    .flatten()
                    .collect();
                let combined = ApiError::combine(errors);
                warn!(
                    "PUT {}/{} rejected: {}",
                    R::KIND,
                    request.id_segment,
                    combined
                );
                return Ok(ApiResponse::error(&combined));
            }
        };

        match action {
            ConditionalHeaderAction::Create => {
                info!("PUT {}/{id}: create", R::KIND);
                match self.store.create(resource.clone()).await {
                    Ok(etag) => {
                        debug!("created {}/{id} at revision {etag}", R::KIND);
                        Ok(ApiResponse::created(
                            request.request_uri,
                            self.document_with_etag(&resource, &etag),
                        ))
                    }
                    Err(CreateError::AlreadyExists) => {
                        warn!("create of {}/{id} conflicted: id already taken", R::KIND);
                        Ok(ApiResponse::error(&ApiError::already_exists(R::KIND, id)))
                    }
                    Err(CreateError::Backend(e)) => Err(e),
                }
            }
            ConditionalHeaderAction::Update(expected) => {
                info!("PUT {}/{id}: replace at revision {expected}", R::KIND);
                match self.store.replace(&expected, resource.clone()).await {
                    Ok(etag) => {
                        debug!("replaced {}/{id}, new revision {etag}", R::KIND);
                        Ok(ApiResponse::ok(self.document_with_etag(&resource, &etag)))
                    }
                    Err(ReplaceError::NotFound) => {
                        Ok(ApiResponse::error(&ApiError::resource_not_found(R::KIND, id)))
                    }
                    Err(ReplaceError::EtagMismatch) => {
                        warn!("replace of {}/{id} rejected: stale revision {expected}", R::KIND);
                        Ok(ApiResponse::error(&ApiError::etag_mismatch()))
                    }
                    Err(ReplaceError::Backend(e)) => Err(e),
                }
            }
        }
    }

    /// Fetch one resource.
    pub async fn get(&self, request: GetRequest<'_>) -> BackendResult<ApiResponse> {
        let id = match ResourceId::parse(request.id_segment) {
            Ok(id) => id,
            Err(e) => {
                return Ok(ApiResponse::error(&ApiError::invalid_route_value(
                    e.to_string(),
                )));
            }
        };

        match self.store.find(id).await? {
            Some((resource, etag)) => {
                debug!("GET {}/{id}: revision {etag}", R::KIND);
                Ok(ApiResponse::ok(self.document_with_etag(&resource, &etag)))
            }
            None => Ok(ApiResponse::error(&ApiError::resource_not_found(
                R::KIND,
                id,
            ))),
        }
    }

    /// Delete one resource. 204 regardless of prior existence.
    pub async fn delete(&self, request: DeleteRequest<'_>) -> BackendResult<ApiResponse> {
        let id = match ResourceId::parse(request.id_segment) {
            Ok(id) => id,
            Err(e) => {
                return Ok(ApiResponse::error(&ApiError::invalid_route_value(
                    e.to_string(),
                )));
            }
        };

        info!("DELETE {}/{id}", R::KIND);
        self.store.delete(id).await?;
        Ok(ApiResponse::no_content())
    }

    /// List a page of resources.
    pub async fn list(&self, request: ListRequest<'_>) -> BackendResult<ApiResponse> {
        let params = match paging::parse_list_params(request.query) {
            Ok(params) => params,
            Err(e) => return Ok(ApiResponse::error(&e)),
        };

        let page = self.store.list(&params.page).await?;
        debug!(
            "LIST {}: {} items, more: {}",
            R::KIND,
            page.items.len(),
            page.continuation.is_some()
        );

        let items = page
            .items
            .iter()
            .map(|(resource, etag)| {
                let mut document = self.document_with_etag(resource, etag);
                if let Some(select) = &params.select {
                    select.apply(&mut document);
                }
                document
            })
            .collect();

        Ok(ApiResponse::ok(paging::assemble_page(
            items,
            page.continuation.as_ref(),
            request.request_uri,
        )))
    }

    /// Body parsing stage: raw text to JSON to a validated resource.
    ///
    /// Runs even when the route id failed to parse (against a placeholder
    /// id), so body failures still join the combined error set.
    fn parse_body(
        &self,
        id: &Result<ResourceId, ApiError>,
        body: Option<&str>,
    ) -> Result<R, ApiError> {
        let text = body
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ApiError::invalid_json_body("A request body is required"))?;
        let document: Value = serde_json::from_str(text)
            .map_err(|e| ApiError::invalid_json_body(format!("Request body is not valid JSON: {e}")))?;
        let candidate = *id.as_ref().unwrap_or(&ResourceId::nil());
        self.codec.deserialize(candidate, &document)
    }

    /// Serialized resource with the revision tag embedded as `eTag`.
    fn document_with_etag(&self, resource: &R, etag: &ETag) -> Value {
        let mut document = self.codec.serialize(resource);
        if let Some(obj) = document.as_object_mut() {
            obj.insert("eTag".to_string(), Value::String(etag.as_str().to_string()));
        }
        document
    }
}
