//! Order resource API library with ETag-based optimistic concurrency.
//!
//! Implements the conditional-request protocol for a small resource API:
//! create-or-replace selected by `If-Match`/`If-None-Match`, single-resource
//! fetch, idempotent delete, and paged listing with field projection. The
//! crate is transport-agnostic — a binding layer (axum, actix, anything)
//! hands structured request values to a [`ResourceHandler`] and writes out
//! the returned [`ApiResponse`]; routing and OpenAPI live outside.
//!
//! # Core Components
//!
//! - [`ResourceHandler`] - request orchestrator for one resource kind
//! - [`ResourceStore`] - trait for pluggable storage backends
//! - [`ResourceCodec`] - per-kind JSON validation and serialization
//! - [`resolve_conditional_headers`] - the create-vs-replace decision
//!
//! # Quick Start
//!
//! ```rust
//! use order_server::{InMemoryStore, OrderCodec, PutRequest, ResourceHandler};
//!
//! # async fn example() {
//! let handler = ResourceHandler::new(InMemoryStore::new(), OrderCodec);
//!
//! let body = r#"{
//!     "pizzas": [{"size": "Large", "toppings": [{"kind": "Cheese", "amount": "Extra"}]}],
//!     "pickupTime": "2026-08-06T18:30:00Z"
//! }"#;
//! let response = handler
//!     .put(PutRequest {
//!         id_segment: "8f8b7a36-6a1c-4f8f-9a6f-3d2f6a1c4f8f",
//!         if_match: &[],
//!         if_none_match: &["*".to_string()],
//!         body: Some(body),
//!         request_uri: "/v1/orders/8f8b7a36-6a1c-4f8f-9a6f-3d2f6a1c4f8f",
//!     })
//!     .await
//!     .expect("backend is in-memory");
//! assert_eq!(response.status, http::StatusCode::CREATED);
//! # }
//! ```

pub mod conditional;
pub mod error;
pub mod etag;
pub mod handler;
pub mod paging;
pub mod resource;
pub mod store;

// Re-export commonly used types for convenience
pub use conditional::{ConditionalHeaderAction, resolve_conditional_headers};
pub use error::{ApiError, ApiErrorCode, BackendError, BackendResult};
pub use etag::ETag;
pub use handler::{ApiResponse, DeleteRequest, GetRequest, ListRequest, PutRequest, ResourceHandler};
pub use paging::{ContinuationToken, ListParams, PageQuery, SelectProjection};
pub use resource::order::{Order, OrderCodec, Pizza, Size, Topping, ToppingAmount, ToppingKind};
pub use resource::{ApiResource, ResourceCodec, ResourceId};
pub use store::{CreateError, InMemoryStore, Page, ReplaceError, ResourceStore};
