//! Conditional-header protocol tests for create-or-replace.
//!
//! Exercises every outcome of the PUT state machine through the public
//! handler: header resolution, status mapping, and the guarantee that a
//! failed write leaves the stored resource untouched.

use http::StatusCode;
use order_server::{
    ApiResponse, GetRequest, InMemoryStore, Order, OrderCodec, PutRequest, ResourceHandler,
};
use serde_json::{Value, json};

const ID: &str = "8f8b7a36-6a1c-4f8f-9a6f-3d2f6a1c4f8f";

type OrderHandler = ResourceHandler<Order, InMemoryStore<Order>, OrderCodec>;

fn handler() -> OrderHandler {
    ResourceHandler::new(InMemoryStore::new(), OrderCodec)
}

fn uri(id: &str) -> String {
    format!("/v1/orders/{id}")
}

fn order_body(size: &str) -> String {
    json!({
        "pizzas": [{"size": size, "toppings": [{"kind": "Cheese", "amount": "Normal"}]}],
        "pickupTime": "2026-08-06T18:30:00Z"
    })
    .to_string()
}

async fn put(
    handler: &OrderHandler,
    id: &str,
    if_match: &[&str],
    if_none_match: &[&str],
    body: Option<&str>,
) -> ApiResponse {
    let if_match: Vec<String> = if_match.iter().map(|v| v.to_string()).collect();
    let if_none_match: Vec<String> = if_none_match.iter().map(|v| v.to_string()).collect();
    handler
        .put(PutRequest {
            id_segment: id,
            if_match: &if_match,
            if_none_match: &if_none_match,
            body,
            request_uri: &uri(id),
        })
        .await
        .expect("in-memory backend does not fault")
}

async fn get(handler: &OrderHandler, id: &str) -> ApiResponse {
    handler
        .get(GetRequest { id_segment: id })
        .await
        .expect("in-memory backend does not fault")
}

fn etag_of(response: &ApiResponse) -> String {
    response.body.as_ref().expect("body")["eTag"]
        .as_str()
        .expect("eTag field")
        .to_string()
}

fn code_of(response: &ApiResponse) -> &str {
    response.body.as_ref().expect("body")["code"]
        .as_str()
        .expect("code field")
}

#[tokio::test]
async fn create_returns_201_with_location_and_a_fetchable_etag() {
    let handler = handler();
    let body = order_body("Medium");

    let response = put(&handler, ID, &[], &["*"], Some(&body)).await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.location.as_deref(), Some(uri(ID).as_str()));
    let created_etag = etag_of(&response);

    let fetched = get(&handler, ID).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(etag_of(&fetched), created_etag);
}

#[tokio::test]
async fn create_on_existing_id_conflicts_and_preserves_the_resource() {
    let handler = handler();
    put(&handler, ID, &[], &["*"], Some(&order_body("Medium"))).await;

    let response = put(&handler, ID, &[], &["*"], Some(&order_body("Large"))).await;

    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(code_of(&response), "ResourceAlreadyExists");
    assert!(
        response.body.as_ref().unwrap()["message"]
            .as_str()
            .unwrap()
            .contains(ID)
    );

    let fetched = get(&handler, ID).await;
    assert_eq!(
        fetched.body.as_ref().unwrap()["pizzas"][0]["size"],
        json!("Medium")
    );
}

#[tokio::test]
async fn replace_with_stale_etag_fails_precondition_and_preserves_the_resource() {
    let handler = handler();
    let created = put(&handler, ID, &[], &["*"], Some(&order_body("Medium"))).await;
    let stale = etag_of(&created);

    // Move the resource to a newer revision.
    put(&handler, ID, &[stale.as_str()], &[], Some(&order_body("Small"))).await;

    let response = put(&handler, ID, &[stale.as_str()], &[], Some(&order_body("Large"))).await;
    assert_eq!(response.status, StatusCode::PRECONDITION_FAILED);
    assert_eq!(code_of(&response), "ETagMismatch");

    let fetched = get(&handler, ID).await;
    assert_eq!(
        fetched.body.as_ref().unwrap()["pizzas"][0]["size"],
        json!("Small")
    );
}

#[tokio::test]
async fn replace_with_current_etag_succeeds_and_rotates_the_etag() {
    let handler = handler();
    let created = put(&handler, ID, &[], &["*"], Some(&order_body("Medium"))).await;
    let first = etag_of(&created);

    let replaced = put(&handler, ID, &[first.as_str()], &[], Some(&order_body("Large"))).await;
    assert_eq!(replaced.status, StatusCode::OK);
    let second = etag_of(&replaced);
    assert_ne!(first, second);

    let fetched = get(&handler, ID).await;
    assert_eq!(etag_of(&fetched), second);
    assert_eq!(
        fetched.body.as_ref().unwrap()["pizzas"][0]["size"],
        json!("Large")
    );
}

#[tokio::test]
async fn replace_of_absent_resource_is_not_found() {
    let handler = handler();
    let response = put(&handler, ID, &["some-revision"], &[], Some(&order_body("Medium"))).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(code_of(&response), "ResourceNotFound");
}

#[tokio::test]
async fn quoted_if_match_header_form_is_accepted() {
    let handler = handler();
    let created = put(&handler, ID, &[], &["*"], Some(&order_body("Medium"))).await;
    let quoted = format!("\"{}\"", etag_of(&created));

    let replaced = put(&handler, ID, &[quoted.as_str()], &[], Some(&order_body("Large"))).await;
    assert_eq!(replaced.status, StatusCode::OK);
}

#[tokio::test]
async fn both_conditional_headers_rejected_regardless_of_body_validity() {
    let handler = handler();

    let valid = put(&handler, ID, &["rev"], &["*"], Some(&order_body("Medium"))).await;
    assert_eq!(valid.status, StatusCode::BAD_REQUEST);
    assert_eq!(code_of(&valid), "InvalidConditionalHeader");

    // Invalid body and id do not change the reported code.
    let invalid = put(&handler, "nope", &["rev"], &["*"], Some("{}")).await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
    assert_eq!(code_of(&invalid), "InvalidConditionalHeader");
}

#[tokio::test]
async fn missing_conditional_headers_require_a_precondition() {
    let handler = handler();
    let response = put(&handler, ID, &[], &[], Some(&order_body("Medium"))).await;
    assert_eq!(response.status, StatusCode::PRECONDITION_REQUIRED);
    assert_eq!(code_of(&response), "InvalidConditionalHeader");
}

#[tokio::test]
async fn non_wildcard_if_none_match_is_rejected() {
    let handler = handler();
    let response = put(&handler, ID, &[], &["abc"], Some(&order_body("Medium"))).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(code_of(&response), "InvalidConditionalHeader");
}

#[tokio::test]
async fn non_uuid_path_segment_is_an_invalid_route_value() {
    let handler = handler();
    let response = put(&handler, "pizza-1", &[], &["*"], Some(&order_body("Medium"))).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(code_of(&response), "InvalidRouteValue");
    assert_eq!(
        response.body.as_ref().unwrap()["message"],
        json!("ID must be a valid GUID.")
    );
}

#[tokio::test]
async fn missing_or_empty_body_is_an_invalid_json_body() {
    let handler = handler();

    let missing = put(&handler, ID, &[], &["*"], None).await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
    assert_eq!(code_of(&missing), "InvalidJsonBody");

    let empty = put(&handler, ID, &[], &["*"], Some("   ")).await;
    assert_eq!(empty.status, StatusCode::BAD_REQUEST);
    assert_eq!(code_of(&empty), "InvalidJsonBody");

    let garbage = put(&handler, ID, &[], &["*"], Some("not json")).await;
    assert_eq!(garbage.status, StatusCode::BAD_REQUEST);
    assert_eq!(code_of(&garbage), "InvalidJsonBody");
}

#[tokio::test]
async fn every_parse_stage_failure_is_reported_in_one_response() {
    let handler = handler();
    let response = put(&handler, "nope", &[], &[], Some("{}")).await;

    // Header failure alone would be a 428; any 400-class failure wins.
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let details = response.body.as_ref().unwrap()["details"]
        .as_array()
        .expect("details array")
        .clone();
    let codes: Vec<Value> = details.iter().map(|d| d["code"].clone()).collect();
    assert!(codes.contains(&json!("InvalidConditionalHeader")));
    assert!(codes.contains(&json!("InvalidRouteValue")));
    assert!(codes.contains(&json!("InvalidJsonBody")));
}
