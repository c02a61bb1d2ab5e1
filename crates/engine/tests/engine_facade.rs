//! End-to-end tests of the `Engine` facade contracts.
//!
//! The three exposed operations are exercised against a mocked Admin API
//! to verify the response envelopes: explicit success flags, outcome
//! fields, and human-readable messages (callers must not infer success
//! from HTTP status alone).

use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use kundeshop_engine::collect::AddOutcome;
use kundeshop_engine::{
    AddToCollectionRequest, AdminClient, AssignVariantRequest, Engine, EngineError,
    RemoveFromCollectionRequest, ShopifyConfig,
};

fn test_engine(server: &MockServer) -> Engine {
    let config = ShopifyConfig {
        shop_domain: "test.myshopify.com".to_string(),
        api_version: "2024-01".to_string(),
        admin_token: SecretString::from("shpat_test_token"),
        duplicate_collect_patterns: vec!["already exists".to_string()],
    };
    let client = AdminClient::with_base_url(&server.uri(), "shpat_test_token")
        .expect("failed to build test AdminClient");
    Engine::from_parts(client, config)
}

#[tokio::test]
async fn resolve_and_associate_creates_collection_for_uncached_customer() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/customers/500/metafields.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "metafields": [] })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/custom_collections.json"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "custom_collection": { "id": 111, "title": "Kundeshop #500" }
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/metafields.json"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "metafield": {
                "id": 9001,
                "namespace": "b2b",
                "key": "personal_collection_id",
                "value": "111",
                "type": "number_integer"
            }
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/collects.json"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "collect": { "id": 1, "product_id": 42, "collection_id": 111 }
        })))
        .mount(&server)
        .await;

    let engine = test_engine(&server);
    let response = engine
        .resolve_and_associate(AddToCollectionRequest {
            customer_id: Some(500),
            product_id: 42,
            collection_id: None,
        })
        .await
        .expect("operation should succeed");

    assert!(response.success);
    assert_eq!(response.collection_id, 111);
    assert_eq!(response.outcome, AddOutcome::Added);
    assert!(response.collection_created);
    assert_eq!(response.message, "Product 42 added to collection 111");
}

#[tokio::test]
async fn duplicate_collect_is_reported_as_success_with_explanation() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/collects.json"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "errors": "already exists"
        })))
        .mount(&server)
        .await;

    let engine = test_engine(&server);
    let response = engine
        .resolve_and_associate(AddToCollectionRequest {
            customer_id: None,
            product_id: 42,
            collection_id: Some(111),
        })
        .await
        .expect("duplicate should be absorbed");

    assert!(response.success);
    assert_eq!(response.outcome, AddOutcome::AlreadyPresent);
    assert!(!response.collection_created);
    assert_eq!(response.message, "Product already existed in collection");
}

#[tokio::test]
async fn failed_cache_write_is_called_out_in_the_message() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/customers/500/metafields.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "metafields": [] })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/custom_collections.json"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "custom_collection": { "id": 111, "title": "Kundeshop #500" }
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/metafields.json"))
        .respond_with(ResponseTemplate::new(500).set_body_string("down"))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/collects.json"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "collect": { "id": 1, "product_id": 42, "collection_id": 111 }
        })))
        .mount(&server)
        .await;

    let engine = test_engine(&server);
    let response = engine
        .resolve_and_associate(AddToCollectionRequest {
            customer_id: Some(500),
            product_id: 42,
            collection_id: None,
        })
        .await
        .expect("cache-write failure must not fail the request");

    assert!(response.success);
    assert!(response.collection_created);
    assert!(
        response.message.contains("could not be cached"),
        "caller must learn the id was not cached: {}",
        response.message
    );
}

#[tokio::test]
async fn disassociate_reports_removal() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/collects.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "collects": [{ "id": 987, "product_id": 42, "collection_id": 7 }]
        })))
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/collects/987.json"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let engine = test_engine(&server);
    let response = engine
        .disassociate(RemoveFromCollectionRequest {
            product_id: 42,
            collection_id: 7,
        })
        .await
        .expect("removal should succeed");

    assert!(response.success);
    assert!(response.removed);
    assert_eq!(response.message, "Product 42 removed from collection 7");
}

#[tokio::test]
async fn assign_variant_names_variant_and_address_in_the_message() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/customers/500/metafields.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "metafields": [] })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/metafields.json"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "metafield": {
                "id": 88,
                "namespace": "b2b",
                "key": "assigned_variants",
                "value": r#"{"addr-1":{"p-1":["v-1"]}}"#,
                "type": "multi_line_text_field"
            }
        })))
        .mount(&server)
        .await;

    let engine = test_engine(&server);
    let response = engine
        .assign_variant(AssignVariantRequest {
            employee_address_id: "addr-1".to_string(),
            product_id: "p-1".to_string(),
            variant_id: "v-1".to_string(),
            customer_id: 500,
        })
        .await
        .expect("assignment should succeed");

    assert!(response.success);
    assert_eq!(response.message, "Variant v-1 assigned to address addr-1");
    assert_eq!(response.assignments.variants("addr-1", "p-1"), ["v-1"]);
}

#[tokio::test]
async fn missing_customer_and_collection_is_rejected_before_any_call() {
    let server = MockServer::start().await;
    let engine = test_engine(&server);

    let result = engine
        .resolve_and_associate(AddToCollectionRequest {
            customer_id: None,
            product_id: 42,
            collection_id: None,
        })
        .await;

    assert!(matches!(result, Err(EngineError::InvalidRequest(_))));
    assert!(
        server.received_requests().await.unwrap_or_default().is_empty(),
        "invalid requests must not reach the remote API"
    );
}
