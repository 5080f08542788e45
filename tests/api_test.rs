/*!
 * HTTP Surface Tests
 *
 * Drives the full router with `tower::ServiceExt::oneshot` to check request
 * decoding, status mapping and response bodies.
 */

mod common;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use common::*;
use serde_json::{Value, json};
use subscription_tracker::app;
use tower::ServiceExt;
use uuid::Uuid;

async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn test_router() -> (Router, tempfile::TempDir) {
    let (service, _db, temp_dir) = setup_test_environment().await;
    (app(service), temp_dir)
}

#[tokio::test]
async fn health_check() {
    let (router, _temp_dir) = test_router().await;

    let (status, body) = send(&router, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn create_returns_created_entity() {
    let (router, _temp_dir) = test_router().await;
    let user_id = Uuid::new_v4();

    let (status, body) = send(
        &router,
        "POST",
        "/subscriptions",
        Some(json!({
            "service_name": "Yandex Plus",
            "price": 400,
            "user_id": user_id,
            "start_date": "07-2025"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["service_name"], "Yandex Plus");
    assert_eq!(body["price"], 400);
    assert_eq!(body["user_id"], user_id.to_string());
    assert_eq!(body["start_date"], "07-2025");
    assert!(body.get("end_date").is_none());
    assert_eq!(body["created_at"], body["updated_at"]);
    assert!(Uuid::parse_str(body["id"].as_str().unwrap()).is_ok());
}

#[tokio::test]
async fn create_with_invalid_date_is_bad_request() {
    let (router, _temp_dir) = test_router().await;

    let (status, body) = send(
        &router,
        "POST",
        "/subscriptions",
        Some(json!({
            "service_name": "Netflix",
            "price": 599,
            "user_id": Uuid::new_v4(),
            "start_date": "13-2024"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn create_with_malformed_body_is_bad_request() {
    let (router, _temp_dir) = test_router().await;

    let (status, _) = send(
        &router,
        "POST",
        "/subscriptions",
        Some(json!({ "service_name": "Netflix" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn get_maps_bad_id_and_missing_row() {
    let (router, _temp_dir) = test_router().await;

    let (status, _) = send(&router, "GET", "/subscriptions/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let uri = format!("/subscriptions/{}", Uuid::new_v4());
    let (status, body) = send(&router, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn full_lifecycle_over_http() {
    let (router, _temp_dir) = test_router().await;
    let user_id = Uuid::new_v4();

    let (_, created) = send(
        &router,
        "POST",
        "/subscriptions",
        Some(json!({
            "service_name": "Netflix",
            "price": 599,
            "user_id": user_id,
            "start_date": "01-2025",
            "end_date": "06-2025"
        })),
    )
    .await;
    let uri = format!("/subscriptions/{}", created["id"].as_str().unwrap());

    let (status, body) = send(&router, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, created);

    let (status, body) = send(
        &router,
        "PUT",
        &uri,
        Some(json!({ "price": 699, "end_date": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Subscription updated successfully");

    let (_, body) = send(&router, "GET", &uri, None).await;
    assert_eq!(body["price"], 699);
    assert_eq!(body["service_name"], "Netflix");
    assert!(body.get("end_date").is_none());

    let (status, body) = send(&router, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Subscription deleted successfully");

    let (status, _) = send(&router, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_with_bad_end_date_is_bad_request() {
    let (router, _temp_dir) = test_router().await;
    let uri = format!("/subscriptions/{}", Uuid::new_v4());

    let (status, _) = send(&router, "PUT", &uri, Some(json!({ "end_date": "2025" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&router, "PUT", "/subscriptions/nope", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn list_applies_defaults_for_bad_query_values() {
    let (router, _temp_dir) = test_router().await;
    let user_id = Uuid::new_v4();

    for i in 0..12 {
        send(
            &router,
            "POST",
            "/subscriptions",
            Some(json!({
                "service_name": format!("Service {}", i),
                "price": 100,
                "user_id": user_id,
                "start_date": "01-2025"
            })),
        )
        .await;
    }

    let (status, body) = send(&router, "GET", "/subscriptions", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 10);

    let (_, body) = send(&router, "GET", "/subscriptions?page=abc&limit=0", None).await;
    assert_eq!(body.as_array().unwrap().len(), 10);

    let (_, body) = send(&router, "GET", "/subscriptions?page=2&limit=5", None).await;
    assert_eq!(body.as_array().unwrap().len(), 5);

    let (_, body) = send(&router, "GET", "/subscriptions?page=3&limit=5", None).await;
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn summary_over_http() {
    let (router, _temp_dir) = test_router().await;
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    for (user_id, price) in [(alice, 400), (bob, 250)] {
        send(
            &router,
            "POST",
            "/subscriptions",
            Some(json!({
                "service_name": "Yandex Plus",
                "price": price,
                "user_id": user_id,
                "start_date": "02-2025"
            })),
        )
        .await;
    }

    let (status, body) = send(
        &router,
        "POST",
        "/summary",
        Some(json!({
            "start_date": "01-2025",
            "end_date": "12-2025",
            "user_id": alice,
            "service_name": "Yandex Plus"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "total_cost": 400 }));

    let (status, _) = send(&router, "POST", "/summary", Some(json!({ "start_date": "01-2025" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
