//! Order tracking: billing-email ownership check with a deliberately vague
//! failure answer.

mod common;

use axum::http::Method;
use common::{response_json, TestApp};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

fn order(id: u64, email: &str) -> serde_json::Value {
    json!({
        "id": id,
        "order_key": "wc_order_k",
        "status": "processing",
        "total": "850.00",
        "billing": {"first_name": "Asha", "email": email}
    })
}

#[tokio::test]
async fn matching_email_returns_the_order() {
    let app = TestApp::new().await;

    Mock::given(method("GET"))
        .and(path("/orders/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(order(42, "asha@example.com")))
        .expect(1)
        .mount(&app.commerce)
        .await;

    let response = app
        .request_json(
            Method::POST,
            "/api/v1/orders/track",
            Some(json!({"order_id": 42, "email": "Asha@Example.com"})),
        )
        .await;
    assert_eq!(response.status(), 200);

    let body = response_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["id"], 42);
    assert_eq!(body["data"]["status"], "processing");
}

#[tokio::test]
async fn email_mismatch_gets_the_vague_answer() {
    let app = TestApp::new().await;

    Mock::given(method("GET"))
        .and(path("/orders/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(order(42, "asha@example.com")))
        .expect(1)
        .mount(&app.commerce)
        .await;

    let response = app
        .request_json(
            Method::POST,
            "/api/v1/orders/track",
            Some(json!({"order_id": 42, "email": "other@example.com"})),
        )
        .await;

    let body = response_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Order not found with these details.");
    // The order payload must not leak on a mismatch
    assert!(body.get("data").is_none());
}

#[tokio::test]
async fn unknown_order_gets_the_same_vague_answer() {
    let app = TestApp::new().await;

    Mock::given(method("GET"))
        .and(path("/orders/404404"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "code": "woocommerce_rest_shop_order_invalid_id",
            "message": "Invalid ID."
        })))
        .expect(1)
        .mount(&app.commerce)
        .await;

    let response = app
        .request_json(
            Method::POST,
            "/api/v1/orders/track",
            Some(json!({"order_id": 404404, "email": "asha@example.com"})),
        )
        .await;

    let body = response_json(response).await;
    assert_eq!(body["success"], false);
    // Identical message whether the order is missing or owned by someone else
    assert_eq!(body["error"], "Order not found with these details.");
}
