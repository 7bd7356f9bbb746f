//! Integration tests for the favorites endpoints, plus the end-to-end
//! browse → favorite → remove flow.

mod common;

use axum::http::{Method, StatusCode};
use common::{assert_amount, product_named, response_json, TestApp};
use serde_json::json;
use storefront_api::seed::sample_products;

#[tokio::test]
async fn add_favorite_returns_created_with_product() {
    let app = TestApp::new().await;
    let products = app.seed().await;
    let book = product_named(&products, "Coffee Table Book: Architecture");

    let response = app
        .request(
            Method::POST,
            "/api/favorites",
            Some(json!({"productId": book.id.to_string(), "userId": "alice"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response_json(response).await;
    assert_eq!(body["message"], "Product added to favorites successfully");
    assert_eq!(body["data"]["userId"], "alice");
    assert_eq!(body["data"]["productId"], book.id.to_string());
    assert_eq!(body["data"]["product"]["name"], book.name);
    assert_amount(&body["data"]["product"]["price"], 29.5);
}

#[tokio::test]
async fn duplicate_favorite_is_rejected_without_second_row() {
    let app = TestApp::new().await;
    let products = app.seed().await;
    let mat = product_named(&products, "Yoga Mat");
    let payload = json!({"productId": mat.id.to_string()});

    let first = app.request(Method::POST, "/favorites", Some(payload.clone())).await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = app.request(Method::POST, "/api/favorites", Some(payload)).await;
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);

    let body = response_json(second).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Product already in favorites");

    let list = response_json(app.request(Method::GET, "/favorites", None).await).await;
    assert_eq!(list["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn same_product_can_be_favorited_by_different_users() {
    let app = TestApp::new().await;
    let products = app.seed().await;
    let mat = product_named(&products, "Yoga Mat");

    for user in ["alice", "bob"] {
        let response = app
            .request(
                Method::POST,
                "/favorites",
                Some(json!({"productId": mat.id.to_string(), "userId": user})),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }
}

#[tokio::test]
async fn add_favorite_validates_product() {
    let app = TestApp::new().await;
    app.seed().await;

    let missing = app.request(Method::POST, "/favorites", Some(json!({}))).await;
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response_json(missing).await["message"], "Validation failed");

    let malformed = app
        .request(Method::POST, "/favorites", Some(json!({"productId": "xyz"})))
        .await;
    assert_eq!(malformed.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response_json(malformed).await["message"],
        "Invalid productId format"
    );

    let unknown = app
        .request(
            Method::POST,
            "/favorites",
            Some(json!({"productId": "00000000-0000-0000-0000-000000000000"})),
        )
        .await;
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
    assert_eq!(response_json(unknown).await["message"], "Product not found");
}

#[tokio::test]
async fn list_is_ordered_by_time_added() {
    let app = TestApp::new().await;
    let products = app.seed().await;
    let order = ["Yoga Mat", "Ceramic Vase", "Wireless Headphones"];

    for name in order {
        let product = product_named(&products, name);
        app.request(
            Method::POST,
            "/favorites",
            Some(json!({"productId": product.id.to_string(), "userId": "frank"})),
        )
        .await;
    }

    let response = app
        .request(Method::GET, "/api/favorites?userId=frank", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["message"], "Favorite items retrieved successfully");
    assert_eq!(body["userId"], "frank");
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["product"]["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, order);
}

#[tokio::test]
async fn user_without_favorites_gets_empty_list() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/favorites?userId=ghost", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn removing_missing_favorite_is_not_found() {
    let app = TestApp::new().await;
    let products = app.seed().await;
    let mat = product_named(&products, "Yoga Mat");
    let vase = product_named(&products, "Ceramic Vase");

    app.request(
        Method::POST,
        "/favorites",
        Some(json!({"productId": mat.id.to_string()})),
    )
    .await;

    for target in [vase.id.to_string(), "bogus".to_string()] {
        let response = app
            .request(Method::DELETE, &format!("/favorites/{target}"), None)
            .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response_json(response).await["message"], "Favorite not found");
    }

    // Another user's favorite is not theirs to remove
    let response = app
        .request(
            Method::DELETE,
            &format!("/favorites/{}?userId=mallory", mat.id),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let list = response_json(app.request(Method::GET, "/favorites", None).await).await;
    assert_eq!(list["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn browse_favorite_and_remove_end_to_end() {
    let app = TestApp::new().await;
    app.seed().await;

    let catalog = response_json(app.request(Method::GET, "/products", None).await).await;
    assert_eq!(catalog["total"], sample_products().len());
    let product_id = catalog["data"][0]["id"].as_str().unwrap().to_string();

    let created = app
        .request(
            Method::POST,
            "/api/favorites",
            Some(json!({"productId": product_id, "userId": "e2e"})),
        )
        .await;
    assert_eq!(created.status(), StatusCode::CREATED);

    let listed = response_json(app.request(Method::GET, "/favorites?userId=e2e", None).await).await;
    assert_eq!(listed["data"].as_array().unwrap().len(), 1);

    let removed = app
        .request(
            Method::DELETE,
            &format!("/api/favorites/{product_id}?userId=e2e"),
            None,
        )
        .await;
    assert_eq!(removed.status(), StatusCode::OK);

    let body = response_json(removed).await;
    assert_eq!(body["message"], "Product removed from favorites successfully");
    assert_eq!(body["data"], json!({"productId": product_id, "userId": "e2e"}));

    let listed = response_json(app.request(Method::GET, "/favorites?userId=e2e", None).await).await;
    assert!(listed["data"].as_array().unwrap().is_empty());
}
