//! Integration tests for the catalog endpoints.
//!
//! Tests cover:
//! - Paging, totals and sorting on the product list
//! - The featured filter
//! - Category listing, including empty and unknown categories
//! - Single product lookup

mod common;

use axum::http::{Method, StatusCode};
use common::{assert_amount, product_named, response_json, TestApp};
use rstest::rstest;

#[tokio::test]
async fn list_returns_page_with_pagination_meta() {
    let app = TestApp::new().await;
    app.seed().await;

    let response = app.request(Method::GET, "/products", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["total"], 6);
    assert_eq!(body["count"], 6);
    assert_eq!(body["page"], 1);
    assert_eq!(body["pages"], 1);

    // Default order is by name
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);
}

#[tokio::test]
async fn list_pages_through_results() {
    let app = TestApp::new().await;
    app.seed().await;

    let body = response_json(app.request(Method::GET, "/products?page=2&limit=4", None).await).await;

    assert_eq!(body["total"], 6);
    assert_eq!(body["count"], 2);
    assert_eq!(body["page"], 2);
    assert_eq!(body["pages"], 2);
}

#[tokio::test]
async fn page_past_the_end_is_empty_not_an_error() {
    let app = TestApp::new().await;
    app.seed().await;

    let response = app.request(Method::GET, "/products?page=9", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["count"], 0);
    assert_eq!(body["total"], 6);
}

#[rstest]
#[case("/products?page=1000000000000000000")]
#[case("/products?page=2000000000000000000&limit=100")]
#[case("/products?page=18446744073709551615")]
#[tokio::test]
async fn huge_page_numbers_are_empty_pages(#[case] uri: &str) {
    let app = TestApp::new().await;
    app.seed().await;

    let response = app.request(Method::GET, uri, None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["count"], 0);
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn huge_page_in_category_is_not_found() {
    let app = TestApp::new().await;
    app.seed().await;

    let response = app
        .request(Method::GET, "/products/home?page=18446744073709551615", None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        response_json(response).await["message"],
        "No products found for category: home"
    );
}

#[tokio::test]
async fn list_sorts_descending_by_price() {
    let app = TestApp::new().await;
    app.seed().await;

    let body = response_json(app.request(Method::GET, "/products?sort=-price", None).await).await;
    let products = body["data"].as_array().unwrap();

    assert_eq!(products[0]["name"], "Wireless Headphones");
    assert_amount(&products[0]["price"], 79.99);
    assert_eq!(products[5]["name"], "Building Blocks Set");
}

#[tokio::test]
async fn unknown_sort_field_falls_back_to_name() {
    let app = TestApp::new().await;
    app.seed().await;

    let response = app.request(Method::GET, "/products?sort=colour", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["data"][0]["name"], "Building Blocks Set");
}

#[tokio::test]
async fn featured_filter_returns_only_featured_products() {
    let app = TestApp::new().await;
    app.seed().await;

    let body = response_json(app.request(Method::GET, "/products?featured=true", None).await).await;
    let products = body["data"].as_array().unwrap();

    assert_eq!(body["total"], 2);
    assert!(products.iter().all(|p| p["featured"] == true));
}

#[tokio::test]
async fn featured_filter_ignores_values_other_than_true() {
    let app = TestApp::new().await;
    app.seed().await;

    let body = response_json(app.request(Method::GET, "/products?featured=false", None).await).await;
    assert_eq!(body["total"], 6);
}

#[rstest]
#[case("/products?limit=0")]
#[case("/products?limit=101")]
#[case("/products?page=0")]
#[case("/products?page=abc")]
#[tokio::test]
async fn bad_paging_parameters_are_rejected(#[case] uri: &str) {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, uri, None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Validation failed");
    assert!(!body["errors"].as_array().unwrap().is_empty());
}

#[rstest]
#[case("electronics")]
#[case("Electronics")]
#[case("ELECTRONICS")]
#[tokio::test]
async fn category_match_ignores_case(#[case] category: &str) {
    let app = TestApp::new().await;
    app.seed().await;

    let response = app
        .request(Method::GET, &format!("/products/{category}"), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["category"], "electronics");
    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["name"], "Wireless Headphones");
}

#[rstest]
#[case("beauty")]
#[case("garden")]
#[tokio::test]
async fn category_without_products_is_not_found(#[case] category: &str) {
    let app = TestApp::new().await;
    app.seed().await;

    let response = app
        .request(Method::GET, &format!("/products/{category}"), None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = response_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(
        body["message"],
        format!("No products found for category: {category}")
    );
}

#[tokio::test]
async fn get_product_by_id() {
    let app = TestApp::new().await;
    let products = app.seed().await;
    let vase = product_named(&products, "Ceramic Vase");

    let response = app
        .request(Method::GET, &format!("/products/product/{}", vase.id), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["data"]["id"], vase.id.to_string());
    assert_eq!(body["data"]["category"], "home");
    assert_eq!(body["data"]["stock"], 15);
    assert_amount(&body["data"]["price"], 34.0);
}

#[rstest]
#[case("00000000-0000-0000-0000-000000000000")]
#[case("not-an-id")]
#[tokio::test]
async fn unknown_or_malformed_product_id_is_not_found(#[case] id: &str) {
    let app = TestApp::new().await;
    app.seed().await;

    let response = app
        .request(Method::GET, &format!("/products/product/{id}"), None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = response_json(response).await;
    assert_eq!(body["message"], "Product not found");
}
