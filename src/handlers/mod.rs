pub mod carts;
pub mod common;
pub mod favorites;
pub mod health;
pub mod products;

use axum::{
    http::{Method, StatusCode, Uri},
    response::Response,
};
use std::sync::Arc;
use tracing::warn;

use crate::{
    config::AppConfig,
    db::DbPool,
    errors::ErrorResponse,
    services::{CartService, FavoriteService, ProductService},
};

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates the database logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub products: Arc<ProductService>,
    pub carts: Arc<CartService>,
    pub favorites: Arc<FavoriteService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, config: &AppConfig) -> Self {
        Self {
            products: Arc::new(ProductService::new(db_pool.clone())),
            carts: Arc::new(CartService::new(db_pool.clone(), config.cart_stock_policy)),
            favorites: Arc::new(FavoriteService::new(db_pool)),
        }
    }
}

/// Fallback for requests that match no route.
pub async fn route_not_found(method: Method, uri: Uri) -> Response {
    let path = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());

    warn!(%method, %path, "Route not found");

    ErrorResponse::new(StatusCode::NOT_FOUND, "Route not found")
        .with_path(path)
        .into_response_with(StatusCode::NOT_FOUND)
}
