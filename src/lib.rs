//! Storefront API Library
//!
//! Product catalog, shopping cart and favorites endpoints over a sea-orm
//! database, plus the fixture seeding used by the `seed-data` binary.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod identity;
pub mod middleware_helpers;
pub mod migrator;
pub mod seed;
pub mod services;
pub mod tracing;

use axum::{http::HeaderValue, response::Json, response::Response, routing::get, Router};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use serde_json::{json, Value};
use std::{any::Any, sync::Arc};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any as CorsAny, CorsLayer},
};

use crate::config::AppConfig;
use crate::handlers::common::{CartTotals, PaginationMeta};
use crate::identity::{GuestIdentity, IdentityResolver};

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: Arc<AppConfig>,
    pub services: handlers::AppServices,
    pub identity: Arc<dyn IdentityResolver>,
}

impl AppState {
    /// Wires services and the guest identity resolver from configuration.
    pub fn new(db: Arc<DatabaseConnection>, config: AppConfig) -> Self {
        let services = handlers::AppServices::new(db.clone(), &config);
        let identity: Arc<dyn IdentityResolver> =
            Arc::new(GuestIdentity::new(config.default_user_id.clone()));

        Self {
            db,
            config: Arc::new(config),
            services,
            identity,
        }
    }

    /// Replaces the identity resolver.
    pub fn with_identity(mut self, identity: Arc<dyn IdentityResolver>) -> Self {
        self.identity = identity;
        self
    }
}

/// Success envelope shared by every endpoint.
///
/// List endpoints add pagination fields and user-scoped reads add `userId`
/// at the top level next to `data`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationMeta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub totals: Option<CartTotals>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            pagination: None,
            category: None,
            user_id: None,
            totals: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_pagination(mut self, pagination: PaginationMeta) -> Self {
        self.pagination = Some(pagination);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_cart_totals(mut self, totals: CartTotals) -> Self {
        self.totals = Some(totals);
        self
    }
}

/// Builds the full application router with its middleware stack.
///
/// Cart and favorites are reachable both with and without the `/api` prefix.
pub fn app_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .route("/", get(welcome))
        .route("/health", get(handlers::health::health_check))
        .nest("/products", handlers::products::products_routes())
        .nest("/cart", handlers::carts::carts_routes())
        .nest("/api/cart", handlers::carts::carts_routes())
        .nest("/favorites", handlers::favorites::favorites_routes())
        .nest("/api/favorites", handlers::favorites::favorites_routes())
        .fallback(handlers::route_not_found)
        // Turn handler panics into a logged, generic 500
        .layer(CatchPanicLayer::custom(handle_panic))
        // HTTP tracing layer for consistent request/response telemetry
        .layer(tracing::configure_http_tracing())
        .layer(axum::middleware::from_fn(
            middleware_helpers::access_log_middleware,
        ))
        .layer(cors)
        // Ensure every request carries a request id for traceability
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id_middleware,
        ))
        .with_state(state)
}

async fn welcome() -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "Welcome to E-commerce Backend API! 🛒",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "products": "/products",
            "cart": "/api/cart",
            "favorites": "/api/favorites",
            "health": "/health"
        }
    }))
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic payload".to_string()
    };

    errors::panic_response(&detail)
}

/// CORS from configuration: explicit origins when listed, permissive outside
/// production or when opted in, otherwise same-origin only.
pub fn cors_layer(cfg: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = cfg
        .cors_origins()
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                ::tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if !origins.is_empty() {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(CorsAny)
            .allow_headers(CorsAny)
    } else if cfg.should_allow_permissive_cors() {
        ::tracing::info!(
            "Using permissive CORS because explicit origins were not configured ({})",
            if cfg.is_development() {
                "development environment"
            } else {
                "explicit override enabled"
            }
        );
        CorsLayer::permissive()
    } else {
        ::tracing::error!(
            "No CORS origins configured; set APP__CORS_ALLOWED_ORIGINS or APP__CORS_ALLOW_ANY_ORIGIN=true"
        );
        CorsLayer::new()
    }
}
