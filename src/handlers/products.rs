use crate::{
    config::AppConfig,
    errors::ApiError,
    handlers::common::{success_response, PaginationMeta, ValidatedQuery},
    services::{ProductQuery, ProductSort},
    ApiResponse, AppState,
};
use axum::{
    extract::{Path, State},
    response::Response,
    routing::get,
    Router,
};
use serde::Deserialize;
use validator::Validate;

/// Creates the router for catalog endpoints
pub fn products_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products))
        .route("/:category", get(list_products_by_category))
        .route("/product/:id", get(get_product))
}

/// List products, optionally only the featured ones
async fn list_products(
    State(state): State<AppState>,
    ValidatedQuery(params): ValidatedQuery<ProductListQuery>,
) -> Result<Response, ApiError> {
    let page = state
        .services
        .products
        .list(params.to_query(&state.config))
        .await?;

    let pagination = PaginationMeta::from(&page);
    Ok(success_response(
        ApiResponse::success(page.products)
            .with_message("Products retrieved successfully")
            .with_pagination(pagination),
    ))
}

/// List products in one category
async fn list_products_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
    ValidatedQuery(params): ValidatedQuery<ProductListQuery>,
) -> Result<Response, ApiError> {
    let (category, page) = state
        .services
        .products
        .list_by_category(&category, params.to_query(&state.config))
        .await?;

    let pagination = PaginationMeta::from(&page);
    Ok(success_response(
        ApiResponse::success(page.products)
            .with_message("Products retrieved successfully")
            .with_pagination(pagination)
            .with_category(category.to_string()),
    ))
}

/// Get a single product
async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let product = state.services.products.get(&id).await?;

    Ok(success_response(
        ApiResponse::success(product).with_message("Product retrieved successfully"),
    ))
}

// Request DTOs

#[derive(Debug, Default, Deserialize, Validate)]
pub struct ProductListQuery {
    #[validate(range(min = 1, message = "Page must be a positive integer"))]
    pub page: Option<u64>,
    #[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100"))]
    pub limit: Option<u64>,
    pub sort: Option<String>,
    pub featured: Option<String>,
}

impl ProductListQuery {
    fn to_query(&self, config: &AppConfig) -> ProductQuery {
        ProductQuery {
            page: self.page.unwrap_or(1),
            limit: config.page_size(self.limit),
            sort: ProductSort::parse(self.sort.as_deref()),
            featured_only: self
                .featured
                .as_deref()
                .is_some_and(|flag| flag.trim().eq_ignore_ascii_case("true")),
        }
    }
}
