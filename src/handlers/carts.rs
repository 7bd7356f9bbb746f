use crate::{
    errors::ApiError,
    handlers::common::{
        created_response, success_response, CartTotals, RemovedEntry, ValidatedJson,
        ValidatedQuery,
    },
    services::AddToCartInput,
    ApiResponse, AppState,
};
use axum::{
    extract::{Path, State},
    response::Response,
    routing::{delete, post},
    Router,
};
use serde::Deserialize;
use validator::Validate;

/// Creates the router for cart endpoints
pub fn carts_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(add_to_cart).get(get_cart))
        .route("/:product_id", delete(remove_from_cart))
}

/// Add a product to the caller's cart
async fn add_to_cart(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<AddToCartRequest>,
) -> Result<Response, ApiError> {
    let input = AddToCartInput {
        user_id: state.identity.resolve(payload.user_id.as_deref()),
        product_id: payload.product_id,
        quantity: payload.quantity.unwrap_or(1),
    };

    let cart = state.services.carts.add_item(input).await?;

    Ok(created_response(
        ApiResponse::success(cart).with_message("Product added to cart successfully"),
    ))
}

/// Get the caller's cart lines and totals
async fn get_cart(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<UserQuery>,
) -> Result<Response, ApiError> {
    let user_id = state.identity.resolve(query.user_id.as_deref());
    let cart = state.services.carts.get_cart(&user_id).await?;

    let totals = CartTotals {
        item_count: cart.item_count,
        total_amount: cart.total_amount,
    };
    Ok(success_response(
        ApiResponse::success(cart.items)
            .with_message("Cart items retrieved successfully")
            .with_user_id(user_id.into_string())
            .with_cart_totals(totals),
    ))
}

/// Remove a product's line from the caller's cart
async fn remove_from_cart(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    ValidatedQuery(query): ValidatedQuery<UserQuery>,
) -> Result<Response, ApiError> {
    let user_id = state.identity.resolve(query.user_id.as_deref());
    state
        .services
        .carts
        .remove_item(&user_id, &product_id)
        .await?;

    Ok(success_response(
        ApiResponse::success(RemovedEntry {
            product_id,
            user_id: user_id.into_string(),
        })
        .with_message("Product removed from cart successfully"),
    ))
}

// Request DTOs

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Product ID is required"))]
    pub product_id: String,
    #[validate(range(min = 1, message = "Quantity must be a positive integer"))]
    pub quantity: Option<i32>,
    #[validate(length(max = 128, message = "User ID cannot exceed 128 characters"))]
    pub user_id: Option<String>,
}

/// `?userId=` on user-scoped reads and deletes.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    #[validate(length(max = 128, message = "User ID cannot exceed 128 characters"))]
    pub user_id: Option<String>,
}
