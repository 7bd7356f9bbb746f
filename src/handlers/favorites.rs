use crate::{
    errors::ApiError,
    handlers::{
        carts::UserQuery,
        common::{created_response, success_response, RemovedEntry, ValidatedJson, ValidatedQuery},
    },
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

/// Creates the router for favorites endpoints
pub fn favorites_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(add_to_favorites).get(list_favorites))
        .route("/:product_id", delete(remove_from_favorites))
}

async fn add_to_favorites(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<AddFavoriteRequest>,
) -> Result<Response, ApiError> {
    let user_id = state.identity.resolve(payload.user_id.as_deref());
    let product_id = payload.product_id;

    let favorite = state
        .services
        .favorites
        .add(&user_id, &product_id)
        .await?;

    Ok(created_response(
        ApiResponse::success(favorite).with_message("Product added to favorites successfully"),
    ))
}

async fn list_favorites(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<UserQuery>,
) -> Result<Response, ApiError> {
    let user_id = state.identity.resolve(query.user_id.as_deref());
    let favorites = state.services.favorites.list(&user_id).await?;

    Ok(success_response(
        ApiResponse::success(favorites)
            .with_message("Favorite items retrieved successfully")
            .with_user_id(user_id.into_string()),
    ))
}

async fn remove_from_favorites(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    ValidatedQuery(query): ValidatedQuery<UserQuery>,
) -> Result<Response, ApiError> {
    let user_id = state.identity.resolve(query.user_id.as_deref());
    state
        .services
        .favorites
        .remove(&user_id, &product_id)
        .await?;

    Ok(success_response(
        ApiResponse::success(RemovedEntry {
            product_id,
            user_id: user_id.into_string(),
        })
        .with_message("Product removed from favorites successfully"),
    ))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddFavoriteRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Product ID is required"))]
    pub product_id: String,
    #[validate(length(max = 128, message = "User ID cannot exceed 128 characters"))]
    pub user_id: Option<String>,
}
