use crate::{
    entities::{
        favorite::{self, Entity as Favorite},
        product::Entity as Product,
    },
    errors::ServiceError,
    identity::UserId,
    services::products::{lookup, ProductSummary},
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, SqlErr,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// A favorite with its product resolved.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteView {
    pub id: Uuid,
    pub user_id: String,
    pub product_id: Uuid,
    /// `None` when the product no longer exists
    pub product: Option<ProductSummary>,
    pub added_at: DateTime<Utc>,
}

impl FavoriteView {
    fn new(model: favorite::Model, product: Option<ProductSummary>) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            product_id: model.product_id,
            product,
            added_at: model.added_at,
        }
    }
}

/// Per-user favorite products.
#[derive(Clone)]
pub struct FavoriteService {
    db: Arc<DatabaseConnection>,
}

impl FavoriteService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Marks a product as a favorite of the user.
    ///
    /// Duplicates are rejected by the `(user_id, product_id)` unique index
    /// and reported as a conflict.
    #[instrument(skip(self, user_id), fields(user_id = %user_id))]
    pub async fn add(
        &self,
        user_id: &UserId,
        raw_product_id: &str,
    ) -> Result<FavoriteView, ServiceError> {
        let product_id = Uuid::parse_str(raw_product_id.trim())
            .map_err(|_| ServiceError::InvalidInput("Invalid productId format".to_string()))?;

        let product = Product::find_by_id(product_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Product not found".to_string()))?;

        let now = Utc::now();
        let favorite = favorite::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id.to_string()),
            product_id: Set(product_id),
            added_at: Set(now),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db)
        .await
        .map_err(map_insert_error)?;

        info!(%product_id, "Product added to favorites");
        Ok(FavoriteView::new(
            favorite,
            Some(ProductSummary::from(&product)),
        ))
    }

    /// Lists the user's favorites, oldest first.
    #[instrument(skip(self, user_id), fields(user_id = %user_id))]
    pub async fn list(&self, user_id: &UserId) -> Result<Vec<FavoriteView>, ServiceError> {
        let favorites = Favorite::find()
            .filter(favorite::Column::UserId.eq(user_id.as_str()))
            .order_by_asc(favorite::Column::AddedAt)
            .order_by_asc(favorite::Column::Id)
            .all(&*self.db)
            .await?;

        let products = lookup(&*self.db, favorites.iter().map(|f| f.product_id)).await?;

        Ok(favorites
            .into_iter()
            .map(|favorite| {
                let product = products.get(&favorite.product_id).map(ProductSummary::from);
                FavoriteView::new(favorite, product)
            })
            .collect())
    }

    /// Deletes the user's favorite for a product in a single statement.
    ///
    /// Ids that do not parse cannot match a favorite and report not found.
    #[instrument(skip(self, user_id), fields(user_id = %user_id))]
    pub async fn remove(&self, user_id: &UserId, raw_product_id: &str) -> Result<(), ServiceError> {
        let not_found = || ServiceError::NotFound("Favorite not found".to_string());

        let product_id = Uuid::parse_str(raw_product_id.trim()).map_err(|_| not_found())?;

        let result = Favorite::delete_many()
            .filter(favorite::Column::UserId.eq(user_id.as_str()))
            .filter(favorite::Column::ProductId.eq(product_id))
            .exec(&*self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(not_found());
        }

        info!(%product_id, "Product removed from favorites");
        Ok(())
    }
}

fn map_insert_error(err: DbErr) -> ServiceError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            ServiceError::Conflict("Product already in favorites".to_string())
        }
        _ => ServiceError::DatabaseError(err),
    }
}
