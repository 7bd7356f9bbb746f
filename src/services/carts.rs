use crate::{
    config::StockPolicy,
    entities::{
        cart::{self, Entity as Cart},
        cart_item::{self, Entity as CartItem},
        product::{self, Entity as Product},
    },
    errors::ServiceError,
    identity::UserId,
    services::products::{lookup, ProductSummary},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::OnConflict, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection,
    DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

const INVALID_PRODUCT_ID: &str = "Invalid productId format";
const PRODUCT_NOT_FOUND: &str = "Product not found";
const CART_NOT_FOUND: &str = "Cart not found";
const PRODUCT_NOT_IN_CART: &str = "Product not found in cart";

/// Input for adding a product to a user's cart.
#[derive(Debug, Clone)]
pub struct AddToCartInput {
    pub user_id: UserId,
    /// Raw id as sent by the client; parsed by the service
    pub product_id: String,
    pub quantity: i32,
}

/// A cart line with its product resolved.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: Uuid,
    /// `None` when the product no longer exists
    pub product: Option<ProductSummary>,
    pub quantity: i32,
    #[serde(with = "rust_decimal::serde::float")]
    pub item_total: Decimal,
    pub added_at: DateTime<Utc>,
}

impl CartLine {
    fn new(item: cart_item::Model, product: Option<&product::Model>) -> Self {
        let item_total = product
            .map(|p| p.price * Decimal::from(item.quantity))
            .unwrap_or(Decimal::ZERO);

        Self {
            product_id: item.product_id,
            product: product.map(ProductSummary::from),
            quantity: item.quantity,
            item_total,
            added_at: item.added_at,
        }
    }
}

/// A user's cart as returned to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    /// `None` until the user's first add
    pub id: Option<Uuid>,
    pub user_id: String,
    pub item_count: i32,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    pub items: Vec<CartLine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl CartView {
    fn empty(user_id: &UserId) -> Self {
        Self {
            id: None,
            user_id: user_id.to_string(),
            item_count: 0,
            total_amount: Decimal::ZERO,
            items: Vec::new(),
            updated_at: None,
        }
    }

    fn from_parts(cart: cart::Model, items: Vec<CartLine>) -> Self {
        Self {
            id: Some(cart.id),
            user_id: cart.user_id,
            item_count: cart.item_count,
            total_amount: cart.total_amount,
            items,
            updated_at: Some(cart.updated_at),
        }
    }
}

/// Sum of quantities and of line totals.
pub fn cart_totals(lines: &[CartLine]) -> (i32, Decimal) {
    lines
        .iter()
        .fold((0i32, Decimal::ZERO), |(count, total), line| {
            (count.saturating_add(line.quantity), total + line.item_total)
        })
}

/// Per-user shopping carts.
///
/// Every write runs in a transaction and finishes by recomputing the cart's
/// `item_count` and `total_amount` from its lines. No row locks are taken, so
/// two concurrent adds for the same line can lose one of the increments.
#[derive(Clone)]
pub struct CartService {
    db: Arc<DatabaseConnection>,
    stock_policy: StockPolicy,
}

impl CartService {
    pub fn new(db: Arc<DatabaseConnection>, stock_policy: StockPolicy) -> Self {
        Self { db, stock_policy }
    }

    /// Adds a product to the user's cart, creating the cart on first use.
    ///
    /// Adding a product that is already in the cart increases that line's
    /// quantity instead of creating a second line.
    ///
    /// # Errors
    ///
    /// * `InvalidInput` - `product_id` is not a valid id
    /// * `ValidationError` - quantity below 1 or too large
    /// * `NotFound` - no such product
    /// * `InsufficientStock` - under `enforce` the requested quantity, or
    ///   under `enforce_line` the merged line, exceeds the product's stock
    #[instrument(skip(self))]
    pub async fn add_item(&self, input: AddToCartInput) -> Result<CartView, ServiceError> {
        let product_id = Uuid::parse_str(input.product_id.trim())
            .map_err(|_| ServiceError::InvalidInput(INVALID_PRODUCT_ID.to_string()))?;

        if input.quantity < 1 {
            return Err(ServiceError::ValidationError(
                "Quantity must be a positive integer".to_string(),
            ));
        }

        let txn = self.db.begin().await?;

        let product = Product::find_by_id(product_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(PRODUCT_NOT_FOUND.to_string()))?;

        let cart = find_or_create_cart(&txn, &input.user_id).await?;

        let existing = CartItem::find()
            .filter(cart_item::Column::CartId.eq(cart.id))
            .filter(cart_item::Column::ProductId.eq(product_id))
            .one(&txn)
            .await?;

        let quantity = match &existing {
            Some(item) => item.quantity.checked_add(input.quantity).ok_or_else(|| {
                ServiceError::ValidationError("Quantity is too large".to_string())
            })?,
            None => input.quantity,
        };

        let checked_quantity = match self.stock_policy {
            StockPolicy::Ignore => None,
            StockPolicy::Enforce => Some(input.quantity),
            StockPolicy::EnforceLine => Some(quantity),
        };
        if checked_quantity.is_some_and(|wanted| wanted > product.stock) {
            return Err(ServiceError::InsufficientStock(
                "Insufficient stock available".to_string(),
            ));
        }

        match existing {
            Some(item) => {
                let mut item: cart_item::ActiveModel = item.into();
                item.quantity = Set(quantity);
                item.update(&txn).await?;
            }
            None => {
                let position = CartItem::find()
                    .filter(cart_item::Column::CartId.eq(cart.id))
                    .count(&txn)
                    .await?;

                cart_item::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    cart_id: Set(cart.id),
                    product_id: Set(product_id),
                    quantity: Set(quantity),
                    position: Set(i32::try_from(position).unwrap_or(i32::MAX)),
                    added_at: Set(Utc::now()),
                }
                .insert(&txn)
                .await?;
            }
        }

        let view = recalculate_cart_totals(&txn, cart).await?;
        txn.commit().await?;

        info!(
            %product_id,
            quantity = input.quantity,
            line_quantity = quantity,
            "Product added to cart"
        );
        Ok(view)
    }

    /// Returns the user's cart. A user without a cart gets an empty one.
    #[instrument(skip(self, user_id), fields(user_id = %user_id))]
    pub async fn get_cart(&self, user_id: &UserId) -> Result<CartView, ServiceError> {
        let Some(cart) = find_cart(&*self.db, user_id).await? else {
            return Ok(CartView::empty(user_id));
        };

        let lines = resolve_lines(&*self.db, cart.id).await?;
        let (item_count, total_amount) = cart_totals(&lines);

        let mut view = CartView::from_parts(cart, lines);
        view.item_count = item_count;
        view.total_amount = total_amount;
        Ok(view)
    }

    /// Removes a product's line from the user's cart.
    ///
    /// # Errors
    ///
    /// * `NotFound("Cart not found")` - the user has no cart
    /// * `NotFound("Product not found in cart")` - no matching line, which
    ///   includes ids that do not parse
    #[instrument(skip(self, user_id), fields(user_id = %user_id))]
    pub async fn remove_item(
        &self,
        user_id: &UserId,
        raw_product_id: &str,
    ) -> Result<CartView, ServiceError> {
        let txn = self.db.begin().await?;

        let cart = find_cart(&txn, user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(CART_NOT_FOUND.to_string()))?;

        let product_id = Uuid::parse_str(raw_product_id.trim())
            .map_err(|_| ServiceError::NotFound(PRODUCT_NOT_IN_CART.to_string()))?;

        let result = CartItem::delete_many()
            .filter(cart_item::Column::CartId.eq(cart.id))
            .filter(cart_item::Column::ProductId.eq(product_id))
            .exec(&txn)
            .await?;

        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(PRODUCT_NOT_IN_CART.to_string()));
        }

        let view = recalculate_cart_totals(&txn, cart).await?;
        txn.commit().await?;

        info!(%product_id, "Product removed from cart");
        Ok(view)
    }
}

/// Returns the user's cart, creating an empty one on first use.
///
/// The insert ignores a conflict on `user_id`, so a cart created by a
/// concurrent request is picked up instead of failing the add.
async fn find_or_create_cart<C>(conn: &C, user_id: &UserId) -> Result<cart::Model, DbErr>
where
    C: ConnectionTrait,
{
    if let Some(cart) = find_cart(conn, user_id).await? {
        return Ok(cart);
    }

    insert_cart_if_absent(conn, user_id).await?;

    find_cart(conn, user_id)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("cart for user {user_id}")))
}

/// Inserts an empty cart unless the user already has one. Returns the
/// number of rows inserted.
async fn insert_cart_if_absent<C>(conn: &C, user_id: &UserId) -> Result<u64, DbErr>
where
    C: ConnectionTrait,
{
    let now = Utc::now();
    let cart = cart::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id.to_string()),
        item_count: Set(0),
        total_amount: Set(Decimal::ZERO),
        created_at: Set(now),
        updated_at: Set(now),
    };

    Cart::insert(cart)
        .on_conflict(
            OnConflict::column(cart::Column::UserId)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await
}

async fn find_cart<C>(conn: &C, user_id: &UserId) -> Result<Option<cart::Model>, DbErr>
where
    C: ConnectionTrait,
{
    Cart::find()
        .filter(cart::Column::UserId.eq(user_id.as_str()))
        .one(conn)
        .await
}

/// Loads a cart's lines in insertion order with their products resolved.
async fn resolve_lines<C>(conn: &C, cart_id: Uuid) -> Result<Vec<CartLine>, DbErr>
where
    C: ConnectionTrait,
{
    let items = CartItem::find()
        .filter(cart_item::Column::CartId.eq(cart_id))
        .order_by_asc(cart_item::Column::Position)
        .order_by_asc(cart_item::Column::AddedAt)
        .all(conn)
        .await?;

    let products = lookup(conn, items.iter().map(|item| item.product_id)).await?;

    Ok(items
        .into_iter()
        .map(|item| {
            let product = products.get(&item.product_id);
            CartLine::new(item, product)
        })
        .collect())
}

/// Recomputes and stores the cart's derived totals.
async fn recalculate_cart_totals<C>(conn: &C, cart: cart::Model) -> Result<CartView, DbErr>
where
    C: ConnectionTrait,
{
    let lines = resolve_lines(conn, cart.id).await?;
    let (item_count, total_amount) = cart_totals(&lines);

    let mut active: cart::ActiveModel = cart.into();
    active.item_count = Set(item_count);
    active.total_amount = Set(total_amount);
    active.updated_at = Set(Utc::now());
    let cart = active.update(conn).await?;

    Ok(CartView::from_parts(cart, lines))
}
