use crate::{
    entities::product::{self, Category, Entity as Product},
    errors::ServiceError,
};
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, Select,
};
use serde::Serialize;
use std::{collections::HashMap, str::FromStr, sync::Arc};
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Fields the catalog can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display, strum::EnumString)]
#[strum(ascii_case_insensitive)]
pub enum SortField {
    #[default]
    #[strum(serialize = "name")]
    Name,
    #[strum(serialize = "price")]
    Price,
    #[strum(serialize = "category")]
    Category,
    #[strum(serialize = "stock")]
    Stock,
    #[strum(serialize = "rating")]
    Rating,
    #[strum(serialize = "reviews")]
    Reviews,
    #[strum(serialize = "featured")]
    Featured,
    #[strum(serialize = "createdAt", serialize = "created_at")]
    CreatedAt,
}

impl SortField {
    fn column(self) -> product::Column {
        match self {
            SortField::Name => product::Column::Name,
            SortField::Price => product::Column::Price,
            SortField::Category => product::Column::Category,
            SortField::Stock => product::Column::Stock,
            SortField::Rating => product::Column::Rating,
            SortField::Reviews => product::Column::Reviews,
            SortField::Featured => product::Column::Featured,
            SortField::CreatedAt => product::Column::CreatedAt,
        }
    }
}

/// Parsed `sort` query parameter: a field name with an optional leading `-`
/// for descending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProductSort {
    pub field: SortField,
    pub descending: bool,
}

impl ProductSort {
    /// Unknown fields fall back to ordering by name, keeping the direction.
    pub fn parse(raw: Option<&str>) -> Self {
        let raw = match raw.map(str::trim) {
            Some(raw) if !raw.is_empty() => raw,
            _ => return Self::default(),
        };

        let (descending, name) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };

        let field = SortField::from_str(name).unwrap_or_else(|_| {
            warn!(sort = %raw, "Unknown sort field, falling back to name");
            SortField::Name
        });

        Self { field, descending }
    }

    fn order(&self) -> Order {
        if self.descending {
            Order::Desc
        } else {
            Order::Asc
        }
    }
}

/// Paging and ordering for catalog listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductQuery {
    /// 1-based page number
    pub page: u64,
    pub limit: u64,
    pub sort: ProductSort,
    pub featured_only: bool,
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            sort: ProductSort::default(),
            featured_only: false,
        }
    }
}

/// One page of catalog results.
#[derive(Debug, Clone)]
pub struct ProductPage {
    pub products: Vec<product::Model>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

impl ProductPage {
    /// Number of pages needed to show `total` items at `limit` per page.
    pub fn pages(&self) -> u64 {
        page_count(self.total, self.limit)
    }
}

pub fn page_count(total: u64, limit: u64) -> u64 {
    if limit == 0 {
        0
    } else {
        total.div_ceil(limit)
    }
}

/// Product fields embedded in cart and favorite responses.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub id: Uuid,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub image: String,
}

impl From<&product::Model> for ProductSummary {
    fn from(model: &product::Model) -> Self {
        Self {
            id: model.id,
            name: model.name.clone(),
            price: model.price,
            image: model.image.clone(),
        }
    }
}

/// Read-only access to the product catalog.
#[derive(Clone)]
pub struct ProductService {
    db: Arc<DatabaseConnection>,
}

impl ProductService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Lists products page by page, optionally restricted to featured ones.
    #[instrument(skip(self))]
    pub async fn list(&self, query: ProductQuery) -> Result<ProductPage, ServiceError> {
        let mut select = Product::find();
        if query.featured_only {
            select = select.filter(product::Column::Featured.eq(true));
        }

        self.fetch_page(select, &query).await
    }

    /// Lists products in a category. The category is matched
    /// case-insensitively; a category with no products on the requested
    /// page is reported as not found, as is a name outside the catalog.
    #[instrument(skip(self))]
    pub async fn list_by_category(
        &self,
        raw_category: &str,
        query: ProductQuery,
    ) -> Result<(Category, ProductPage), ServiceError> {
        let normalized = raw_category.trim().to_lowercase();
        let not_found =
            || ServiceError::NotFound(format!("No products found for category: {}", normalized));

        let category = Category::from_str(&normalized).map_err(|_| not_found())?;

        let select = Product::find().filter(product::Column::Category.eq(category));
        let page = self.fetch_page(select, &query).await?;

        if page.products.is_empty() {
            return Err(not_found());
        }

        Ok((category, page))
    }

    /// Fetches one product. Ids that are not UUIDs never match.
    #[instrument(skip(self))]
    pub async fn get(&self, raw_id: &str) -> Result<product::Model, ServiceError> {
        let id = Uuid::parse_str(raw_id.trim())
            .map_err(|_| ServiceError::NotFound("Product not found".to_string()))?;

        Product::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Product not found".to_string()))
    }

    async fn fetch_page(
        &self,
        select: Select<Product>,
        query: &ProductQuery,
    ) -> Result<ProductPage, ServiceError> {
        let page = query.page.max(1);
        let limit = query.limit.max(1);

        // Id as a tiebreaker keeps paging stable when sort values repeat
        let paginator = select
            .order_by(query.sort.field.column(), query.sort.order())
            .order_by_asc(product::Column::Id)
            .paginate(&*self.db, limit);

        let total = paginator.num_items().await?;
        // Pages past the end are empty; the offset is never sent when it would overflow
        let products = match (page - 1).checked_mul(limit) {
            Some(offset) if offset < total => paginator.fetch_page(page - 1).await?,
            _ => Vec::new(),
        };

        info!(
            total,
            page,
            limit,
            returned = products.len(),
            "Fetched product page"
        );

        Ok(ProductPage {
            products,
            total,
            page,
            limit,
        })
    }
}

/// Loads the products behind a set of ids in one query.
///
/// Ids with no matching product are simply absent from the map.
pub(crate) async fn lookup<C>(
    conn: &C,
    ids: impl IntoIterator<Item = Uuid>,
) -> Result<HashMap<Uuid, product::Model>, DbErr>
where
    C: ConnectionTrait,
{
    let ids: Vec<Uuid> = ids.into_iter().collect();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let products = Product::find()
        .filter(product::Column::Id.is_in(ids))
        .all(conn)
        .await?;

    Ok(products.into_iter().map(|p| (p.id, p)).collect())
}
