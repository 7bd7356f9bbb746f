// Catalog
pub mod products;

// Per-user collections
pub mod carts;
pub mod favorites;

pub use carts::{AddToCartInput, CartLine, CartService, CartView};
pub use favorites::{FavoriteService, FavoriteView};
pub use products::{ProductPage, ProductQuery, ProductService, ProductSort, ProductSummary};
