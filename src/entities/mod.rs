pub mod cart;
pub mod cart_item;
pub mod favorite;
pub mod product;

// Re-export entities
pub use cart::{Entity as Cart, Model as CartModel};
pub use cart_item::{Entity as CartItem, Model as CartItemModel};
pub use favorite::{Entity as Favorite, Model as FavoriteModel};
pub use product::{Category, Entity as Product, Model as ProductModel};
