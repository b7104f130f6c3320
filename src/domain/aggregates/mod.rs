//! Aggregates module
pub mod category;
pub mod product;
pub mod cart;

pub use category::{slugify, Category};
pub use product::Product;
pub use cart::{Cart, CartItem, MAX_LINE_QUANTITY};
