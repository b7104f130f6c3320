//! Decor Storefront
//!
//! Catalog, pricing and checkout logic for a decorative-materials storefront.
//!
//! ## Features
//! - Category tree building, filtering and breadcrumbs
//! - Time-windowed discounts with product-over-category precedence
//! - Sale listings
//! - Cart with WhatsApp checkout handoff
//! - Unit-of-material calculators
//! - SEO metadata
//! - Per-session visit/conversion analytics

pub mod analytics;
pub mod config;
pub mod domain;

pub use analytics::{AnalyticsStore, SessionAnalytics};
pub use config::Config;
pub use domain::aggregates::{Cart, CartItem, Category, Product};
pub use domain::category_tree::TreeNode;
pub use domain::pricing::{Clock, DiscountOutcome, DiscountSource, FixedClock, SystemClock};
pub use domain::value_objects::{DiscountTerms, Money};

use thiserror::Error;

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("Category {category_id} cannot be placed under {parent_id}: it would create a cycle")]
    ParentCycle {
        category_id: String,
        parent_id: String,
    },

    #[error("Category {0} still has subcategories or products")]
    CategoryInUse(String),

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Invalid quantity")]
    InvalidQuantity,

    #[error("Invalid phone number")]
    InvalidPhone,

    #[error("Invalid measurement: {0}")]
    InvalidMeasurement(String),

    #[error("Currency mismatch")]
    CurrencyMismatch,
}

pub type Result<T> = std::result::Result<T, CatalogError>;
