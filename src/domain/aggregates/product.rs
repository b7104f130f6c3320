//! Product Aggregate

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use crate::domain::value_objects::{CategoryDiscountTerms, DiscountTerms};

/// Catalog product as returned by the catalog join: its own discount plus
/// the discount of the single category it belongs to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category_id: String,
    pub price: Decimal,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub discount: DiscountTerms,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub category_discount: CategoryDiscountTerms,
}

impl Product {
    pub fn new(id: impl Into<String>, name: impl Into<String>, category_id: impl Into<String>, price: Decimal) -> Self {
        let name = name.into();
        Self {
            id: id.into(), slug: super::category::slugify(&name), name, description: None,
            category_id: category_id.into(), price,
            discount: DiscountTerms::disabled(), category_discount: CategoryDiscountTerms::default(),
        }
    }

    pub fn slug_or_default(&self) -> String {
        if self.slug.is_empty() { super::category::slugify(&self.name) } else { self.slug.clone() }
    }
}
