//! Category Aggregate

use serde::{Deserialize, Serialize};
use crate::domain::value_objects::DiscountTerms;

/// Catalog category. `parent_id == None` marks a root.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub parent_id: Option<String>,
    /// Sort order among siblings.
    #[serde(default)]
    pub position: i32,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub discount: DiscountTerms,
}

impl Category {
    pub fn new(id: impl Into<String>, name: impl Into<String>, parent_id: Option<&str>, position: i32) -> Self {
        let name = name.into();
        Self {
            id: id.into(), slug: slugify(&name), name, description: None,
            parent_id: parent_id.map(str::to_string), position, discount: DiscountTerms::disabled(),
        }
    }

    /// Stored slug, or one derived from the name when the record has none.
    pub fn slug_or_default(&self) -> String {
        if self.slug.is_empty() { slugify(&self.name) } else { self.slug.clone() }
    }
}

/// Lowercase alphanumeric runs joined by single dashes.
pub fn slugify(name: &str) -> String {
    name.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Wall Panels & Trims"), "wall-panels-trims");
        assert_eq!(slugify("  3D  Tiles "), "3d-tiles");
    }

    #[test]
    fn test_deserialize_wire_record() {
        let c: Category = serde_json::from_value(serde_json::json!({
            "id": "c2",
            "name": "Vinyl",
            "parentId": "c1",
            "position": 3,
            "discountEnabled": true,
            "discountPercentage": 15,
            "discountStartDate": "2024-05-01T00:00:00Z",
            "discountEndDate": "garbage",
        }))
        .unwrap();
        assert_eq!(c.parent_id.as_deref(), Some("c1"));
        assert_eq!(c.position, 3);
        assert!(c.discount.discount_enabled);
        assert!(c.discount.discount_end_date.is_none());
        assert_eq!(c.slug_or_default(), "vinyl");
    }
}
