//! SEO metadata for catalog pages.

use serde::Serialize;

use crate::domain::aggregates::{Category, Product};

const MAX_DESCRIPTION_CHARS: usize = 160;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SeoMeta {
    pub title: String,
    pub description: String,
    pub canonical_url: String,
}

impl SeoMeta {
    pub fn for_product(product: &Product, store_name: &str, base_url: &str) -> Self {
        let fallback = format!("Buy {} at {}.", product.name, store_name);
        Self {
            title: format!("{} | {}", product.name, store_name),
            description: meta_description(product.description.as_deref(), &fallback),
            canonical_url: canonical(base_url, "products", &product.slug_or_default()),
        }
    }

    pub fn for_category(category: &Category, store_name: &str, base_url: &str) -> Self {
        let fallback = format!("Browse {} at {}.", category.name, store_name);
        Self {
            title: format!("{} | {}", category.name, store_name),
            description: meta_description(category.description.as_deref(), &fallback),
            canonical_url: canonical(base_url, "categories", &category.slug_or_default()),
        }
    }
}

fn canonical(base_url: &str, kind: &str, slug: &str) -> String {
    format!("{}/{}/{}", base_url.trim_end_matches('/'), kind, slug)
}

/// Whitespace-collapsed description capped at 160 characters.
fn meta_description(description: Option<&str>, fallback: &str) -> String {
    let source = description.map(str::trim).filter(|d| !d.is_empty()).unwrap_or(fallback);
    let collapsed = source.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= MAX_DESCRIPTION_CHARS {
        return collapsed;
    }
    let cut: String = collapsed.chars().take(MAX_DESCRIPTION_CHARS - 3).collect();
    format!("{}...", cut.trim_end())
}
