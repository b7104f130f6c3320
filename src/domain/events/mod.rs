//! Domain events
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DomainEvent {
    Catalog(CatalogEvent),
    Analytics(AnalyticsEvent),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CatalogEvent {
    CategoryCreated { category_id: String },
    CategoryUpdated { category_id: String, parent_id: Option<String> },
    CategoryDeleted { category_id: String },
    ProductCreated { product_id: String, category_id: String },
    ProductUpdated { product_id: String, category_id: String },
    ProductDeleted { product_id: String },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnalyticsEvent {
    PageVisited { session_id: String, path: String },
    WhatsAppCheckout { session_id: Option<String>, item_count: usize, total: Decimal },
}

impl DomainEvent {
    /// NATS subject the event is published on.
    pub fn subject(&self) -> &'static str {
        match self {
            Self::Catalog(CatalogEvent::CategoryCreated { .. }) => "storefront.catalog.category_created",
            Self::Catalog(CatalogEvent::CategoryUpdated { .. }) => "storefront.catalog.category_updated",
            Self::Catalog(CatalogEvent::CategoryDeleted { .. }) => "storefront.catalog.category_deleted",
            Self::Catalog(CatalogEvent::ProductCreated { .. }) => "storefront.catalog.product_created",
            Self::Catalog(CatalogEvent::ProductUpdated { .. }) => "storefront.catalog.product_updated",
            Self::Catalog(CatalogEvent::ProductDeleted { .. }) => "storefront.catalog.product_deleted",
            Self::Analytics(AnalyticsEvent::PageVisited { .. }) => "storefront.analytics.page_visited",
            Self::Analytics(AnalyticsEvent::WhatsAppCheckout { .. }) => "storefront.analytics.whatsapp_checkout",
        }
    }
}
