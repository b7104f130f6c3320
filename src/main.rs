//! Decor Storefront - catalog, pricing and checkout API

use anyhow::Result;
use axum::{extract::{Path, Query, State}, http::StatusCode, routing::{get, post}, Json, Router};
use std::time::Duration;
use chrono::{DateTime, Utc};
use decor_storefront::domain::aggregates::{Cart, Category, Product};
use decor_storefront::domain::events::{CatalogEvent, DomainEvent};
use decor_storefront::domain::{calculators, category_tree, pricing, seo::SeoMeta};
use decor_storefront::{AnalyticsStore, CatalogError, Clock, Config, DiscountOutcome, SessionAnalytics, SystemClock, TreeNode};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub nats: Option<async_nats::Client>,
    pub clock: Arc<dyn Clock>,
    pub analytics: AnalyticsStore,
    pub config: Arc<Config>,
}

type ApiError = (StatusCode, String);
type ApiResult<T> = std::result::Result<T, ApiError>;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())).with(tracing_subscriber::fmt::layer()).init();
    let config = Config::from_env()?;
    let db = PgPoolOptions::new().max_connections(10).connect(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&db).await?;
    let nats = match config.nats_url.as_deref() {
        Some(url) => match async_nats::connect(url).await {
            Ok(client) => Some(client),
            Err(e) => { tracing::warn!("NATS unavailable, events will not be published: {}", e); None }
        },
        None => None,
    };
    let port = config.port;
    let analytics = AnalyticsStore::with_limits(config.analytics_max_sessions, Duration::from_secs(config.analytics_session_idle_secs));
    let state = AppState { db, nats, clock: Arc::new(SystemClock), analytics, config: Arc::new(config) };

    let app = Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "decor-storefront"})) }))
        .route("/api/v1/categories", get(list_categories).post(create_category))
        .route("/api/v1/categories/tree", get(category_tree_handler))
        .route("/api/v1/categories/:id", get(get_category).put(update_category).delete(delete_category))
        .route("/api/v1/products", get(list_products).post(create_product))
        .route("/api/v1/products/:id", get(get_product).put(update_product).delete(delete_product))
        .route("/api/v1/sale", get(sale))
        .route("/api/v1/checkout/whatsapp", post(checkout_whatsapp))
        .route("/api/v1/calculators/coverage", post(coverage_calculator))
        .route("/api/v1/calculators/wallpaper", post(wallpaper_calculator))
        .route("/api/v1/analytics/visit", post(record_visit))
        .route("/api/v1/analytics/sessions/:id", get(get_session).delete(end_session))
        .layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive()).with_state(state);

    tracing::info!("Decor storefront listening on 0.0.0.0:{}", port);
    axum::serve(tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?, app).await?;
    Ok(())
}

// =============================================================================
// Helpers
// =============================================================================

const CATEGORY_COLUMNS: &str = "SELECT id, name, slug, description, parent_id, position, discount_enabled, discount_percentage, discount_start_date, discount_end_date FROM categories";

const PRODUCT_COLUMNS: &str = "SELECT p.id, p.name, p.slug, p.description, p.category_id, p.price, \
    p.discount_enabled, p.discount_percentage, p.discount_start_date, p.discount_end_date, \
    COALESCE(c.discount_enabled, FALSE) AS category_discount_enabled, c.discount_percentage AS category_discount_percentage, \
    c.discount_start_date AS category_discount_start_date, c.discount_end_date AS category_discount_end_date \
    FROM products p LEFT JOIN categories c ON c.id = p.category_id";

fn internal(e: impl std::fmt::Display) -> ApiError {
    tracing::error!("Request failed: {}", e);
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

fn domain_error(e: CatalogError) -> ApiError {
    let status = match &e {
        CatalogError::CategoryNotFound(_) | CatalogError::ProductNotFound(_) => StatusCode::NOT_FOUND,
        CatalogError::ParentCycle { .. } | CatalogError::CategoryInUse(_) => StatusCode::CONFLICT,
        CatalogError::EmptyCart | CatalogError::InvalidQuantity | CatalogError::InvalidPhone
        | CatalogError::InvalidMeasurement(_) | CatalogError::CurrencyMismatch => StatusCode::UNPROCESSABLE_ENTITY,
    };
    (status, e.to_string())
}

fn invalid(e: validator::ValidationErrors) -> ApiError { (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()) }

async fn load_categories(db: &sqlx::PgPool) -> ApiResult<Vec<Category>> {
    sqlx::query_as::<_, Category>(CATEGORY_COLUMNS).fetch_all(db).await.map_err(internal)
}

async fn load_products(db: &sqlx::PgPool) -> ApiResult<Vec<Product>> {
    sqlx::query_as::<_, Product>(&format!("{PRODUCT_COLUMNS} ORDER BY p.name")).fetch_all(db).await.map_err(internal)
}

async fn fetch_product(db: &sqlx::PgPool, id: &str) -> ApiResult<Product> {
    sqlx::query_as::<_, Product>(&format!("{PRODUCT_COLUMNS} WHERE p.id = $1")).bind(id).fetch_optional(db).await.map_err(internal)?
        .ok_or_else(|| domain_error(CatalogError::ProductNotFound(id.to_string())))
}

fn slug_for(slug: Option<&str>, name: &str) -> String {
    slug.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
        .unwrap_or_else(|| decor_storefront::domain::aggregates::slugify(name))
}

fn validate_percentage(pct: &Decimal) -> std::result::Result<(), ValidationError> {
    if *pct < Decimal::ZERO || *pct > Decimal::ONE_HUNDRED { return Err(ValidationError::new("percentage_out_of_range")); }
    Ok(())
}

async fn publish(nats: &Option<async_nats::Client>, event: &DomainEvent) {
    let Some(client) = nats else { return };
    match serde_json::to_vec(event) {
        Ok(payload) => {
            if let Err(e) = client.publish(event.subject().to_string(), payload.into()).await {
                tracing::warn!("Failed to publish {}: {}", event.subject(), e);
            }
        }
        Err(e) => tracing::warn!("Failed to serialize {}: {}", event.subject(), e),
    }
}

// =============================================================================
// Categories
// =============================================================================

#[derive(Debug, Serialize)] pub struct CategoryView { #[serde(flatten)] pub category: Category, pub discount: DiscountOutcome }
#[derive(Debug, Serialize)] #[serde(rename_all = "camelCase")] pub struct CategoryDetail { #[serde(flatten)] pub category: Category, pub breadcrumbs: Vec<Category>, pub product_count: usize, pub discount: DiscountOutcome, pub seo: SeoMeta }
#[derive(Debug, Deserialize)] pub struct TreeParams { pub parent: Option<String>, pub search: Option<String> }

async fn list_categories(State(s): State<AppState>) -> ApiResult<Json<Vec<CategoryView>>> {
    let now = s.clock.now();
    let cats = load_categories(&s.db).await?;
    Ok(Json(cats.into_iter().map(|c| CategoryView { discount: pricing::evaluate_category(&c, now), category: c }).collect()))
}

async fn category_tree_handler(State(s): State<AppState>, Query(p): Query<TreeParams>) -> ApiResult<Json<Vec<TreeNode>>> {
    let cats = load_categories(&s.db).await?;
    let tree = category_tree::build_tree(&cats, p.parent.as_deref());
    Ok(Json(match p.search.as_deref().map(str::trim) {
        Some(term) if !term.is_empty() => category_tree::filter_tree(&tree, term),
        _ => tree,
    }))
}

async fn get_category(State(s): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<CategoryDetail>> {
    let cats = load_categories(&s.db).await?;
    let category = cats.iter().find(|c| c.id == id).cloned().ok_or_else(|| domain_error(CatalogError::CategoryNotFound(id.clone())))?;
    let products = load_products(&s.db).await?;
    Ok(Json(CategoryDetail {
        breadcrumbs: category_tree::breadcrumbs(&id, &cats),
        product_count: category_tree::count_products_in_subtree(&id, &cats, &products),
        discount: pricing::evaluate_category(&category, s.clock.now()),
        seo: SeoMeta::for_category(&category, &s.config.store_name, &s.config.store_base_url),
        category,
    }))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRequest {
    #[validate(length(min = 1, max = 120))] pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub parent_id: Option<String>,
    #[serde(default)] pub position: i32,
    #[serde(default)] pub discount_enabled: bool,
    #[validate(custom = "validate_percentage")] pub discount_percentage: Option<Decimal>,
    pub discount_start_date: Option<DateTime<Utc>>,
    pub discount_end_date: Option<DateTime<Utc>>,
}

impl CategoryRequest {
    fn slug(&self) -> String { slug_for(self.slug.as_deref(), &self.name) }
}

async fn create_category(State(s): State<AppState>, Json(r): Json<CategoryRequest>) -> ApiResult<(StatusCode, Json<Category>)> {
    r.validate().map_err(invalid)?;
    let cats = load_categories(&s.db).await?;
    let id = Uuid::now_v7().to_string();
    category_tree::ensure_valid_parent(&id, r.parent_id.as_deref(), &cats).map_err(domain_error)?;
    let c = sqlx::query_as::<_, Category>("INSERT INTO categories (id, name, slug, description, parent_id, position, discount_enabled, discount_percentage, discount_start_date, discount_end_date) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING id, name, slug, description, parent_id, position, discount_enabled, discount_percentage, discount_start_date, discount_end_date")
        .bind(&id).bind(&r.name).bind(r.slug()).bind(&r.description).bind(&r.parent_id).bind(r.position)
        .bind(r.discount_enabled).bind(r.discount_percentage).bind(r.discount_start_date).bind(r.discount_end_date)
        .fetch_one(&s.db).await.map_err(internal)?;
    tracing::info!(category_id = %c.id, "category created");
    publish(&s.nats, &DomainEvent::Catalog(CatalogEvent::CategoryCreated { category_id: c.id.clone() })).await;
    Ok((StatusCode::CREATED, Json(c)))
}

async fn update_category(State(s): State<AppState>, Path(id): Path<String>, Json(r): Json<CategoryRequest>) -> ApiResult<Json<Category>> {
    r.validate().map_err(invalid)?;
    let cats = load_categories(&s.db).await?;
    if !cats.iter().any(|c| c.id == id) { return Err(domain_error(CatalogError::CategoryNotFound(id))); }
    category_tree::ensure_valid_parent(&id, r.parent_id.as_deref(), &cats).map_err(domain_error)?;
    let c = sqlx::query_as::<_, Category>("UPDATE categories SET name = $2, slug = $3, description = $4, parent_id = $5, position = $6, discount_enabled = $7, discount_percentage = $8, discount_start_date = $9, discount_end_date = $10, updated_at = NOW() WHERE id = $1 RETURNING id, name, slug, description, parent_id, position, discount_enabled, discount_percentage, discount_start_date, discount_end_date")
        .bind(&id).bind(&r.name).bind(r.slug()).bind(&r.description).bind(&r.parent_id).bind(r.position)
        .bind(r.discount_enabled).bind(r.discount_percentage).bind(r.discount_start_date).bind(r.discount_end_date)
        .fetch_optional(&s.db).await.map_err(internal)?.ok_or_else(|| domain_error(CatalogError::CategoryNotFound(id.clone())))?;
    publish(&s.nats, &DomainEvent::Catalog(CatalogEvent::CategoryUpdated { category_id: c.id.clone(), parent_id: c.parent_id.clone() })).await;
    Ok(Json(c))
}

async fn delete_category(State(s): State<AppState>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    let cats = load_categories(&s.db).await?;
    let products = load_products(&s.db).await?;
    category_tree::ensure_deletable(&id, &cats, &products).map_err(domain_error)?;
    sqlx::query("DELETE FROM categories WHERE id = $1").bind(&id).execute(&s.db).await.map_err(internal)?;
    tracing::info!(category_id = %id, "category deleted");
    publish(&s.nats, &DomainEvent::Catalog(CatalogEvent::CategoryDeleted { category_id: id })).await;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Products
// =============================================================================

#[derive(Debug, Serialize)] pub struct ProductView { #[serde(flatten)] pub product: Product, pub pricing: DiscountOutcome }
#[derive(Debug, Serialize)] pub struct ProductDetail { #[serde(flatten)] pub product: Product, pub pricing: DiscountOutcome, pub seo: SeoMeta }
#[derive(Debug, Deserialize)] pub struct ProductParams { pub category: Option<String>, pub search: Option<String> }

async fn list_products(State(s): State<AppState>, Query(p): Query<ProductParams>) -> ApiResult<Json<Vec<ProductView>>> {
    let now = s.clock.now();
    let products = load_products(&s.db).await?;
    let selected: Vec<&Product> = match p.category.as_deref() {
        Some(category_id) => category_tree::products_in_subtree(category_id, &load_categories(&s.db).await?, &products),
        None => products.iter().collect(),
    };
    let needle = p.search.as_deref().map(|t| t.trim().to_lowercase()).filter(|t| !t.is_empty());
    Ok(Json(selected.into_iter()
        .filter(|prod| needle.as_ref().map_or(true, |n| prod.name.to_lowercase().contains(n)))
        .map(|prod| ProductView { pricing: pricing::evaluate(prod, now), product: prod.clone() })
        .collect()))
}

async fn get_product(State(s): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<ProductDetail>> {
    let product = fetch_product(&s.db, &id).await?;
    Ok(Json(ProductDetail {
        pricing: pricing::evaluate(&product, s.clock.now()),
        seo: SeoMeta::for_product(&product, &s.config.store_name, &s.config.store_base_url),
        product,
    }))
}

fn validate_price(price: &Decimal) -> std::result::Result<(), ValidationError> {
    // products.price is NUMERIC(12, 2)
    if *price < Decimal::ZERO || *price >= Decimal::new(10_000_000_000, 0) { return Err(ValidationError::new("price_out_of_range")); }
    Ok(())
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    #[validate(length(min = 1, max = 200))] pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    #[validate(length(min = 1))] pub category_id: String,
    #[validate(custom = "validate_price")] pub price: Decimal,
    #[serde(default)] pub discount_enabled: bool,
    #[validate(custom = "validate_percentage")] pub discount_percentage: Option<Decimal>,
    pub discount_start_date: Option<DateTime<Utc>>,
    pub discount_end_date: Option<DateTime<Utc>>,
}

async fn ensure_category_exists(db: &sqlx::PgPool, category_id: &str) -> ApiResult<()> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM categories WHERE id = $1)").bind(category_id).fetch_one(db).await.map_err(internal)?;
    if exists { Ok(()) } else { Err(domain_error(CatalogError::CategoryNotFound(category_id.to_string()))) }
}

async fn create_product(State(s): State<AppState>, Json(r): Json<ProductRequest>) -> ApiResult<(StatusCode, Json<ProductView>)> {
    r.validate().map_err(invalid)?;
    ensure_category_exists(&s.db, &r.category_id).await?;
    let id = Uuid::now_v7().to_string();
    sqlx::query("INSERT INTO products (id, name, slug, description, category_id, price, discount_enabled, discount_percentage, discount_start_date, discount_end_date) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)")
        .bind(&id).bind(&r.name).bind(slug_for(r.slug.as_deref(), &r.name)).bind(&r.description).bind(&r.category_id).bind(r.price)
        .bind(r.discount_enabled).bind(r.discount_percentage).bind(r.discount_start_date).bind(r.discount_end_date)
        .execute(&s.db).await.map_err(internal)?;
    let product = fetch_product(&s.db, &id).await?;
    tracing::info!(product_id = %product.id, "product created");
    publish(&s.nats, &DomainEvent::Catalog(CatalogEvent::ProductCreated { product_id: product.id.clone(), category_id: product.category_id.clone() })).await;
    Ok((StatusCode::CREATED, Json(ProductView { pricing: pricing::evaluate(&product, s.clock.now()), product })))
}

async fn update_product(State(s): State<AppState>, Path(id): Path<String>, Json(r): Json<ProductRequest>) -> ApiResult<Json<ProductView>> {
    r.validate().map_err(invalid)?;
    ensure_category_exists(&s.db, &r.category_id).await?;
    let updated = sqlx::query("UPDATE products SET name = $2, slug = $3, description = $4, category_id = $5, price = $6, discount_enabled = $7, discount_percentage = $8, discount_start_date = $9, discount_end_date = $10, updated_at = NOW() WHERE id = $1")
        .bind(&id).bind(&r.name).bind(slug_for(r.slug.as_deref(), &r.name)).bind(&r.description).bind(&r.category_id).bind(r.price)
        .bind(r.discount_enabled).bind(r.discount_percentage).bind(r.discount_start_date).bind(r.discount_end_date)
        .execute(&s.db).await.map_err(internal)?;
    if updated.rows_affected() == 0 { return Err(domain_error(CatalogError::ProductNotFound(id))); }
    let product = fetch_product(&s.db, &id).await?;
    publish(&s.nats, &DomainEvent::Catalog(CatalogEvent::ProductUpdated { product_id: product.id.clone(), category_id: product.category_id.clone() })).await;
    Ok(Json(ProductView { pricing: pricing::evaluate(&product, s.clock.now()), product }))
}

async fn delete_product(State(s): State<AppState>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    let deleted = sqlx::query("DELETE FROM products WHERE id = $1").bind(&id).execute(&s.db).await.map_err(internal)?;
    if deleted.rows_affected() == 0 { return Err(domain_error(CatalogError::ProductNotFound(id))); }
    tracing::info!(product_id = %id, "product deleted");
    publish(&s.nats, &DomainEvent::Catalog(CatalogEvent::ProductDeleted { product_id: id })).await;
    Ok(StatusCode::NO_CONTENT)
}

async fn sale(State(s): State<AppState>) -> ApiResult<Json<Vec<ProductView>>> {
    let products = load_products(&s.db).await?;
    Ok(Json(pricing::products_on_sale(&products, s.clock.now()).into_iter()
        .map(|(product, pricing)| ProductView { product: product.clone(), pricing }).collect()))
}

// =============================================================================
// Checkout
// =============================================================================

#[derive(Debug, Deserialize, Validate)] pub struct CheckoutRequest { pub session_id: Option<String>, #[validate(length(min = 1))] pub items: Vec<CheckoutItem> }
#[derive(Debug, Serialize, Deserialize, Validate)] pub struct CheckoutItem { pub product_id: String, #[validate(range(min = 1, max = 10000))] pub quantity: u32 }
#[derive(Debug, Serialize)] pub struct CheckoutResponse { pub url: String, pub cart: Cart }

async fn checkout_whatsapp(State(s): State<AppState>, Json(r): Json<CheckoutRequest>) -> ApiResult<Json<CheckoutResponse>> {
    r.validate().map_err(invalid)?;
    for item in &r.items { item.validate().map_err(invalid)?; }
    let ids: Vec<String> = r.items.iter().map(|i| i.product_id.clone()).collect();
    let products = sqlx::query_as::<_, Product>(&format!("{PRODUCT_COLUMNS} WHERE p.id = ANY($1)")).bind(&ids).fetch_all(&s.db).await.map_err(internal)?;
    let now = s.clock.now();
    let mut cart = match &r.session_id { Some(sid) => Cart::for_session(sid, &s.config.currency), None => Cart::new(&s.config.currency) };
    for item in &r.items {
        let product = products.iter().find(|p| p.id == item.product_id).ok_or_else(|| domain_error(CatalogError::ProductNotFound(item.product_id.clone())))?;
        cart.add_product(product, item.quantity, now).map_err(domain_error)?;
    }
    let url = cart.checkout_via_whatsapp(&s.config.store_whatsapp, &s.config.store_name).map_err(domain_error)?;
    if let Some(sid) = &r.session_id { s.analytics.record_conversion(sid).await; }
    for event in cart.take_events() { publish(&s.nats, &event).await; }
    tracing::info!(cart_id = %cart.id(), items = cart.item_count(), "whatsapp checkout handoff");
    Ok(Json(CheckoutResponse { url, cart }))
}

// =============================================================================
// Calculators
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct CoverageRequest { pub area_m2: Option<Decimal>, pub perimeter_m: Option<Decimal>, pub height_m: Option<Decimal>, #[serde(default)] pub openings_m2: Decimal, pub coverage_per_unit_m2: Decimal, #[serde(default)] pub waste_percent: Decimal }
#[derive(Debug, Serialize)] pub struct CoverageResponse { pub area_m2: Decimal, pub units: u32 }
#[derive(Debug, Deserialize)]
pub struct WallpaperRequest { pub perimeter_m: Decimal, pub height_m: Decimal, pub roll_width_m: Decimal, pub roll_length_m: Decimal, #[serde(default)] pub pattern_repeat_m: Decimal }

async fn coverage_calculator(Json(r): Json<CoverageRequest>) -> ApiResult<Json<CoverageResponse>> {
    let area_m2 = match (r.area_m2, r.perimeter_m, r.height_m) {
        (Some(area), _, _) => area,
        (None, Some(perimeter), Some(height)) => calculators::wall_area(perimeter, height, r.openings_m2).map_err(domain_error)?,
        _ => return Err(domain_error(CatalogError::InvalidMeasurement("area or perimeter and height required".to_string()))),
    };
    let units = calculators::coverage_units(area_m2, r.coverage_per_unit_m2, r.waste_percent).map_err(domain_error)?;
    Ok(Json(CoverageResponse { area_m2: calculators::round_money(area_m2, 2), units }))
}

async fn wallpaper_calculator(Json(r): Json<WallpaperRequest>) -> ApiResult<Json<calculators::WallpaperEstimate>> {
    calculators::wallpaper_rolls(r.perimeter_m, r.height_m, r.roll_width_m, r.roll_length_m, r.pattern_repeat_m).map(Json).map_err(domain_error)
}

// =============================================================================
// Analytics
// =============================================================================

#[derive(Debug, Deserialize, Validate)] pub struct VisitRequest { #[validate(length(min = 1, max = 128))] pub session_id: String, #[validate(length(min = 1, max = 2048))] pub path: String }

async fn record_visit(State(s): State<AppState>, Json(r): Json<VisitRequest>) -> ApiResult<StatusCode> {
    r.validate().map_err(invalid)?;
    let Some(event) = s.analytics.record_visit(&r.session_id, &r.path).await else { return Ok(StatusCode::NO_CONTENT) };
    let stored = sqlx::query("INSERT INTO page_visits (id, session_id, path, visited_at) VALUES ($1, $2, $3, $4)")
        .bind(Uuid::now_v7()).bind(&r.session_id).bind(&r.path).bind(s.clock.now())
        .execute(&s.db).await;
    if let Err(e) = stored {
        s.analytics.forget_visit(&r.session_id, &r.path).await;
        return Err(internal(e));
    }
    publish(&s.nats, &event).await;
    Ok(StatusCode::CREATED)
}

async fn get_session(State(s): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<SessionAnalytics>> {
    s.analytics.session(&id).await.map(Json).ok_or_else(|| (StatusCode::NOT_FOUND, format!("Session not found: {id}")))
}

async fn end_session(State(s): State<AppState>, Path(id): Path<String>) -> StatusCode {
    if s.analytics.end_session(&id).await { StatusCode::NO_CONTENT } else { StatusCode::NOT_FOUND }
}
