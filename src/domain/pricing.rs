//! Discount evaluation.
//!
//! Pure functions over a caller-supplied snapshot and a reference instant.
//! A product's own promotion always wins over the category sale it inherits;
//! the two are never summed or compared.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::aggregates::{Category, Product};
use crate::domain::value_objects::DiscountTerms;

/// Source of "now" for discount checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> { Utc::now() }
}

/// Always returns the same instant.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> { self.0 }
}

/// Anything with a list price and discount terms.
pub trait PricedEntity {
    fn list_price(&self) -> Decimal;

    fn own_discount(&self) -> DiscountTerms;

    /// Fallback discount applied when the entity has no active promotion of its own.
    fn inherited_discount(&self) -> Option<DiscountTerms> { None }
}

impl PricedEntity for Product {
    fn list_price(&self) -> Decimal { self.price }
    fn own_discount(&self) -> DiscountTerms { self.discount }
    fn inherited_discount(&self) -> Option<DiscountTerms> { Some(self.category_discount.into()) }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountSource {
    Product,
    Category,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountOutcome {
    pub active: bool,
    pub percentage: Decimal,
    pub final_price: Decimal,
    pub source: Option<DiscountSource>,
}

impl DiscountOutcome {
    fn inactive(price: Decimal) -> Self {
        Self { active: false, percentage: Decimal::ZERO, final_price: price, source: None }
    }

    fn applied(price: Decimal, percentage: Decimal, source: DiscountSource) -> Self {
        Self { active: true, percentage, final_price: apply_percentage(price, percentage), source: Some(source) }
    }

    /// Amount taken off the list price.
    pub fn savings(&self, list_price: Decimal) -> Decimal { list_price - self.final_price }
}

/// `price * (1 - percentage / 100)`.
pub fn apply_percentage(price: Decimal, percentage: Decimal) -> Decimal {
    price * (Decimal::ONE - percentage / Decimal::ONE_HUNDRED)
}

pub fn evaluate<E: PricedEntity + ?Sized>(entity: &E, now: DateTime<Utc>) -> DiscountOutcome {
    let price = entity.list_price();
    if let Some(pct) = entity.own_discount().active_percentage(now) {
        return DiscountOutcome::applied(price, pct, DiscountSource::Product);
    }
    if let Some(pct) = entity.inherited_discount().and_then(|d| d.active_percentage(now)) {
        return DiscountOutcome::applied(price, pct, DiscountSource::Category);
    }
    DiscountOutcome::inactive(price)
}

/// Category tiles have no price of their own; only the badge matters.
pub fn evaluate_category(category: &Category, now: DateTime<Utc>) -> DiscountOutcome {
    match category.discount.active_percentage(now) {
        Some(pct) => DiscountOutcome {
            active: true,
            percentage: pct,
            final_price: Decimal::ZERO,
            source: Some(DiscountSource::Category),
        },
        None => DiscountOutcome::inactive(Decimal::ZERO),
    }
}

/// Products with an active discount, deepest discount first, then by name.
pub fn products_on_sale(products: &[Product], now: DateTime<Utc>) -> Vec<(&Product, DiscountOutcome)> {
    let mut on_sale: Vec<_> = products
        .iter()
        .map(|p| (p, evaluate(p, now)))
        .filter(|(_, outcome)| outcome.active)
        .collect();
    on_sale.sort_by(|(a, oa), (b, ob)| ob.percentage.cmp(&oa.percentage).then_with(|| a.name.cmp(&b.name)));
    on_sale
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::parse_timestamp;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn at(s: &str) -> DateTime<Utc> { parse_timestamp(s).unwrap() }

    fn may() -> (DateTime<Utc>, DateTime<Utc>) { (at("2024-05-01T00:00:00Z"), at("2024-05-31T23:59:59Z")) }

    fn product(price: Decimal) -> Product { Product::new("p1", "Oak panel", "c1", price) }

    #[test]
    fn test_disabled_discount_is_inactive() {
        let (start, end) = may();
        let mut p = product(dec!(100));
        p.discount = DiscountTerms { discount_enabled: false, ..DiscountTerms::new(dec!(10), start, end) };
        let outcome = evaluate(&p, at("2024-05-15T12:00:00Z"));
        assert!(!outcome.active);
        assert_eq!(outcome.percentage, Decimal::ZERO);
        assert_eq!(outcome.final_price, dec!(100));
        assert_eq!(outcome.source, None);
    }

    #[test]
    fn test_active_within_window() {
        let (start, end) = may();
        let mut p = product(dec!(80));
        p.discount = DiscountTerms::new(dec!(25), start, end);
        let outcome = evaluate(&p, at("2024-05-15T12:00:00Z"));
        assert!(outcome.active);
        assert_eq!(outcome.percentage, dec!(25));
        assert_eq!(outcome.final_price, dec!(80) * (Decimal::ONE - dec!(25) / dec!(100)));
        assert_eq!(outcome.final_price, dec!(60));
        assert_eq!(outcome.savings(p.price), dec!(20));
    }

    #[test]
    fn test_window_bounds_are_inclusive() {
        let (start, end) = may();
        let mut p = product(dec!(100));
        p.discount = DiscountTerms::new(dec!(10), start, end);
        assert!(evaluate(&p, start).active);
        assert!(evaluate(&p, end).active);
        assert!(!evaluate(&p, start - Duration::seconds(1)).active);
        assert!(!evaluate(&p, end + Duration::seconds(1)).active);
    }

    #[test]
    fn test_subsecond_boundary() {
        let mut p = product(dec!(100));
        p.discount = DiscountTerms::new(dec!(10), at("2024-05-01T00:00:00Z"), at("2024-05-31T23:59:59.001Z"));
        assert!(evaluate(&p, at("2024-05-31T23:59:59.999Z")).active);
    }

    #[test]
    fn test_zero_percentage_is_not_a_discount() {
        let (start, end) = may();
        let mut p = product(dec!(100));
        p.discount = DiscountTerms::new(Decimal::ZERO, start, end);
        assert!(!evaluate(&p, at("2024-05-15")).active);
    }

    #[test]
    fn test_missing_end_date_never_active() {
        let (start, _) = may();
        let mut p = product(dec!(100));
        p.discount = DiscountTerms { discount_end_date: None, ..DiscountTerms::new(dec!(10), start, start) };
        assert!(!evaluate(&p, start).active);
    }

    #[test]
    fn test_own_discount_beats_category_discount() {
        let (start, end) = may();
        let mut p = product(dec!(200));
        p.discount = DiscountTerms::new(dec!(10), start, end);
        p.category_discount = DiscountTerms::new(dec!(30), start, end).into();
        let outcome = evaluate(&p, at("2024-05-15"));
        assert_eq!(outcome.percentage, dec!(10));
        assert_eq!(outcome.final_price, dec!(180));
        assert_eq!(outcome.source, Some(DiscountSource::Product));
    }

    #[test]
    fn test_category_discount_inherited() {
        let (start, end) = may();
        let mut p = product(dec!(200));
        p.category_discount = DiscountTerms::new(dec!(25), start, end).into();
        let outcome = evaluate(&p, at("2024-05-15"));
        assert!(outcome.active);
        assert_eq!(outcome.percentage, dec!(25));
        assert_eq!(outcome.final_price, dec!(150));
        assert_eq!(outcome.source, Some(DiscountSource::Category));
    }

    #[test]
    fn test_expired_own_discount_falls_back_to_category() {
        let (start, end) = may();
        let mut p = product(dec!(100));
        p.discount = DiscountTerms::new(dec!(50), at("2024-01-01"), at("2024-01-31"));
        p.category_discount = DiscountTerms::new(dec!(15), start, end).into();
        let outcome = evaluate(&p, at("2024-05-15"));
        assert_eq!(outcome.percentage, dec!(15));
        assert_eq!(outcome.source, Some(DiscountSource::Category));
    }

    #[test]
    fn test_percentage_over_hundred_is_ignored() {
        let (start, end) = may();
        let mut p = product(dec!(100));
        p.discount = DiscountTerms::new(dec!(150), start, end);
        assert!(!evaluate(&p, at("2024-05-15")).active);

        p.category_discount = DiscountTerms::new(dec!(10), start, end).into();
        let outcome = evaluate(&p, at("2024-05-15"));
        assert_eq!(outcome.source, Some(DiscountSource::Category));
        assert_eq!(outcome.final_price, dec!(90));
        assert!(outcome.final_price >= Decimal::ZERO);
    }

    #[test]
    fn test_evaluate_category_badge() {
        let (start, end) = may();
        let mut c = Category::new("c1", "Wallpaper", None, 0);
        c.discount = DiscountTerms::new(dec!(20), start, end);
        let outcome = evaluate_category(&c, at("2024-05-02"));
        assert!(outcome.active);
        assert_eq!(outcome.percentage, dec!(20));
        assert!(!evaluate_category(&c, at("2024-06-02")).active);
    }

    #[test]
    fn test_products_on_sale_ordering() {
        let (start, end) = may();
        let mut a = Product::new("a", "Tile", "c1", dec!(10));
        a.discount = DiscountTerms::new(dec!(10), start, end);
        let mut b = Product::new("b", "Brick", "c1", dec!(10));
        b.category_discount = DiscountTerms::new(dec!(30), start, end).into();
        let c = Product::new("c", "Paint", "c1", dec!(10));
        let mut d = Product::new("d", "Adhesive", "c1", dec!(10));
        d.discount = DiscountTerms::new(dec!(10), start, end);

        let products = vec![a, b, c, d];
        let sale = products_on_sale(&products, at("2024-05-10"));
        let ids: Vec<_> = sale.iter().map(|(p, _)| p.id.as_str()).collect();
        assert_eq!(ids, ["b", "d", "a"]);
    }

    #[test]
    fn test_fixed_clock() {
        let clock = FixedClock(at("2024-05-10"));
        assert_eq!(clock.now(), at("2024-05-10"));
    }
}
