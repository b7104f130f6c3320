//! Value Objects for the catalog

use chrono::{DateTime, NaiveDate, NaiveDateTime, SubsecRound, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{CatalogError, Result};

/// Money value object
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money { amount: Decimal, currency: String }

impl Money {
    pub fn new(amount: Decimal, currency: &str) -> Self { Self { amount, currency: currency.to_string() } }
    pub fn zero(currency: &str) -> Self { Self::new(Decimal::ZERO, currency) }
    pub fn amount(&self) -> Decimal { self.amount }
    pub fn currency(&self) -> &str { &self.currency }
    pub fn add(&self, other: &Money) -> Result<Money> {
        if self.currency != other.currency { return Err(CatalogError::CurrencyMismatch); }
        Ok(Money::new(self.amount + other.amount, &self.currency))
    }
    pub fn subtract(&self, other: &Money) -> Result<Money> {
        if self.currency != other.currency { return Err(CatalogError::CurrencyMismatch); }
        Ok(Money::new(self.amount - other.amount, &self.currency))
    }
    pub fn multiply(&self, qty: u32) -> Money { Money::new(self.amount * Decimal::from(qty), &self.currency) }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{} {:.2}", self.currency, self.amount) }
}

/// Percentage-off promotion bounded by an inclusive time window.
///
/// The same shape is used for a category's own discount, a product's own
/// discount, and the category discount a product inherits through the
/// catalog join. Field names follow the storefront's data API.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DiscountTerms {
    #[serde(default)]
    pub discount_enabled: bool,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub discount_percentage: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub discount_start_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub discount_end_date: Option<DateTime<Utc>>,
}

impl DiscountTerms {
    pub fn new(percentage: Decimal, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            discount_enabled: true,
            discount_percentage: Some(percentage),
            discount_start_date: Some(start),
            discount_end_date: Some(end),
        }
    }

    pub fn disabled() -> Self { Self::default() }

    /// All four fields present and the flag set.
    /// Percentage in effect at `now`, if any.
    ///
    /// Timestamps are compared at whole-second precision and both window
    /// ends are inclusive. A percentage outside `(0, 100]` never applies.
    pub fn active_percentage(&self, now: DateTime<Utc>) -> Option<Decimal> {
        if !self.discount_enabled {
            return None;
        }
        let (pct, start, end) = match (self.discount_percentage, self.discount_start_date, self.discount_end_date) {
            (Some(p), Some(s), Some(e)) => (p, s, e),
            _ => return None,
        };
        if pct <= Decimal::ZERO || pct > Decimal::ONE_HUNDRED {
            return None;
        }
        let now = now.trunc_subsecs(0);
        if now >= start.trunc_subsecs(0) && now <= end.trunc_subsecs(0) {
            Some(pct)
        } else {
            None
        }
    }
}

/// Category discount surfaced on a product row by the catalog join.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDiscountTerms {
    #[serde(default)]
    pub category_discount_enabled: bool,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub category_discount_percentage: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub category_discount_start_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub category_discount_end_date: Option<DateTime<Utc>>,
}

impl From<CategoryDiscountTerms> for DiscountTerms {
    fn from(c: CategoryDiscountTerms) -> Self {
        Self {
            discount_enabled: c.category_discount_enabled,
            discount_percentage: c.category_discount_percentage,
            discount_start_date: c.category_discount_start_date,
            discount_end_date: c.category_discount_end_date,
        }
    }
}

impl From<DiscountTerms> for CategoryDiscountTerms {
    fn from(d: DiscountTerms) -> Self {
        Self {
            category_discount_enabled: d.discount_enabled,
            category_discount_percentage: d.discount_percentage,
            category_discount_start_date: d.discount_start_date,
            category_discount_end_date: d.discount_end_date,
        }
    }
}

// =============================================================================
// Lenient deserializers
// =============================================================================

/// Parses a timestamp, returning `None` for anything unrecognised.
///
/// Accepts RFC 3339, naive `YYYY-MM-DDTHH:MM:SS[.fff]` / `YYYY-MM-DD HH:MM:SS`
/// (read as UTC), bare dates (midnight UTC) and integer epoch milliseconds.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| Utc.from_utc_datetime(&naive));
    }
    raw.parse::<i64>().ok().and_then(|ms| Utc.timestamp_millis_opt(ms).single())
}

fn lenient_timestamp<'de, D>(deserializer: D) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => parse_timestamp(&s),
        Some(serde_json::Value::Number(n)) => n.as_i64().and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        _ => None,
    })
}

fn lenient_decimal<'de, D>(deserializer: D) -> std::result::Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let raw = match value {
        Some(serde_json::Value::String(s)) => s.trim().to_string(),
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => return Ok(None),
    };
    Ok(Decimal::from_str(&raw).or_else(|_| Decimal::from_scientific(&raw)).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn at(s: &str) -> DateTime<Utc> { parse_timestamp(s).unwrap() }

    #[test]
    fn test_money_add() {
        let a = Money::new(dec!(100), "USD");
        let b = Money::new(dec!(50), "USD");
        assert_eq!(a.add(&b).unwrap().amount(), dec!(150));
        assert_eq!(a.add(&Money::zero("EUR")), Err(CatalogError::CurrencyMismatch));
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert_eq!(at("2024-05-01T10:00:00Z"), at("2024-05-01T12:00:00+02:00"));
        assert_eq!(at("2024-05-01T10:00:00"), at("2024-05-01 10:00:00"));
        assert_eq!(at("2024-05-01"), at("2024-05-01T00:00:00Z"));
        assert_eq!(at("1714557600000"), at("2024-05-01T10:00:00Z"));
        assert!(parse_timestamp("not a date").is_none());
        assert!(parse_timestamp("").is_none());
    }

    #[test]
    fn test_malformed_fields_deserialize_as_absent() {
        let terms: DiscountTerms = serde_json::from_value(serde_json::json!({
            "discountEnabled": true,
            "discountPercentage": "ten",
            "discountStartDate": "yesterday",
            "discountEndDate": 1714557600000i64,
        }))
        .unwrap();
        assert!(terms.discount_enabled);
        assert_eq!(terms.discount_percentage, None);
        assert_eq!(terms.discount_start_date, None);
        assert_eq!(terms.discount_end_date, Some(at("2024-05-01T10:00:00Z")));
        assert_eq!(terms.active_percentage(at("2024-05-01T10:00:00Z")), None);
    }

    #[test]
    fn test_percentage_accepts_numbers_and_strings() {
        let terms: DiscountTerms = serde_json::from_value(serde_json::json!({
            "discountEnabled": true,
            "discountPercentage": 12.5,
        }))
        .unwrap();
        assert_eq!(terms.discount_percentage, Some(dec!(12.5)));

        let terms: DiscountTerms = serde_json::from_value(serde_json::json!({ "discountPercentage": "30" })).unwrap();
        assert_eq!(terms.discount_percentage, Some(dec!(30)));
        assert!(!terms.discount_enabled);
    }

    #[test]
    fn test_active_percentage_truncates_subseconds() {
        let start = at("2024-05-01T00:00:00Z");
        let end = at("2024-05-31T23:59:59.001Z");
        let terms = DiscountTerms::new(dec!(20), start, end);
        assert_eq!(terms.active_percentage(at("2024-05-31T23:59:59.999Z")), Some(dec!(20)));
        assert_eq!(terms.active_percentage(at("2024-06-01T00:00:00Z")), None);
    }

    #[test]
    fn test_inverted_window_never_active() {
        let terms = DiscountTerms::new(dec!(20), at("2024-06-01"), at("2024-05-01"));
        assert_eq!(terms.active_percentage(at("2024-05-15")), None);
        assert_eq!(terms.active_percentage(at("2024-06-01")), None);
    }

    #[test]
    fn test_percentage_above_hundred_never_applies() {
        let window = (at("2024-05-01"), at("2024-05-31"));
        assert_eq!(DiscountTerms::new(dec!(100), window.0, window.1).active_percentage(at("2024-05-15")), Some(dec!(100)));
        assert_eq!(DiscountTerms::new(dec!(100.01), window.0, window.1).active_percentage(at("2024-05-15")), None);
        assert_eq!(DiscountTerms::new(dec!(999.99), window.0, window.1).active_percentage(at("2024-05-15")), None);
    }
}
