//! Cart Aggregate
//!
//! Checkout is a handoff: the cart is rendered into a WhatsApp message and
//! the customer finishes the order in chat with the store.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;
use crate::domain::aggregates::Product;
use crate::domain::events::{AnalyticsEvent, DomainEvent};
use crate::domain::pricing;
use crate::domain::value_objects::Money;
use crate::{CatalogError, Result};

/// Largest quantity a single cart line may hold.
pub const MAX_LINE_QUANTITY: u32 = 10_000;

#[derive(Clone, Debug, Serialize)]
pub struct Cart {
    id: String,
    session_id: Option<String>,
    items: Vec<CartItem>,
    subtotal: Money,
    savings: Money,
    currency: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(skip)]
    events: Vec<DomainEvent>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CartItem {
    pub product_id: String,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Money,
    /// Unit price after the discount in effect when the item was added.
    pub unit_final_price: Money,
    pub discount_percentage: Decimal,
}

impl CartItem {
    pub fn line_total(&self) -> Money { self.unit_final_price.multiply(self.quantity) }
    pub fn line_list_total(&self) -> Money { self.unit_price.multiply(self.quantity) }
}

impl Cart {
    pub fn new(currency: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(), session_id: None,
            items: vec![], subtotal: Money::zero(currency), savings: Money::zero(currency), currency: currency.to_string(),
            created_at: Utc::now(), updated_at: Utc::now(), events: vec![],
        }
    }

    pub fn for_session(session_id: impl Into<String>, currency: &str) -> Self {
        let mut cart = Self::new(currency);
        cart.session_id = Some(session_id.into());
        cart
    }

    pub fn id(&self) -> &str { &self.id }
    pub fn items(&self) -> &[CartItem] { &self.items }
    pub fn subtotal(&self) -> &Money { &self.subtotal }
    pub fn savings(&self) -> &Money { &self.savings }
    pub fn item_count(&self) -> usize { self.items.len() }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }

    /// Adds `quantity` units of `product`, priced at `now`.
    pub fn add_product(&mut self, product: &Product, quantity: u32, now: DateTime<Utc>) -> Result<()> {
        let outcome = pricing::evaluate(product, now);
        self.add_item(CartItem {
            product_id: product.id.clone(), name: product.name.clone(), quantity,
            unit_price: Money::new(product.price, &self.currency),
            unit_final_price: Money::new(outcome.final_price, &self.currency),
            discount_percentage: outcome.percentage,
        })
    }

    /// Adds a priced line, merging with an existing line for the same product.
    pub fn add_item(&mut self, item: CartItem) -> Result<()> {
        if item.quantity == 0 || item.quantity > MAX_LINE_QUANTITY { return Err(CatalogError::InvalidQuantity); }
        if let Some(existing) = self.items.iter_mut().find(|i| i.product_id == item.product_id) {
            existing.quantity = existing.quantity.checked_add(item.quantity)
                .filter(|q| *q <= MAX_LINE_QUANTITY)
                .ok_or(CatalogError::InvalidQuantity)?;
        } else {
            self.items.push(item);
        }
        self.recalculate();
        Ok(())
    }

    /// Plain-text order summary sent to the store's WhatsApp.
    pub fn whatsapp_message(&self, store_name: &str) -> Result<String> {
        if self.is_empty() { return Err(CatalogError::EmptyCart); }
        let mut lines = vec![format!("Hello {store_name}! I would like to order:"), String::new()];
        for item in &self.items {
            let mut line = format!("- {} x{}: {}", item.name, item.quantity, item.line_total());
            if item.discount_percentage > Decimal::ZERO {
                line.push_str(&format!(" ({}% off)", item.discount_percentage.normalize()));
            }
            lines.push(line);
        }
        lines.push(String::new());
        if self.savings.amount() > Decimal::ZERO {
            lines.push(format!("You save: {}", self.savings));
        }
        lines.push(format!("Total: {}", self.subtotal));
        Ok(lines.join("\n"))
    }

    /// `https://wa.me/<digits>?text=<message>` link; raises a checkout event.
    pub fn checkout_via_whatsapp(&mut self, phone: &str, store_name: &str) -> Result<String> {
        let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
        if digits.is_empty() { return Err(CatalogError::InvalidPhone); }
        let message = self.whatsapp_message(store_name)?;
        self.raise_event(DomainEvent::Analytics(AnalyticsEvent::WhatsAppCheckout {
            session_id: self.session_id.clone(), item_count: self.items.len(), total: self.subtotal.amount(),
        }));
        Ok(format!("https://wa.me/{}?text={}", digits, urlencoding::encode(&message)))
    }

    fn recalculate(&mut self) {
        self.subtotal = self.items.iter().fold(Money::zero(&self.currency), |acc, i| acc.add(&i.line_total()).unwrap_or(acc));
        let list_total = self.items.iter().fold(Money::zero(&self.currency), |acc, i| acc.add(&i.line_list_total()).unwrap_or(acc));
        self.savings = list_total.subtract(&self.subtotal).unwrap_or_else(|_| Money::zero(&self.currency));
        self.updated_at = Utc::now();
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: DomainEvent) { self.events.push(e); }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::DiscountTerms;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn now() -> DateTime<Utc> { Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap() }

    fn discounted(id: &str, name: &str, price: Decimal, pct: Decimal) -> Product {
        let mut p = Product::new(id, name, "c1", price);
        p.discount = DiscountTerms::new(pct, Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(), Utc.with_ymd_and_hms(2024, 5, 31, 0, 0, 0).unwrap());
        p
    }

    #[test]
    fn test_cart_operations() {
        let mut cart = Cart::new("USD");
        let widget = Product::new("P1", "Widget", "c1", dec!(10));
        cart.add_product(&widget, 2, now()).unwrap();
        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.subtotal().amount(), dec!(20));
        cart.add_product(&widget, 1, now()).unwrap();
        assert_eq!(cart.items()[0].quantity, 3); // Merged
        assert_eq!(cart.subtotal().amount(), dec!(30));
        assert_eq!(cart.add_product(&widget, 0, now()), Err(CatalogError::InvalidQuantity));
    }

    #[test]
    fn test_merged_quantity_is_bounded() {
        let mut cart = Cart::new("USD");
        let widget = Product::new("P1", "Widget", "c1", dec!(10));
        assert_eq!(cart.add_product(&widget, u32::MAX, now()), Err(CatalogError::InvalidQuantity));
        assert!(cart.is_empty());

        cart.add_product(&widget, MAX_LINE_QUANTITY, now()).unwrap();
        assert_eq!(cart.add_product(&widget, 1, now()), Err(CatalogError::InvalidQuantity));
        assert_eq!(cart.items()[0].quantity, MAX_LINE_QUANTITY);
        assert_eq!(cart.subtotal().amount(), dec!(100000));
    }

    #[test]
    fn test_cart_prices_with_active_discount() {
        let mut cart = Cart::new("USD");
        cart.add_product(&discounted("P1", "Panel", dec!(50), dec!(20)), 2, now()).unwrap();
        cart.add_product(&Product::new("P2", "Glue", "c1", dec!(5)), 1, now()).unwrap();
        assert_eq!(cart.subtotal().amount(), dec!(85));
        assert_eq!(cart.savings().amount(), dec!(20));
        assert_eq!(cart.items()[0].discount_percentage, dec!(20));
    }

    #[test]
    fn test_whatsapp_message_and_url() {
        let mut cart = Cart::for_session("sess-1", "USD");
        cart.add_product(&discounted("P1", "Panel", dec!(50), dec!(20)), 1, now()).unwrap();
        let message = cart.whatsapp_message("Decor House").unwrap();
        assert!(message.starts_with("Hello Decor House!"));
        assert!(message.contains("- Panel x1: USD 40.00 (20% off)"));
        assert!(message.contains("You save: USD 10.00"));
        assert!(message.ends_with("Total: USD 40.00"));

        let url = cart.checkout_via_whatsapp("+1 (555) 010-2030", "Decor House").unwrap();
        assert!(url.starts_with("https://wa.me/15550102030?text=Hello%20Decor%20House"));
        let events = cart.take_events();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0],
            DomainEvent::Analytics(AnalyticsEvent::WhatsAppCheckout { session_id: Some(s), item_count: 1, .. }) if s == "sess-1"
        ));
    }

    #[test]
    fn test_whatsapp_checkout_errors() {
        let mut cart = Cart::new("USD");
        assert_eq!(cart.checkout_via_whatsapp("555", "Store"), Err(CatalogError::EmptyCart));
        cart.add_product(&Product::new("P1", "Glue", "c1", dec!(5)), 1, now()).unwrap();
        assert_eq!(cart.checkout_via_whatsapp("n/a", "Store"), Err(CatalogError::InvalidPhone));
        assert!(cart.take_events().is_empty());
    }
}
