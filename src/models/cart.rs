use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A single cart entry: a product (or variation) id with a price snapshot
/// taken at the time it was added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CartLine {
    pub product_id: u64,
    pub name: String,
    /// Unit price snapshot; the backend re-derives authoritative prices from
    /// the catalog at order time
    pub unit_price: Decimal,
    /// Pre-sale price when the product was on sale at add time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_unit_price: Option<Decimal>,
    pub quantity: u32,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub slug: String,
}

impl CartLine {
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Client-owned cart: a mapping from product id to cart line.
///
/// The client session persists this structure locally and sends the lines with
/// each pricing or checkout request; the server never stores it. Every
/// retained line has quantity >= 1.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct Cart {
    pub lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a line, merging the quantity into an existing line for the same
    /// product id. Zero-quantity adds are ignored.
    pub fn add(&mut self, line: CartLine) {
        if line.quantity == 0 {
            return;
        }
        match self.lines.iter_mut().find(|l| l.product_id == line.product_id) {
            Some(existing) => existing.quantity += line.quantity,
            None => self.lines.push(line),
        }
    }

    pub fn remove(&mut self, product_id: u64) {
        self.lines.retain(|l| l.product_id != product_id);
    }

    /// Sets the quantity for a product; quantities below 1 remove the line.
    pub fn set_quantity(&mut self, product_id: u64, quantity: u32) {
        if quantity < 1 {
            self.remove(product_id);
            return;
        }
        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product_id) {
            line.quantity = quantity;
        }
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn subtotal(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Total number of units across all lines.
    pub fn count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn line(id: u64, price: Decimal, qty: u32) -> CartLine {
        CartLine {
            product_id: id,
            name: format!("Product {}", id),
            unit_price: price,
            original_unit_price: None,
            quantity: qty,
            image: String::new(),
            slug: String::new(),
        }
    }

    #[test]
    fn add_merges_quantity_for_same_product() {
        let mut cart = Cart::new();
        cart.add(line(1, dec!(400), 2));
        cart.add(line(1, dec!(400), 1));
        assert_eq!(cart.lines.len(), 1);
        assert_eq!(cart.lines[0].quantity, 3);
    }

    #[test]
    fn add_zero_quantity_is_ignored() {
        let mut cart = Cart::new();
        cart.add(line(1, dec!(400), 0));
        assert!(cart.is_empty());
    }

    #[test]
    fn set_quantity_below_one_removes_line() {
        let mut cart = Cart::new();
        cart.add(line(1, dec!(400), 2));
        cart.set_quantity(1, 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn subtotal_sums_line_totals() {
        let mut cart = Cart::new();
        cart.add(line(1, dec!(400), 2));
        cart.add(line(2, dec!(150.50), 1));
        assert_eq!(cart.subtotal(), dec!(950.50));
    }

    #[test]
    fn clear_empties_cart() {
        let mut cart = Cart::new();
        cart.add(line(1, dec!(400), 2));
        cart.add(line(2, dec!(150), 1));
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.subtotal(), Decimal::ZERO);
    }

    #[test]
    fn serde_round_trip_preserves_lines() {
        let mut cart = Cart::new();
        cart.add(line(7, dec!(999), 3));
        let json = serde_json::to_string(&cart).unwrap();
        let restored: Cart = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.lines, cart.lines);
    }
}
