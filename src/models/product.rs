use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ProductImage {
    #[serde(default)]
    pub src: String,
    #[serde(default)]
    pub alt: String,
}

/// Product attribute.
///
/// Parent products carry an `options` array; variations carry a single
/// `option` string. One type covers both wire shapes.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct Attribute {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

impl Attribute {
    /// First available option value regardless of which wire shape carried it.
    pub fn first_option(&self) -> Option<&str> {
        self.option
            .as_deref()
            .or_else(|| self.options.first().map(String::as_str))
    }
}

/// Catalog product or product variation.
///
/// The commerce backend serves variations with the same envelope as products
/// (minus a few parent-only fields), so one type is used for both.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
    /// Money fields arrive as decimal strings; empty when unset
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub regular_price: String,
    #[serde(default)]
    pub sale_price: String,
    #[serde(default)]
    pub on_sale: bool,
    #[serde(default)]
    pub average_rating: String,
    #[serde(default)]
    pub rating_count: u32,
    #[serde(default)]
    pub images: Vec<ProductImage>,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

impl Product {
    /// Effective display price: current price, falling back to sale then
    /// regular price.
    pub fn display_price(&self) -> Option<Decimal> {
        [&self.price, &self.sale_price, &self.regular_price]
            .into_iter()
            .find(|p| !p.is_empty())
            .and_then(|p| Decimal::from_str(p).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn display_price_prefers_current_price() {
        let p: Product = serde_json::from_value(serde_json::json!({
            "id": 1, "price": "450", "regular_price": "500", "sale_price": "450"
        }))
        .unwrap();
        assert_eq!(p.display_price(), Some(dec!(450)));
    }

    #[test]
    fn display_price_falls_back_to_regular() {
        let p: Product = serde_json::from_value(serde_json::json!({
            "id": 1, "regular_price": "500"
        }))
        .unwrap();
        assert_eq!(p.display_price(), Some(dec!(500)));
    }

    #[test]
    fn attribute_handles_both_wire_shapes() {
        let parent: Attribute =
            serde_json::from_value(serde_json::json!({"name": "Size", "options": ["1 Litre", "500 ml"]}))
                .unwrap();
        assert_eq!(parent.first_option(), Some("1 Litre"));

        let variation: Attribute =
            serde_json::from_value(serde_json::json!({"name": "Size", "option": "500 ml"})).unwrap();
        assert_eq!(variation.first_option(), Some("500 ml"));
    }
}
