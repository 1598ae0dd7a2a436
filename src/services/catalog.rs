//! Catalog proxying and size-label matching.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use tracing::instrument;

use crate::{
    clients::CommerceClient,
    errors::ServiceError,
    models::Product,
};

/// Alias table mapping normalized size labels to a canonical token. Data,
/// not control flow: extend it when the catalog grows a new size.
static SIZE_ALIASES: &[(&str, &[&str])] = &[
    ("250ml", &["250ml", "quarterlitre", "quarterliter"]),
    ("500ml", &["500ml", "halflitre", "halfliter", "05l"]),
    ("1l", &["1l", "1litre", "1liter", "1ltr", "1000ml"]),
    ("2l", &["2l", "2litre", "2liter", "2ltr", "2000ml"]),
    ("5l", &["5l", "5litre", "5liter", "5ltr", "5000ml"]),
    ("1kg", &["1kg", "1000g", "1kilo", "1kilogram"]),
    ("500g", &["500g", "halfkg", "halfkilo"]),
];

static ALIAS_LOOKUP: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for (canonical, aliases) in SIZE_ALIASES {
        for alias in *aliases {
            map.insert(*alias, *canonical);
        }
    }
    map
});

/// Lowercases and strips everything but letters and digits, so
/// "1 Litre" and "1-litre" normalize identically.
pub fn normalize_label(label: &str) -> String {
    label
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Canonical token for a human-entered size label; normalized labels with no
/// alias entry stand for themselves.
pub fn canonical_size(label: &str) -> String {
    let normalized = normalize_label(label);
    ALIAS_LOOKUP
        .get(normalized.as_str())
        .map(|c| c.to_string())
        .unwrap_or(normalized)
}

/// The size-ish attribute option of a variation, if it has one.
fn size_label(variation: &Product) -> Option<&str> {
    variation
        .attributes
        .iter()
        .find(|a| {
            let name = a.name.to_lowercase();
            name.contains("size") || name.contains("volume") || name.contains("weight")
        })
        .and_then(|a| a.first_option())
}

/// Picks the catalog variation whose size label matches a human-entered one.
pub fn match_variation<'a>(variations: &'a [Product], label: &str) -> Option<&'a Product> {
    let wanted = canonical_size(label);
    variations
        .iter()
        .find(|v| size_label(v).map(canonical_size).as_deref() == Some(wanted.as_str()))
}

/// Read-side catalog operations, proxied from the commerce backend.
#[derive(Clone)]
pub struct CatalogService {
    commerce: Arc<CommerceClient>,
    upsell_limit: usize,
}

impl CatalogService {
    pub fn new(commerce: Arc<CommerceClient>, upsell_limit: usize) -> Self {
        Self {
            commerce,
            upsell_limit,
        }
    }

    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, ServiceError> {
        self.commerce.list_products().await
    }

    #[instrument(skip(self))]
    pub async fn product_by_slug(&self, slug: &str) -> Result<Option<Product>, ServiceError> {
        self.commerce.product_by_slug(slug).await
    }

    #[instrument(skip(self))]
    pub async fn variations(&self, product_id: u64) -> Result<Vec<Product>, ServiceError> {
        self.commerce.product_variations(product_id).await
    }

    /// Upsell selection: the first few catalog products. A 'featured' flag
    /// would be a better signal once the backend exposes one.
    #[instrument(skip(self))]
    pub async fn upsell_products(&self) -> Result<Vec<Product>, ServiceError> {
        let mut products = self.commerce.list_products().await?;
        products.truncate(self.upsell_limit);
        Ok(products)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variation(id: u64, attr_name: &str, option: &str) -> Product {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "attributes": [{"name": attr_name, "option": option}]
        }))
        .unwrap()
    }

    #[test]
    fn normalization_collapses_punctuation_and_case() {
        assert_eq!(normalize_label("1 Litre"), "1litre");
        assert_eq!(normalize_label("1-LITRE"), "1litre");
        assert_eq!(normalize_label("500 ml."), "500ml");
    }

    #[test]
    fn aliases_map_to_canonical_tokens() {
        assert_eq!(canonical_size("1 Litre"), "1l");
        assert_eq!(canonical_size("1000 ml"), "1l");
        assert_eq!(canonical_size("Half Litre"), "500ml");
        // Unknown labels stand for themselves
        assert_eq!(canonical_size("750 ml"), "750ml");
    }

    #[test]
    fn matches_variation_across_alias_spellings() {
        let variations = vec![
            variation(1, "Size", "500 ml"),
            variation(2, "Size", "1000 ml"),
            variation(3, "Size", "5 Litre"),
        ];
        assert_eq!(match_variation(&variations, "1 Litre").map(|v| v.id), Some(2));
        assert_eq!(match_variation(&variations, "half litre").map(|v| v.id), Some(1));
        assert_eq!(match_variation(&variations, "5l").map(|v| v.id), Some(3));
    }

    #[test]
    fn unmatched_label_returns_none() {
        let variations = vec![variation(1, "Size", "500 ml")];
        assert!(match_variation(&variations, "2 Litre").is_none());
    }

    #[test]
    fn volume_and_weight_attributes_are_recognized() {
        let variations = vec![
            variation(1, "Volume", "1 Litre"),
            variation(2, "Weight", "500 g"),
        ];
        assert_eq!(match_variation(&variations, "1000ml").map(|v| v.id), Some(1));
        assert_eq!(match_variation(&variations, "500G").map(|v| v.id), Some(2));
    }

    #[test]
    fn variations_without_size_attributes_never_match() {
        let variations = vec![variation(1, "Colour", "Gold")];
        assert!(match_variation(&variations, "gold").is_none());
    }
}
