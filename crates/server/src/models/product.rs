//! Product domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fgs_core::{Money, ProductId};

use super::nullable;

/// A catalog product.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub price: Money,
    pub original_price: Option<Money>,
    pub discount_percent: i64,
    pub category: String,
    pub subcategory: Option<String>,
    pub image_url: Option<String>,
    pub stock_quantity: i64,
    pub is_featured: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a product (admin API and catalog seeding).
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Money,
    #[serde(default)]
    pub original_price: Option<Money>,
    #[serde(default)]
    pub discount_percent: i64,
    pub category: String,
    #[serde(default)]
    pub subcategory: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub stock_quantity: i64,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

const fn default_active() -> bool {
    true
}

impl NewProduct {
    /// Check the catalog invariants before the row reaches the database.
    ///
    /// # Errors
    ///
    /// Returns a human-readable message for the first violated rule.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name is required".to_owned());
        }
        if self.category.trim().is_empty() {
            return Err("category is required".to_owned());
        }
        if self.stock_quantity < 0 {
            return Err("stock_quantity cannot be negative".to_owned());
        }
        validate_pricing(self.price, self.original_price, self.discount_percent)
    }
}

/// Partial product update. Stock only moves through order placement and restock.
///
/// Nullable columns take `Some(None)` to clear: send the field as `null`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    pub price: Option<Money>,
    #[serde(default, deserialize_with = "nullable")]
    pub original_price: Option<Option<Money>>,
    pub discount_percent: Option<i64>,
    pub category: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub subcategory: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub image_url: Option<Option<String>>,
    pub is_featured: Option<bool>,
    pub is_active: Option<bool>,
}

impl ProductUpdate {
    /// Apply the update on top of `current`, validating the merged result.
    ///
    /// # Errors
    ///
    /// Returns a human-readable message if the merged product breaks an invariant.
    pub fn merge(self, current: &Product) -> Result<Product, String> {
        let merged = Product {
            id: current.id,
            name: self.name.unwrap_or_else(|| current.name.clone()),
            description: self
                .description
                .unwrap_or_else(|| current.description.clone()),
            price: self.price.unwrap_or(current.price),
            original_price: self.original_price.unwrap_or(current.original_price),
            discount_percent: self.discount_percent.unwrap_or(current.discount_percent),
            category: self.category.unwrap_or_else(|| current.category.clone()),
            subcategory: self
                .subcategory
                .unwrap_or_else(|| current.subcategory.clone()),
            image_url: self.image_url.unwrap_or_else(|| current.image_url.clone()),
            stock_quantity: current.stock_quantity,
            is_featured: self.is_featured.unwrap_or(current.is_featured),
            is_active: self.is_active.unwrap_or(current.is_active),
            created_at: current.created_at,
            updated_at: current.updated_at,
        };

        if merged.name.trim().is_empty() {
            return Err("name cannot be empty".to_owned());
        }
        if merged.category.trim().is_empty() {
            return Err("category cannot be empty".to_owned());
        }
        validate_pricing(merged.price, merged.original_price, merged.discount_percent)?;

        Ok(merged)
    }
}

fn validate_pricing(
    price: Money,
    original_price: Option<Money>,
    discount_percent: i64,
) -> Result<(), String> {
    if !price.is_positive() {
        return Err("price must be greater than zero".to_owned());
    }
    if let Some(original) = original_price
        && original < price
    {
        return Err("original_price cannot be lower than price".to_owned());
    }
    if !(0..=100).contains(&discount_percent) {
        return Err("discount_percent must be between 0 and 100".to_owned());
    }
    Ok(())
}

/// Catalog listing filter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub search: Option<String>,
    /// Only featured products when `Some(true)`.
    pub featured: Option<bool>,
    /// Admin listings include deactivated products.
    #[serde(skip)]
    pub include_inactive: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn diamonds() -> NewProduct {
        serde_json::from_value(serde_json::json!({
            "name": "ROV 100 Diamonds",
            "price": 42,
            "original_price": 50,
            "discount_percent": 16,
            "category": "เกมไทย",
            "subcategory": "ROV",
            "stock_quantity": 100
        }))
        .unwrap()
    }

    fn stored(product: NewProduct) -> Product {
        let now = Utc::now();
        Product {
            id: ProductId::new(1),
            name: product.name,
            description: Some("Instant top-up".to_owned()),
            price: product.price,
            original_price: product.original_price,
            discount_percent: product.discount_percent,
            category: product.category,
            subcategory: product.subcategory,
            image_url: Some("https://cdn.example.com/rov.png".to_owned()),
            stock_quantity: product.stock_quantity,
            is_featured: false,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn update(body: serde_json::Value) -> ProductUpdate {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_update_null_clears_original_price() {
        let current = stored(diamonds());

        let merged = update(serde_json::json!({
            "price": 60,
            "original_price": null,
            "discount_percent": 0
        }))
        .merge(&current)
        .unwrap();

        assert_eq!(merged.price, Money::from_minor(6000));
        assert_eq!(merged.original_price, None);
        assert_eq!(merged.discount_percent, 0);
    }

    #[test]
    fn test_update_null_clears_optional_text() {
        let current = stored(diamonds());

        let merged = update(serde_json::json!({
            "description": null,
            "subcategory": null,
            "image_url": null
        }))
        .merge(&current)
        .unwrap();

        assert_eq!(merged.description, None);
        assert_eq!(merged.subcategory, None);
        assert_eq!(merged.image_url, None);
        assert_eq!(merged.original_price, current.original_price);
    }

    #[test]
    fn test_update_absent_fields_are_kept() {
        let current = stored(diamonds());

        let merged = update(serde_json::json!({ "is_featured": true }))
            .merge(&current)
            .unwrap();

        assert!(merged.is_featured);
        assert_eq!(merged.description, current.description);
        assert_eq!(merged.original_price, current.original_price);
        assert_eq!(merged.subcategory, current.subcategory);
        assert_eq!(merged.image_url, current.image_url);
    }

    #[test]
    fn test_update_price_above_kept_original_is_rejected() {
        let current = stored(diamonds());

        let result = update(serde_json::json!({ "price": 60 })).merge(&current);

        assert_eq!(
            result.unwrap_err(),
            "original_price cannot be lower than price"
        );
    }

    #[test]
    fn test_new_product_defaults() {
        let product = diamonds();
        assert!(product.is_active);
        assert!(!product.is_featured);
        assert_eq!(product.price, Money::from_minor(4200));
        assert!(product.validate().is_ok());
    }

    #[test]
    fn test_new_product_rejects_bad_pricing() {
        let mut product = diamonds();
        product.original_price = Some(Money::from_minor(100));
        assert!(product.validate().is_err());

        let mut product = diamonds();
        product.discount_percent = 101;
        assert!(product.validate().is_err());

        let mut product = diamonds();
        product.price = Money::ZERO;
        assert!(product.validate().is_err());
    }

    #[test]
    fn test_new_product_rejects_negative_stock() {
        let mut product = diamonds();
        product.stock_quantity = -1;
        assert_eq!(
            product.validate(),
            Err("stock_quantity cannot be negative".to_owned())
        );
    }
}
