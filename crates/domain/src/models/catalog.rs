use chrono::{DateTime, Utc};
use common::{CategoryId, ProductId, ShopId};
use document_store::Document;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::money::Money;
use crate::repository::Entity;

/// A product category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductCategory {
    pub id: CategoryId,
    pub name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductCategory {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: CategoryId::new(),
            name: name.into(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Document for ProductCategory {
    const COLLECTION: &'static str = "categories";

    fn document_id(&self) -> Uuid {
        self.id.as_uuid()
    }
}

impl Entity for ProductCategory {
    const NAME: &'static str = "ProductCategory";

    fn is_active(&self) -> bool {
        self.is_active
    }
}

/// Whether a product can currently be bought.
///
/// Follows the blacklist state of the owning shop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    #[default]
    Available,
    Suspended,
}

impl ProductStatus {
    /// Status implied by the owning shop's blacklist flag.
    pub fn for_blacklisted(is_blacklisted: bool) -> Self {
        if is_blacklisted {
            ProductStatus::Suspended
        } else {
            ProductStatus::Available
        }
    }

    /// Returns the stored representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Available => "available",
            ProductStatus::Suspended => "suspended",
        }
    }
}

impl std::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A product listed by a shop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub shop: ShopId,
    pub category: CategoryId,
    pub name: String,
    pub description: String,
    pub price: Money,
    /// Units in stock; never negative.
    pub inventory_count: i64,
    pub on_sale: bool,
    pub discounted_price: Option<Money>,
    pub status: ProductStatus,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for listing a new product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub shop: ShopId,
    pub category: CategoryId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Money,
    pub inventory_count: i64,
    #[serde(default)]
    pub discounted_price: Option<Money>,
}

impl Product {
    pub fn new(input: NewProduct, status: ProductStatus) -> Self {
        let now = Utc::now();
        Self {
            id: ProductId::new(),
            shop: input.shop,
            category: input.category,
            name: input.name,
            description: input.description,
            price: input.price,
            inventory_count: input.inventory_count,
            on_sale: input.discounted_price.is_some(),
            discounted_price: input.discounted_price,
            status,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns true if `quantity` units can be taken from stock.
    pub fn has_stock_for(&self, quantity: u32) -> bool {
        self.inventory_count >= i64::from(quantity)
    }
}

impl Document for Product {
    const COLLECTION: &'static str = "products";

    fn document_id(&self) -> Uuid {
        self.id.as_uuid()
    }
}

impl Entity for Product {
    const NAME: &'static str = "Product";

    fn is_active(&self) -> bool {
        self.is_active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(inventory_count: i64) -> Product {
        Product::new(
            NewProduct {
                shop: ShopId::new(),
                category: CategoryId::new(),
                name: "Mug".to_string(),
                description: String::new(),
                price: Money::from_cents(1200),
                inventory_count,
                discounted_price: None,
            },
            ProductStatus::Available,
        )
    }

    #[test]
    fn status_follows_blacklist_flag() {
        assert_eq!(ProductStatus::for_blacklisted(true), ProductStatus::Suspended);
        assert_eq!(ProductStatus::for_blacklisted(false), ProductStatus::Available);
    }

    #[test]
    fn status_serializes_as_stored_string() {
        let json = serde_json::to_value(ProductStatus::Suspended).unwrap();
        assert_eq!(json, ProductStatus::Suspended.as_str());
    }

    #[test]
    fn stock_check_is_inclusive() {
        let p = product(2);
        assert!(p.has_stock_for(2));
        assert!(!p.has_stock_for(3));
    }

    #[test]
    fn discounted_price_marks_product_on_sale() {
        let mut input = product(1);
        assert!(!input.on_sale);
        input = Product::new(
            NewProduct {
                shop: input.shop,
                category: input.category,
                name: input.name,
                description: input.description,
                price: input.price,
                inventory_count: 1,
                discounted_price: Some(Money::from_cents(900)),
            },
            ProductStatus::Available,
        );
        assert!(input.on_sale);
    }
}
