use chrono::{DateTime, Utc};
use common::{CouponId, ShopId};
use document_store::Document;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;
use crate::repository::Entity;

/// A percentage discount code issued by a shop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coupon {
    pub id: CouponId,
    /// Uppercased; unique per shop among active coupons.
    pub code: String,
    pub shop: ShopId,
    pub discount_percentage: u8,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Coupon {
    pub fn new(shop: ShopId, code: &str, discount_percentage: u8) -> Result<Self, DomainError> {
        let code = normalize_code(code);
        if code.is_empty() {
            return Err(DomainError::Validation(
                "coupon code must not be empty".to_string(),
            ));
        }
        if discount_percentage > 100 {
            return Err(DomainError::Validation(format!(
                "discount percentage must be at most 100, got {discount_percentage}"
            )));
        }

        let now = Utc::now();
        Ok(Self {
            id: CouponId::new(),
            code,
            shop,
            discount_percentage,
            is_active: true,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Canonical form of a coupon code.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

impl Document for Coupon {
    const COLLECTION: &'static str = "coupons";

    fn document_id(&self) -> Uuid {
        self.id.as_uuid()
    }
}

impl Entity for Coupon {
    const NAME: &'static str = "Coupon";

    fn is_active(&self) -> bool {
        self.is_active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_is_normalized() {
        let coupon = Coupon::new(ShopId::new(), " spring10 ", 10).unwrap();
        assert_eq!(coupon.code, "SPRING10");
    }

    #[test]
    fn percentage_above_hundred_is_rejected() {
        assert!(Coupon::new(ShopId::new(), "X", 101).is_err());
        assert!(Coupon::new(ShopId::new(), "X", 100).is_ok());
    }

    #[test]
    fn blank_code_is_rejected() {
        assert!(Coupon::new(ShopId::new(), "   ", 5).is_err());
    }
}
