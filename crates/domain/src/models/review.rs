use chrono::{DateTime, Utc};
use common::{OrderId, ProductId, ReviewId, UserId};
use document_store::Document;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;
use crate::repository::Entity;

/// A customer review of a purchased product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub user: UserId,
    pub product: ProductId,
    pub order: OrderId,
    /// 1 to 5 stars.
    pub rating: u8,
    pub comment: String,
    /// Vendor reply; set at most once.
    pub reply: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Review {
    pub const MIN_RATING: u8 = 1;
    pub const MAX_RATING: u8 = 5;

    pub fn new(
        user: UserId,
        product: ProductId,
        order: OrderId,
        rating: u8,
        comment: impl Into<String>,
    ) -> Result<Self, DomainError> {
        if !(Self::MIN_RATING..=Self::MAX_RATING).contains(&rating) {
            return Err(DomainError::Validation(format!(
                "rating must be between {} and {}, got {rating}",
                Self::MIN_RATING,
                Self::MAX_RATING
            )));
        }

        let now = Utc::now();
        Ok(Self {
            id: ReviewId::new(),
            user,
            product,
            order,
            rating,
            comment: comment.into(),
            reply: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        })
    }
}

impl Document for Review {
    const COLLECTION: &'static str = "reviews";

    fn document_id(&self) -> Uuid {
        self.id.as_uuid()
    }
}

impl Entity for Review {
    const NAME: &'static str = "Review";

    fn is_active(&self) -> bool {
        self.is_active
    }
}
