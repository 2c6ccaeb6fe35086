use chrono::{DateTime, Utc};
use common::{OrderId, PaymentId, ShopId, UserId};
use document_store::Document;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::money::Money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Successful,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Successful => "successful",
            PaymentStatus::Failed => "failed",
        }
    }
}

/// A recorded payment for an order.
///
/// Payments are never soft-deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub user: UserId,
    pub order: OrderId,
    pub shop: ShopId,
    pub amount: Money,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    pub fn successful(user: UserId, order: OrderId, shop: ShopId, amount: Money) -> Self {
        let now = Utc::now();
        Self {
            id: PaymentId::new(),
            user,
            order,
            shop,
            amount,
            status: PaymentStatus::Successful,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Document for Payment {
    const COLLECTION: &'static str = "payments";

    fn document_id(&self) -> Uuid {
        self.id.as_uuid()
    }
}
