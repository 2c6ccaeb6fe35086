use common::{ShopId, UserId};
use document_store::{Document, DocumentStore, DocumentStoreExt, Filter};

use crate::error::DomainError;
use crate::models::{Follow, Order, OrderStatus, Payment, PaymentStatus};
use crate::money::Money;
use crate::repository::Repository;

/// Read-only aggregates over committed data.
pub struct ReportingService<S> {
    store: S,
    orders: Repository<S, Order>,
}

impl<S: DocumentStore + Clone> ReportingService<S> {
    pub fn new(store: S) -> Self {
        Self {
            orders: Repository::new(store.clone()),
            store,
        }
    }

    /// Sum of successful payments, optionally for one shop.
    pub async fn total_revenue(&self, shop: Option<ShopId>) -> Result<Money, DomainError> {
        let mut filter = Filter::new().eq("status", PaymentStatus::Successful.as_str());
        if let Some(shop) = shop {
            filter = filter.eq_id("shop", shop);
        }
        let payments: Vec<Payment> = self.store.find_documents(&filter).await?;
        Ok(payments.iter().map(|p| p.amount).sum())
    }

    /// Number of active completed orders, optionally for one shop.
    pub async fn total_orders(&self, shop: Option<ShopId>) -> Result<u64, DomainError> {
        let mut filter = Filter::new().eq("status", OrderStatus::Complete.as_str());
        if let Some(shop) = shop {
            filter = filter.eq_id("shop", shop);
        }
        self.orders.count_active(filter).await
    }

    /// Returns true if `follower` currently follows `shop`.
    pub async fn is_following(&self, follower: UserId, shop: ShopId) -> Result<bool, DomainError> {
        let filter = Filter::new()
            .eq_id("follower", follower)
            .eq_id("shop", shop);
        let follows: Vec<Follow> = self.store.find_documents(&filter).await?;
        Ok(!follows.is_empty())
    }

    /// Number of follow records referencing `shop`.
    pub async fn follow_count(&self, shop: ShopId) -> Result<u64, DomainError> {
        let filter = Filter::new().eq_id("shop", shop);
        Ok(self.store.count(Follow::COLLECTION, &filter).await?)
    }
}
