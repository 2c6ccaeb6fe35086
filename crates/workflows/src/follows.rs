//! Follow and unfollow workflows.
//!
//! The follow record and the shop's `follower_count` always change in the
//! same transaction.

use common::{ShopId, UserId};
use document_store::{
    Document, DocumentStore, Filter, StoreError, StoreTransaction, TransactionExt, Update,
};
use domain::{DomainError, EntityTransactionExt, Follow, Shop, User, touched};

use crate::error::{Result, WorkflowError};
use crate::runner::Workflows;
use crate::services::PaymentGateway;

fn pair_filter(follower: UserId, shop: ShopId) -> Filter {
    Filter::new()
        .eq_id("follower", follower)
        .eq_id("shop", shop)
}

impl<S, G> Workflows<S, G>
where
    S: DocumentStore,
    G: PaymentGateway,
{
    /// Makes `follower` follow `shop_id` and bumps the shop's follower count.
    #[tracing::instrument(skip(self))]
    pub async fn follow_shop(&self, follower: UserId, shop_id: ShopId) -> Result<Follow> {
        self.execute("follow_shop", move |tx| {
            Box::pin(async move {
                tx.require_active::<User>(follower.into()).await?;
                tx.require_active::<Shop>(shop_id.into()).await?;

                let existing: Vec<Follow> =
                    tx.find_documents(&pair_filter(follower, shop_id)).await?;
                if !existing.is_empty() {
                    return Err(WorkflowError::AlreadyFollowing { shop: shop_id });
                }

                let follow = Follow::new(follower, shop_id);
                tx.insert_document(&follow).await.map_err(|err| match err {
                    StoreError::DuplicateKey { .. } => {
                        WorkflowError::AlreadyFollowing { shop: shop_id }
                    }
                    other => other.into(),
                })?;

                let increment = touched(Update::new().inc("follower_count", 1));
                tx.update_one(Shop::COLLECTION, shop_id.into(), &Filter::active(), &increment)
                    .await?
                    .ok_or_else(|| DomainError::not_found::<Shop>(shop_id))?;

                Ok(follow)
            })
        })
        .await
    }

    /// Removes the follow of `follower` on `shop_id` and decrements the count.
    #[tracing::instrument(skip(self))]
    pub async fn unfollow_shop(&self, follower: UserId, shop_id: ShopId) -> Result<()> {
        self.execute("unfollow_shop", move |tx| {
            Box::pin(async move {
                tx.require_active::<User>(follower.into()).await?;
                let shop: Option<Shop> = tx.get_document(shop_id.into()).await?;
                if shop.is_none() {
                    return Err(DomainError::not_found::<Shop>(shop_id).into());
                }

                let existing: Vec<Follow> =
                    tx.find_documents(&pair_filter(follower, shop_id)).await?;
                let follow = existing
                    .into_iter()
                    .next()
                    .ok_or(WorkflowError::NotFollowing { shop: shop_id })?;

                tx.delete_document::<Follow>(follow.id.into())
                    .await?
                    .ok_or(WorkflowError::NotFollowing { shop: shop_id })?;

                let decrement = touched(Update::new().inc("follower_count", -1));
                tx.update_one(Shop::COLLECTION, shop_id.into(), &Filter::new(), &decrement)
                    .await?
                    .ok_or_else(|| DomainError::not_found::<Shop>(shop_id))?;

                Ok(())
            })
        })
        .await
    }
}
