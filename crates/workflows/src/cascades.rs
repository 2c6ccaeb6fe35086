//! Deletion and blacklist workflows.
//!
//! Each one writes its primary entity first and then runs its cascade steps
//! in the same transaction. A failing cascade step is reported as
//! [`WorkflowError::CascadeFailed`] and undoes the primary write.

use std::collections::BTreeMap;

use common::{CategoryId, ShopId, UserId};
use document_store::{
    ACTIVE_FIELD, Document, DocumentStore, Filter, StoreTransaction, TransactionExt, Update,
};
use domain::{
    DomainError, EntityTransactionExt, Follow, Product, ProductCategory, ProductStatus, Shop,
    User, touched,
};
use tracing::debug;

use crate::error::{Result, WorkflowError};
use crate::runner::Workflows;
use crate::services::PaymentGateway;

impl<S, G> Workflows<S, G>
where
    S: DocumentStore,
    G: PaymentGateway,
{
    /// Deactivates a shop, removes its follows and deactivates its products.
    #[tracing::instrument(skip(self))]
    pub async fn delete_shop(&self, shop_id: ShopId) -> Result<Shop> {
        self.execute("delete_shop", move |tx| {
            Box::pin(async move {
                let deactivate = touched(
                    Update::new()
                        .set(ACTIVE_FIELD, false)
                        .set("follower_count", 0),
                );
                let shop = tx
                    .update_document::<Shop>(shop_id.into(), &Filter::active(), &deactivate)
                    .await?
                    .ok_or_else(|| DomainError::not_found::<Shop>(shop_id))?;

                let follows = tx
                    .delete_many(Follow::COLLECTION, &Filter::new().eq_id("shop", shop_id))
                    .await
                    .map_err(WorkflowError::cascade("remove_follows"))?;

                let products = tx
                    .update_many(
                        Product::COLLECTION,
                        &Filter::active().eq_id("shop", shop_id),
                        &touched(Update::new().set(ACTIVE_FIELD, false)),
                    )
                    .await
                    .map_err(WorkflowError::cascade("deactivate_products"))?;

                debug!(follows, products, "Shop cascade applied");
                Ok(shop)
            })
        })
        .await
    }

    /// Sets a shop's blacklist flag and moves all its products to the matching status.
    #[tracing::instrument(skip(self))]
    pub async fn toggle_shop_blacklist(
        &self,
        shop_id: ShopId,
        is_blacklisted: bool,
    ) -> Result<Shop> {
        self.execute("toggle_shop_blacklist", move |tx| {
            Box::pin(async move {
                let flag = touched(Update::new().set("is_blacklisted", is_blacklisted));
                let shop = tx
                    .update_document::<Shop>(shop_id.into(), &Filter::active(), &flag)
                    .await?
                    .ok_or_else(|| DomainError::not_found::<Shop>(shop_id))?;

                let status = ProductStatus::for_blacklisted(is_blacklisted);
                let products = tx
                    .update_many(
                        Product::COLLECTION,
                        &Filter::new().eq_id("shop", shop_id),
                        &touched(Update::new().set("status", status.as_str())),
                    )
                    .await
                    .map_err(WorkflowError::cascade("update_product_status"))?;

                debug!(products, %status, "Product status updated");
                Ok(shop)
            })
        })
        .await
    }

    /// Deactivates a category and every active product in it.
    #[tracing::instrument(skip(self))]
    pub async fn delete_product_category(
        &self,
        category_id: CategoryId,
    ) -> Result<ProductCategory> {
        self.execute("delete_product_category", move |tx| {
            Box::pin(async move {
                let category = tx.deactivate::<ProductCategory>(category_id.into()).await?;

                let products = tx
                    .update_many(
                        Product::COLLECTION,
                        &Filter::active().eq_id("category", category_id),
                        &touched(Update::new().set(ACTIVE_FIELD, false)),
                    )
                    .await
                    .map_err(WorkflowError::cascade("deactivate_products"))?;

                debug!(products, "Category cascade applied");
                Ok(category)
            })
        })
        .await
    }

    /// Deactivates a user and removes every follow they made.
    ///
    /// Shops, orders and reviews of the user are left untouched. The follower
    /// count of each shop the user followed is decremented with the removal.
    #[tracing::instrument(skip(self))]
    pub async fn delete_user(&self, user_id: UserId) -> Result<User> {
        self.execute("delete_user", move |tx| {
            Box::pin(async move {
                let user = tx.deactivate::<User>(user_id.into()).await?;
                remove_follows_of(tx, user_id).await?;
                Ok(user)
            })
        })
        .await
    }
}

async fn remove_follows_of<T>(tx: &mut T, follower: UserId) -> Result<()>
where
    T: StoreTransaction + ?Sized,
{
    let by_follower = Filter::new().eq_id("follower", follower);
    let follows: Vec<Follow> = tx
        .find_documents(&by_follower)
        .await
        .map_err(WorkflowError::cascade("remove_follows"))?;
    if follows.is_empty() {
        return Ok(());
    }

    tx.delete_many(Follow::COLLECTION, &by_follower)
        .await
        .map_err(WorkflowError::cascade("remove_follows"))?;

    let mut per_shop: BTreeMap<ShopId, i64> = BTreeMap::new();
    for follow in &follows {
        *per_shop.entry(follow.shop).or_default() += 1;
    }
    for (shop, removed) in per_shop {
        let decrement = touched(Update::new().inc("follower_count", -removed));
        tx.update_one(Shop::COLLECTION, shop.into(), &Filter::new(), &decrement)
            .await
            .map_err(WorkflowError::cascade("decrement_follower_counts"))?;
    }

    debug!(removed = follows.len(), "User follows removed");
    Ok(())
}
