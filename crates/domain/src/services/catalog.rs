use common::{CouponId, ProductId, ShopId, UserId};
use document_store::{DocumentStore, Filter, TransactionCoordinator, TransactionExt, Update};
use tracing::info;

use super::unique_violation;
use crate::error::DomainError;
use crate::models::{
    Coupon, NewProduct, Product, ProductCategory, ProductStatus, Shop, ShopChanges, User,
    normalize_code,
};
use crate::repository::{EntityTransactionExt, Repository, touched};

/// Shops, categories, products and coupons.
pub struct CatalogService<S> {
    coordinator: TransactionCoordinator<S>,
    shops: Repository<S, Shop>,
    categories: Repository<S, ProductCategory>,
    products: Repository<S, Product>,
    coupons: Repository<S, Coupon>,
}

impl<S: DocumentStore + Clone> CatalogService<S> {
    pub fn new(store: S) -> Self {
        Self {
            shops: Repository::new(store.clone()),
            categories: Repository::new(store.clone()),
            products: Repository::new(store.clone()),
            coupons: Repository::new(store.clone()),
            coordinator: TransactionCoordinator::new(store),
        }
    }

    pub fn shops(&self) -> &Repository<S, Shop> {
        &self.shops
    }

    pub fn categories(&self) -> &Repository<S, ProductCategory> {
        &self.categories
    }

    pub fn products(&self) -> &Repository<S, Product> {
        &self.products
    }

    pub fn coupons(&self) -> &Repository<S, Coupon> {
        &self.coupons
    }

    /// Opens a shop for an active user.
    #[tracing::instrument(skip(self))]
    pub async fn create_shop(
        &self,
        owner: UserId,
        name: &str,
        description: &str,
    ) -> Result<Shop, DomainError> {
        let shop = Shop::new(owner, name, description);

        let shop = self
            .coordinator
            .run("create_shop", move |tx| {
                Box::pin(async move {
                    tx.require_active::<User>(owner.into()).await?;
                    tx.insert_document(&shop).await?;
                    Ok::<_, DomainError>(shop)
                })
            })
            .await?;

        info!(shop_id = %shop.id, owner = %owner, "Shop created");
        Ok(shop)
    }

    /// Returns the active shop owned by `owner`, if any.
    pub async fn get_shop_by_owner(&self, owner: UserId) -> Result<Option<Shop>, DomainError> {
        let shops = self
            .shops
            .list_active(Filter::new().eq_id("owner", owner))
            .await?;
        Ok(shops.into_iter().next())
    }

    /// Applies `changes` to a shop. Only the owner may edit it.
    #[tracing::instrument(skip(self))]
    pub async fn update_shop(
        &self,
        actor: UserId,
        shop_id: ShopId,
        changes: ShopChanges,
    ) -> Result<Shop, DomainError> {
        self.coordinator
            .run("update_shop", move |tx| {
                Box::pin(async move {
                    let shop = tx.require_active::<Shop>(shop_id.into()).await?;
                    if shop.owner != actor {
                        return Err(DomainError::Forbidden(format!(
                            "user {actor} does not own shop {shop_id}"
                        )));
                    }

                    let mut update = Update::new();
                    if let Some(name) = changes.name {
                        update = update.set("name", name);
                    }
                    if let Some(description) = changes.description {
                        update = update.set("description", description);
                    }
                    if update.is_empty() {
                        return Ok(shop);
                    }

                    tx.update_document::<Shop>(shop_id.into(), &Filter::active(), &touched(update))
                        .await?
                        .ok_or_else(|| DomainError::not_found::<Shop>(shop_id))
                })
            })
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn create_category(&self, name: &str) -> Result<ProductCategory, DomainError> {
        self.categories.insert(ProductCategory::new(name)).await
    }

    /// Lists a product under an active shop and category.
    ///
    /// Products of a blacklisted shop start out suspended.
    #[tracing::instrument(skip(self))]
    pub async fn create_product(&self, input: NewProduct) -> Result<Product, DomainError> {
        if input.price.is_negative() {
            return Err(DomainError::Validation("price must not be negative".to_string()));
        }
        if input.inventory_count < 0 {
            return Err(DomainError::Validation(
                "inventory count must not be negative".to_string(),
            ));
        }

        let product = self
            .coordinator
            .run("create_product", move |tx| {
                Box::pin(async move {
                    let shop = tx.confirm_active::<Shop>(input.shop.into()).await?;
                    tx.require_active::<ProductCategory>(input.category.into())
                        .await?;

                    let product =
                        Product::new(input, ProductStatus::for_blacklisted(shop.is_blacklisted));
                    tx.insert_document(&product).await?;
                    Ok::<_, DomainError>(product)
                })
            })
            .await?;

        info!(product_id = %product.id, shop_id = %product.shop, "Product created");
        Ok(product)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_product(&self, product_id: ProductId) -> Result<Product, DomainError> {
        self.products.soft_delete(product_id).await
    }

    /// Issues a coupon. Codes are unique per shop among active coupons.
    #[tracing::instrument(skip(self))]
    pub async fn create_coupon(
        &self,
        shop_id: ShopId,
        code: &str,
        discount_percentage: u8,
    ) -> Result<Coupon, DomainError> {
        let coupon = Coupon::new(shop_id, code, discount_percentage)?;

        self.coordinator
            .run("create_coupon", move |tx| {
                Box::pin(async move {
                    tx.confirm_active::<Shop>(shop_id.into()).await?;

                    let same_code = Filter::active()
                        .eq_id("shop", shop_id)
                        .eq("code", coupon.code.clone());
                    let existing: Vec<Coupon> = tx.find_documents(&same_code).await?;
                    if !existing.is_empty() {
                        return Err(DomainError::conflict::<Coupon>(format!(
                            "code {} already exists for shop {shop_id}",
                            coupon.code
                        )));
                    }

                    tx.insert_document(&coupon)
                        .await
                        .map_err(|e| unique_violation::<Coupon>(e, "code already exists"))?;
                    Ok(coupon)
                })
            })
            .await
    }

    /// Looks up an active coupon by code within a shop.
    pub async fn find_coupon(
        &self,
        code: &str,
        shop_id: ShopId,
    ) -> Result<Option<Coupon>, DomainError> {
        let filter = Filter::new()
            .eq_id("shop", shop_id)
            .eq("code", normalize_code(code));
        Ok(self.coupons.list_active(filter).await?.into_iter().next())
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_coupon(&self, coupon_id: CouponId) -> Result<Coupon, DomainError> {
        self.coupons.soft_delete(coupon_id).await
    }
}
