use common::{ProductId, ReviewId, UserId};
use document_store::{DocumentStore, Filter, TransactionCoordinator, TransactionExt, Update};
use serde_json::Value;

use crate::error::DomainError;
use crate::models::{Order, OrderStatus, Product, Review, Shop, User};
use crate::repository::{EntityTransactionExt, Repository, touched};

/// Product reviews and vendor replies.
pub struct ReviewService<S> {
    coordinator: TransactionCoordinator<S>,
    reviews: Repository<S, Review>,
}

impl<S: DocumentStore + Clone> ReviewService<S> {
    pub fn new(store: S) -> Self {
        Self {
            reviews: Repository::new(store.clone()),
            coordinator: TransactionCoordinator::new(store),
        }
    }

    pub fn reviews(&self) -> &Repository<S, Review> {
        &self.reviews
    }

    /// Reviews a product the user received through a completed order.
    ///
    /// A user reviews a given product at most once.
    #[tracing::instrument(skip(self, comment))]
    pub async fn create_review(
        &self,
        user_id: UserId,
        product_id: ProductId,
        rating: u8,
        comment: &str,
    ) -> Result<Review, DomainError> {
        let comment = comment.to_string();

        self.coordinator
            .run("create_review", move |tx| {
                Box::pin(async move {
                    tx.require_active::<User>(user_id.into()).await?;
                    tx.require_active::<Product>(product_id.into()).await?;

                    let completed = Filter::active()
                        .eq_id("user", user_id)
                        .eq("status", OrderStatus::Complete.as_str());
                    let orders: Vec<Order> = tx.find_documents(&completed).await?;
                    let order = orders
                        .into_iter()
                        .find(|order| order.contains(product_id))
                        .ok_or_else(|| {
                            DomainError::Forbidden(format!(
                                "user {user_id} has no completed order containing product {product_id}"
                            ))
                        })?;

                    let same_pair = Filter::active()
                        .eq_id("user", user_id)
                        .eq_id("product", product_id);
                    let existing: Vec<Review> = tx.find_documents(&same_pair).await?;
                    if !existing.is_empty() {
                        return Err(DomainError::conflict::<Review>(format!(
                            "user {user_id} already reviewed product {product_id}"
                        )));
                    }

                    let review = Review::new(user_id, product_id, order.id, rating, comment)?;
                    tx.insert_document(&review).await?;
                    Ok(review)
                })
            })
            .await
    }

    /// Adds the shop owner's reply to a review. A review is replied to once.
    #[tracing::instrument(skip(self, reply))]
    pub async fn reply_to_review(
        &self,
        actor: UserId,
        review_id: ReviewId,
        reply: &str,
    ) -> Result<Review, DomainError> {
        let reply = reply.to_string();

        self.coordinator
            .run("reply_to_review", move |tx| {
                Box::pin(async move {
                    let review = tx.require_active::<Review>(review_id.into()).await?;
                    if review.reply.is_some() {
                        return Err(DomainError::conflict::<Review>(format!(
                            "review {review_id} already has a reply"
                        )));
                    }

                    let product: Product = tx
                        .get_document(review.product.into())
                        .await?
                        .ok_or_else(|| DomainError::not_found::<Product>(review.product))?;
                    let shop: Shop = tx
                        .get_document(product.shop.into())
                        .await?
                        .ok_or_else(|| DomainError::not_found::<Shop>(product.shop))?;
                    if shop.owner != actor {
                        return Err(DomainError::Forbidden(format!(
                            "user {actor} does not own shop {}",
                            shop.id
                        )));
                    }

                    let unanswered = Filter::active().eq("reply", Value::Null);
                    let update = touched(Update::new().set("reply", reply));
                    tx.update_document::<Review>(review_id.into(), &unanswered, &update)
                        .await?
                        .ok_or_else(|| {
                            DomainError::conflict::<Review>(format!(
                                "review {review_id} already has a reply"
                            ))
                        })
                })
            })
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_review(&self, review_id: ReviewId) -> Result<Review, DomainError> {
        self.reviews.soft_delete(review_id).await
    }
}
