//! Order placement and payment workflows.

use common::{OrderId, ShopId, UserId};
use document_store::{
    Document, DocumentStore, Filter, StoreError, StoreTransaction, TransactionExt, Update,
};
use domain::{
    EntityTransactionExt, Money, Order, OrderLine, OrderStatus, Payment, Product, Shop, User,
    touched,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, WorkflowError};
use crate::runner::Workflows;
use crate::services::{CURRENCY, PaymentGateway, PaymentIntent};

/// Input of [`Workflows::place_order`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceOrder {
    pub shop: ShopId,
    pub products: Vec<OrderLine>,
    #[serde(default)]
    pub discount: Option<Money>,
    #[serde(default)]
    pub delivery_address: String,
}

/// Input of [`Workflows::record_payment`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordPayment {
    pub order: OrderId,
    pub shop: ShopId,
    pub amount: Money,
}

impl<S, G> Workflows<S, G>
where
    S: DocumentStore,
    G: PaymentGateway,
{
    /// Places an order and takes its line items out of stock.
    ///
    /// Inventory is decremented with a compare-and-set on the count read in
    /// this transaction; losing that race yields `ConcurrentUpdateConflict`.
    #[tracing::instrument(
        skip(self, input),
        fields(shop_id = %input.shop, lines = input.products.len())
    )]
    pub async fn place_order(&self, user_id: UserId, input: PlaceOrder) -> Result<Order> {
        if input.products.is_empty() {
            return Err(WorkflowError::Validation(
                "an order needs at least one product".to_string(),
            ));
        }
        if let Some(line) = input.products.iter().find(|line| line.quantity == 0) {
            return Err(WorkflowError::Validation(format!(
                "quantity of product {} must be positive",
                line.product
            )));
        }
        if Order::checked_subtotal(&input.products).is_none() {
            return Err(WorkflowError::Validation(
                "order total exceeds the supported amount".to_string(),
            ));
        }

        self.execute("place_order", move |tx| {
            Box::pin(async move {
                tx.require_active::<User>(user_id.into()).await?;
                tx.confirm_active::<Shop>(input.shop.into()).await?;

                for line in &input.products {
                    take_from_stock(tx, line).await?;
                }

                let order = Order::place(
                    user_id,
                    input.shop,
                    input.products,
                    input.discount,
                    input.delivery_address,
                );
                tx.insert_document(&order).await?;

                metrics::counter!("orders_placed_total").increment(1);
                Ok(order)
            })
        })
        .await
    }

    /// Records a successful payment and completes its order.
    ///
    /// Only a pending order can be paid, so an order never has two
    /// successful payments.
    #[tracing::instrument(skip(self, input), fields(order_id = %input.order))]
    pub async fn record_payment(&self, user_id: UserId, input: RecordPayment) -> Result<Payment> {
        if input.amount.is_negative() {
            return Err(WorkflowError::Validation(
                "payment amount must not be negative".to_string(),
            ));
        }

        self.execute("record_payment", move |tx| {
            Box::pin(async move {
                tx.require_active::<User>(user_id.into()).await?;
                tx.require_active::<Shop>(input.shop.into()).await?;
                let order = tx.require_active::<Order>(input.order.into()).await?;
                if order.shop != input.shop {
                    return Err(WorkflowError::Validation(format!(
                        "order {} does not belong to shop {}",
                        order.id, input.shop
                    )));
                }

                let payment = Payment::successful(user_id, order.id, input.shop, input.amount);
                tx.insert_document(&payment).await.map_err(|err| match err {
                    StoreError::DuplicateKey { .. } => {
                        WorkflowError::PaymentAssociationFailed { order: order.id }
                    }
                    other => other.into(),
                })?;

                let pending = Filter::active().eq("status", OrderStatus::Pending.as_str());
                let complete = touched(
                    Update::new()
                        .set_id("payment", payment.id)
                        .set("status", OrderStatus::Complete.as_str()),
                );
                tx.update_one(Order::COLLECTION, order.id.into(), &pending, &complete)
                    .await?
                    .ok_or(WorkflowError::PaymentAssociationFailed { order: order.id })?;

                metrics::counter!("payments_recorded_total").increment(1);
                Ok(payment)
            })
        })
        .await
    }

    /// Creates a payment intent with the gateway for a decimal amount.
    #[tracing::instrument(skip(self))]
    pub async fn create_payment_intent(&self, amount: f64) -> Result<PaymentIntent> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(WorkflowError::Validation(format!(
                "payment amount must be positive, got {amount}"
            )));
        }

        self.gateway()
            .create_intent(Money::from_decimal(amount), CURRENCY)
            .await
    }
}

/// Decrements the stock of one line item's product.
async fn take_from_stock<T>(tx: &mut T, line: &OrderLine) -> Result<()>
where
    T: StoreTransaction + ?Sized,
{
    let product = tx.require_active::<Product>(line.product.into()).await?;
    if !product.has_stock_for(line.quantity) {
        return Err(WorkflowError::InsufficientInventory {
            product: product.id,
            requested: line.quantity,
            available: product.inventory_count,
        });
    }

    let unchanged = Filter::active().eq("inventory_count", product.inventory_count);
    let decrement = touched(Update::new().inc("inventory_count", -i64::from(line.quantity)));
    let updated = tx
        .update_one(Product::COLLECTION, product.id.into(), &unchanged, &decrement)
        .await?;
    if updated.is_none() {
        return Err(WorkflowError::ConcurrentUpdateConflict {
            reason: format!("inventory of product {} changed", product.id),
        });
    }

    debug!(product_id = %product.id, quantity = line.quantity, "Inventory decremented");
    Ok(())
}
