use chrono::{DateTime, Utc};
use common::{OrderId, PaymentId, ProductId, ShopId, UserId};
use document_store::Document;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::money::Money;
use crate::repository::Entity;

/// Order status.
///
/// ```text
/// Pending ──(successful payment)──► Complete
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Complete,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Complete => "complete",
        }
    }
}

/// A line item embedded in an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product: ProductId,
    /// Unit price as supplied by the client.
    pub price: Money,
    pub quantity: u32,
}

impl OrderLine {
    pub fn new(product: ProductId, price: Money, quantity: u32) -> Self {
        Self {
            product,
            price,
            quantity,
        }
    }

    /// Returns `price * quantity`.
    pub fn total(&self) -> Money {
        self.price.multiply(self.quantity)
    }

    /// Returns `price * quantity`, or `None` if it does not fit in cents.
    pub fn checked_total(&self) -> Option<Money> {
        self.price.checked_multiply(self.quantity)
    }
}

/// A customer order against one shop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user: UserId,
    pub shop: ShopId,
    pub products: Vec<OrderLine>,
    pub subtotal: Money,
    pub discount: Money,
    pub total_price: Money,
    pub payment: Option<PaymentId>,
    pub status: OrderStatus,
    pub delivery_address: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Creates a pending order and computes its totals.
    ///
    /// A negative discount counts as zero and the total never drops below zero.
    pub fn place(
        user: UserId,
        shop: ShopId,
        products: Vec<OrderLine>,
        discount: Option<Money>,
        delivery_address: impl Into<String>,
    ) -> Self {
        let subtotal: Money = products.iter().map(OrderLine::total).sum();
        let discount = discount.unwrap_or_default().non_negative();
        let now = Utc::now();
        Self {
            id: OrderId::new(),
            user,
            shop,
            products,
            subtotal,
            discount,
            total_price: subtotal.saturating_sub(discount),
            payment: None,
            status: OrderStatus::Pending,
            delivery_address: delivery_address.into(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sums the line totals, or returns `None` if any step overflows.
    pub fn checked_subtotal(lines: &[OrderLine]) -> Option<Money> {
        lines.iter().try_fold(Money::zero(), |acc, line| {
            acc.checked_add(line.checked_total()?)
        })
    }

    /// Returns true if the order contains `product`.
    pub fn contains(&self, product: ProductId) -> bool {
        self.products.iter().any(|line| line.product == product)
    }
}

impl Document for Order {
    const COLLECTION: &'static str = "orders";

    fn document_id(&self) -> Uuid {
        self.id.as_uuid()
    }
}

impl Entity for Order {
    const NAME: &'static str = "Order";

    fn is_active(&self) -> bool {
        self.is_active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines() -> Vec<OrderLine> {
        vec![
            OrderLine::new(ProductId::new(), Money::from_cents(1000), 2),
            OrderLine::new(ProductId::new(), Money::from_cents(250), 1),
        ]
    }

    #[test]
    fn totals_sum_line_items() {
        let order = Order::place(UserId::new(), ShopId::new(), lines(), None, "1 Main St");
        assert_eq!(order.subtotal.cents(), 2250);
        assert_eq!(order.total_price.cents(), 2250);
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(order.payment.is_none());
    }

    #[test]
    fn discount_is_subtracted_and_floored() {
        let order = Order::place(
            UserId::new(),
            ShopId::new(),
            lines(),
            Some(Money::from_cents(250)),
            "",
        );
        assert_eq!(order.total_price.cents(), 2000);

        let order = Order::place(
            UserId::new(),
            ShopId::new(),
            lines(),
            Some(Money::from_cents(10_000)),
            "",
        );
        assert_eq!(order.total_price, Money::zero());
    }

    #[test]
    fn negative_discount_counts_as_zero() {
        let order = Order::place(
            UserId::new(),
            ShopId::new(),
            lines(),
            Some(Money::from_cents(-500)),
            "",
        );
        assert_eq!(order.discount, Money::zero());
        assert_eq!(order.total_price.cents(), 2250);
    }

    #[test]
    fn checked_subtotal_detects_overflow() {
        assert_eq!(Order::checked_subtotal(&lines()), Some(Money::from_cents(2250)));

        let too_large = vec![OrderLine::new(
            ProductId::new(),
            Money::from_cents(i64::MAX / 2),
            3,
        )];
        assert_eq!(Order::checked_subtotal(&too_large), None);

        let sum_too_large = vec![
            OrderLine::new(ProductId::new(), Money::from_cents(i64::MAX - 10), 1),
            OrderLine::new(ProductId::new(), Money::from_cents(20), 1),
        ];
        assert_eq!(Order::checked_subtotal(&sum_too_large), None);
    }

    #[test]
    fn contains_checks_line_items() {
        let items = lines();
        let first = items[0].product;
        let order = Order::place(UserId::new(), ShopId::new(), items, None, "");
        assert!(order.contains(first));
        assert!(!order.contains(ProductId::new()));
    }
}
