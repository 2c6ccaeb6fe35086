//! Integration tests for the marketplace workflows.
//!
//! Every test runs against the in-memory document store, which provides
//! snapshot isolation and write fault injection.

use common::{CategoryId, OrderId, ProductId, ShopId, UserId};
use document_store::{DocumentStoreExt, Filter, InMemoryDocumentStore};
use domain::{
    AccountService, CatalogService, Follow, Money, NewProduct, Order, OrderLine, OrderStatus,
    Payment, Product, ProductStatus, ReportingService, Shop, User, UserRole,
};
use workflows::{
    InMemoryPaymentGateway, PlaceOrder, RecordPayment, WorkflowError, Workflows,
};

type TestWorkflows = Workflows<InMemoryDocumentStore, InMemoryPaymentGateway>;

struct TestHarness {
    store: InMemoryDocumentStore,
    gateway: InMemoryPaymentGateway,
    workflows: TestWorkflows,
    accounts: AccountService<InMemoryDocumentStore>,
    catalog: CatalogService<InMemoryDocumentStore>,
    reporting: ReportingService<InMemoryDocumentStore>,
}

impl TestHarness {
    fn new() -> Self {
        let store = InMemoryDocumentStore::new();
        let gateway = InMemoryPaymentGateway::new();

        Self {
            workflows: Workflows::new(store.clone(), gateway.clone()),
            accounts: AccountService::new(store.clone()),
            catalog: CatalogService::new(store.clone()),
            reporting: ReportingService::new(store.clone()),
            store,
            gateway,
        }
    }

    async fn user(&self, name: &str) -> User {
        let email = format!("{}@example.com", name.to_lowercase());
        self.accounts
            .create_user(name, &email, UserRole::User)
            .await
            .unwrap()
    }

    async fn shop(&self) -> Shop {
        let vendor = self
            .accounts
            .create_user("Vendor", &format!("{}@vendors.example", ShopId::new()), UserRole::Vendor)
            .await
            .unwrap();
        self.catalog
            .create_shop(vendor.id, "Corner Shop", "Everything you need")
            .await
            .unwrap()
    }

    async fn category(&self, name: &str) -> CategoryId {
        self.catalog.create_category(name).await.unwrap().id
    }

    async fn product(&self, shop: ShopId, category: CategoryId, inventory: i64) -> Product {
        self.catalog
            .create_product(NewProduct {
                shop,
                category,
                name: "Widget".to_string(),
                description: String::new(),
                price: Money::from_cents(1000),
                inventory_count: inventory,
                discounted_price: None,
            })
            .await
            .unwrap()
    }

    async fn stored_product(&self, id: ProductId) -> Product {
        self.store.get_document(id.into()).await.unwrap().unwrap()
    }

    async fn stored_shop(&self, id: ShopId) -> Shop {
        self.store.get_document(id.into()).await.unwrap().unwrap()
    }

    async fn stored_order(&self, id: OrderId) -> Order {
        self.store.get_document(id.into()).await.unwrap().unwrap()
    }

    async fn payments_for(&self, order: OrderId) -> Vec<Payment> {
        self.store
            .find_documents(&Filter::new().eq_id("order", order))
            .await
            .unwrap()
    }

    async fn follow_count(&self, shop: ShopId) -> i64 {
        self.reporting.follow_count(shop).await.unwrap() as i64
    }
}

fn order_of(shop: ShopId, lines: Vec<(ProductId, u32)>) -> PlaceOrder {
    PlaceOrder {
        shop,
        products: lines
            .into_iter()
            .map(|(product, quantity)| OrderLine::new(product, Money::from_cents(1000), quantity))
            .collect(),
        discount: None,
        delivery_address: "12 Quay Street".to_string(),
    }
}

mod place_order {
    use super::*;

    #[tokio::test]
    async fn creates_pending_order_and_decrements_inventory() {
        let h = TestHarness::new();
        let buyer = h.user("Bo").await;
        let shop = h.shop().await;
        let category = h.category("Tools").await;
        let a = h.product(shop.id, category, 5).await;
        let b = h.product(shop.id, category, 3).await;

        let order = h
            .workflows
            .place_order(buyer.id, order_of(shop.id, vec![(a.id, 2), (b.id, 3)]))
            .await
            .unwrap();

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total_price.cents(), 5000);
        assert_eq!(order.products.len(), 2);
        assert_eq!(h.stored_product(a.id).await.inventory_count, 3);
        assert_eq!(h.stored_product(b.id).await.inventory_count, 0);
        assert_eq!(h.stored_order(order.id).await, order);
    }

    #[tokio::test]
    async fn discount_is_clamped_and_total_floored() {
        let h = TestHarness::new();
        let buyer = h.user("Bo").await;
        let shop = h.shop().await;
        let product = h.product(shop.id, h.category("Tools").await, 5).await;

        let mut input = order_of(shop.id, vec![(product.id, 1)]);
        input.discount = Some(Money::from_cents(5_000));
        let order = h.workflows.place_order(buyer.id, input).await.unwrap();
        assert_eq!(order.total_price, Money::zero());

        let mut input = order_of(shop.id, vec![(product.id, 1)]);
        input.discount = Some(Money::from_cents(-300));
        let order = h.workflows.place_order(buyer.id, input).await.unwrap();
        assert_eq!(order.discount, Money::zero());
        assert_eq!(order.total_price.cents(), 1000);
    }

    #[tokio::test]
    async fn insufficient_inventory_commits_nothing() {
        let h = TestHarness::new();
        let buyer = h.user("Bo").await;
        let shop = h.shop().await;
        let category = h.category("Tools").await;
        let plenty = h.product(shop.id, category, 10).await;
        let scarce = h.product(shop.id, category, 1).await;

        let result = h
            .workflows
            .place_order(
                buyer.id,
                order_of(shop.id, vec![(plenty.id, 4), (scarce.id, 2)]),
            )
            .await;

        match result {
            Err(WorkflowError::InsufficientInventory {
                product,
                requested,
                available,
            }) => {
                assert_eq!(product, scarce.id);
                assert_eq!(requested, 2);
                assert_eq!(available, 1);
            }
            other => panic!("expected InsufficientInventory, got {other:?}"),
        }
        assert_eq!(h.stored_product(plenty.id).await.inventory_count, 10);
        assert_eq!(h.stored_product(scarce.id).await.inventory_count, 1);
        assert_eq!(h.reporting.total_orders(None).await.unwrap(), 0);
        assert_eq!(h.store.document_count("orders").await, 0);
    }

    #[tokio::test]
    async fn missing_or_deactivated_product_is_not_found() {
        let h = TestHarness::new();
        let buyer = h.user("Bo").await;
        let shop = h.shop().await;
        let product = h.product(shop.id, h.category("Tools").await, 5).await;
        h.catalog.delete_product(product.id).await.unwrap();

        for id in [product.id, ProductId::new()] {
            let result = h
                .workflows
                .place_order(buyer.id, order_of(shop.id, vec![(id, 1)]))
                .await;
            assert!(matches!(
                result,
                Err(WorkflowError::NotFound {
                    entity: "Product",
                    ..
                })
            ));
        }
    }

    #[tokio::test]
    async fn inactive_shop_or_user_is_not_found() {
        let h = TestHarness::new();
        let buyer = h.user("Bo").await;
        let shop = h.shop().await;
        let product = h.product(shop.id, h.category("Tools").await, 5).await;

        let result = h
            .workflows
            .place_order(UserId::new(), order_of(shop.id, vec![(product.id, 1)]))
            .await;
        assert!(matches!(
            result,
            Err(WorkflowError::NotFound { entity: "User", .. })
        ));

        h.workflows.delete_shop(shop.id).await.unwrap();
        let result = h
            .workflows
            .place_order(buyer.id, order_of(shop.id, vec![(product.id, 1)]))
            .await;
        assert!(matches!(
            result,
            Err(WorkflowError::NotFound { entity: "Shop", .. })
        ));
    }

    #[tokio::test]
    async fn empty_order_or_zero_quantity_is_invalid() {
        let h = TestHarness::new();
        let buyer = h.user("Bo").await;
        let shop = h.shop().await;
        let product = h.product(shop.id, h.category("Tools").await, 5).await;

        let empty = h
            .workflows
            .place_order(buyer.id, order_of(shop.id, vec![]))
            .await;
        assert!(matches!(empty, Err(WorkflowError::Validation(_))));

        let zero = h
            .workflows
            .place_order(buyer.id, order_of(shop.id, vec![(product.id, 0)]))
            .await;
        assert!(matches!(zero, Err(WorkflowError::Validation(_))));
    }

    #[tokio::test]
    async fn overflowing_order_total_is_invalid() {
        let h = TestHarness::new();
        let buyer = h.user("Bo").await;
        let shop = h.shop().await;
        let product = h.product(shop.id, h.category("Tools").await, 5).await;
        let mut input = order_of(shop.id, vec![]);
        input.products = vec![OrderLine::new(
            product.id,
            Money::from_cents(i64::MAX / 2),
            3,
        )];

        let result = h.workflows.place_order(buyer.id, input).await;

        assert!(matches!(result, Err(WorkflowError::Validation(_))));
        assert_eq!(h.stored_product(product.id).await.inventory_count, 5);
        assert_eq!(h.store.document_count("orders").await, 0);
    }

    #[tokio::test]
    async fn concurrent_orders_for_last_units_let_exactly_one_win() {
        let h = TestHarness::new();
        let first = h.user("Ann").await;
        let second = h.user("Ben").await;
        let shop = h.shop().await;
        let product = h.product(shop.id, h.category("Tools").await, 2).await;

        let (a, b) = tokio::join!(
            h.workflows
                .place_order(first.id, order_of(shop.id, vec![(product.id, 2)])),
            h.workflows
                .place_order(second.id, order_of(shop.id, vec![(product.id, 2)])),
        );

        let results = [a, b];
        let successes = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1);
        for result in &results {
            if let Err(err) = result {
                assert!(
                    matches!(
                        err,
                        WorkflowError::ConcurrentUpdateConflict { .. }
                            | WorkflowError::InsufficientInventory { .. }
                    ),
                    "unexpected error: {err:?}"
                );
            }
        }
        assert_eq!(h.stored_product(product.id).await.inventory_count, 0);
        assert_eq!(h.store.document_count("orders").await, 1);
    }

    #[tokio::test]
    async fn sequential_orders_never_drive_inventory_negative() {
        let h = TestHarness::new();
        let buyer = h.user("Bo").await;
        let shop = h.shop().await;
        let product = h.product(shop.id, h.category("Tools").await, 3).await;

        let mut placed = 0;
        for _ in 0..5 {
            if h
                .workflows
                .place_order(buyer.id, order_of(shop.id, vec![(product.id, 1)]))
                .await
                .is_ok()
            {
                placed += 1;
            }
        }

        assert_eq!(placed, 3);
        assert_eq!(h.stored_product(product.id).await.inventory_count, 0);
    }
}

mod record_payment {
    use super::*;

    async fn pending_order(h: &TestHarness, buyer: &User) -> Order {
        let shop = h.shop().await;
        let product = h.product(shop.id, h.category("Tools").await, 5).await;
        h.workflows
            .place_order(buyer.id, order_of(shop.id, vec![(product.id, 2)]))
            .await
            .unwrap()
    }

    fn payment_for(order: &Order) -> RecordPayment {
        RecordPayment {
            order: order.id,
            shop: order.shop,
            amount: order.total_price,
        }
    }

    #[tokio::test]
    async fn completes_order_with_payment() {
        let h = TestHarness::new();
        let buyer = h.user("Bo").await;
        let order = pending_order(&h, &buyer).await;

        let payment = h
            .workflows
            .record_payment(buyer.id, payment_for(&order))
            .await
            .unwrap();

        let stored = h.stored_order(order.id).await;
        assert_eq!(stored.status, OrderStatus::Complete);
        assert_eq!(stored.payment, Some(payment.id));
        assert_eq!(payment.amount.cents(), 2000);
        assert_eq!(
            h.reporting.total_revenue(Some(order.shop)).await.unwrap(),
            Money::from_cents(2000)
        );
    }

    #[tokio::test]
    async fn completed_order_cannot_be_paid_twice() {
        let h = TestHarness::new();
        let buyer = h.user("Bo").await;
        let order = pending_order(&h, &buyer).await;
        h.workflows
            .record_payment(buyer.id, payment_for(&order))
            .await
            .unwrap();

        let second = h
            .workflows
            .record_payment(buyer.id, payment_for(&order))
            .await;

        assert!(matches!(
            second,
            Err(WorkflowError::PaymentAssociationFailed { order: id }) if id == order.id
        ));
        assert_eq!(h.payments_for(order.id).await.len(), 1);
    }

    #[tokio::test]
    async fn missing_order_creates_no_payment() {
        let h = TestHarness::new();
        let buyer = h.user("Bo").await;
        let shop = h.shop().await;
        let order = OrderId::new();

        let result = h
            .workflows
            .record_payment(
                buyer.id,
                RecordPayment {
                    order,
                    shop: shop.id,
                    amount: Money::from_cents(100),
                },
            )
            .await;

        assert!(matches!(
            result,
            Err(WorkflowError::NotFound { entity: "Order", .. })
        ));
        assert!(h.payments_for(order).await.is_empty());
    }

    #[tokio::test]
    async fn failed_order_update_discards_payment() {
        let h = TestHarness::new();
        let buyer = h.user("Bo").await;
        let order = pending_order(&h, &buyer).await;
        h.store.fail_writes_to("orders");

        let result = h
            .workflows
            .record_payment(buyer.id, payment_for(&order))
            .await;
        h.store.clear_failures();

        assert!(matches!(result, Err(WorkflowError::Store(_))));
        assert!(h.payments_for(order.id).await.is_empty());
        assert_eq!(h.stored_order(order.id).await.status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn order_of_another_shop_is_rejected() {
        let h = TestHarness::new();
        let buyer = h.user("Bo").await;
        let order = pending_order(&h, &buyer).await;
        let other_shop = h.shop().await;

        let result = h
            .workflows
            .record_payment(
                buyer.id,
                RecordPayment {
                    shop: other_shop.id,
                    ..payment_for(&order)
                },
            )
            .await;

        assert!(matches!(result, Err(WorkflowError::Validation(_))));
        assert!(h.payments_for(order.id).await.is_empty());
    }
}

mod follows {
    use super::*;

    #[tokio::test]
    async fn follow_increments_count_once() {
        let h = TestHarness::new();
        let fan = h.user("Fay").await;
        let shop = h.shop().await;

        h.workflows.follow_shop(fan.id, shop.id).await.unwrap();
        let again = h.workflows.follow_shop(fan.id, shop.id).await;

        assert!(matches!(again, Err(WorkflowError::AlreadyFollowing { .. })));
        assert_eq!(h.stored_shop(shop.id).await.follower_count, 1);
        assert_eq!(h.follow_count(shop.id).await, 1);
    }

    #[tokio::test]
    async fn unfollow_decrements_count() {
        let h = TestHarness::new();
        let fan = h.user("Fay").await;
        let shop = h.shop().await;
        h.workflows.follow_shop(fan.id, shop.id).await.unwrap();

        h.workflows.unfollow_shop(fan.id, shop.id).await.unwrap();

        assert_eq!(h.stored_shop(shop.id).await.follower_count, 0);
        assert!(!h.reporting.is_following(fan.id, shop.id).await.unwrap());
        assert!(matches!(
            h.workflows.unfollow_shop(fan.id, shop.id).await,
            Err(WorkflowError::NotFollowing { .. })
        ));
        assert_eq!(h.stored_shop(shop.id).await.follower_count, 0);
    }

    #[tokio::test]
    async fn following_unknown_shop_is_not_found() {
        let h = TestHarness::new();
        let fan = h.user("Fay").await;

        let result = h.workflows.follow_shop(fan.id, ShopId::new()).await;
        assert!(matches!(
            result,
            Err(WorkflowError::NotFound { entity: "Shop", .. })
        ));
        assert_eq!(h.store.document_count("follows").await, 0);
    }

    #[tokio::test]
    async fn count_matches_follow_records_after_mixed_sequence() {
        let h = TestHarness::new();
        let shop = h.shop().await;
        let mut fans = Vec::new();
        for name in ["Ann", "Ben", "Cat", "Dan"] {
            fans.push(h.user(name).await);
        }

        for fan in &fans {
            h.workflows.follow_shop(fan.id, shop.id).await.unwrap();
        }
        h.workflows.unfollow_shop(fans[1].id, shop.id).await.unwrap();
        h.workflows.unfollow_shop(fans[3].id, shop.id).await.unwrap();
        h.workflows.follow_shop(fans[1].id, shop.id).await.unwrap();
        let _ = h.workflows.follow_shop(fans[0].id, shop.id).await;
        let _ = h.workflows.unfollow_shop(fans[3].id, shop.id).await;

        let stored = h.stored_shop(shop.id).await;
        assert_eq!(stored.follower_count, 3);
        assert_eq!(stored.follower_count, h.follow_count(shop.id).await);
    }

    #[tokio::test]
    async fn concurrent_follows_keep_count_consistent() {
        let h = TestHarness::new();
        let shop = h.shop().await;
        let ann = h.user("Ann").await;
        let ben = h.user("Ben").await;

        let (a, b) = tokio::join!(
            h.workflows.follow_shop(ann.id, shop.id),
            h.workflows.follow_shop(ben.id, shop.id),
        );

        for result in [&a, &b] {
            if let Err(err) = result {
                assert!(err.is_retryable(), "unexpected error: {err:?}");
            }
        }
        assert!(a.is_ok() || b.is_ok());
        assert_eq!(
            h.stored_shop(shop.id).await.follower_count,
            h.follow_count(shop.id).await
        );
    }
}

mod cascades {
    use super::*;

    #[tokio::test]
    async fn delete_shop_deactivates_products_and_removes_follows() {
        let h = TestHarness::new();
        let shop = h.shop().await;
        let other = h.shop().await;
        let category = h.category("Tools").await;
        let products = [
            h.product(shop.id, category, 1).await,
            h.product(shop.id, category, 1).await,
        ];
        let unrelated = h.product(other.id, category, 1).await;
        let fan = h.user("Fay").await;
        h.workflows.follow_shop(fan.id, shop.id).await.unwrap();
        h.workflows.follow_shop(fan.id, other.id).await.unwrap();

        let deleted = h.workflows.delete_shop(shop.id).await.unwrap();

        assert!(!deleted.is_active);
        assert_eq!(deleted.follower_count, 0);
        for product in &products {
            assert!(!h.stored_product(product.id).await.is_active);
        }
        assert!(h.stored_product(unrelated.id).await.is_active);
        assert_eq!(h.follow_count(shop.id).await, 0);
        assert_eq!(h.follow_count(other.id).await, 1);
    }

    #[tokio::test]
    async fn failed_product_step_keeps_shop_active() {
        let h = TestHarness::new();
        let shop = h.shop().await;
        let product = h.product(shop.id, h.category("Tools").await, 1).await;
        let fan = h.user("Fay").await;
        h.workflows.follow_shop(fan.id, shop.id).await.unwrap();
        h.store.fail_writes_to("products");

        let result = h.workflows.delete_shop(shop.id).await;
        h.store.clear_failures();

        assert!(matches!(
            result,
            Err(WorkflowError::CascadeFailed {
                step: "deactivate_products",
                ..
            })
        ));
        let stored = h.stored_shop(shop.id).await;
        assert!(stored.is_active);
        assert_eq!(stored.follower_count, 1);
        assert_eq!(h.follow_count(shop.id).await, 1);
        assert!(h.stored_product(product.id).await.is_active);
    }

    #[tokio::test]
    async fn deleting_a_deleted_shop_is_not_found() {
        let h = TestHarness::new();
        let shop = h.shop().await;
        h.workflows.delete_shop(shop.id).await.unwrap();

        assert!(matches!(
            h.workflows.delete_shop(shop.id).await,
            Err(WorkflowError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn blacklisting_a_deleted_shop_is_not_found() {
        let h = TestHarness::new();
        let shop = h.shop().await;
        let product = h.product(shop.id, h.category("Tools").await, 1).await;
        h.workflows.delete_shop(shop.id).await.unwrap();

        let result = h.workflows.toggle_shop_blacklist(shop.id, true).await;

        assert!(matches!(
            result,
            Err(WorkflowError::NotFound { entity: "Shop", .. })
        ));
        assert!(!h.stored_shop(shop.id).await.is_blacklisted);
        assert_eq!(
            h.stored_product(product.id).await.status,
            ProductStatus::Available
        );
    }

    #[tokio::test]
    async fn blacklist_toggles_status_of_every_product() {
        let h = TestHarness::new();
        let shop = h.shop().await;
        let category = h.category("Tools").await;
        let mut products = Vec::new();
        for _ in 0..3 {
            products.push(h.product(shop.id, category, 1).await);
        }

        let blacklisted = h
            .workflows
            .toggle_shop_blacklist(shop.id, true)
            .await
            .unwrap();
        assert!(blacklisted.is_blacklisted);
        for product in &products {
            assert_eq!(
                h.stored_product(product.id).await.status,
                ProductStatus::Suspended
            );
        }

        let restored = h
            .workflows
            .toggle_shop_blacklist(shop.id, false)
            .await
            .unwrap();
        assert!(!restored.is_blacklisted);
        for product in &products {
            assert_eq!(
                h.stored_product(product.id).await.status,
                ProductStatus::Available
            );
        }
    }

    #[tokio::test]
    async fn failed_status_update_leaves_blacklist_flag_unchanged() {
        let h = TestHarness::new();
        let shop = h.shop().await;
        let product = h.product(shop.id, h.category("Tools").await, 1).await;
        h.store.fail_writes_to("products");

        let result = h.workflows.toggle_shop_blacklist(shop.id, true).await;
        h.store.clear_failures();

        assert!(matches!(
            result,
            Err(WorkflowError::CascadeFailed {
                step: "update_product_status",
                ..
            })
        ));
        assert!(!h.stored_shop(shop.id).await.is_blacklisted);
        assert_eq!(
            h.stored_product(product.id).await.status,
            ProductStatus::Available
        );
    }

    #[tokio::test]
    async fn delete_category_deactivates_only_its_products() {
        let h = TestHarness::new();
        let shop = h.shop().await;
        let tools = h.category("Tools").await;
        let garden = h.category("Garden").await;
        let hammer = h.product(shop.id, tools, 1).await;
        let rake = h.product(shop.id, garden, 1).await;

        let category = h.workflows.delete_product_category(tools).await.unwrap();

        assert!(!category.is_active);
        assert!(!h.stored_product(hammer.id).await.is_active);
        assert!(h.stored_product(rake.id).await.is_active);
        assert!(
            h.catalog
                .categories()
                .find_active(tools)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn failed_category_cascade_keeps_category() {
        let h = TestHarness::new();
        let shop = h.shop().await;
        let tools = h.category("Tools").await;
        h.product(shop.id, tools, 1).await;
        h.store.fail_writes_to("products");

        let result = h.workflows.delete_product_category(tools).await;
        h.store.clear_failures();

        assert!(matches!(result, Err(WorkflowError::CascadeFailed { .. })));
        assert!(h.catalog.categories().find_active(tools).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn delete_user_removes_follows_but_keeps_shops() {
        let h = TestHarness::new();
        let fan = h.user("Fay").await;
        let other_fan = h.user("Gus").await;
        let first = h.shop().await;
        let second = h.shop().await;
        let owned = h.catalog.create_shop(fan.id, "Fay's", "").await.unwrap();
        h.workflows.follow_shop(fan.id, first.id).await.unwrap();
        h.workflows.follow_shop(fan.id, second.id).await.unwrap();
        h.workflows.follow_shop(other_fan.id, first.id).await.unwrap();

        let deleted = h.workflows.delete_user(fan.id).await.unwrap();

        assert!(!deleted.is_active);
        assert!(h.stored_shop(owned.id).await.is_active);
        let remaining: Vec<Follow> = h
            .store
            .find_documents(&Filter::new().eq_id("follower", fan.id))
            .await
            .unwrap();
        assert!(remaining.is_empty());
        for shop in [first.id, second.id] {
            assert_eq!(
                h.stored_shop(shop).await.follower_count,
                h.follow_count(shop).await
            );
        }
        assert_eq!(h.follow_count(first.id).await, 1);
        assert!(matches!(
            h.workflows.delete_user(fan.id).await,
            Err(WorkflowError::NotFound { entity: "User", .. })
        ));
    }
}

mod payment_intent {
    use super::*;

    #[tokio::test]
    async fn amount_is_converted_to_cents() {
        let h = TestHarness::new();

        let intent = h.workflows.create_payment_intent(19.99).await.unwrap();

        assert_eq!(intent.amount.cents(), 1999);
        assert_eq!(intent.currency, "usd");
        assert_eq!(h.gateway.intent_count(), 1);
    }

    #[tokio::test]
    async fn non_positive_amount_is_invalid() {
        let h = TestHarness::new();
        for amount in [0.0, -5.0, f64::NAN] {
            assert!(matches!(
                h.workflows.create_payment_intent(amount).await,
                Err(WorkflowError::Validation(_))
            ));
        }
        assert_eq!(h.gateway.intent_count(), 0);
    }

    #[tokio::test]
    async fn gateway_failure_is_reported() {
        let h = TestHarness::new();
        h.gateway.set_fail_on_intent(true);

        assert!(matches!(
            h.workflows.create_payment_intent(10.0).await,
            Err(WorkflowError::PaymentGateway(_))
        ));
    }
}
