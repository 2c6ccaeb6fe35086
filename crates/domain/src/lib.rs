//! Domain layer of the marketplace.
//!
//! This crate provides:
//! - the persistent entities (users, shops, catalog, orders, payments, follows,
//!   reviews, coupons, newsletter subscriptions)
//! - soft-delete aware repositories over the document store
//! - services for the single-collection operations around the workflows

pub mod error;
pub mod models;
pub mod money;
pub mod repository;
pub mod services;

pub use error::DomainError;
pub use models::{
    Coupon, Follow, NewProduct, NewsletterSubscriber, Order, OrderLine, OrderStatus, Payment,
    PaymentStatus, Product, ProductCategory, ProductStatus, Review, Shop, ShopChanges,
    SubscriberRef, User, UserRole,
};
pub use money::Money;
pub use repository::{Entity, EntityTransactionExt, Repository, touched};
pub use services::{AccountService, CatalogService, ReportingService, ReviewService};
