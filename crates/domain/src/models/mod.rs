//! Persistent entities of the marketplace.
//!
//! Every entity is stored as a JSON document in its own collection. Field
//! names are the snake_case struct fields, which is what filters refer to.

mod catalog;
mod coupon;
mod follow;
mod newsletter;
mod order;
mod payment;
mod review;
mod shop;
mod user;

pub use catalog::{NewProduct, Product, ProductCategory, ProductStatus};
pub use coupon::{Coupon, normalize_code};
pub use follow::Follow;
pub use newsletter::{NewsletterSubscriber, SubscriberRef};
pub use order::{Order, OrderLine, OrderStatus};
pub use payment::{Payment, PaymentStatus};
pub use review::Review;
pub use shop::{Shop, ShopChanges};
pub use user::{User, UserRole, normalize_email};
