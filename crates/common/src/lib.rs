//! Shared identifier types for the marketplace crates.

mod types;

pub use types::{
    CategoryId, CouponId, FollowId, OrderId, PaymentId, ProductId, ReviewId, ShopId,
    SubscriberId, UserId,
};
