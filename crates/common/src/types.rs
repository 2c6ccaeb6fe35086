use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Declares a UUID-backed identifier for one entity collection.
///
/// Each entity gets its own type so a `ShopId` can never be passed where a
/// `UserId` is expected.
macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an identifier from an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the underlying UUID.
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }
    };
}

entity_id!(
    /// Identifier of a user account.
    UserId
);
entity_id!(
    /// Identifier of a vendor shop.
    ShopId
);
entity_id!(
    /// Identifier of a product listed by a shop.
    ProductId
);
entity_id!(
    /// Identifier of a product category.
    CategoryId
);
entity_id!(
    /// Identifier of a placed order.
    OrderId
);
entity_id!(
    /// Identifier of a recorded payment.
    PaymentId
);
entity_id!(
    /// Identifier of a follower/shop relation.
    FollowId
);
entity_id!(
    /// Identifier of a product review.
    ReviewId
);
entity_id!(
    /// Identifier of a shop coupon.
    CouponId
);
entity_id!(
    /// Identifier of a newsletter subscription.
    SubscriberId
);
