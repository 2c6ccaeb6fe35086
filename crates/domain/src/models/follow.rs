use chrono::{DateTime, Utc};
use common::{FollowId, ShopId, UserId};
use document_store::Document;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user following a shop. Unique per (follower, shop); removed physically on unfollow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Follow {
    pub id: FollowId,
    pub follower: UserId,
    pub shop: ShopId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Follow {
    pub fn new(follower: UserId, shop: ShopId) -> Self {
        let now = Utc::now();
        Self {
            id: FollowId::new(),
            follower,
            shop,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Document for Follow {
    const COLLECTION: &'static str = "follows";

    fn document_id(&self) -> Uuid {
        self.id.as_uuid()
    }
}
