use chrono::{DateTime, Utc};
use common::{ShopId, UserId};
use document_store::Document;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::repository::Entity;

/// A vendor storefront.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shop {
    pub id: ShopId,
    pub owner: UserId,
    pub name: String,
    pub description: String,
    /// Number of follow records referencing this shop.
    pub follower_count: i64,
    pub is_blacklisted: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Shop {
    pub fn new(owner: UserId, name: impl Into<String>, description: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: ShopId::new(),
            owner,
            name: name.into(),
            description: description.into(),
            follower_count: 0,
            is_blacklisted: false,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Editable shop fields; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShopChanges {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl Document for Shop {
    const COLLECTION: &'static str = "shops";

    fn document_id(&self) -> Uuid {
        self.id.as_uuid()
    }
}

impl Entity for Shop {
    const NAME: &'static str = "Shop";

    fn is_active(&self) -> bool {
        self.is_active
    }
}
