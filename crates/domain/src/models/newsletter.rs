use chrono::{DateTime, Utc};
use common::{SubscriberId, UserId};
use document_store::Document;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::repository::Entity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsletterSubscriber {
    pub id: SubscriberId,
    pub email: String,
    /// The account registered under `email`.
    pub user: UserId,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NewsletterSubscriber {
    pub fn new(email: String, user: UserId) -> Self {
        let now = Utc::now();
        Self {
            id: SubscriberId::new(),
            email,
            user,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Identifies a subscription to cancel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriberRef {
    Id(SubscriberId),
    Email(String),
}

impl Document for NewsletterSubscriber {
    const COLLECTION: &'static str = "newsletter_subscribers";

    fn document_id(&self) -> Uuid {
        self.id.as_uuid()
    }
}

impl Entity for NewsletterSubscriber {
    const NAME: &'static str = "NewsletterSubscriber";

    fn is_active(&self) -> bool {
        self.is_active
    }
}
