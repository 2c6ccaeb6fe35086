use common::UserId;
use document_store::{DocumentStore, Filter, TransactionCoordinator, TransactionExt, Update};
use tracing::info;

use super::unique_violation;
use crate::error::DomainError;
use crate::models::{NewsletterSubscriber, SubscriberRef, User, UserRole, normalize_email};
use crate::repository::{EntityTransactionExt, Repository, touched};

/// User accounts and newsletter subscriptions.
pub struct AccountService<S> {
    coordinator: TransactionCoordinator<S>,
    users: Repository<S, User>,
    subscribers: Repository<S, NewsletterSubscriber>,
}

impl<S: DocumentStore + Clone> AccountService<S> {
    pub fn new(store: S) -> Self {
        Self {
            users: Repository::new(store.clone()),
            subscribers: Repository::new(store.clone()),
            coordinator: TransactionCoordinator::new(store),
        }
    }

    pub fn users(&self) -> &Repository<S, User> {
        &self.users
    }

    pub fn subscribers(&self) -> &Repository<S, NewsletterSubscriber> {
        &self.subscribers
    }

    /// Registers a user. The email must not belong to another active user.
    #[tracing::instrument(skip(self))]
    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        role: UserRole,
    ) -> Result<User, DomainError> {
        let user = User::new(name, email, role);

        let user = self
            .coordinator
            .run("create_user", move |tx| {
                Box::pin(async move {
                    let same_email = Filter::active().eq("email", user.email.clone());
                    let existing: Vec<User> = tx.find_documents(&same_email).await?;
                    if !existing.is_empty() {
                        return Err(DomainError::conflict::<User>(format!(
                            "email {} is already registered",
                            user.email
                        )));
                    }

                    tx.insert_document(&user)
                        .await
                        .map_err(|e| unique_violation::<User>(e, "email is already registered"))?;
                    Ok(user)
                })
            })
            .await?;

        info!(user_id = %user.id, "User created");
        Ok(user)
    }

    /// Suspends or reinstates an active user.
    #[tracing::instrument(skip(self))]
    pub async fn set_suspended(&self, user_id: UserId, suspended: bool) -> Result<User, DomainError> {
        self.coordinator
            .run("set_user_suspended", move |tx| {
                Box::pin(async move {
                    let update = touched(Update::new().set("is_suspended", suspended));
                    tx.update_document::<User>(user_id.into(), &Filter::active(), &update)
                        .await?
                        .ok_or_else(|| DomainError::not_found::<User>(user_id))
                })
            })
            .await
    }

    /// Subscribes the account registered under `email` to the newsletter.
    #[tracing::instrument(skip(self))]
    pub async fn subscribe(&self, email: &str) -> Result<NewsletterSubscriber, DomainError> {
        let email = normalize_email(email);

        self.coordinator
            .run("newsletter_subscribe", move |tx| {
                Box::pin(async move {
                    let same_email = Filter::active().eq("email", email.clone());

                    let subscribed: Vec<NewsletterSubscriber> =
                        tx.find_documents(&same_email).await?;
                    if !subscribed.is_empty() {
                        return Err(DomainError::conflict::<NewsletterSubscriber>(format!(
                            "{email} is already subscribed"
                        )));
                    }

                    let users: Vec<User> = tx.find_documents(&same_email).await?;
                    let user = users
                        .into_iter()
                        .next()
                        .ok_or_else(|| DomainError::not_found::<User>(&email))?;

                    let subscriber = NewsletterSubscriber::new(email, user.id);
                    tx.insert_document(&subscriber).await.map_err(|e| {
                        unique_violation::<NewsletterSubscriber>(e, "email is already subscribed")
                    })?;
                    Ok(subscriber)
                })
            })
            .await
    }

    /// Cancels a subscription identified by id or email.
    #[tracing::instrument(skip(self))]
    pub async fn unsubscribe(
        &self,
        subscriber: SubscriberRef,
    ) -> Result<NewsletterSubscriber, DomainError> {
        self.coordinator
            .run("newsletter_unsubscribe", move |tx| {
                Box::pin(async move {
                    let id = match subscriber {
                        SubscriberRef::Id(id) => id,
                        SubscriberRef::Email(email) => {
                            let email = normalize_email(&email);
                            let filter = Filter::active().eq("email", email.clone());
                            let found: Vec<NewsletterSubscriber> =
                                tx.find_documents(&filter).await?;
                            found.into_iter().next().map(|s| s.id).ok_or_else(|| {
                                DomainError::not_found::<NewsletterSubscriber>(email)
                            })?
                        }
                    };
                    tx.deactivate::<NewsletterSubscriber>(id.into()).await
                })
            })
            .await
    }
}
