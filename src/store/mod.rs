//! Persistence of subscriptions.
//!
//! `SubscriptionStore` is the seam between the web layer and the storage. The application state
//! is generic over it so that the Postgres store can be swapped with the in-memory one.

mod memory;
mod postgres;

pub use memory::InMemorySubscriptionStore;
pub use postgres::PgSubscriptionStore;

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::web::types::ValidEmail;

// ###################################
// ->   STRUCTS
// ###################################
/// A persisted subscription. The email is the natural key, there is at most one per address.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Subscription {
    pub id: Uuid,
    pub email: String,
    pub subscribed_at: DateTime<Utc>,
}

impl Subscription {
    pub fn new(email: &ValidEmail) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.as_ref().to_owned(),
            subscribed_at: Utc::now(),
        }
    }
}

// ###################################
// ->   STORE
// ###################################
pub trait SubscriptionStore: Send + Sync + 'static {
    /// Exact match lookup.
    fn find_by_email(
        &self,
        email: &ValidEmail,
    ) -> impl Future<Output = StoreResult<Option<Subscription>>> + Send;

    /// Inserts a new subscription.
    /// Returns `Ok(None)` if the email is already stored, the store stays unchanged in that case.
    fn create(
        &self,
        email: &ValidEmail,
    ) -> impl Future<Output = StoreResult<Option<Subscription>>> + Send;

    /// Returns the subscription for `email` and whether it was just created.
    ///
    /// Relies on `create` reporting a conflict instead of failing, so two callers racing
    /// on the same email both succeed and only one of them creates the record.
    fn get_or_create(
        &self,
        email: &ValidEmail,
    ) -> impl Future<Output = StoreResult<(Subscription, bool)>> + Send {
        async move {
            if let Some(existing) = self.find_by_email(email).await? {
                return Ok((existing, false));
            }

            if let Some(created) = self.create(email).await? {
                return Ok((created, true));
            }

            // Lost the race to a concurrent insert.
            let existing = self
                .find_by_email(email)
                .await?
                .ok_or_else(|| StoreError::MissingAfterConflict(email.as_ref().to_owned()))?;

            Ok((existing, false))
        }
    }
}

// ###################################
// ->   ERROR
// ###################################
pub type StoreResult<T> = core::result::Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("insert of '{0}' conflicted but no stored subscription was found")]
    MissingAfterConflict(String),

    #[error("sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
}
