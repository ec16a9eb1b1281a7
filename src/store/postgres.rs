use tracing::Instrument;

use super::{StoreResult, Subscription, SubscriptionStore};
use crate::{database::DbManager, web::types::ValidEmail};

/// Stores subscriptions in the `subscriptions` table.
/// The unique index on `email` is what keeps the records unique.
#[derive(Debug, Clone)]
pub struct PgSubscriptionStore {
    database_mgr: DbManager,
}

impl PgSubscriptionStore {
    pub fn new(database_mgr: DbManager) -> Self {
        Self { database_mgr }
    }

    pub fn database_mgr(&self) -> &DbManager {
        &self.database_mgr
    }
}

impl SubscriptionStore for PgSubscriptionStore {
    async fn find_by_email(&self, email: &ValidEmail) -> StoreResult<Option<Subscription>> {
        let subscription = sqlx::query_as::<_, Subscription>(
            r#"SELECT id, email, subscribed_at FROM subscriptions
            WHERE email = $1"#,
        )
        .bind(email.as_ref())
        .fetch_optional(self.database_mgr.db())
        .await?;

        Ok(subscription)
    }

    async fn create(&self, email: &ValidEmail) -> StoreResult<Option<Subscription>> {
        let subscription = Subscription::new(email);

        let q_span = tracing::info_span!("Adding subscription to the database");
        let query_result = sqlx::query(
            r#"
            INSERT INTO subscriptions (id, email, subscribed_at)
            VALUES ($1, $2, $3)
        "#,
        )
        .bind(subscription.id)
        .bind(&subscription.email)
        .bind(subscription.subscribed_at)
        .execute(self.database_mgr.db())
        .instrument(q_span)
        .await;

        match query_result {
            Ok(_) => Ok(Some(subscription)),
            // Someone stored the same email first, nothing to do.
            Err(er) if is_unique_violation(&er) => Ok(None),
            Err(er) => Err(er.into()),
        }
    }
}

// ###################################
// ->   HELPERS
// ###################################

/// Checks whether the error was raised by a unique constraint.
fn is_unique_violation(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(er) => er.is_unique_violation(),
        _ => false,
    }
}
