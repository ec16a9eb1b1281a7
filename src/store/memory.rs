use std::{
    collections::{hash_map::Entry, HashMap},
    sync::{Mutex, MutexGuard, PoisonError},
};

use tracing::debug;

use super::{StoreResult, Subscription, SubscriptionStore};
use crate::web::types::ValidEmail;

/// Keeps the subscriptions in a map keyed by email.
/// The lookup and the insert of `create` happen under a single lock.
#[derive(Debug, Default)]
pub struct InMemorySubscriptionStore {
    subscriptions: Mutex<HashMap<String, Subscription>>,
}

impl InMemorySubscriptionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // Every mutation is a single `insert`, so a poisoned map is still consistent.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, Subscription>> {
        self.subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl SubscriptionStore for InMemorySubscriptionStore {
    async fn find_by_email(&self, email: &ValidEmail) -> StoreResult<Option<Subscription>> {
        Ok(self.lock().get(email.as_ref()).cloned())
    }

    async fn create(&self, email: &ValidEmail) -> StoreResult<Option<Subscription>> {
        let mut subscriptions = self.lock();

        match subscriptions.entry(email.as_ref().to_owned()) {
            Entry::Occupied(_) => {
                debug!("{:<20} - email already stored", "memory_store");
                Ok(None)
            }
            Entry::Vacant(e) => Ok(Some(e.insert(Subscription::new(email)).clone())),
        }
    }
}
