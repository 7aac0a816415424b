use async_trait::async_trait;
use uuid::Uuid;

use super::domain::{ListFilter, Subscription, SubscriptionFields, SummaryQuery};
use crate::errors::ServiceError;

/// Persistence contract for subscriptions.
///
/// Implementations classify their own failures: a missing row is `NotFound`,
/// a uniqueness conflict is `Duplicate`, anything else is `Internal`.
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    async fn create(&self, id: Uuid, fields: &SubscriptionFields) -> Result<Subscription, ServiceError>;
    async fn get(&self, id: Uuid) -> Result<Subscription, ServiceError>;
    /// Replace every mutable field of `id` and refresh `updated_at`
    async fn update(&self, id: Uuid, fields: &SubscriptionFields) -> Result<Subscription, ServiceError>;
    async fn delete(&self, id: Uuid) -> Result<(), ServiceError>;
    /// Newest first; limit/offset normalized with [`crate::pagination::Pagination::normalize`]
    async fn list(&self, filter: &ListFilter) -> Result<Vec<Subscription>, ServiceError>;
    async fn summary(&self, query: &SummaryQuery) -> Result<i64, ServiceError>;
}

/// Simple in-memory repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
    use std::sync::Mutex;

    use chrono::Utc;

    use crate::subscription::summary::total_cost;

    #[derive(Default)]
    pub struct InMemorySubscriptionRepository {
        rows: Mutex<HashMap<Uuid, (u64, Subscription)>>, // value: (insertion seq, row)
        seq: AtomicU64,
        calls: AtomicUsize,
    }

    impl InMemorySubscriptionRepository {
        /// Number of repository calls made so far
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn touch(&self) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }

        fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<Uuid, (u64, Subscription)>>, ServiceError> {
            self.rows
                .lock()
                .map_err(|_| ServiceError::Internal("in-memory store poisoned".into()))
        }

        /// Matching rows ordered newest first
        fn filtered(&self, user_id: Option<Uuid>, service_name: Option<&str>) -> Result<Vec<Subscription>, ServiceError> {
            let rows = self.lock()?;
            let mut found: Vec<&(u64, Subscription)> = rows
                .values()
                .filter(|(_, s)| s.matches(user_id, service_name))
                .collect();
            found.sort_by(|(sa, a), (sb, b)| b.created_at.cmp(&a.created_at).then(sb.cmp(sa)));
            Ok(found.into_iter().map(|(_, s)| s.clone()).collect())
        }
    }

    #[async_trait]
    impl SubscriptionRepository for InMemorySubscriptionRepository {
        async fn create(&self, id: Uuid, fields: &SubscriptionFields) -> Result<Subscription, ServiceError> {
            self.touch();
            let mut rows = self.lock()?;
            if rows.contains_key(&id) {
                return Err(ServiceError::Duplicate(format!("subscription {id} already exists")));
            }
            let now = Utc::now();
            let sub = Subscription {
                id,
                service_name: fields.service_name.clone(),
                price: fields.price,
                user_id: fields.user_id,
                start_date: fields.start_date,
                end_date: fields.end_date,
                created_at: now,
                updated_at: now,
            };
            let seq = self.seq.fetch_add(1, Ordering::SeqCst);
            rows.insert(id, (seq, sub.clone()));
            Ok(sub)
        }

        async fn get(&self, id: Uuid) -> Result<Subscription, ServiceError> {
            self.touch();
            let rows = self.lock()?;
            rows.get(&id)
                .map(|(_, s)| s.clone())
                .ok_or_else(|| ServiceError::not_found("subscription"))
        }

        async fn update(&self, id: Uuid, fields: &SubscriptionFields) -> Result<Subscription, ServiceError> {
            self.touch();
            let mut rows = self.lock()?;
            let (_, sub) = rows
                .get_mut(&id)
                .ok_or_else(|| ServiceError::not_found("subscription"))?;
            sub.service_name = fields.service_name.clone();
            sub.price = fields.price;
            sub.user_id = fields.user_id;
            sub.start_date = fields.start_date;
            sub.end_date = fields.end_date;
            sub.updated_at = Utc::now();
            Ok(sub.clone())
        }

        async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
            self.touch();
            let mut rows = self.lock()?;
            rows.remove(&id)
                .map(|_| ())
                .ok_or_else(|| ServiceError::not_found("subscription"))
        }

        async fn list(&self, filter: &ListFilter) -> Result<Vec<Subscription>, ServiceError> {
            self.touch();
            let (limit, offset) = filter.page.normalize();
            let rows = self.filtered(filter.user_id, filter.service_name.as_deref())?;
            Ok(rows
                .into_iter()
                .skip(offset as usize)
                .take(limit as usize)
                .collect())
        }

        async fn summary(&self, query: &SummaryQuery) -> Result<i64, ServiceError> {
            self.touch();
            let rows = self.filtered(query.user_id, query.service_name.as_deref())?;
            Ok(total_cost(&query.range, &rows))
        }
    }
}
