use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use super::domain::{ListFilter, Subscription, SubscriptionInput, SummaryFilter, SummaryQuery};
use super::repository::SubscriptionRepository;
use super::summary::MonthRange;
use super::validation::validate_input;
use crate::errors::ServiceError;

/// Application service for subscriptions, independent of web framework.
pub struct SubscriptionService<R: SubscriptionRepository + ?Sized> {
    repo: Arc<R>,
}

impl<R: SubscriptionRepository + ?Sized> SubscriptionService<R> {
    pub fn new(repo: Arc<R>) -> Self { Self { repo } }

    /// Validate, assign a fresh id and persist.
    ///
    /// # Examples
    /// ```
    /// use service::subscription::{SubscriptionInput, SubscriptionService, repository::mock::InMemorySubscriptionRepository};
    /// use std::sync::Arc;
    /// let svc = SubscriptionService::new(Arc::new(InMemorySubscriptionRepository::default()));
    /// let input = SubscriptionInput {
    ///     service_name: "Yandex Plus".into(),
    ///     price: 400,
    ///     user_id: "60601fee-2bf1-4721-ae6f-7636e79a0cba".into(),
    ///     start_date: "07-2025".into(),
    ///     end_date: None,
    /// };
    /// let created = tokio_test::block_on(svc.create(input)).unwrap();
    /// assert_eq!(created.start_date.to_string(), "07-2025");
    /// ```
    #[instrument(skip(self, input), fields(service_name = %input.service_name))]
    pub async fn create(&self, input: SubscriptionInput) -> Result<Subscription, ServiceError> {
        let fields = validate_input(&input).map_err(rejected)?;
        let id = Uuid::new_v4();
        let created = self
            .repo
            .create(id, &fields)
            .await
            .map_err(|e| failed("create subscription", e))?;
        info!(id = %created.id, user_id = %created.user_id, "subscription_created");
        Ok(created)
    }

    #[instrument(skip(self), fields(id = %id))]
    pub async fn get(&self, id: Uuid) -> Result<Subscription, ServiceError> {
        self.repo.get(id).await.map_err(|e| failed("get subscription", e))
    }

    /// Full replace of the mutable fields; `id` comes from the caller.
    #[instrument(skip(self, input), fields(id = %id))]
    pub async fn update(&self, id: Uuid, input: SubscriptionInput) -> Result<Subscription, ServiceError> {
        let fields = validate_input(&input).map_err(rejected)?;
        let updated = self
            .repo
            .update(id, &fields)
            .await
            .map_err(|e| failed("update subscription", e))?;
        info!(id = %updated.id, "subscription_updated");
        Ok(updated)
    }

    #[instrument(skip(self), fields(id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        self.repo
            .delete(id)
            .await
            .map_err(|e| failed("delete subscription", e))?;
        info!(id = %id, "subscription_deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn list(&self, filter: ListFilter) -> Result<Vec<Subscription>, ServiceError> {
        let list = self
            .repo
            .list(&filter)
            .await
            .map_err(|e| failed("list subscriptions", e))?;
        debug!(count = list.len(), "list subscriptions");
        Ok(list)
    }

    /// Total cost over the inclusive month range; both bounds are required.
    #[instrument(skip(self))]
    pub async fn summary(&self, filter: SummaryFilter) -> Result<i64, ServiceError> {
        let (start, end) = match (filter.start, filter.end) {
            (Some(start), Some(end)) => (start, end),
            _ => return Err(rejected(ServiceError::invalid("start and end are required"))),
        };
        let range = MonthRange::new(start, end).map_err(rejected)?;
        let query = SummaryQuery {
            range,
            user_id: filter.user_id,
            service_name: filter.service_name,
        };
        self.repo
            .summary(&query)
            .await
            .map_err(|e| failed("summary subscriptions", e))
    }
}

fn rejected(e: ServiceError) -> ServiceError {
    debug!(error = %e, "subscription input rejected");
    e
}

/// Log a repository failure and pass it through unchanged.
fn failed(op: &'static str, e: ServiceError) -> ServiceError {
    match &e {
        ServiceError::Internal(_) => error!(op, kind = e.kind(), error = %e, "{op} failed"),
        _ => warn!(op, kind = e.kind(), error = %e, "{op} failed"),
    }
    e
}
