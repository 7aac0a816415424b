use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::month::Month;
use super::summary::MonthRange;
use crate::pagination::Pagination;

/// Raw create/update payload before validation
#[derive(Debug, Clone, Default)]
pub struct SubscriptionInput {
    pub service_name: String,
    pub price: i64,
    pub user_id: String,
    pub start_date: String,
    pub end_date: Option<String>,
}

/// Validated mutable fields of a subscription (no identity, no timestamps)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionFields {
    pub service_name: String,
    pub price: i32,
    pub user_id: Uuid,
    pub start_date: Month,
    pub end_date: Option<Month>,
}

/// Persisted subscription
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub id: Uuid,
    pub service_name: String,
    pub price: i32,
    pub user_id: Uuid,
    pub start_date: Month,
    pub end_date: Option<Month>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    /// Whether the subscription is billed for month `m`
    pub fn is_active_in(&self, m: Month) -> bool {
        self.start_date <= m && self.end_date.map_or(true, |end| end >= m)
    }

    /// Exact-match user/service filter shared by list and summary
    pub fn matches(&self, user_id: Option<Uuid>, service_name: Option<&str>) -> bool {
        user_id.map_or(true, |uid| self.user_id == uid)
            && service_name.map_or(true, |name| self.service_name == name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    pub user_id: Option<Uuid>,
    pub service_name: Option<String>,
    pub page: Pagination,
}

/// Summary request as received; both bounds are required by the service
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryFilter {
    pub user_id: Option<Uuid>,
    pub service_name: Option<String>,
    pub start: Option<Month>,
    pub end: Option<Month>,
}

/// Summary request after bound validation, handed to the repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryQuery {
    pub range: MonthRange,
    pub user_id: Option<Uuid>,
    pub service_name: Option<String>,
}
