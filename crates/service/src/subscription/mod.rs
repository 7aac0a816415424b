//! Subscription records: month codec, validation, aggregation and persistence.

pub mod domain;
pub mod month;
pub mod repo;
pub mod repository;
pub mod service;
pub mod summary;
pub mod validation;

pub use domain::{ListFilter, Subscription, SubscriptionFields, SubscriptionInput, SummaryFilter, SummaryQuery};
pub use month::{format_month, Month};
pub use repository::SubscriptionRepository;
pub use service::SubscriptionService;
