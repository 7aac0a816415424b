//! Service layer for subscription records.
//! - Validates raw input into domain records before any persistence call.
//! - Defines the repository contract and ships SeaORM and in-memory implementations.
//! - Classifies every failure into `ServiceError` for the transport layer.

pub mod errors;
pub mod pagination;
pub mod subscription;
#[cfg(test)]
pub mod test_support;

pub use errors::ServiceError;
pub use subscription::SubscriptionService;
