use uuid::Uuid;

use super::domain::{SubscriptionFields, SubscriptionInput};
use super::month::Month;
use crate::errors::ServiceError;

pub const MIN_SERVICE_NAME_LEN: usize = 3;

/// Turn a raw payload into validated fields. Checks run in order and stop at
/// the first failure; every failure is `InvalidArgument`.
pub fn validate_input(input: &SubscriptionInput) -> Result<SubscriptionFields, ServiceError> {
    let service_name = input.service_name.trim();
    // 按 UTF-8 字节计长度
    if service_name.len() < MIN_SERVICE_NAME_LEN {
        return Err(ServiceError::invalid("service_name must be at least 3 characters"));
    }

    if input.price <= 0 {
        return Err(ServiceError::invalid("price must be positive integer"));
    }
    let price = i32::try_from(input.price)
        .map_err(|_| ServiceError::invalid("price is out of range"))?;

    let user_id = Uuid::parse_str(&input.user_id)
        .map_err(|_| ServiceError::invalid("invalid user_id"))?;
    if user_id.is_nil() {
        return Err(ServiceError::invalid("user_id is required"));
    }

    let start_date = Month::parse(&input.start_date)?;

    // 空白的 end_date 视为未设置
    let end_date = match input.end_date.as_deref() {
        Some(raw) if !raw.trim().is_empty() => Some(Month::parse(raw)?),
        _ => None,
    };

    if let Some(end) = end_date {
        if end < start_date {
            return Err(ServiceError::invalid("end_date must not be before start_date"));
        }
    }

    Ok(SubscriptionFields {
        service_name: service_name.to_string(),
        price,
        user_id,
        start_date,
        end_date,
    })
}
