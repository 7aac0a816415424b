use thiserror::Error;

/// Classified failures shared by validation, service and repositories.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("duplicate: {0}")]
    Duplicate(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn invalid(detail: impl Into<String>) -> Self { Self::InvalidArgument(detail.into()) }

    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }

    /// Stable label for log fields
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::InvalidArgument(_) => "invalid_argument",
            ServiceError::NotFound(_) => "not_found",
            ServiceError::Duplicate(_) => "duplicate",
            ServiceError::Internal(_) => "internal",
        }
    }

    /// Detail message without the classification prefix
    pub fn detail(&self) -> &str {
        match self {
            ServiceError::InvalidArgument(d)
            | ServiceError::NotFound(d)
            | ServiceError::Duplicate(d)
            | ServiceError::Internal(d) => d,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ServiceError;

    #[test]
    fn detail_is_preserved_without_prefix() {
        let e = ServiceError::invalid("price must be positive integer");
        assert_eq!(e.kind(), "invalid_argument");
        assert_eq!(e.detail(), "price must be positive integer");
        assert_eq!(e.to_string(), "invalid argument: price must be positive integer");
    }

    #[test]
    fn not_found_helper_names_entity() {
        assert_eq!(ServiceError::not_found("subscription").detail(), "subscription not found");
    }
}
