//! Pagination utilities for list queries
//!
//! Out-of-range limits are reset to the default rather than clamped to the
//! maximum: `limit = 500` behaves like an unset limit.

pub const DEFAULT_LIMIT: u64 = 20;
pub const MAX_LIMIT: i64 = 100;

/// Raw offset/limit pair as received from the caller
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pagination {
    /// `0` means unset
    pub limit: i64,
    pub offset: i64,
}

impl Pagination {
    /// Returns `(limit, offset)` ready for the query builder
    pub fn normalize(self) -> (u64, u64) {
        let limit = if self.limit <= 0 || self.limit > MAX_LIMIT {
            DEFAULT_LIMIT
        } else {
            self.limit as u64
        };
        let offset = self.offset.max(0) as u64;
        (limit, offset)
    }
}
