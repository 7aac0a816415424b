//! Month-range cost aggregation.
//!
//! A subscription contributes its price once for every month of the queried
//! range in which it is active, so three active months count three times.

use super::domain::Subscription;
use super::month::Month;
use crate::errors::ServiceError;

/// Inclusive `[start, end]` range of months, `start <= end`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthRange {
    start: Month,
    end: Month,
}

impl MonthRange {
    pub fn new(start: Month, end: Month) -> Result<Self, ServiceError> {
        if end < start {
            return Err(ServiceError::invalid("end must not be before start"));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> Month { self.start }

    pub fn end(&self) -> Month { self.end }

    /// Every month from `start` to `end`, one calendar month per step
    pub fn months(&self) -> Months {
        Months { next: Some(self.start), end: self.end }
    }
}

/// Calendar-month cursor produced by [`MonthRange::months`]
#[derive(Debug, Clone)]
pub struct Months {
    next: Option<Month>,
    end: Month,
}

impl Iterator for Months {
    type Item = Month;

    fn next(&mut self) -> Option<Month> {
        let current = self.next.filter(|m| *m <= self.end)?;
        self.next = current.succ();
        Some(current)
    }
}

/// Sum `price` over every (month, subscription) pair where the subscription is
/// active in that month. Callers apply the user/service filters beforehand.
pub fn total_cost(range: &MonthRange, subscriptions: &[Subscription]) -> i64 {
    let mut total: i64 = 0;
    for month in range.months() {
        for sub in subscriptions.iter().filter(|s| s.is_active_in(month)) {
            total = total.saturating_add(i64::from(sub.price));
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn m(text: &str) -> Month {
        Month::parse(text).unwrap()
    }

    fn sub(price: i32, start: &str, end: Option<&str>) -> Subscription {
        let now = Utc::now();
        Subscription {
            id: Uuid::new_v4(),
            service_name: "Yandex Plus".into(),
            price,
            user_id: Uuid::new_v4(),
            start_date: m(start),
            end_date: end.map(m),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn months_are_inclusive_and_cross_years() {
        let range = MonthRange::new(m("11-2024"), m("02-2025")).unwrap();
        let got: Vec<String> = range.months().map(|x| x.to_string()).collect();
        assert_eq!(got, ["11-2024", "12-2024", "01-2025", "02-2025"]);
    }

    #[test]
    fn single_month_range_yields_one_month() {
        let range = MonthRange::new(m("07-2025"), m("07-2025")).unwrap();
        assert_eq!(range.months().count(), 1);
    }

    #[test]
    fn end_before_start_is_rejected() {
        let err = MonthRange::new(m("12-2025"), m("07-2025")).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidArgument(_)));
    }

    #[test]
    fn price_counts_once_per_active_month() {
        let subs = [sub(100, "01-2025", Some("03-2025"))];
        let range = MonthRange::new(m("01-2025"), m("03-2025")).unwrap();
        assert_eq!(total_cost(&range, &subs), 300);
    }

    #[test]
    fn range_after_end_date_totals_zero() {
        let subs = [sub(100, "01-2025", Some("03-2025"))];
        let range = MonthRange::new(m("04-2025"), m("06-2025")).unwrap();
        assert_eq!(total_cost(&range, &subs), 0);
    }

    #[test]
    fn open_ended_subscription_counts_every_month_from_start() {
        let subs = [sub(50, "03-2025", None)];
        let range = MonthRange::new(m("01-2025"), m("06-2025")).unwrap();
        assert_eq!(total_cost(&range, &subs), 50 * 4);
    }

    #[test]
    fn partial_overlap_and_multiple_subscriptions() {
        let subs = [
            sub(100, "01-2025", Some("03-2025")),
            sub(10, "03-2025", Some("08-2025")),
            sub(1, "09-2025", None),
        ];
        let range = MonthRange::new(m("02-2025"), m("05-2025")).unwrap();
        // 100 * (02, 03) + 10 * (03, 04, 05)
        assert_eq!(total_cost(&range, &subs), 230);
    }

    #[test]
    fn no_subscriptions_totals_zero() {
        let range = MonthRange::new(m("01-2025"), m("12-2025")).unwrap();
        assert_eq!(total_cost(&range, &[]), 0);
    }
}
