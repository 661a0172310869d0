//! Trip date-range validation.

use chrono::NaiveDate;
use thiserror::Error;

/// Distance threshold (km) above which a same-day trip is refused.
const DEFAULT_SAME_DAY_MAX_KM: f64 = 350.0;

/// Tunable booking rules.
///
/// The same-day threshold is a business constant, kept here rather than
/// inlined at the check site so it can be adjusted per deployment.
#[derive(Debug, Clone)]
pub struct TripRules {
    /// Maximum route distance allowed when start and end date are equal.
    pub same_day_max_km: f64,
}

impl Default for TripRules {
    fn default() -> Self {
        Self {
            same_day_max_km: DEFAULT_SAME_DAY_MAX_KM,
        }
    }
}

/// Why a requested date range was rejected. Display text is user-facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DateRangeError {
    #[error("start date cannot be in the past")]
    PastStartDate,
    #[error("end date cannot be before the start date")]
    EndBeforeStart,
    #[error("same-day trips are not available for routes this long")]
    SameDayTooFar,
    #[error("compute the route before booking a same-day trip")]
    RouteNotComputed,
}

impl TripRules {
    /// Applies the rules in order; the first violated rule is returned.
    ///
    /// `distance_km` of zero means no route has been computed yet, which
    /// only blocks same-day bookings (eligibility cannot be confirmed).
    pub fn validate(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        distance_km: f64,
        today: NaiveDate,
    ) -> Result<(), DateRangeError> {
        if start < today {
            return Err(DateRangeError::PastStartDate);
        }
        if end < start {
            return Err(DateRangeError::EndBeforeStart);
        }
        if end == start {
            if distance_km >= self.same_day_max_km {
                return Err(DateRangeError::SameDayTooFar);
            }
            if distance_km == 0.0 {
                return Err(DateRangeError::RouteNotComputed);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    const TODAY: (i32, u32, u32) = (2024, 6, 10);

    fn today() -> NaiveDate {
        date(TODAY.0, TODAY.1, TODAY.2)
    }

    #[test]
    fn test_past_start_rejected() {
        let rules = TripRules::default();
        let result = rules.validate(date(2024, 6, 9), date(2024, 6, 12), 100.0, today());
        assert_eq!(result, Err(DateRangeError::PastStartDate));
    }

    #[test]
    fn test_end_before_start_rejected() {
        let rules = TripRules::default();
        let result = rules.validate(date(2024, 6, 12), date(2024, 6, 11), 100.0, today());
        assert_eq!(result, Err(DateRangeError::EndBeforeStart));
    }

    #[test]
    fn test_same_day_under_threshold_allowed() {
        let rules = TripRules::default();
        let result = rules.validate(today(), today(), 349.99, today());
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn test_same_day_at_threshold_rejected() {
        let rules = TripRules::default();
        let result = rules.validate(today(), today(), 350.0, today());
        assert_eq!(result, Err(DateRangeError::SameDayTooFar));
    }

    #[test]
    fn test_same_day_without_route_rejected() {
        let rules = TripRules::default();
        let result = rules.validate(today(), today(), 0.0, today());
        assert_eq!(result, Err(DateRangeError::RouteNotComputed));
    }

    #[test]
    fn test_multi_day_without_route_allowed() {
        // Distance only gates same-day bookings.
        let rules = TripRules::default();
        let result = rules.validate(today(), date(2024, 6, 12), 0.0, today());
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn test_threshold_is_tunable() {
        let rules = TripRules {
            same_day_max_km: 100.0,
        };
        let result = rules.validate(today(), today(), 120.0, today());
        assert_eq!(result, Err(DateRangeError::SameDayTooFar));
    }
}
