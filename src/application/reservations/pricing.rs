//! Price calculation
//!
//! Rentals are billed per started day: 25 hours cost two days.

use chrono::{DateTime, Duration, Utc};

use crate::domain::ValidationError;

/// Number of started 24h periods in `[start, end)`. Any remainder, down to
/// a nanosecond, counts as a full day.
pub fn billable_days(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<i64, ValidationError> {
    let span = end - start;
    if span <= Duration::zero() {
        return Err(ValidationError::InvalidDuration);
    }
    let whole = span.num_days();
    let covered = Duration::try_days(whole).ok_or(ValidationError::InvalidDuration)?;
    Ok(if span > covered { whole + 1 } else { whole })
}

pub fn compute_price(
    daily_rate: f64,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<f64, ValidationError> {
    if !daily_rate.is_finite() || daily_rate < 0.0 {
        return Err(ValidationError::InvalidRate(daily_rate));
    }
    let days = billable_days(start, end)?;
    Ok(daily_rate * days as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn jan(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 1, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn partial_day_is_billed_in_full() {
        // 25 hours → 2 days
        assert_eq!(compute_price(50.0, jan(1, 9), jan(2, 10)).unwrap(), 100.0);
    }

    #[test]
    fn exact_days_are_not_rounded_up() {
        // 48 hours → 2 days
        assert_eq!(compute_price(50.0, jan(1, 9), jan(3, 9)).unwrap(), 100.0);
    }

    #[test]
    fn one_second_is_one_day() {
        let start = jan(1, 9);
        assert_eq!(billable_days(start, start + Duration::seconds(1)).unwrap(), 1);
    }

    #[test]
    fn sub_second_remainders_are_billed() {
        let start = jan(1, 9);
        let just_over = start + Duration::days(1) + Duration::milliseconds(1);
        assert_eq!(billable_days(start, just_over).unwrap(), 2);
        assert_eq!(compute_price(50.0, start, just_over).unwrap(), 100.0);

        let half_second = start + Duration::milliseconds(500);
        assert_eq!(billable_days(start, half_second).unwrap(), 1);
        assert_eq!(compute_price(50.0, start, half_second).unwrap(), 50.0);

        assert_eq!(billable_days(start, start + Duration::nanoseconds(1)).unwrap(), 1);
    }

    #[test]
    fn zero_or_negative_duration_fails() {
        assert_eq!(
            compute_price(50.0, jan(2, 9), jan(2, 9)),
            Err(ValidationError::InvalidDuration)
        );
        assert_eq!(
            compute_price(50.0, jan(3, 9), jan(2, 9)),
            Err(ValidationError::InvalidDuration)
        );
    }

    #[test]
    fn negative_or_nan_rate_fails() {
        assert!(matches!(
            compute_price(-1.0, jan(1, 9), jan(2, 9)),
            Err(ValidationError::InvalidRate(_))
        ));
        assert!(matches!(
            compute_price(f64::NAN, jan(1, 9), jan(2, 9)),
            Err(ValidationError::InvalidRate(_))
        ));
    }

    #[test]
    fn free_car_costs_nothing() {
        assert_eq!(compute_price(0.0, jan(1, 9), jan(4, 9)).unwrap(), 0.0);
    }
}
