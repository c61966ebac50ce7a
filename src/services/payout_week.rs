use chrono::{Datelike, Duration, NaiveDate, Utc, Weekday};
use serde::Serialize;

use crate::{
    error::{EngineError, EngineResult},
    schemas::Reservation,
};

/// A Tuesday-through-Monday settlement window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PayoutWeek {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl PayoutWeek {
    pub fn validate(&self) -> EngineResult<()> {
        if !is_valid_payout_week(self.start, self.end) {
            return Err(EngineError::InvalidPayoutWeek {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }
}

/// Locate the payout week containing `reference`: the Tuesday on or before
/// it, through the following Monday. A Sunday or Monday reference therefore
/// belongs to the week that started the previous Tuesday.
pub fn resolve_payout_week(reference: NaiveDate) -> PayoutWeek {
    let days_since_tuesday = (reference.weekday().num_days_from_monday() + 6) % 7;
    let start = reference - Duration::days(i64::from(days_since_tuesday));
    PayoutWeek {
        start,
        end: start + Duration::days(6),
    }
}

pub fn current_payout_week() -> PayoutWeek {
    resolve_payout_week(Utc::now().date_naive())
}

pub fn previous_payout_week() -> PayoutWeek {
    resolve_payout_week(Utc::now().date_naive() - Duration::days(7))
}

pub fn is_valid_payout_week(start: NaiveDate, end: NaiveDate) -> bool {
    start.weekday() == Weekday::Tue
        && end.weekday() == Weekday::Mon
        && end - start == Duration::days(6)
}

/// Inclusive on both boundaries: a check-out landing exactly on either edge
/// of the window settles in this week.
pub fn should_include_reservation_in_week(reservation: &Reservation, week: &PayoutWeek) -> bool {
    reservation.check_out_date >= week.start && reservation.check_out_date <= week.end
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, Duration, NaiveDate, Utc, Weekday};

    use super::{
        is_valid_payout_week, resolve_payout_week, should_include_reservation_in_week, PayoutWeek,
    };
    use crate::schemas::{Reservation, ReservationStatus};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn reservation_checking_out(check_out: NaiveDate) -> Reservation {
        Reservation {
            id: "r-1".to_string(),
            property_id: 1,
            check_in_date: check_out - Duration::days(3),
            check_out_date: check_out,
            nights: 3,
            channel: "Vrbo".to_string(),
            status: ReservationStatus::Confirmed,
            base_rate: 0.0,
            cleaning_fee: 0.0,
            platform_fees: 0.0,
            tax_amount: 0.0,
            client_payout: 0.0,
            has_detailed_finance: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn every_resolved_week_starts_tuesday_and_ends_the_following_monday() {
        // A full fortnight of reference dates covers every weekday twice.
        let base = date(2024, 6, 1);
        for offset in 0..14 {
            let week = resolve_payout_week(base + Duration::days(offset));
            assert_eq!(week.start.weekday(), Weekday::Tue);
            assert_eq!(week.end.weekday(), Weekday::Mon);
            assert_eq!(week.end - week.start, Duration::days(6));
        }
    }

    #[test]
    fn tuesday_reference_is_its_own_week_start() {
        // 2024-06-04 is a Tuesday.
        let week = resolve_payout_week(date(2024, 6, 4));
        assert_eq!(week.start, date(2024, 6, 4));
        assert_eq!(week.end, date(2024, 6, 10));
    }

    #[test]
    fn sunday_and_monday_fall_into_the_previous_tuesdays_week() {
        // 2024-06-09 is a Sunday, 2024-06-10 a Monday.
        assert_eq!(resolve_payout_week(date(2024, 6, 9)).start, date(2024, 6, 4));
        assert_eq!(
            resolve_payout_week(date(2024, 6, 10)).start,
            date(2024, 6, 4)
        );
        // Wednesday steps back to this week's Tuesday.
        assert_eq!(resolve_payout_week(date(2024, 6, 5)).start, date(2024, 6, 4));
    }

    #[test]
    fn validity_breaks_when_either_boundary_shifts_by_a_day() {
        let start = date(2024, 6, 4);
        let end = date(2024, 6, 10);
        assert!(is_valid_payout_week(start, end));
        assert!(!is_valid_payout_week(start + Duration::days(1), end));
        assert!(!is_valid_payout_week(start, end + Duration::days(1)));
        assert!(!is_valid_payout_week(start - Duration::days(1), end));

        let week = PayoutWeek {
            start,
            end: end + Duration::days(1),
        };
        assert!(week.validate().is_err());
    }

    #[test]
    fn inclusion_is_inclusive_on_both_boundaries() {
        let week = PayoutWeek {
            start: date(2024, 6, 4),
            end: date(2024, 6, 10),
        };
        assert!(should_include_reservation_in_week(
            &reservation_checking_out(week.start),
            &week
        ));
        assert!(should_include_reservation_in_week(
            &reservation_checking_out(week.end),
            &week
        ));
        assert!(!should_include_reservation_in_week(
            &reservation_checking_out(week.start - Duration::days(1)),
            &week
        ));
        assert!(!should_include_reservation_in_week(
            &reservation_checking_out(week.end + Duration::days(1)),
            &week
        ));
    }
}
