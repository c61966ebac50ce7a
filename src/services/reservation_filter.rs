use chrono::NaiveDate;

use crate::schemas::{CalculationType, Reservation};

/// Select the reservations that settle in this statement, sorted by
/// check-in date (stable, so equal check-ins keep their input order).
///
/// Checkout mode keeps reservations whose check-out lands inside the window,
/// inclusive on both boundaries. Calendar mode trusts the upstream proration
/// step, which already constrained membership to overlapping stays.
pub fn filter_reservations(
    reservations: &[Reservation],
    property_ids: &[i64],
    period_start: NaiveDate,
    period_end: NaiveDate,
    calculation_type: CalculationType,
) -> Vec<Reservation> {
    let mut selected: Vec<Reservation> = reservations
        .iter()
        .filter(|reservation| property_ids.contains(&reservation.property_id))
        .filter(|reservation| match calculation_type {
            CalculationType::Calendar => true,
            CalculationType::Checkout => {
                reservation.check_out_date >= period_start
                    && reservation.check_out_date <= period_end
            }
        })
        .filter(|reservation| reservation.status.is_reportable())
        .cloned()
        .collect();
    selected.sort_by_key(|reservation| reservation.check_in_date);
    selected
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate, Utc};

    use super::filter_reservations;
    use crate::schemas::{CalculationType, Reservation, ReservationStatus};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn reservation(
        id: &str,
        property_id: i64,
        check_in: NaiveDate,
        nights: i64,
        status: ReservationStatus,
    ) -> Reservation {
        Reservation {
            id: id.to_string(),
            property_id,
            check_in_date: check_in,
            check_out_date: check_in + Duration::days(nights),
            nights,
            channel: "Direct".to_string(),
            status,
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
    fn checkout_mode_is_inclusive_on_both_period_boundaries() {
        let start = date(2024, 6, 4);
        let end = date(2024, 6, 10);
        let input = vec![
            // Checks out exactly on period start.
            reservation("on-start", 1, start - Duration::days(2), 2, ReservationStatus::Confirmed),
            // Checks out exactly on period end.
            reservation("on-end", 1, end - Duration::days(3), 3, ReservationStatus::Confirmed),
            // One day past the end.
            reservation("past-end", 1, end - Duration::days(2), 3, ReservationStatus::Confirmed),
        ];

        let kept = filter_reservations(&input, &[1], start, end, CalculationType::Checkout);
        let ids: Vec<&str> = kept.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["on-start", "on-end"]);
    }

    #[test]
    fn only_confirmed_reservations_survive() {
        let start = date(2024, 6, 4);
        let end = date(2024, 6, 10);
        let input = vec![
            reservation("confirmed", 1, start, 3, ReservationStatus::Confirmed),
            reservation("cancelled", 1, start, 3, ReservationStatus::Cancelled),
            reservation("inquiry", 1, start, 3, ReservationStatus::Inquiry),
            reservation("completed", 1, start, 3, ReservationStatus::Completed),
        ];

        let kept = filter_reservations(&input, &[1], start, end, CalculationType::Checkout);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, "confirmed");
    }

    #[test]
    fn other_properties_are_excluded() {
        let start = date(2024, 6, 4);
        let end = date(2024, 6, 10);
        let input = vec![
            reservation("mine", 1, start, 2, ReservationStatus::Confirmed),
            reservation("not-mine", 2, start, 2, ReservationStatus::Confirmed),
        ];

        let kept = filter_reservations(&input, &[1], start, end, CalculationType::Checkout);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, "mine");
    }

    #[test]
    fn calendar_mode_keeps_upstream_membership_and_sorts_by_check_in() {
        let start = date(2024, 6, 1);
        let end = date(2024, 6, 30);
        let input = vec![
            reservation("later", 1, date(2024, 6, 20), 30, ReservationStatus::Confirmed),
            reservation("earlier", 1, date(2024, 6, 2), 3, ReservationStatus::Confirmed),
            // Same check-in as "earlier": stable sort keeps input order.
            reservation("earlier-tie", 1, date(2024, 6, 2), 4, ReservationStatus::Confirmed),
        ];

        let kept = filter_reservations(&input, &[1], start, end, CalculationType::Calendar);
        let ids: Vec<&str> = kept.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["earlier", "earlier-tie", "later"]);
    }
}
