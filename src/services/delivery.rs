use serde::Serialize;
use tracing::warn;

use crate::services::statement_calculation::Statement;

/// Structured refusal returned when a statement must not be emailed.
#[derive(Debug, Clone, Serialize)]
pub struct DeliveryHold {
    pub reason: String,
    pub owner_payout: f64,
}

/// Gate for the email collaborator. A negative payout is a successfully
/// computed result, not a calculation error, but the statement is flagged
/// for manual review instead of being mailed out.
pub fn check_email_guardrail(statement: &Statement) -> Result<(), DeliveryHold> {
    let owner_payout = statement.totals.owner_payout;
    if owner_payout < 0.0 {
        warn!(owner_payout, "Owner statement held from email delivery");
        return Err(DeliveryHold {
            reason: format!(
                "Owner payout is negative ({owner_payout:.2}) for {} to {}. Review the statement before sending.",
                statement.period_start, statement.period_end
            ),
            owner_payout,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::{Duration, NaiveDate, TimeZone, Utc};

    use super::check_email_guardrail;
    use crate::{
        config::EngineConfig,
        schemas::{
            CalculationType, Expense, ExpenseBatch, FeeSchedule, ListingInfo, PayoutPolicy,
            Reservation, ReservationStatus, StatementRequest,
        },
        services::statement_calculation::calculate_statement,
    };

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn statement_with_cost(cost_amount: f64) -> crate::services::statement_calculation::Statement {
        let check_out = date(2024, 6, 10);
        let booking = Reservation {
            id: "r-1".to_string(),
            property_id: 1,
            check_in_date: check_out - Duration::days(3),
            check_out_date: check_out,
            nights: 3,
            channel: "Direct".to_string(),
            status: ReservationStatus::Confirmed,
            base_rate: 0.0,
            cleaning_fee: 0.0,
            platform_fees: 0.0,
            tax_amount: 0.0,
            client_payout: 200.0,
            has_detailed_finance: true,
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
        };
        let cost = Expense {
            id: "c-1".to_string(),
            property_id: Some(1),
            date: date(2024, 6, 6),
            amount: cost_amount,
            description: "repair".to_string(),
            vendor: String::new(),
            category: "maintenance".to_string(),
            expense_type: String::new(),
        };
        let listing_info: HashMap<i64, ListingInfo> = [(
            1,
            ListingInfo {
                property_id: 1,
                pm_fee_percentage: Some(15.0),
                ..ListingInfo::default()
            },
        )]
        .into_iter()
        .collect();
        let request = StatementRequest {
            property_ids: vec![1],
            start_date: date(2024, 6, 4),
            end_date: date(2024, 6, 10),
            calculation_type: CalculationType::Checkout,
            fee_schedule: FeeSchedule::default(),
            payout_policy: PayoutPolicy::Unified,
        };
        calculate_statement(
            &request,
            &[booking],
            &ExpenseBatch::new(vec![cost]),
            &listing_info,
            &EngineConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn positive_payouts_pass_the_gate() {
        let statement = statement_with_cost(-20.0);
        assert!(statement.totals.owner_payout > 0.0);
        assert!(check_email_guardrail(&statement).is_ok());
    }

    #[test]
    fn negative_payouts_are_held_with_a_structured_reason() {
        let statement = statement_with_cost(-900.0);
        assert!(statement.totals.owner_payout < 0.0);

        let hold = check_email_guardrail(&statement).unwrap_err();
        assert_eq!(hold.owner_payout, statement.totals.owner_payout);
        assert!(hold.reason.contains("negative"));
        assert!(hold.reason.contains("2024-06-04"));
    }
}
