use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::{
    config::EngineConfig,
    error::{EngineError, EngineResult},
    schemas::{
        validate_input, CalculationType, Expense, ExpenseBatch, FeeSchedule, ListingInfo,
        PayoutPolicy, Reservation, StatementRequest,
    },
    services::{
        duplicate_detection::DuplicateWarning,
        expense_classifier::{classify_expenses, is_upsell, ClassifiedExpenses},
        payout_week::{is_valid_payout_week, PayoutWeek},
        reservation_filter::filter_reservations,
        reservation_rules::{apply_reservation_rules, AdjustedReservation},
    },
};

#[derive(Debug, Clone, Serialize)]
pub struct StatementTotals {
    pub total_revenue: f64,
    pub total_expenses: f64,
    pub total_upsells: f64,
    pub pm_commission: f64,
    /// Effective average commission percentage across the statement.
    pub pm_percentage: f64,
    pub tech_fees: f64,
    pub insurance_fees: f64,
    pub total_cleaning_fee: f64,
    pub owner_payout: f64,
    pub property_count: usize,
}

/// Informational: pass-through cleanings billed to guests should line up
/// one-to-one with cleaning costs recorded for the same properties.
#[derive(Debug, Clone, Serialize)]
pub struct CleaningMismatchWarning {
    pub reservation_cleanings: usize,
    pub expense_cleanings: usize,
    /// `reservation_cleanings - expense_cleanings`.
    pub difference: i64,
}

/// The computed statement. Assembled once per calculation request and never
/// mutated; a recalculation replaces the whole object.
#[derive(Debug, Clone, Serialize)]
pub struct Statement {
    pub title: String,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub calculation_type: CalculationType,
    pub reservations: Vec<AdjustedReservation>,
    pub expenses: Vec<Expense>,
    pub ll_cover_expenses: Vec<Expense>,
    pub duplicate_warnings: Vec<DuplicateWarning>,
    pub cleaning_mismatch: Option<CleaningMismatchWarning>,
    /// Per-source audit rows, bucketed for rendering and reconciliation.
    pub line_items: Vec<Value>,
    pub totals: StatementTotals,
}

/// Compute one owner statement from an in-memory input snapshot.
///
/// Pure and synchronous: all fetching happens before this call, all
/// delivery after it. Intermediate sums stay unrounded; rounding to cents
/// happens once, at assembly.
pub fn calculate_statement(
    request: &StatementRequest,
    reservations: &[Reservation],
    expense_batch: &ExpenseBatch,
    listing_info: &HashMap<i64, ListingInfo>,
    config: &EngineConfig,
) -> EngineResult<Statement> {
    validate_input(request)?;
    request.check_period()?;

    // Every requested property must carry a rule profile. Optional fields
    // degrade to defaults; a missing profile fails loudly with the id.
    for property_id in &request.property_ids {
        let Some(profile) = listing_info.get(property_id) else {
            return Err(EngineError::MissingListingProfile {
                property_id: *property_id,
            });
        };
        validate_input(profile)?;
    }

    let selected = filter_reservations(
        reservations,
        &request.property_ids,
        request.start_date,
        request.end_date,
        request.calculation_type,
    );
    for reservation in &selected {
        reservation.check_dates()?;
    }

    let classified = classify_expenses(
        &expense_batch.expenses,
        &request.property_ids,
        request.start_date,
        request.end_date,
        listing_info,
        &config.default_expense_category,
    );

    let mut adjusted: Vec<AdjustedReservation> = Vec::with_capacity(selected.len());
    for reservation in &selected {
        let listing = listing_info
            .get(&reservation.property_id)
            .ok_or(EngineError::MissingListingProfile {
                property_id: reservation.property_id,
            })?;
        adjusted.push(apply_reservation_rules(
            reservation,
            listing,
            request.end_date,
            request.calculation_type,
            config,
        ));
    }

    let mut total_revenue = 0.0;
    let mut pm_commission = 0.0;
    let mut total_cleaning_fee = 0.0;
    let mut gross_payout_sum = 0.0;
    for item in &adjusted {
        if !item.excluded_from_revenue {
            total_revenue += item.client_revenue;
        }
        pm_commission += item.pm_commission;
        total_cleaning_fee += item.cleaning_fee_actual;
        gross_payout_sum += item.gross_payout;
    }

    let pm_percentage = if total_revenue == 0.0 {
        config.default_pm_fee_percentage
    } else {
        pm_commission / total_revenue * 100.0
    };

    let property_count = request.property_ids.len();
    let tech_fees = request
        .fee_schedule
        .tech_fees(property_count, config.weeks_per_month);
    let insurance_fees = request
        .fee_schedule
        .insurance_fees(property_count, config.weeks_per_month);

    let mut owner_payout = gross_payout_sum + classified.total_upsells - classified.total_expenses;
    if request.payout_policy == PayoutPolicy::LegacyWeekly {
        owner_payout = owner_payout.max(0.0);
    }

    let cleaning_mismatch = cleaning_mismatch_warning(&adjusted, &classified);
    if let Some(mismatch) = &cleaning_mismatch {
        warn!(
            reservation_cleanings = mismatch.reservation_cleanings,
            expense_cleanings = mismatch.expense_cleanings,
            "Cleaning count mismatch for pass-through properties"
        );
    }

    let totals = StatementTotals {
        total_revenue: round2(total_revenue),
        total_expenses: round2(classified.total_expenses),
        total_upsells: round2(classified.total_upsells),
        pm_commission: round2(pm_commission),
        pm_percentage: round2(pm_percentage),
        tech_fees: round2(tech_fees),
        insurance_fees: round2(insurance_fees),
        total_cleaning_fee: round2(total_cleaning_fee),
        owner_payout: round2(owner_payout),
        property_count,
    };

    info!(
        reservations = adjusted.len(),
        expenses = classified.filtered_expenses.len(),
        owner_payout = totals.owner_payout,
        calculation_type = request.calculation_type.as_str(),
        "Statement calculated"
    );

    let line_items = build_line_items(&adjusted, &classified);
    Ok(Statement {
        title: statement_title(request.start_date, request.end_date),
        period_start: request.start_date,
        period_end: request.end_date,
        calculation_type: request.calculation_type,
        reservations: adjusted,
        expenses: classified.filtered_expenses,
        ll_cover_expenses: classified.ll_cover_expenses,
        duplicate_warnings: expense_batch.duplicate_warnings.clone(),
        cleaning_mismatch,
        line_items,
        totals,
    })
}

/// Legacy weekly-rules entry point: a validated Tuesday-to-Monday window,
/// checkout membership, and the floor-at-zero payout formulation.
pub fn calculate_weekly_statement(
    week: &PayoutWeek,
    property_ids: Vec<i64>,
    fee_schedule: FeeSchedule,
    reservations: &[Reservation],
    expense_batch: &ExpenseBatch,
    listing_info: &HashMap<i64, ListingInfo>,
    config: &EngineConfig,
) -> EngineResult<Statement> {
    week.validate()?;
    let request = StatementRequest {
        property_ids,
        start_date: week.start,
        end_date: week.end,
        calculation_type: CalculationType::Checkout,
        fee_schedule,
        payout_policy: PayoutPolicy::LegacyWeekly,
    };
    calculate_statement(&request, reservations, expense_batch, listing_info, config)
}

fn cleaning_mismatch_warning(
    adjusted: &[AdjustedReservation],
    classified: &ClassifiedExpenses,
) -> Option<CleaningMismatchWarning> {
    let reservation_cleanings = adjusted
        .iter()
        .filter(|item| item.cleaning_fee_actual > 0.0)
        .count();
    let expense_cleanings = classified.pass_through_cleaning.len();
    if reservation_cleanings == expense_cleanings {
        return None;
    }
    Some(CleaningMismatchWarning {
        reservation_cleanings,
        expense_cleanings,
        difference: reservation_cleanings as i64 - expense_cleanings as i64,
    })
}

fn build_line_items(
    adjusted: &[AdjustedReservation],
    classified: &ClassifiedExpenses,
) -> Vec<Value> {
    let mut line_items: Vec<Value> = Vec::new();

    for item in adjusted {
        let reservation = &item.reservation;
        if !item.excluded_from_revenue && item.client_revenue != 0.0 {
            line_items.push(json!({
                "bucket": "gross_revenue",
                "source": "reservations",
                "source_id": reservation.id,
                "from": reservation.check_in_date,
                "to": reservation.check_out_date,
                "prorated": item.is_prorated,
                "amount": round2(item.client_revenue),
            }));
        }
        if item.pm_commission != 0.0 || item.commission_waived {
            line_items.push(json!({
                "bucket": "pm_commission",
                "source": "reservations",
                "source_id": reservation.id,
                "rate": item.pm_fee_percentage,
                "waived": item.commission_waived,
                "amount": round2(-item.pm_commission),
            }));
        }
        if item.tax_pass_through != 0.0 {
            line_items.push(json!({
                "bucket": "tax_pass_through",
                "source": "reservations",
                "source_id": reservation.id,
                "amount": round2(item.tax_pass_through),
            }));
        }
        if item.cleaning_fee_actual != 0.0 {
            line_items.push(json!({
                "bucket": "cleaning_pass_through",
                "source": "reservations",
                "source_id": reservation.id,
                "amount": round2(-item.cleaning_fee_actual),
            }));
        }
    }

    for expense in &classified.filtered_expenses {
        let bucket = if is_upsell(expense) { "upsell" } else { "expense" };
        line_items.push(json!({
            "bucket": bucket,
            "source": "expenses",
            "source_id": expense.id,
            "kind": expense.category,
            "date": expense.date,
            "amount": round2(expense.amount),
        }));
    }

    line_items
}

fn statement_title(start: NaiveDate, end: NaiveDate) -> String {
    if is_valid_payout_week(start, end) {
        return format!("Payout week {start} to {end}");
    }
    if start.day() == 1
        && start.month() == end.month()
        && start.year() == end.year()
        && is_last_day_of_month(end)
    {
        return format!("{} {}", month_name(start.month()), start.year());
    }
    format!("{start} to {end}")
}

fn is_last_day_of_month(date: NaiveDate) -> bool {
    date.succ_opt().is_some_and(|next| next.month() != date.month())
}

fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        12 => "December",
        _ => "Unknown",
    }
}

/// Round-half-up to cents. Applied at the output boundary only, so
/// accumulation never compounds rounding error.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
