use chrono::NaiveDate;
use serde::Serialize;

use crate::{
    config::EngineConfig,
    schemas::{CalculationType, ListingInfo, Reservation},
};

/// A reservation annotated with every financial adjustment the rule
/// pipeline applied. The source record is carried along untouched.
#[derive(Debug, Clone, Serialize)]
pub struct AdjustedReservation {
    pub reservation: Reservation,
    /// Owner-facing revenue after the co-hosting split and proration.
    pub client_revenue: f64,
    pub original_revenue: f64,
    pub is_prorated: bool,
    pub proration_note: Option<String>,
    pub pm_fee_percentage: f64,
    /// Amount actually deducted. Zero while a waiver is active, even though
    /// the rate above is still reported on the statement.
    pub pm_commission: f64,
    pub commission_waived: bool,
    /// Tax-responsibility amount added to the owner payout.
    pub tax_pass_through: f64,
    /// Reverse-engineered owner-facing cleaning cost (pass-through only).
    pub cleaning_fee_actual: f64,
    /// Airbnb pays the owner directly for co-hosted listings, so this
    /// revenue stays out of statement totals.
    pub excluded_from_revenue: bool,
    pub gross_payout: f64,
}

/// Run the per-reservation rule pipeline. Order matters: later rules
/// consume earlier results (proration applies to the co-hosted split, the
/// cleaning derivation uses the effective commission rate, and the payout
/// formula consumes all of them).
pub fn apply_reservation_rules(
    reservation: &Reservation,
    listing: &ListingInfo,
    period_end: NaiveDate,
    calculation_type: CalculationType,
    config: &EngineConfig,
) -> AdjustedReservation {
    let original_revenue = reservation.client_payout;

    let mut client_revenue = co_hosted_revenue(original_revenue, listing);

    let (prorated, is_prorated, proration_note) =
        prorated_revenue(client_revenue, reservation, listing, config);
    client_revenue = prorated;

    let pm_fee_percentage = effective_fee_percentage(reservation, listing, config);
    let commission_waived = is_commission_waived(listing, period_end);
    let pm_commission = if commission_waived {
        0.0
    } else {
        client_revenue * pm_fee_percentage / 100.0
    };

    let tax_pass_through = tax_pass_through_amount(reservation, listing);

    // In calendar mode a check-out past the statement end means the cleaning
    // hasn't happened inside this period yet; the deduction waits.
    let cleaning_deferred = calculation_type == CalculationType::Calendar
        && reservation.check_out_date > period_end;
    let cleaning_fee_actual =
        if listing.cleaning_fee_pass_through && reservation.cleaning_fee > 0.0 && !cleaning_deferred
        {
            reverse_cleaning_fee(reservation.cleaning_fee, pm_fee_percentage)
        } else {
            0.0
        };

    // Co-hosted-on-Airbnb: the platform pays the owner directly, so only the
    // PM's cut (and any cleaning recovery) flows through this statement.
    let excluded_from_revenue = reservation.is_airbnb() && listing.co_host_on_airbnb;
    let gross_payout = if excluded_from_revenue {
        -pm_commission - cleaning_fee_actual
    } else {
        client_revenue - pm_commission + tax_pass_through - cleaning_fee_actual
    };

    AdjustedReservation {
        reservation: reservation.clone(),
        client_revenue,
        original_revenue,
        is_prorated,
        proration_note,
        pm_fee_percentage,
        pm_commission,
        commission_waived,
        tax_pass_through,
        cleaning_fee_actual,
        excluded_from_revenue,
        gross_payout,
    }
}

fn co_hosted_revenue(gross: f64, listing: &ListingInfo) -> f64 {
    if !listing.is_co_hosted {
        return gross;
    }
    let mut revenue = gross;
    if let Some(percentage) = listing.co_host_percentage {
        revenue = gross * percentage / 100.0;
    }
    if let Some(fixed_fee) = listing.co_host_fixed_fee {
        revenue -= fixed_fee;
    }
    revenue.max(0.0)
}

fn prorated_revenue(
    gross: f64,
    reservation: &Reservation,
    listing: &ListingInfo,
    config: &EngineConfig,
) -> (f64, bool, Option<String>) {
    if !listing.proration_enabled {
        return (gross, false, None);
    }
    let min_nights = listing
        .min_nights_for_proration
        .unwrap_or(config.default_min_nights_for_proration);
    if reservation.nights < min_nights {
        return (gross, false, None);
    }
    let Some(percentage) = listing.proration_percentage else {
        return (gross, false, None);
    };
    let mut revenue = gross * percentage / 100.0;
    if let Some(cap) = listing.max_prorated_amount {
        revenue = revenue.min(cap);
    }
    let note = format!(
        "{}-night stay prorated at {}% of gross",
        reservation.nights, percentage
    );
    (revenue, true, Some(note))
}

/// Resolve the commission rate for this reservation: the configured
/// percentage (or the owner default), unless a future fee schedule is in
/// force and the booking was created on or after its start date.
pub fn effective_fee_percentage(
    reservation: &Reservation,
    listing: &ListingInfo,
    config: &EngineConfig,
) -> f64 {
    let base = listing
        .pm_fee_percentage
        .unwrap_or(config.default_pm_fee_percentage);
    if !listing.new_fee_schedule {
        return base;
    }
    match (listing.new_fee_percentage, listing.new_fee_start_date) {
        (Some(new_percentage), Some(start_date))
            if reservation.created_at.date_naive() >= start_date =>
        {
            new_percentage
        }
        _ => base,
    }
}

/// A waiver with no expiry runs indefinitely. The expiry date is compared
/// at end-of-day: a statement ending on the expiry date itself is waived.
pub fn is_commission_waived(listing: &ListingInfo, period_end: NaiveDate) -> bool {
    if !listing.waive_commission {
        return false;
    }
    match listing.waive_commission_until {
        None => true,
        Some(until) => period_end <= until,
    }
}

fn tax_pass_through_amount(reservation: &Reservation, listing: &ListingInfo) -> f64 {
    if listing.disregard_tax {
        return 0.0;
    }
    // Airbnb typically remits occupancy tax itself; only pass it to the
    // owner when the property explicitly opted in.
    if reservation.is_airbnb() && !listing.airbnb_pass_through_tax {
        return 0.0;
    }
    reservation.tax_amount
}

/// Back the commission markup out of the guest-paid fee, then round up to
/// the nearest $5 to get the owner-facing cleaning cost.
pub fn reverse_cleaning_fee(guest_paid_fee: f64, pm_fee_percentage: f64) -> f64 {
    ((guest_paid_fee / (1.0 + pm_fee_percentage / 100.0)) / 5.0).ceil() * 5.0
}
