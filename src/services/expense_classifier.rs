use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::schemas::{Expense, ListingInfo};

/// Output of the single classification pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ClassifiedExpenses {
    pub filtered_expenses: Vec<Expense>,
    /// "LL Cover" entries, excluded from standard totals.
    pub ll_cover_expenses: Vec<Expense>,
    /// Cleaning/supplies costs recovered from guests via fee pass-through.
    /// Excluded from totals but kept for the cleaning-count check.
    pub pass_through_cleaning: Vec<Expense>,
    pub total_expenses: f64,
    pub total_upsells: f64,
}

/// Route every expense in one pass: property gate, period gate, LL-Cover
/// detour, pass-through cleaning exclusion, then upsell-or-cost with running
/// totals. Matching is case-insensitive substring dispatch on the free-text
/// fields, kept loose on purpose to stay faithful to legacy data.
pub fn classify_expenses(
    expenses: &[Expense],
    property_ids: &[i64],
    period_start: NaiveDate,
    period_end: NaiveDate,
    listing_info: &HashMap<i64, ListingInfo>,
    default_category: &str,
) -> ClassifiedExpenses {
    let mut out = ClassifiedExpenses::default();

    for raw in expenses {
        // Unassigned (shared) costs always pass the property gate.
        if let Some(property_id) = raw.property_id {
            if !property_ids.contains(&property_id) {
                continue;
            }
        }
        if raw.date < period_start || raw.date > period_end {
            continue;
        }

        let mut expense = raw.clone();
        if expense.category.trim().is_empty() {
            expense.category =
                auto_categorize(&expense.vendor, &expense.description, expense.amount)
                    .map(ToOwned::to_owned)
                    .unwrap_or_else(|| default_category.to_string());
        }

        if is_ll_cover(&expense) {
            out.ll_cover_expenses.push(expense);
            continue;
        }

        // Cleaning and supplies for a pass-through property are recovered
        // directly from guests, never charged to the owner.
        if is_cleaning_or_supplies(&expense) && has_cleaning_pass_through(&expense, listing_info) {
            out.pass_through_cleaning.push(expense);
            continue;
        }

        if is_upsell(&expense) {
            out.total_upsells += expense.amount;
        } else {
            out.total_expenses += expense.amount.abs();
        }
        out.filtered_expenses.push(expense);
    }

    out
}

/// An upsell is any positive amount, or anything explicitly typed as one.
pub fn is_upsell(expense: &Expense) -> bool {
    expense.amount > 0.0
        || expense.expense_type.trim().eq_ignore_ascii_case("upsell")
        || expense.category.trim().eq_ignore_ascii_case("upsell")
}

fn is_ll_cover(expense: &Expense) -> bool {
    let text = format!(
        "{} {} {}",
        expense.description, expense.vendor, expense.category
    )
    .to_lowercase();
    text.contains("ll cover") || text.contains("llcover")
}

fn is_cleaning_or_supplies(expense: &Expense) -> bool {
    let text = format!(
        "{} {} {}",
        expense.category, expense.expense_type, expense.description
    )
    .to_lowercase();
    contains_any(&text, &["cleaning", "supplies"])
}

fn has_cleaning_pass_through(expense: &Expense, listing_info: &HashMap<i64, ListingInfo>) -> bool {
    expense
        .property_id
        .and_then(|property_id| listing_info.get(&property_id))
        .is_some_and(|info| info.cleaning_fee_pass_through)
}

/// Auto-categorize an expense based on vendor/description keyword matching,
/// used to fill entries that arrive with no category at all.
///
/// Returns `None` if no rule matches.
pub fn auto_categorize(vendor: &str, description: &str, amount: f64) -> Option<&'static str> {
    let text = format!("{} {}", vendor, description).to_lowercase();

    if contains_any(
        &text,
        &["cleaning", "housekeeping", "maid", "laundry", "turnover"],
    ) {
        return Some("cleaning");
    }

    if contains_any(
        &text,
        &[
            "supplies", "amenities", "toiletries", "paper", "soap", "shampoo", "towel", "linens",
        ],
    ) {
        return Some("supplies");
    }

    if contains_any(
        &text,
        &[
            "repair",
            "maintenance",
            "plumber",
            "plumbing",
            "electrician",
            "hvac",
            "handyman",
            "paint",
            "pest",
        ],
    ) {
        return Some("maintenance");
    }

    if contains_any(
        &text,
        &[
            "electric",
            "water",
            "gas",
            "internet",
            "wifi",
            "cable",
            "utility",
            "utilities",
            "trash",
        ],
    ) {
        return Some("utilities");
    }

    if contains_any(&text, &["insurance", "premium", "policy"]) {
        return Some("insurance");
    }

    if contains_any(
        &text,
        &[
            "upsell",
            "early check-in",
            "late checkout",
            "late check-out",
            "pet fee",
            "extra guest",
            "mid-stay",
        ],
    ) {
        return Some("upsell");
    }

    // A bare positive amount with no other signal is treated as a credit.
    if amount > 0.0 && vendor.is_empty() && description.is_empty() {
        return Some("upsell");
    }

    None
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| text.contains(kw))
}
