pub mod delivery;
pub mod duplicate_detection;
pub mod expense_classifier;
pub mod payout_week;
pub mod reservation_filter;
pub mod reservation_rules;
pub mod statement_calculation;
