//! Owner payout statement engine for short-term-rental properties.
//!
//! Given raw reservation and expense records plus per-property rule
//! profiles, the engine resolves the settlement window, applies the layered
//! financial rules (commission, waivers, co-hosting splits, long-stay
//! proration, tax and cleaning-fee pass-through), and assembles an auditable
//! statement. Fetching the inputs and delivering the output (persistence,
//! PDF rendering, email) are the host application's concern; the engine is a
//! pure, synchronous computation over one in-memory snapshot.

pub mod cache;
pub mod config;
pub mod error;
pub mod schemas;
pub mod services;

pub use cache::ProfileCache;
pub use config::EngineConfig;
pub use error::{EngineError, EngineResult};
pub use schemas::{
    CalculationType, Expense, ExpenseBatch, FeeSchedule, ListingInfo, PayoutPolicy, Reservation,
    ReservationStatus, StatementRequest,
};
pub use services::{
    delivery::{check_email_guardrail, DeliveryHold},
    duplicate_detection::{detect_duplicate_expenses, DuplicateWarning},
    expense_classifier::{auto_categorize, classify_expenses, is_upsell, ClassifiedExpenses},
    payout_week::{
        current_payout_week, is_valid_payout_week, previous_payout_week, resolve_payout_week,
        should_include_reservation_in_week, PayoutWeek,
    },
    reservation_filter::filter_reservations,
    reservation_rules::{
        apply_reservation_rules, effective_fee_percentage, is_commission_waived,
        reverse_cleaning_fee, AdjustedReservation,
    },
    statement_calculation::{
        calculate_statement, calculate_weekly_statement, CleaningMismatchWarning, Statement,
        StatementTotals,
    },
};
