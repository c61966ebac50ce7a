use chrono::NaiveDate;

pub type EngineResult<T> = Result<T, EngineError>;

/// Calculation failures abort statement generation entirely. Data-quality
/// findings (duplicate expenses, cleaning-count mismatches) are not errors;
/// they ride along on the statement as warnings.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Unknown reservation status '{value}'. Valid statuses: {valid}.")]
    InvalidStatus { value: String, valid: &'static str },

    #[error("Unknown calculation type '{value}'. Valid types: checkout, calendar.")]
    InvalidCalculationType { value: String },

    #[error("Invalid ISO date '{0}'. Expected YYYY-MM-DD.")]
    InvalidDate(String),

    #[error(
        "Reservation {reservation_id}: check-out {check_out} precedes check-in {check_in}."
    )]
    InvalidDateRange {
        reservation_id: String,
        check_in: NaiveDate,
        check_out: NaiveDate,
    },

    #[error("Invalid period: start {start} is after end {end}.")]
    InvalidPeriod { start: NaiveDate, end: NaiveDate },

    #[error(
        "Invalid payout week {start} to {end}. Payout weeks run Tuesday through the following Monday."
    )]
    InvalidPayoutWeek { start: NaiveDate, end: NaiveDate },

    #[error("No listing profile configured for property {property_id}.")]
    MissingListingProfile { property_id: i64 },

    #[error("Validation failed: {0}")]
    Validation(String),
}
