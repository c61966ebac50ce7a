use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{EngineError, EngineResult};
use crate::services::duplicate_detection::{detect_duplicate_expenses, DuplicateWarning};

pub fn validate_input<T: Validate>(input: &T) -> EngineResult<()> {
    input
        .validate()
        .map_err(|errors| EngineError::Validation(errors.to_string()))
}

pub const VALID_RESERVATION_STATUSES: &str =
    "new, confirmed, completed, cancelled, inquiry, expired, declined, unknown";

/// Booking lifecycle status. Only `confirmed` reservations participate in
/// financial totals; legacy channel exports still say `accepted`, which
/// normalizes to `confirmed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    New,
    #[serde(alias = "accepted")]
    Confirmed,
    Completed,
    Cancelled,
    Inquiry,
    Expired,
    Declined,
    Unknown,
}

impl ReservationStatus {
    /// Lenient constructor for the integration boundary: anything
    /// unrecognized maps to `Unknown` instead of failing the batch.
    pub fn normalize(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "new" => Self::New,
            "confirmed" | "accepted" => Self::Confirmed,
            "completed" => Self::Completed,
            "cancelled" => Self::Cancelled,
            "inquiry" => Self::Inquiry,
            "expired" => Self::Expired,
            "declined" => Self::Declined,
            _ => Self::Unknown,
        }
    }

    /// Strict parser for callers that must reject bad data instead of
    /// coercing it.
    pub fn parse(raw: &str) -> EngineResult<Self> {
        match Self::normalize(raw) {
            Self::Unknown if !raw.trim().eq_ignore_ascii_case("unknown") => {
                Err(EngineError::InvalidStatus {
                    value: raw.trim().to_string(),
                    valid: VALID_RESERVATION_STATUSES,
                })
            }
            status => Ok(status),
        }
    }

    pub fn is_reportable(self) -> bool {
        self == Self::Confirmed
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Inquiry => "inquiry",
            Self::Expired => "expired",
            Self::Declined => "declined",
            Self::Unknown => "unknown",
        }
    }
}

/// How a statement window selects reservations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalculationType {
    /// Reservations whose check-out date falls inside the window.
    Checkout,
    /// Reservations overlapping the window, pre-prorated upstream.
    Calendar,
}

impl CalculationType {
    pub fn parse(raw: &str) -> EngineResult<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "checkout" => Ok(Self::Checkout),
            "calendar" => Ok(Self::Calendar),
            _ => Err(EngineError::InvalidCalculationType {
                value: raw.trim().to_string(),
            }),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Checkout => "checkout",
            Self::Calendar => "calendar",
        }
    }
}

/// A booking as fetched from the channel integration. Immutable inside the
/// engine; the rule pipeline produces annotated copies rather than mutating
/// the source record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub id: String,
    pub property_id: i64,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub nights: i64,
    pub channel: String,
    pub status: ReservationStatus,
    #[serde(default)]
    pub base_rate: f64,
    #[serde(default)]
    pub cleaning_fee: f64,
    #[serde(default)]
    pub platform_fees: f64,
    #[serde(default)]
    pub tax_amount: f64,
    /// What the channel pays out for this stay; the owner-facing revenue
    /// the rule pipeline starts from.
    #[serde(default)]
    pub client_payout: f64,
    /// Whether the itemized money fields above are populated.
    #[serde(default)]
    pub has_detailed_finance: bool,
    /// Booking creation time, used for fee-schedule transition decisions.
    pub created_at: DateTime<Utc>,
}

impl Reservation {
    pub fn is_airbnb(&self) -> bool {
        self.channel.to_ascii_lowercase().contains("airbnb")
    }

    /// Check-out must not precede check-in, and the stored night count must
    /// match the day difference.
    pub fn check_dates(&self) -> EngineResult<()> {
        if self.check_out_date < self.check_in_date {
            return Err(EngineError::InvalidDateRange {
                reservation_id: self.id.clone(),
                check_in: self.check_in_date,
                check_out: self.check_out_date,
            });
        }
        let span = (self.check_out_date - self.check_in_date).num_days();
        if span != self.nights {
            return Err(EngineError::Validation(format!(
                "Reservation {}: night count {} does not match the {}-day stay.",
                self.id, self.nights, span
            )));
        }
        Ok(())
    }
}

/// A dated monetary entry from the accounting sync or a spreadsheet upload.
/// Positive amounts are upsells/credits; costs arrive negative or flagged by
/// category. `property_id = None` means an unassigned/shared cost.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    pub id: String,
    pub property_id: Option<i64>,
    pub date: NaiveDate,
    pub amount: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub vendor: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub expense_type: String,
}

/// Expenses handed to the engine, optionally carrying the duplicate
/// annotations produced when two sources were merged.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExpenseBatch {
    pub expenses: Vec<Expense>,
    pub duplicate_warnings: Vec<DuplicateWarning>,
}

impl ExpenseBatch {
    pub fn new(expenses: Vec<Expense>) -> Self {
        Self {
            expenses,
            duplicate_warnings: Vec::new(),
        }
    }

    /// Merge two source lists (e.g. spreadsheet upload + accounting sync)
    /// and annotate probable duplicates across them. Nothing is dropped;
    /// the warnings ride along for manual review.
    pub fn from_sources(primary: Vec<Expense>, secondary: Vec<Expense>) -> Self {
        let duplicate_warnings = detect_duplicate_expenses(&primary, &secondary);
        let mut expenses = primary;
        expenses.extend(secondary);
        Self {
            expenses,
            duplicate_warnings,
        }
    }
}

/// Per-property financial rule profile ("listing info"). Optional fields
/// degrade to the engine defaults; a profile missing entirely fails the
/// calculation loudly.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ListingInfo {
    pub property_id: i64,
    #[validate(range(min = 0.0, max = 100.0))]
    pub pm_fee_percentage: Option<f64>,
    /// A future fee schedule: reservations created on or after the start
    /// date bill at the new percentage.
    #[serde(default)]
    pub new_fee_schedule: bool,
    #[validate(range(min = 0.0, max = 100.0))]
    pub new_fee_percentage: Option<f64>,
    pub new_fee_start_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_co_hosted: bool,
    #[validate(range(min = 0.0, max = 100.0))]
    pub co_host_percentage: Option<f64>,
    pub co_host_fixed_fee: Option<f64>,
    #[serde(default)]
    pub disregard_tax: bool,
    #[serde(default)]
    pub airbnb_pass_through_tax: bool,
    #[serde(default)]
    pub cleaning_fee_pass_through: bool,
    pub default_cleaning_fee: Option<f64>,
    #[serde(default)]
    pub waive_commission: bool,
    /// Inclusive expiry: a statement ending on this date is still waived.
    pub waive_commission_until: Option<NaiveDate>,
    #[serde(default)]
    pub co_host_on_airbnb: bool,
    #[serde(default)]
    pub proration_enabled: bool,
    pub min_nights_for_proration: Option<i64>,
    #[validate(range(min = 0.0, max = 100.0))]
    pub proration_percentage: Option<f64>,
    pub max_prorated_amount: Option<f64>,
}

/// Tech/insurance fee strategy. Both conventions appear on historical
/// statements, so the caller picks one per request instead of the engine
/// unifying them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum FeeSchedule {
    /// Flat per-property amounts per statement period.
    FlatPerProperty { tech_fee: f64, insurance_fee: f64 },
    /// Per-owner monthly amounts amortized over the configured
    /// weeks-per-month divisor.
    MonthlyAmortized {
        tech_fee_monthly: f64,
        insurance_fee_monthly: f64,
    },
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self::FlatPerProperty {
            tech_fee: 50.0,
            insurance_fee: 25.0,
        }
    }
}

impl FeeSchedule {
    pub fn tech_fees(&self, property_count: usize, weeks_per_month: f64) -> f64 {
        match self {
            Self::FlatPerProperty { tech_fee, .. } => tech_fee * property_count as f64,
            Self::MonthlyAmortized {
                tech_fee_monthly, ..
            } => tech_fee_monthly / weeks_per_month,
        }
    }

    pub fn insurance_fees(&self, property_count: usize, weeks_per_month: f64) -> f64 {
        match self {
            Self::FlatPerProperty { insurance_fee, .. } => {
                insurance_fee * property_count as f64
            }
            Self::MonthlyAmortized {
                insurance_fee_monthly,
                ..
            } => insurance_fee_monthly / weeks_per_month,
        }
    }
}

/// Whether the final payout is floored at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoutPolicy {
    /// Legacy weekly-rules formulation: the payout never goes negative.
    LegacyWeekly,
    /// Unified statement calculation: negative payouts pass through and the
    /// delivery guardrail gates them instead.
    #[default]
    Unified,
}

/// One statement calculation request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StatementRequest {
    #[validate(length(min = 1))]
    pub property_ids: Vec<i64>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub calculation_type: CalculationType,
    #[serde(default)]
    pub fee_schedule: FeeSchedule,
    #[serde(default)]
    pub payout_policy: PayoutPolicy,
}

impl StatementRequest {
    pub fn check_period(&self) -> EngineResult<()> {
        if self.start_date > self.end_date {
            return Err(EngineError::InvalidPeriod {
                start: self.start_date,
                end: self.end_date,
            });
        }
        Ok(())
    }
}

/// Parse an ISO calendar date as received on the request boundary.
pub fn parse_date(value: &str) -> EngineResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| EngineError::InvalidDate(value.trim().to_string()))
}
