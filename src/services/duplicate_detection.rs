use serde::Serialize;
use tracing::warn;

use crate::schemas::Expense;

/// A probable duplicate pair across two expense sources. Annotation only:
/// both records stay in the statement for manual review.
#[derive(Debug, Clone, Serialize)]
pub struct DuplicateWarning {
    pub first: Expense,
    pub second: Expense,
    pub confidence: &'static str,
}

// Same float tolerance the payment reconciliation path uses.
const AMOUNT_TOLERANCE: f64 = 0.01;

/// Flag pairs whose amounts match within a cent, whose dates are at most a
/// day apart, and where one description contains the other.
pub fn detect_duplicate_expenses(
    primary: &[Expense],
    secondary: &[Expense],
) -> Vec<DuplicateWarning> {
    let mut warnings = Vec::new();

    for first in primary {
        for second in secondary {
            if (first.amount - second.amount).abs() > AMOUNT_TOLERANCE {
                continue;
            }
            let day_gap = (first.date - second.date).num_days().abs();
            if day_gap > 1 {
                continue;
            }
            if !descriptions_overlap(&first.description, &second.description) {
                continue;
            }
            warnings.push(DuplicateWarning {
                first: first.clone(),
                second: second.clone(),
                confidence: if day_gap == 0 { "high" } else { "medium" },
            });
        }
    }

    if !warnings.is_empty() {
        warn!(
            count = warnings.len(),
            "Probable duplicate expenses detected across sources"
        );
    }
    warnings
}

fn descriptions_overlap(a: &str, b: &str) -> bool {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a.contains(&b) || b.contains(&a)
}
