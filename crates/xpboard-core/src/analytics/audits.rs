//! Audit counts and the audit ratio

use crate::charts::Palette;
use crate::models::{CategoricalSeries, Category, Transaction};

/// Number of audits given (positive amount) and received (negative amount)
pub fn audit_given_received_series(
    transactions: &[Transaction],
    palette: &Palette,
) -> CategoricalSeries {
    let (given, received) = transactions
        .iter()
        .filter(|t| t.is_audit())
        .fold((0u64, 0u64), |(given, received), t| {
            if t.amount > 0 {
                (given + 1, received)
            } else if t.amount < 0 {
                (given, received + 1)
            } else {
                (given, received)
            }
        });

    CategoricalSeries::new(vec![
        Category::new("Audits Given", given as f64, &palette.success),
        Category::new("Audits Received", received as f64, &palette.info),
    ])
}

/// Audit points done vs received, for the horizontal bar slot
pub fn audits_points_series(total_up: i64, total_down: i64, palette: &Palette) -> CategoricalSeries {
    CategoricalSeries::new(vec![
        Category::new("Done", total_up as f64, &palette.success),
        Category::new("Received", total_down as f64, &palette.info),
    ])
}

/// `total_up / total_down` with one decimal, `"0.00"` when either side is zero
pub fn audit_ratio(total_up: i64, total_down: i64) -> String {
    if total_up == 0 || total_down == 0 {
        return "0.00".to_string();
    }
    format!("{:.1}", total_up as f64 / total_down as f64)
}

/// Whether the displayed ratio is below 1 and the user owes audits
pub fn audit_ratio_is_low(total_up: i64, total_down: i64) -> bool {
    audit_ratio(total_up, total_down)
        .parse::<f64>()
        .is_ok_and(|ratio| ratio < 1.0)
}
