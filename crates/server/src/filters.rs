//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Formats a decimal amount as dollars.
///
/// Usage in templates: `{{ total|money }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn money(value: &Decimal, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(format_money(value))
}

/// Formats a timestamp for table rows, e.g. "Aug 20, 2026 14:30".
///
/// Usage in templates: `{{ transaction.created_at|datetime }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn datetime(value: &DateTime<Utc>, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(format_datetime(value))
}

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

fn format_money(value: &Decimal) -> String {
    format!("${:.2}", value.round_dp(2))
}

fn format_datetime(value: &DateTime<Utc>) -> String {
    value.format("%b %-d, %Y %H:%M").to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_money_rounds_to_cents() {
        assert_eq!(format_money(&Decimal::new(2550, 2)), "$25.50");
        assert_eq!(format_money(&Decimal::new(5, 0)), "$5.00");
        assert_eq!(format_money(&Decimal::new(12345, 3)), "$12.35");
    }

    #[test]
    fn test_datetime_is_compact() {
        let at = Utc.with_ymd_and_hms(2026, 8, 20, 14, 30, 0).unwrap();
        assert_eq!(format_datetime(&at), "Aug 20, 2026 14:30");
    }
}
