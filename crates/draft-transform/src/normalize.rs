//! Raw row to render context.

use std::collections::BTreeSet;

use draft_model::{RawValue, RenderContext, Row};

use crate::datetime::{format_long_date, parse_day_first};

/// Build the render context for one row.
///
/// Total: every column of the row appears in the context with a string
/// value, and no input can make this fail.
pub fn normalize_row(row: &Row, date_columns: &BTreeSet<String>) -> RenderContext {
    row.iter()
        .map(|(column, value)| {
            let is_date = date_columns.contains(column);
            (column, normalize_value(value, is_date))
        })
        .collect()
}

/// Normalize one cell.
///
/// Nulls become `""`. Date columns are rendered as `05 March 2024` when the
/// value reads as a date and fall back to the raw string form otherwise.
/// Everything else keeps its natural string form untouched.
pub fn normalize_value(value: &RawValue, is_date_column: bool) -> String {
    if value.is_null() {
        return String::new();
    }
    if !is_date_column {
        return value.to_string();
    }
    match value {
        RawValue::Date(date) => format_long_date(*date),
        RawValue::DateTime(dt) => format_long_date(dt.date()),
        other => {
            let raw = other.to_string();
            parse_day_first(&raw).map_or(raw, format_long_date)
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn date_columns() -> BTreeSet<String> {
        ["effective_date", "start_date", "end_date"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    #[test]
    fn date_column_is_formatted_day_first() {
        let row = Row::new().with("effective_date", "03/04/2024");
        let context = normalize_row(&row, &date_columns());
        assert_eq!(context.get("effective_date"), Some("03 April 2024"));
    }

    #[test]
    fn unparseable_date_keeps_raw_text() {
        let row = Row::new().with("start_date", "not-a-date");
        let context = normalize_row(&row, &date_columns());
        assert_eq!(context.get("start_date"), Some("not-a-date"));
    }

    #[test]
    fn typed_dates_are_formatted_directly() {
        let date = NaiveDate::from_ymd_opt(2025, 12, 15).unwrap();
        let row = Row::new()
            .with("end_date", RawValue::Date(date))
            .with("start_date", RawValue::DateTime(date.and_hms_opt(8, 0, 0).unwrap()));
        let context = normalize_row(&row, &date_columns());
        assert_eq!(context.get("end_date"), Some("15 December 2025"));
        assert_eq!(context.get("start_date"), Some("15 December 2025"));
    }

    #[test]
    fn date_like_text_outside_date_columns_is_untouched() {
        let row = Row::new().with("signed_on", "03/04/2024");
        let context = normalize_row(&row, &date_columns());
        assert_eq!(context.get("signed_on"), Some("03/04/2024"));
    }

    #[test]
    fn nulls_become_empty_strings() {
        let row = Row::new()
            .with("party", RawValue::Null)
            .with("amount", RawValue::Float(f64::NAN))
            .with("effective_date", RawValue::Null);
        let context = normalize_row(&row, &date_columns());
        assert_eq!(context.get("party"), Some(""));
        assert_eq!(context.get("amount"), Some(""));
        assert_eq!(context.get("effective_date"), Some(""));
    }

    #[test]
    fn plain_values_pass_through_unchanged() {
        let row = Row::new()
            .with("party", "  Acme Ltd ")
            .with("amount", RawValue::Int(125_000))
            .with("rate", RawValue::Float(4.25));
        let context = normalize_row(&row, &date_columns());
        assert_eq!(context.get("party"), Some("  Acme Ltd "));
        assert_eq!(context.get("amount"), Some("125000"));
        assert_eq!(context.get("rate"), Some("4.25"));
    }

    #[test]
    fn numeric_date_column_value_falls_back_to_number_text() {
        let row = Row::new().with("effective_date", RawValue::Int(45_000));
        let context = normalize_row(&row, &date_columns());
        assert_eq!(context.get("effective_date"), Some("45000"));
    }
}
