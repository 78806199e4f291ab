//! DataFrame rows to pipeline rows.

use chrono::{DateTime, NaiveDate};
use draft_model::{RawValue, Row};
use polars::prelude::{AnyValue, DataFrame, TimeUnit};

/// Days from 0001-01-01 (CE) to 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Convert a polars cell to a raw value.
pub fn any_to_raw(value: AnyValue<'_>) -> RawValue {
    match value {
        AnyValue::Null => RawValue::Null,
        AnyValue::Boolean(b) => RawValue::Bool(b),
        AnyValue::Int8(v) => RawValue::Int(i64::from(v)),
        AnyValue::Int16(v) => RawValue::Int(i64::from(v)),
        AnyValue::Int32(v) => RawValue::Int(i64::from(v)),
        AnyValue::Int64(v) => RawValue::Int(v),
        AnyValue::UInt8(v) => RawValue::Int(i64::from(v)),
        AnyValue::UInt16(v) => RawValue::Int(i64::from(v)),
        AnyValue::UInt32(v) => RawValue::Int(i64::from(v)),
        AnyValue::UInt64(v) => match i64::try_from(v) {
            Ok(v) => RawValue::Int(v),
            Err(_) => RawValue::Text(v.to_string()),
        },
        AnyValue::Float32(v) => RawValue::Float(f64::from(v)),
        AnyValue::Float64(v) => RawValue::Float(v),
        AnyValue::String(s) => RawValue::Text(s.to_string()),
        AnyValue::StringOwned(s) => RawValue::Text(s.to_string()),
        AnyValue::Date(days) => NaiveDate::from_num_days_from_ce_opt(days + UNIX_EPOCH_DAYS_FROM_CE)
            .map_or_else(|| RawValue::Text(days.to_string()), RawValue::Date),
        AnyValue::Datetime(ts, unit, _) => {
            let parsed = match unit {
                TimeUnit::Nanoseconds => Some(DateTime::from_timestamp_nanos(ts)),
                TimeUnit::Microseconds => DateTime::from_timestamp_micros(ts),
                TimeUnit::Milliseconds => DateTime::from_timestamp_millis(ts),
            };
            parsed.map_or_else(
                || RawValue::Text(ts.to_string()),
                |dt| RawValue::DateTime(dt.naive_utc()),
            )
        }
        other => RawValue::Text(other.to_string()),
    }
}

/// Convert every DataFrame row, in order, keeping column order.
pub fn rows_from_frame(df: &DataFrame) -> Vec<Row> {
    let columns = df.get_columns();
    (0..df.height())
        .map(|idx| {
            let mut row = Row::with_capacity(columns.len());
            for column in columns {
                let value = column.get(idx).unwrap_or(AnyValue::Null);
                row.insert(column.name().to_string(), any_to_raw(value));
            }
            row
        })
        .collect()
}
