//! Row transformation for batch drafting.
//!
//! - **datetime**: lenient day-first date parsing and long-form formatting
//! - **normalize**: raw row to string-only render context
//! - **sanitize**: untrusted labels to filesystem-safe name tokens

pub mod datetime;
pub mod normalize;
pub mod sanitize;

pub use datetime::{format_long_date, parse_day_first};
pub use normalize::{normalize_row, normalize_value};
pub use sanitize::{safe_filename, sanitize_filename};
