//! Filesystem-safe name tokens from untrusted labels.

use draft_model::{DEFAULT_FALLBACK_LABEL, DEFAULT_MAX_FILENAME_LEN};

/// Sanitize a label into a path segment.
///
/// Trims whitespace, substitutes `fallback` when nothing is left, collapses
/// every run of characters outside `[A-Za-z0-9_-]` into one `_`, and
/// truncates to `max_len` characters. The result is never empty and is
/// stable under re-application.
pub fn sanitize_filename(label: Option<&str>, fallback: &str, max_len: usize) -> String {
    let trimmed = label.map(str::trim).unwrap_or_default();
    let source = if trimmed.is_empty() {
        match fallback.trim() {
            "" => DEFAULT_FALLBACK_LABEL,
            fallback => fallback,
        }
    } else {
        trimmed
    };

    let mut safe = String::with_capacity(source.len());
    let mut in_run = false;
    for ch in source.chars() {
        if ch.is_ascii_alphanumeric() || ch == '_' || ch == '-' {
            safe.push(ch);
            in_run = false;
        } else if !in_run {
            safe.push('_');
            in_run = true;
        }
    }

    // Output is pure ASCII, so byte truncation is char truncation.
    safe.truncate(max_len.max(1));
    safe
}

/// [`sanitize_filename`] with the default `contract` fallback and 80 character
/// limit.
pub fn safe_filename(label: Option<&str>) -> String {
    sanitize_filename(label, DEFAULT_FALLBACK_LABEL, DEFAULT_MAX_FILENAME_LEN)
}
