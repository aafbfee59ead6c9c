//! Shared parsing utilities for saved scheduler output.
//!
//! Field-level helpers used when reading `sacct` exports.

pub mod time;

pub use time::{format_duration, parse_duration, parse_sacct_timestamp};

/// Filter helper for optional string fields.
/// Returns None if the string is empty or a placeholder value.
pub fn non_empty_string(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() || trimmed == "-" || trimmed == "N/A" || trimmed == "Unknown" {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Split a delimited line and validate field count.
pub fn split_delimited(
    line: &str,
    delimiter: char,
    min_fields: usize,
) -> Result<Vec<&str>, String> {
    let fields: Vec<&str> = line.split(delimiter).collect();
    if fields.len() < min_fields {
        return Err(format!(
            "Expected {} fields, got {}: {}",
            min_fields,
            fields.len(),
            line
        ));
    }
    Ok(fields)
}

/// Normalize a sacct column name: drop any `%width` suffix and lowercase it.
///
/// `jobname%-40` and `JobName` both become `jobname`.
pub fn column_key(name: &str) -> String {
    name.split('%').next().unwrap_or(name).trim().to_lowercase()
}
