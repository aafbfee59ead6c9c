//! Time parsing utilities for sacct exports.

use chrono::NaiveDateTime;
use std::time::Duration;

/// Parse a sacct timestamp (YYYY-MM-DDTHH:MM:SS).
///
/// sacct prints wall-clock time without a zone, so the result is naive.
/// Returns None for empty strings or placeholder values like "N/A", "Unknown", "None", "NaT".
pub fn parse_sacct_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() || s == "N/A" || s == "Unknown" || s == "None" || s == "NaT" {
        return None;
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").ok()
}

/// Parse a duration in various formats.
///
/// Supports:
/// - D-HH:MM:SS (SLURM time limit with days)
/// - HH:MM:SS
/// - MM:SS
/// - Seconds as integer
///
/// Returns None for "UNLIMITED", "Partition_Limit" or empty strings.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if s.is_empty() || s == "UNLIMITED" || s == "Partition_Limit" || s == "-" {
        return None;
    }

    // Check for day separator (D-HH:MM:SS)
    let parts: Vec<&str> = s.split('-').collect();
    let (days, time_part) = match parts.as_slice() {
        [days, time] => (days.parse::<u64>().ok()?, *time),
        [time] => (0, *time),
        _ => return None,
    };

    let time_parts: Vec<u64> = time_part
        .split(':')
        .map(|p| p.parse().ok())
        .collect::<Option<_>>()?;

    let seconds = match time_parts.as_slice() {
        [h, m, s] => h * 3600 + m * 60 + s,
        [m, s] => m * 60 + s,
        [s] => *s,
        _ => return None,
    };

    Some(Duration::from_secs(days * 86400 + seconds))
}

/// Format a duration the way sacct prints it (e.g., "1-02:30:00", "01:30:00").
pub fn format_duration(duration: Duration) -> String {
    let seconds = duration.as_secs();
    let days = seconds / 86400;
    let hours = (seconds % 86400) / 3600;
    let mins = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if days > 0 {
        format!("{}-{:02}:{:02}:{:02}", days, hours, mins, secs)
    } else {
        format!("{:02}:{:02}:{:02}", hours, mins, secs)
    }
}
