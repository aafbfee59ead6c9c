//! Date column filter driven by a date comparator.

use crate::date::{compare, local_midnight, normalize};
use chrono::{DateTime, Local, NaiveDate, TimeZone};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FilterParseError {
    #[error("Expected KIND:DATE, got {0:?}")]
    MissingDate(String),
    #[error(
        "Unknown filter kind {0:?} (expected equals, notEqual, lessThan, greaterThan or inRange)"
    )]
    UnknownKind(String),
    #[error("Invalid date {0:?} (expected YYYY-MM-DD)")]
    InvalidDate(String),
    #[error("inRange needs FROM..TO, got {0:?}")]
    InvalidRange(String),
}

/// Filter condition on a date column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFilterKind {
    Equals,
    NotEqual,
    LessThan,
    GreaterThan,
    InRange { to: NaiveDate },
}

impl DateFilterKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Equals => "equals",
            Self::NotEqual => "notEqual",
            Self::LessThan => "lessThan",
            Self::GreaterThan => "greaterThan",
            Self::InRange { .. } => "inRange",
        }
    }
}

/// A date column filter.
///
/// Cells are compared against local midnight of `date` (and of the range
/// end for `inRange`). Blank cells are decided by `include_blanks` before
/// the comparator runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFilter {
    pub kind: DateFilterKind,
    pub date: NaiveDate,
    /// Range ends count as inside
    pub inclusive: bool,
    pub include_blanks: bool,
}

impl DateFilter {
    pub fn new(kind: DateFilterKind, date: NaiveDate) -> Self {
        Self {
            kind,
            date,
            inclusive: false,
            include_blanks: false,
        }
    }

    pub fn inclusive(mut self, inclusive: bool) -> Self {
        self.inclusive = inclusive;
        self
    }

    pub fn include_blanks(mut self, include_blanks: bool) -> Self {
        self.include_blanks = include_blanks;
        self
    }

    /// Whether `cell_value` passes, comparing in the local time zone.
    pub fn matches(&self, cell_value: Option<&str>) -> bool {
        self.matches_with(&Local, compare::<Local>, cell_value)
    }

    /// Whether `cell_value` passes, using `comparator` with boundaries in `tz`.
    pub fn matches_with<Tz, F>(&self, tz: &Tz, comparator: F, cell_value: Option<&str>) -> bool
    where
        Tz: TimeZone,
        F: Fn(&DateTime<Tz>, Option<&str>) -> Ordering,
    {
        if normalize(cell_value).is_empty() {
            return self.include_blanks;
        }
        let Some(boundary) = local_midnight(tz, self.date) else {
            return false;
        };
        let ord = comparator(&boundary, cell_value);

        match self.kind {
            DateFilterKind::Equals => ord == Ordering::Equal,
            DateFilterKind::NotEqual => ord != Ordering::Equal,
            DateFilterKind::LessThan => ord == Ordering::Less,
            DateFilterKind::GreaterThan => ord == Ordering::Greater,
            DateFilterKind::InRange { to } => {
                let Some(upper) = local_midnight(tz, to) else {
                    return false;
                };
                let upper_ord = comparator(&upper, cell_value);
                if self.inclusive {
                    ord != Ordering::Less && upper_ord != Ordering::Greater
                } else {
                    ord == Ordering::Greater && upper_ord == Ordering::Less
                }
            }
        }
    }
}

impl fmt::Display for DateFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            DateFilterKind::Equals => write!(f, "= {}", self.date),
            DateFilterKind::NotEqual => write!(f, "≠ {}", self.date),
            DateFilterKind::LessThan => write!(f, "< {}", self.date),
            DateFilterKind::GreaterThan => write!(f, "> {}", self.date),
            DateFilterKind::InRange { to } => {
                let (open, close) = if self.inclusive { ('[', ']') } else { ('(', ')') };
                write!(f, "{}{}..{}{}", open, self.date, to, close)
            }
        }
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, FilterParseError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| FilterParseError::InvalidDate(s.trim().to_string()))
}

/// Parses `KIND:DATE` or `inRange:FROM..TO` (kinds are case-insensitive).
impl FromStr for DateFilter {
    type Err = FilterParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, value) = s
            .split_once(':')
            .ok_or_else(|| FilterParseError::MissingDate(s.to_string()))?;

        let kind = kind.trim().to_ascii_lowercase();
        if kind == "inrange" {
            let (from, to) = value
                .split_once("..")
                .ok_or_else(|| FilterParseError::InvalidRange(value.to_string()))?;
            let to = parse_date(to)?;
            return Ok(Self::new(DateFilterKind::InRange { to }, parse_date(from)?));
        }

        let kind = match kind.as_str() {
            "equals" => DateFilterKind::Equals,
            "notequal" => DateFilterKind::NotEqual,
            "lessthan" => DateFilterKind::LessThan,
            "greaterthan" => DateFilterKind::GreaterThan,
            _ => return Err(FilterParseError::UnknownKind(kind)),
        };
        Ok(Self::new(kind, parse_date(value)?))
    }
}
