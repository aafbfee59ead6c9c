//! Named grid functions that column definitions refer to.

use crate::date::{compare, normalize};
use chrono::{DateTime, Local};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Name of the date cell formatter.
pub const CLEAN_DATE_COLUMN: &str = "cleanDateColumn";
/// Name of the date filter comparator.
pub const DATE_COMPARATOR: &str = "DateComparator";

/// Formats a raw cell value for display.
pub type CellFormatter = for<'a> fn(Option<&'a str>) -> &'a str;

/// Compares a cell against a filter boundary at local midnight.
pub type DateComparatorFn = fn(&DateTime<Local>, Option<&str>) -> Ordering;

#[derive(Debug, Clone, Copy)]
pub enum GridFunction {
    Formatter(CellFormatter),
    Comparator(DateComparatorFn),
}

/// Function table, keyed by the names used in column definitions.
#[derive(Debug, Clone, Default)]
pub struct GridFunctions {
    entries: HashMap<&'static str, GridFunction>,
}

impl GridFunctions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table holding [`CLEAN_DATE_COLUMN`] and [`DATE_COMPARATOR`].
    pub fn with_builtin() -> Self {
        let mut functions = Self::new();
        functions.register(CLEAN_DATE_COLUMN, GridFunction::Formatter(normalize));
        functions.register(DATE_COMPARATOR, GridFunction::Comparator(compare::<Local>));
        functions
    }

    /// Register `function` under `name`, returning the one it replaces.
    pub fn register(&mut self, name: &'static str, function: GridFunction) -> Option<GridFunction> {
        self.entries.insert(name, function)
    }

    pub fn formatter(&self, name: &str) -> Option<CellFormatter> {
        match self.entries.get(name)? {
            GridFunction::Formatter(f) => Some(*f),
            GridFunction::Comparator(_) => None,
        }
    }

    pub fn comparator(&self, name: &str) -> Option<DateComparatorFn> {
        match self.entries.get(name)? {
            GridFunction::Comparator(f) => Some(*f),
            GridFunction::Formatter(_) => None,
        }
    }
}
