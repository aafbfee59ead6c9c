//! Grid column helpers for the job table.
//!
//! Date columns hold raw timestamps as exported by the scheduler. They are
//! shown through [`normalize`] and filtered through [`compare`], both
//! reachable by name from a [`GridFunctions`] table the way the table's
//! column definitions refer to them.

pub mod date;
pub mod filter;
pub mod functions;

pub use date::{compare, local_midnight, normalize, parse_cell_date, NOT_A_TIME};
pub use filter::{DateFilter, DateFilterKind, FilterParseError};
pub use functions::{
    CellFormatter, DateComparatorFn, GridFunction, GridFunctions, CLEAN_DATE_COLUMN,
    DATE_COMPARATOR,
};
