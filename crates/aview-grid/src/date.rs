//! Date cell normalization and comparison.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Offset, TimeDelta, TimeZone, Utc};
use std::cmp::Ordering;

/// Marker some data libraries write for a missing timestamp.
pub const NOT_A_TIME: &str = "NaT";

/// Date-time layouts read as wall time in the local zone.
const LOCAL_DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];

/// Date-only layouts other than ISO, read as local midnight.
const LOCAL_DATE_FORMATS: &[&str] = &["%m/%d/%Y", "%Y/%m/%d"];

/// Normalize a raw cell value into its display date.
///
/// Missing values and the [`NOT_A_TIME`] marker become `""`; a combined
/// date-time keeps only the part before the first `T`; anything else is
/// returned unchanged.
pub fn normalize(cell_value: Option<&str>) -> &str {
    match cell_value {
        None | Some(NOT_A_TIME) => "",
        Some(value) => value.split_once('T').map_or(value, |(date, _)| date),
    }
}

/// Compare a cell's date against a filter boundary at local midnight.
///
/// Returns `Less` when the cell is earlier than the boundary, `Greater`
/// when it is later and `Equal` otherwise (`as i8` gives the grid's
/// -1/0/1). A missing cell compares `Equal`, and so does a cell whose text
/// is not a date.
///
/// The boundary's time zone is the local zone of the comparison.
pub fn compare<Tz: TimeZone>(
    filter_local_date_at_midnight: &DateTime<Tz>,
    cell_value: Option<&str>,
) -> Ordering {
    let Some(raw) = cell_value.filter(|value| !value.is_empty()) else {
        return Ordering::Equal;
    };

    let tz = filter_local_date_at_midnight.timezone();
    let Some(cell_date) = parse_cell_date(&tz, normalize(Some(raw))) else {
        tracing::debug!("Cell value {:?} is not a date", raw);
        return Ordering::Equal;
    };

    cell_date.cmp(&filter_local_date_at_midnight.with_timezone(&Utc))
}

/// Parse normalized cell text and anchor it to its calendar date in `tz`.
///
/// ISO date-only text parses as UTC midnight, other layouts as wall time in
/// `tz`. The zone's offset at the parsed instant is then added back, which
/// cancels the UTC reading of a bare date and yields local midnight of that
/// date.
pub fn parse_cell_date<Tz: TimeZone>(tz: &Tz, value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    let parsed = if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        date.and_hms_opt(0, 0, 0)?.and_utc()
    } else {
        let naive = LOCAL_DATE_TIME_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
            .or_else(|| {
                LOCAL_DATE_FORMATS
                    .iter()
                    .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
            })?;
        tz.from_local_datetime(&naive)
            .earliest()?
            .with_timezone(&Utc)
    };

    // Minutes west of UTC, as a browser reports the timezone offset
    let offset_west = -tz
        .offset_from_utc_datetime(&parsed.naive_utc())
        .fix()
        .local_minus_utc();
    Some(parsed + TimeDelta::seconds(i64::from(offset_west)))
}

/// Midnight of `date` in `tz`, the boundary a date filter compares against.
pub fn local_midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> Option<DateTime<Tz>> {
    tz.from_local_datetime(&date.and_hms_opt(0, 0, 0)?).earliest()
}
