use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use csv::StringRecord;

/// Delimiter used inside the `tags` cell
pub const TAG_DELIMITER: &str = ";";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Maps known column names to their position in the header row.
/// Lookup is case-insensitive; unknown columns are ignored.
pub struct ColumnMap {
    positions: HashMap<String, usize>,
}

impl ColumnMap {
    pub fn from_headers(headers: &StringRecord) -> Self {
        let positions = headers
            .iter()
            .enumerate()
            .map(|(i, name)| (normalize_header(name), i))
            .collect();
        ColumnMap { positions }
    }

    pub fn has(&self, column: &str) -> bool {
        self.positions.contains_key(&normalize_header(column))
    }

    /// Trimmed cell value; `None` when the column is absent, the row is
    /// short, or the cell is blank.
    pub fn get<'r>(&self, record: &'r StringRecord, column: &str) -> Option<&'r str> {
        let idx = *self.positions.get(&normalize_header(column))?;
        record.get(idx).map(str::trim).filter(|v| !v.is_empty())
    }

    /// The cell exactly as written; `None` only when the column is absent,
    /// the row is short, or the cell is empty.
    pub fn get_raw<'r>(&self, record: &'r StringRecord, column: &str) -> Option<&'r str> {
        let idx = *self.positions.get(&normalize_header(column))?;
        record.get(idx).filter(|v| !v.is_empty())
    }
}

fn normalize_header(name: &str) -> String {
    name.trim_start_matches('\u{feff}').trim().to_ascii_lowercase()
}

pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// RFC 3339 timestamps, or a bare date taken as midnight UTC.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }
    parse_date(value)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| format!("invalid timestamp {:?}", value))
}

pub fn format_date(date: &NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| format!("invalid date {:?} (expected YYYY-MM-DD)", value))
}

/// Parse a non-negative whole number. Decimal input is rounded.
pub fn parse_number<T>(column: &str, value: &str) -> Result<T, String>
where
    T: FromStr + TryFrom<u64>,
{
    if let Ok(n) = value.parse::<T>() {
        return Ok(n);
    }
    value
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite() && *f >= 0.0)
        .and_then(|f| T::try_from(f.round() as u64).ok())
        .ok_or_else(|| format!("{} must be a non-negative number, got {:?}", column, value))
}

pub fn join_tags(tags: &[String]) -> String {
    tags.join(TAG_DELIMITER)
}

pub fn split_tags(value: &str) -> Vec<String> {
    value
        .split(TAG_DELIMITER)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
