//! Time windowing for search requests
//!
//! A window is a half-open `[start, end)` interval of publish timestamps.
//! Either bound may be absent, meaning the search is unbounded on that side.

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, NaiveTime, Utc};
use std::fmt;

/// Timestamp format used on the wire and in checkpoint files
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// A half-open publish-time interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Window {
    /// Inclusive lower bound
    pub start: Option<DateTime<Utc>>,

    /// Exclusive upper bound
    pub end: Option<DateTime<Utc>>,
}

impl Window {
    /// Creates a window from optional bounds
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self { start, end }
    }

    /// A window with no bounds on either side
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Formats the start bound, or `None` when unbounded
    pub fn start_str(&self) -> Option<String> {
        self.start.map(format_timestamp)
    }

    /// Formats the end bound, or `None` when unbounded
    pub fn end_str(&self) -> Option<String> {
        self.end.map(format_timestamp)
    }

    /// Returns true if both bounds are present and `end <= start`
    pub fn is_empty(&self) -> bool {
        matches!((self.start, self.end), (Some(s), Some(e)) if e <= s)
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {}",
            self.start_str().unwrap_or_else(|| "-inf".to_string()),
            self.end_str().unwrap_or_else(|| "+inf".to_string())
        )
    }
}

/// Formats a timestamp as `YYYY-MM-DDTHH:MM:SSZ`
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Midnight UTC at the start of the given date
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.day0()))
}

/// Builds the search windows for a run
///
/// `after` is an inclusive start date and `before` an inclusive end date; the
/// exclusive upper bound is the day after `before`. When `split_monthly` is set
/// and both dates are present, one window is produced per calendar month that
/// overlaps the range, starting at the first of each month. Otherwise a single
/// window covering the whole range is returned.
///
/// An inverted range (`after > before`) yields no windows.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use vidharvest::window::build_windows;
///
/// let after = NaiveDate::from_ymd_opt(2020, 1, 15);
/// let before = NaiveDate::from_ymd_opt(2020, 3, 10);
/// assert_eq!(build_windows(after, before, true).len(), 3);
/// ```
pub fn build_windows(
    after: Option<NaiveDate>,
    before: Option<NaiveDate>,
    split_monthly: bool,
) -> Vec<Window> {
    if let (Some(a), Some(b)) = (after, before) {
        if a > b {
            return Vec::new();
        }
        if split_monthly {
            return month_windows(a, b);
        }
    }

    let start = after.map(start_of_day);
    let end = before
        .and_then(|b| b.checked_add_signed(Duration::days(1)))
        .map(start_of_day);

    vec![Window::new(start, end)]
}

/// Calendar-month windows covering every month from `after` through `before`
fn month_windows(after: NaiveDate, before: NaiveDate) -> Vec<Window> {
    let last = first_of_month(before);
    let mut current = first_of_month(after);
    let mut windows = Vec::new();

    while current <= last {
        let Some(next) = current.checked_add_months(Months::new(1)) else {
            break;
        };
        windows.push(Window::new(
            Some(start_of_day(current)),
            Some(start_of_day(next)),
        ));
        current = next;
    }

    windows
}
