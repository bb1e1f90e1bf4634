//! Timestamps, clocks, and calendar windows.
//!
//! Everything is stored in UTC. Calendar windows ("today", "this week") are
//! computed in the UTC offset of the clock's current reading, so a clock in
//! `+03:00` sees its day start at 21:00 UTC of the previous date.

use std::cell::Cell;
use std::rc::Rc;

use chrono::{
    DateTime, Datelike, Duration, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, Utc,
};

use crate::error::{Error, Result};

/// Storage format. Fixed width so SQL string comparison is chronological.
const DB_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Input format accepted for due dates.
pub const DUE_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

pub trait Clock {
    fn now(&self) -> DateTime<FixedOffset>;

    fn now_utc(&self) -> DateTime<Utc> {
        self.now().with_timezone(&Utc)
    }
}

/// Wall clock in the machine's local offset.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// Manually driven clock. Clones share the same reading.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Rc<Cell<DateTime<FixedOffset>>>,
}

impl FixedClock {
    pub fn new(now: DateTime<FixedOffset>) -> Self {
        Self {
            now: Rc::new(Cell::new(now)),
        }
    }

    pub fn set(&self, now: DateTime<FixedOffset>) {
        self.now.set(now);
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.now.get()
    }
}

pub fn to_db(ts: DateTime<Utc>) -> String {
    ts.format(DB_FORMAT).to_string()
}

pub fn from_db(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(s).map(|ts| ts.with_timezone(&Utc))
}

/// Parse a due date in the fixed `YYYY-MM-DDTHH:MM:SSZ` pattern.
///
/// `%Y` alone would also take signed or five-digit years, which do not fit
/// the fixed-width storage format, so the year is bounded to four digits.
pub fn parse_due_date(s: &str) -> Result<DateTime<Utc>> {
    let invalid = || {
        Error::validation(format!(
            "invalid due date '{s}': expected YYYY-MM-DDTHH:MM:SSZ"
        ))
    };
    let naive = NaiveDateTime::parse_from_str(s, DUE_DATE_FORMAT).map_err(|_| invalid())?;
    if !(0..=9999).contains(&naive.year()) || !s.starts_with(|c: char| c.is_ascii_digit()) {
        return Err(invalid());
    }
    Ok(naive.and_utc())
}

/// Empty input means "no due date".
pub fn parse_optional_due_date(s: &str) -> Result<Option<DateTime<Utc>>> {
    if s.is_empty() {
        Ok(None)
    } else {
        parse_due_date(s).map(Some)
    }
}

pub fn format_due_date(ts: DateTime<Utc>) -> String {
    ts.format(DUE_DATE_FORMAT).to_string()
}

fn midnight_utc(date: NaiveDate, offset: FixedOffset) -> DateTime<Utc> {
    let local = date.and_time(NaiveTime::MIN);
    (local - Duration::seconds(offset.local_minus_utc().into())).and_utc()
}

/// Half-open window covering the current calendar day: `[00:00, next 00:00)`.
pub fn day_window(now: DateTime<FixedOffset>) -> (DateTime<Utc>, DateTime<Utc>) {
    let today = now.date_naive();
    let offset = *now.offset();
    (
        midnight_utc(today, offset),
        midnight_utc(today + Duration::days(1), offset),
    )
}

/// Half-open window covering the current ISO week, anchored to Monday 00:00.
pub fn week_window(now: DateTime<FixedOffset>) -> (DateTime<Utc>, DateTime<Utc>) {
    let today = now.date_naive();
    let monday = today - Duration::days(today.weekday().num_days_from_monday().into());
    let offset = *now.offset();
    (
        midnight_utc(monday, offset),
        midnight_utc(monday + Duration::days(7), offset),
    )
}

/// Whether `ts` falls on the same calendar date as `now`, in `now`'s offset.
pub fn is_same_day(ts: DateTime<Utc>, now: DateTime<FixedOffset>) -> bool {
    ts.with_timezone(now.offset()).date_naive() == now.date_naive()
}
