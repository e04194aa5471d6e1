// Copyright 2025 Stoolap Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Microsecond timestamps
//!
//! Timestamps are `i64` microseconds since the Unix epoch, UTC. `i64::MIN`
//! is reserved for NULL and doubles as the "open" lower bound of an interval.
//!
//! Literals may be written at any precision from a year down to a
//! microsecond. A partial literal covers a range: `'2015-02'` starts at
//! `2015-02-01T00:00:00.000000Z` (its floor) and ends at
//! `2015-02-28T23:59:59.999999Z` (its ceil).

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

/// NULL timestamp, also the open lower bound
pub const NULL_TIMESTAMP: i64 = i64::MIN;

/// Smallest non-NULL timestamp
pub const MIN_TIMESTAMP: i64 = i64::MIN + 1;

/// Largest timestamp, the open upper bound
pub const MAX_TIMESTAMP: i64 = i64::MAX;

pub const MICROS_PER_MILLI: i64 = 1_000;
pub const MICROS_PER_SECOND: i64 = 1_000_000;
pub const MICROS_PER_MINUTE: i64 = 60 * MICROS_PER_SECOND;
pub const MICROS_PER_HOUR: i64 = 60 * MICROS_PER_MINUTE;
pub const MICROS_PER_DAY: i64 = 24 * MICROS_PER_HOUR;
pub const MICROS_PER_WEEK: i64 = 7 * MICROS_PER_DAY;

/// Finest component present in a timestamp literal
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Precision {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
    Micro,
}

/// A timestamp literal resolved to the range it covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartialTimestamp {
    /// First microsecond covered by the literal
    pub floor: i64,
    /// Last microsecond covered by the literal
    pub ceil: i64,
    pub precision: Precision,
}

impl PartialTimestamp {
    /// An exact microsecond
    pub fn exact(ts: i64) -> Self {
        Self {
            floor: ts,
            ceil: ts,
            precision: Precision::Micro,
        }
    }
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(s: &'a str) -> Self {
        Self {
            bytes: s.as_bytes(),
            pos: 0,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn eat(&mut self, b: u8) -> bool {
        if self.peek() == Some(b) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Reads exactly `n` ASCII digits
    fn digits(&mut self, n: usize) -> Option<u32> {
        let end = self.pos.checked_add(n)?;
        let slice = self.bytes.get(self.pos..end)?;
        let mut value = 0u32;
        for b in slice {
            if !b.is_ascii_digit() {
                return None;
            }
            value = value * 10 + u32::from(b - b'0');
        }
        self.pos = end;
        Some(value)
    }

    /// Reads one to six fraction digits, scaled to microseconds
    fn fraction(&mut self) -> Option<u32> {
        let start = self.pos;
        let mut value = 0u32;
        while let Some(b) = self.peek() {
            if !b.is_ascii_digit() {
                break;
            }
            if self.pos - start == 6 {
                return None;
            }
            value = value * 10 + u32::from(b - b'0');
            self.pos += 1;
        }
        let len = self.pos - start;
        if len == 0 {
            return None;
        }
        Some(value * 10u32.pow((6 - len) as u32))
    }
}

/// Parse a timestamp literal of any precision
///
/// Accepts `YYYY[-MM[-DD[(T| )hh[:mm[:ss[.ffffff]]]]]]`, with an optional
/// trailing `Z` once a time of day is present. Returns `None` when the
/// literal is malformed or names an impossible date.
pub fn parse_partial_timestamp(s: &str) -> Option<PartialTimestamp> {
    let mut cur = Cursor::new(s);

    let year = cur.digits(4)? as i32;
    let mut month = 1;
    let mut day = 1;
    let mut hour = 0;
    let mut minute = 0;
    let mut second = 0;
    let mut micros = 0;
    let mut precision = Precision::Year;

    'parse: {
        if cur.at_end() {
            break 'parse;
        }
        if !cur.eat(b'-') {
            return None;
        }
        month = cur.digits(2)?;
        precision = Precision::Month;
        if cur.at_end() {
            break 'parse;
        }
        if !cur.eat(b'-') {
            return None;
        }
        day = cur.digits(2)?;
        precision = Precision::Day;
        if cur.at_end() {
            break 'parse;
        }
        if !(cur.eat(b'T') || cur.eat(b' ')) {
            return None;
        }
        hour = cur.digits(2)?;
        precision = Precision::Hour;
        if !cur.eat(b':') {
            break 'parse;
        }
        minute = cur.digits(2)?;
        precision = Precision::Minute;
        if !cur.eat(b':') {
            break 'parse;
        }
        second = cur.digits(2)?;
        precision = Precision::Second;
        if !cur.eat(b'.') {
            break 'parse;
        }
        micros = cur.fraction()?;
        precision = Precision::Micro;
    }

    if precision >= Precision::Hour {
        cur.eat(b'Z');
    }
    if !cur.at_end() {
        return None;
    }

    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let time = NaiveTime::from_hms_micro_opt(hour, minute, second, micros)?;
    let floor = NaiveDateTime::new(date, time).and_utc().timestamp_micros();

    let ceil = match precision {
        Precision::Year => start_of_month(year + 1, 1)? - 1,
        Precision::Month => {
            let (next_year, next_month) = if month == 12 {
                (year + 1, 1)
            } else {
                (year, month + 1)
            };
            start_of_month(next_year, next_month)? - 1
        }
        Precision::Day => floor + MICROS_PER_DAY - 1,
        Precision::Hour => floor + MICROS_PER_HOUR - 1,
        Precision::Minute => floor + MICROS_PER_MINUTE - 1,
        Precision::Second => floor + MICROS_PER_SECOND - 1,
        Precision::Micro => floor,
    };

    Some(PartialTimestamp {
        floor,
        ceil,
        precision,
    })
}

fn start_of_month(year: i32, month: u32) -> Option<i64> {
    let date = NaiveDate::from_ymd_opt(year, month, 1)?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc().timestamp_micros())
}

/// Format a timestamp as `YYYY-MM-DDThh:mm:ss.ffffffZ`
///
/// The NULL timestamp formats as an empty string. Instants outside the
/// four-digit year range (the interval sentinels) use the proleptic
/// Gregorian calendar.
pub fn format_timestamp(ts: i64) -> String {
    if ts == NULL_TIMESTAMP {
        return String::new();
    }

    if let Some(dt) = DateTime::from_timestamp_micros(ts) {
        if (0..=9999).contains(&dt.year()) {
            return dt.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string();
        }
    }

    let days = ts.div_euclid(MICROS_PER_DAY);
    let rem = ts.rem_euclid(MICROS_PER_DAY);
    let (year, month, day) = civil_from_days(days);
    let year = if year < 0 {
        format!("-{:04}", -year)
    } else {
        format!("{:04}", year)
    };
    format!(
        "{}-{:02}-{:02}T{:02}:{:02}:{:02}.{:06}Z",
        year,
        month,
        day,
        rem / MICROS_PER_HOUR,
        rem % MICROS_PER_HOUR / MICROS_PER_MINUTE,
        rem % MICROS_PER_MINUTE / MICROS_PER_SECOND,
        rem % MICROS_PER_SECOND
    )
}

/// Days since the epoch to (year, month, day)
fn civil_from_days(days: i64) -> (i64, i64, i64) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}

/// Units accepted by interval shorthand and `dateadd`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PeriodUnit {
    Year,
    Month,
    Week,
    Day,
    Hour,
    Minute,
    Second,
    Milli,
    Micro,
}

impl PeriodUnit {
    /// Parse a single-character unit code (`y M w d h m s T u`)
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'y' => Some(PeriodUnit::Year),
            'M' => Some(PeriodUnit::Month),
            'w' => Some(PeriodUnit::Week),
            'd' => Some(PeriodUnit::Day),
            'h' => Some(PeriodUnit::Hour),
            'm' => Some(PeriodUnit::Minute),
            's' => Some(PeriodUnit::Second),
            'T' => Some(PeriodUnit::Milli),
            'u' => Some(PeriodUnit::Micro),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            PeriodUnit::Year => 'y',
            PeriodUnit::Month => 'M',
            PeriodUnit::Week => 'w',
            PeriodUnit::Day => 'd',
            PeriodUnit::Hour => 'h',
            PeriodUnit::Minute => 'm',
            PeriodUnit::Second => 's',
            PeriodUnit::Milli => 'T',
            PeriodUnit::Micro => 'u',
        }
    }

    fn fixed_micros(&self) -> Option<i64> {
        match self {
            PeriodUnit::Year | PeriodUnit::Month => None,
            PeriodUnit::Week => Some(MICROS_PER_WEEK),
            PeriodUnit::Day => Some(MICROS_PER_DAY),
            PeriodUnit::Hour => Some(MICROS_PER_HOUR),
            PeriodUnit::Minute => Some(MICROS_PER_MINUTE),
            PeriodUnit::Second => Some(MICROS_PER_SECOND),
            PeriodUnit::Milli => Some(MICROS_PER_MILLI),
            PeriodUnit::Micro => Some(1),
        }
    }
}

/// Add `amount` units to a timestamp
///
/// Month and year arithmetic keeps the time of day and clamps the day of
/// month (`2015-01-31` plus one month is `2015-02-28`). Returns `None` on
/// overflow or when the result leaves the calendar range.
pub fn add_period(ts: i64, unit: PeriodUnit, amount: i64) -> Option<i64> {
    if let Some(step) = unit.fixed_micros() {
        return ts.checked_add(step.checked_mul(amount)?);
    }

    let months = match unit {
        PeriodUnit::Year => amount.checked_mul(12)?,
        _ => amount,
    };
    let dt = DateTime::from_timestamp_micros(ts)?.naive_utc();
    let total = i64::from(dt.year())
        .checked_mul(12)?
        .checked_add(i64::from(dt.month0()))?
        .checked_add(months)?;
    let year = i32::try_from(total.div_euclid(12)).ok()?;
    let month = (total.rem_euclid(12) + 1) as u32;
    let day = dt.day().min(days_in_month(year, month));
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let time = NaiveTime::from_hms_micro_opt(
        dt.hour(),
        dt.minute(),
        dt.second(),
        dt.nanosecond() / 1_000,
    )?;
    Some(NaiveDateTime::new(date, time).and_utc().timestamp_micros())
}

/// Returns the number of days in a given month
fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 30,
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}
