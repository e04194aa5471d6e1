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

//! Interval shorthand literals
//!
//! Inside `IN`, a timestamp literal may carry a period and a repetition:
//!
//! ```text
//! '2015-02-23'                          one day
//! '2015-02-23T10:00;2d'                 10:00:00.000000 .. 2015-02-25T10:00:59.999999
//! '2015-02-23T10:00:55.000Z;30m;2d;5'   five 30 minute windows, two days apart
//! ```

use crate::core::timestamp::{add_period, parse_partial_timestamp, PartialTimestamp, PeriodUnit};
use crate::core::{Error, Result};

use super::interval::{Interval, IntervalList};

/// Amount and unit, e.g. `30m`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub amount: i64,
    pub unit: PeriodUnit,
}

impl Period {
    /// Parse `<digits><unit>`
    pub fn parse(s: &str) -> Option<Period> {
        let unit_char = s.chars().last()?;
        let unit = PeriodUnit::from_char(unit_char)?;
        let digits = &s[..s.len() - unit_char.len_utf8()];
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let amount = digits.parse::<i64>().ok()?;
        Some(Period { amount, unit })
    }

    fn apply(&self, ts: i64, times: i64) -> Option<i64> {
        add_period(ts, self.unit, self.amount.checked_mul(times)?)
    }
}

/// Parse an interval literal into its intervals
///
/// `position` is the offset of the literal and is attached to every error.
pub fn parse_interval_literal(
    literal: &str,
    position: usize,
    max_repeat: usize,
) -> Result<IntervalList> {
    let parts: Vec<&str> = literal.split(';').collect();
    let base = parse_partial_timestamp(parts[0]).ok_or(Error::InvalidDate { position })?;

    match parts.len() {
        1 => Ok(IntervalList::single(Interval::new(base.floor, base.ceil))),
        2 => {
            let period = parse_period(parts[1], position)?;
            let hi = period
                .apply(base.ceil, 1)
                .ok_or_else(|| out_of_range(position))?;
            Ok(IntervalList::single(Interval::new(base.floor, hi)))
        }
        4 => {
            let period = parse_period(parts[1], position)?;
            let step = parse_period(parts[2], position)?;
            let count = parse_count(parts[3], position, max_repeat)?;
            repeat(base, period, step, count, position)
        }
        _ => Err(Error::invalid_interval(
            position,
            "expected date;period or date;period;interval;count",
        )),
    }
}

fn repeat(
    base: PartialTimestamp,
    period: Period,
    step: Period,
    count: usize,
    position: usize,
) -> Result<IntervalList> {
    let mut windows = Vec::with_capacity(count);
    for i in 0..count as i64 {
        let lo = step.apply(base.floor, i);
        let hi = step
            .apply(base.ceil, i)
            .and_then(|ceil| period.apply(ceil, 1));
        match (lo, hi) {
            (Some(lo), Some(hi)) => windows.push(Interval::new(lo, hi)),
            _ => return Err(out_of_range(position)),
        }
    }
    Ok(IntervalList::from_unsorted(windows))
}

fn parse_period(s: &str, position: usize) -> Result<Period> {
    Period::parse(s)
        .ok_or_else(|| Error::invalid_interval(position, format!("invalid period '{}'", s)))
}

fn parse_count(s: &str, position: usize, max_repeat: usize) -> Result<usize> {
    let count = s
        .parse::<usize>()
        .ok()
        .filter(|&n| n > 0)
        .ok_or_else(|| Error::invalid_interval(position, format!("invalid count '{}'", s)))?;
    if count > max_repeat {
        return Err(Error::invalid_interval(
            position,
            format!("count {} exceeds limit {}", count, max_repeat),
        ));
    }
    Ok(count)
}

fn out_of_range(position: usize) -> Error {
    Error::invalid_interval(position, "interval out of range")
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX: usize = 1_000;

    #[test]
    fn test_single_literal() {
        let l = parse_interval_literal("2015-02-23", 0, MAX).unwrap();
        assert_eq!(
            l.to_string(),
            "[{lo=2015-02-23T00:00:00.000000Z, hi=2015-02-23T23:59:59.999999Z}]"
        );
    }

    #[test]
    fn test_period() {
        let l = parse_interval_literal("2015-02-23T10:00;2d", 0, MAX).unwrap();
        assert_eq!(
            l.to_string(),
            "[{lo=2015-02-23T10:00:00.000000Z, hi=2015-02-25T10:00:59.999999Z}]"
        );

        let l = parse_interval_literal("2015-02-23T10:00:55.000Z;7d", 0, MAX).unwrap();
        assert_eq!(
            l.to_string(),
            "[{lo=2015-02-23T10:00:55.000000Z, hi=2015-03-02T10:00:55.000000Z}]"
        );
    }

    #[test]
    fn test_repeated_windows() {
        let l = parse_interval_literal("2015-02-23T10:00:55.000Z;30m;2d;5", 0, MAX).unwrap();
        assert_eq!(
            l.to_string(),
            "[{lo=2015-02-23T10:00:55.000000Z, hi=2015-02-23T10:30:55.000000Z},\
             {lo=2015-02-25T10:00:55.000000Z, hi=2015-02-25T10:30:55.000000Z},\
             {lo=2015-02-27T10:00:55.000000Z, hi=2015-02-27T10:30:55.000000Z},\
             {lo=2015-03-01T10:00:55.000000Z, hi=2015-03-01T10:30:55.000000Z},\
             {lo=2015-03-03T10:00:55.000000Z, hi=2015-03-03T10:30:55.000000Z}]"
        );

        let l = parse_interval_literal("2015-01-31T10:00:00.000Z;1h;1M;3", 0, MAX).unwrap();
        assert_eq!(
            l.to_string(),
            "[{lo=2015-01-31T10:00:00.000000Z, hi=2015-01-31T11:00:00.000000Z},\
             {lo=2015-02-28T10:00:00.000000Z, hi=2015-02-28T11:00:00.000000Z},\
             {lo=2015-03-31T10:00:00.000000Z, hi=2015-03-31T11:00:00.000000Z}]"
        );
    }

    #[test]
    fn test_overlapping_windows_merge() {
        let l = parse_interval_literal("2015-02-23T10:00:00.000Z;3h;1h;3", 0, MAX).unwrap();
        assert_eq!(
            l.to_string(),
            "[{lo=2015-02-23T10:00:00.000000Z, hi=2015-02-23T15:00:00.000000Z}]"
        );
    }

    #[test]
    fn test_errors_carry_position() {
        let err = parse_interval_literal("2014-0x-01T12:30:00.000Z", 12, MAX).unwrap_err();
        assert_eq!(err, Error::InvalidDate { position: 12 });

        let err = parse_interval_literal("2014-03-01T12:30:00.000Z;x", 12, MAX).unwrap_err();
        assert!(matches!(err, Error::InvalidInterval { position: 12, .. }));

        let err = parse_interval_literal("2014-03-01T12:30:00.000Z;30m;x;5", 12, MAX).unwrap_err();
        assert!(matches!(err, Error::InvalidInterval { position: 12, .. }));

        let err = parse_interval_literal("2014-03-01T12:30:00.000Z;30m;2d;0", 3, MAX).unwrap_err();
        assert!(matches!(err, Error::InvalidInterval { position: 3, .. }));

        let err = parse_interval_literal("2014-03-01T12:30:00.000Z;30m;2d", 3, MAX).unwrap_err();
        assert!(matches!(err, Error::InvalidInterval { position: 3, .. }));

        let err = parse_interval_literal("2014-03-01;1d;1d;5000", 3, MAX).unwrap_err();
        assert!(err.to_string().contains("exceeds limit"));
    }

    #[test]
    fn test_period_parse() {
        assert_eq!(
            Period::parse("30m"),
            Some(Period {
                amount: 30,
                unit: PeriodUnit::Minute
            })
        );
        assert_eq!(Period::parse("m"), None);
        assert_eq!(Period::parse("-1d"), None);
        assert_eq!(Period::parse("10x"), None);
        assert_eq!(Period::parse(""), None);
    }
}
