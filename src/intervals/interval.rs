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

//! Timestamp interval algebra
//!
//! An [`Interval`] is an inclusive range of microseconds. An
//! [`IntervalList`] keeps intervals sorted by `lo` and pairwise
//! non-overlapping. Intervals that merely touch (`a.hi + 1 == b.lo`) stay
//! separate.
//!
//! The domain is `[NULL_TIMESTAMP, MAX_TIMESTAMP]`. `NULL_TIMESTAMP` is both
//! the open lower bound and the NULL marker, so `{NULL, NULL}` matches rows
//! with a NULL timestamp and the complement of the full domain is empty.

use std::fmt;

use crate::core::timestamp::{format_timestamp, MAX_TIMESTAMP, NULL_TIMESTAMP};

/// Inclusive microsecond range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Interval {
    pub lo: i64,
    pub hi: i64,
}

impl Interval {
    /// The whole timestamp domain
    pub const FULL: Interval = Interval {
        lo: NULL_TIMESTAMP,
        hi: MAX_TIMESTAMP,
    };

    /// Interval matching NULL timestamps
    pub const NULL: Interval = Interval {
        lo: NULL_TIMESTAMP,
        hi: NULL_TIMESTAMP,
    };

    pub fn new(lo: i64, hi: i64) -> Self {
        Self { lo, hi }
    }

    /// A single microsecond
    pub fn point(ts: i64) -> Self {
        Self { lo: ts, hi: ts }
    }

    /// Returns true if `lo > hi`
    pub fn is_inverted(&self) -> bool {
        self.lo > self.hi
    }

    pub fn contains(&self, ts: i64) -> bool {
        self.lo <= ts && ts <= self.hi
    }

    fn overlaps(&self, other: &Interval) -> bool {
        self.lo <= other.hi && other.lo <= self.hi
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{lo={}, hi={}}}",
            format_timestamp(self.lo),
            format_timestamp(self.hi)
        )
    }
}

/// Sorted, non-overlapping list of intervals
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct IntervalList {
    intervals: Vec<Interval>,
}

impl IntervalList {
    /// No timestamps at all
    pub fn empty() -> Self {
        Self::default()
    }

    /// The whole domain
    pub fn full() -> Self {
        Self {
            intervals: vec![Interval::FULL],
        }
    }

    /// A single interval; inverted input gives an empty list
    pub fn single(interval: Interval) -> Self {
        if interval.is_inverted() {
            Self::empty()
        } else {
            Self {
                intervals: vec![interval],
            }
        }
    }

    /// Build a list from intervals in any order
    ///
    /// Inverted intervals are dropped, overlapping ones merged.
    pub fn from_unsorted(intervals: impl IntoIterator<Item = Interval>) -> Self {
        let mut items: Vec<Interval> = intervals
            .into_iter()
            .filter(|iv| !iv.is_inverted())
            .collect();
        items.sort_unstable_by_key(|iv| (iv.lo, iv.hi));

        let mut merged: Vec<Interval> = Vec::with_capacity(items.len());
        for iv in items {
            match merged.last_mut() {
                Some(last) if last.overlaps(&iv) => last.hi = last.hi.max(iv.hi),
                _ => merged.push(iv),
            }
        }
        Self { intervals: merged }
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.intervals == [Interval::FULL]
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn as_slice(&self) -> &[Interval] {
        &self.intervals
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Interval> {
        self.intervals.iter()
    }

    pub fn into_vec(self) -> Vec<Interval> {
        self.intervals
    }

    /// Timestamps present in both lists
    pub fn intersect(&self, other: &IntervalList) -> IntervalList {
        let (a, b) = (&self.intervals, &other.intervals);
        let mut out = Vec::with_capacity(a.len().min(b.len()));
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            let lo = a[i].lo.max(b[j].lo);
            let hi = a[i].hi.min(b[j].hi);
            if lo <= hi {
                out.push(Interval::new(lo, hi));
            }
            if a[i].hi < b[j].hi {
                i += 1;
            } else {
                j += 1;
            }
        }
        IntervalList { intervals: out }
    }

    /// Timestamps present in either list
    pub fn union(&self, other: &IntervalList) -> IntervalList {
        let (a, b) = (&self.intervals, &other.intervals);
        let mut out: Vec<Interval> = Vec::with_capacity(a.len() + b.len());
        let (mut i, mut j) = (0, 0);
        while i < a.len() || j < b.len() {
            let next = if j >= b.len() || (i < a.len() && a[i].lo <= b[j].lo) {
                i += 1;
                a[i - 1]
            } else {
                j += 1;
                b[j - 1]
            };
            match out.last_mut() {
                Some(last) if last.overlaps(&next) => last.hi = last.hi.max(next.hi),
                _ => out.push(next),
            }
        }
        IntervalList { intervals: out }
    }

    /// Complement against the full domain
    pub fn invert(&self) -> IntervalList {
        let mut out = Vec::with_capacity(self.intervals.len() + 1);
        let mut next_lo = Some(NULL_TIMESTAMP);
        for iv in &self.intervals {
            if let Some(lo) = next_lo {
                if iv.lo > lo {
                    out.push(Interval::new(lo, iv.lo - 1));
                }
            }
            next_lo = iv.hi.checked_add(1);
        }
        if let Some(lo) = next_lo {
            out.push(Interval::new(lo, MAX_TIMESTAMP));
        }
        IntervalList { intervals: out }
    }

    /// Timestamps in `self` but not in `other`
    pub fn subtract(&self, other: &IntervalList) -> IntervalList {
        if other.is_empty() {
            return self.clone();
        }
        self.intersect(&other.invert())
    }
}

impl From<Vec<Interval>> for IntervalList {
    fn from(intervals: Vec<Interval>) -> Self {
        Self::from_unsorted(intervals)
    }
}

impl<'a> IntoIterator for &'a IntervalList {
    type Item = &'a Interval;
    type IntoIter = std::slice::Iter<'a, Interval>;

    fn into_iter(self) -> Self::IntoIter {
        self.intervals.iter()
    }
}

impl fmt::Display for IntervalList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, iv) in self.intervals.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", iv)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(pairs: &[(i64, i64)]) -> IntervalList {
        IntervalList::from_unsorted(pairs.iter().map(|&(lo, hi)| Interval::new(lo, hi)))
    }

    fn pairs(l: &IntervalList) -> Vec<(i64, i64)> {
        l.iter().map(|iv| (iv.lo, iv.hi)).collect()
    }

    #[test]
    fn test_from_unsorted_merges_overlaps_only() {
        let l = list(&[(20, 30), (1, 5), (4, 10), (11, 12), (25, 26)]);
        assert_eq!(pairs(&l), vec![(1, 10), (11, 12), (20, 30)]);

        let l = list(&[(5, 1)]);
        assert!(l.is_empty());
    }

    #[test]
    fn test_intersect() {
        let a = list(&[(1, 10), (20, 30)]);
        let b = list(&[(5, 25)]);
        assert_eq!(pairs(&a.intersect(&b)), vec![(5, 10), (20, 25)]);

        let c = list(&[(11, 19)]);
        assert!(a.intersect(&c).is_empty());

        assert_eq!(a.intersect(&IntervalList::full()), a);
    }

    #[test]
    fn test_union_keeps_touching_apart() {
        let a = list(&[(1, 10), (30, 40)]);
        let b = list(&[(11, 12), (35, 50)]);
        assert_eq!(pairs(&a.union(&b)), vec![(1, 10), (11, 12), (30, 50)]);

        assert_eq!(a.union(&IntervalList::empty()), a);
    }

    #[test]
    fn test_invert() {
        let a = list(&[(10, 20)]);
        assert_eq!(
            pairs(&a.invert()),
            vec![(NULL_TIMESTAMP, 9), (21, MAX_TIMESTAMP)]
        );
        assert_eq!(a.invert().invert(), a);

        assert!(IntervalList::full().invert().is_empty());
        assert!(IntervalList::empty().invert().is_full());

        let null = IntervalList::single(Interval::NULL);
        assert_eq!(
            pairs(&null.invert()),
            vec![(NULL_TIMESTAMP + 1, MAX_TIMESTAMP)]
        );

        let open_lo = list(&[(NULL_TIMESTAMP, 100)]);
        assert_eq!(pairs(&open_lo.invert()), vec![(101, MAX_TIMESTAMP)]);

        let open_hi = list(&[(100, MAX_TIMESTAMP)]);
        assert_eq!(pairs(&open_hi.invert()), vec![(NULL_TIMESTAMP, 99)]);
    }

    #[test]
    fn test_subtract() {
        let a = list(&[(1, 100)]);
        let b = list(&[(10, 20), (50, 60)]);
        assert_eq!(
            pairs(&a.subtract(&b)),
            vec![(1, 9), (21, 49), (61, 100)]
        );
        assert_eq!(a.subtract(&IntervalList::empty()), a);
        assert!(a.subtract(&IntervalList::full()).is_empty());
    }

    #[test]
    fn test_display() {
        let l = list(&[(0, 0)]);
        assert_eq!(
            l.to_string(),
            "[{lo=1970-01-01T00:00:00.000000Z, hi=1970-01-01T00:00:00.000000Z}]"
        );
        assert_eq!(IntervalList::single(Interval::NULL).to_string(), "[{lo=, hi=}]");
        assert_eq!(IntervalList::empty().to_string(), "[]");
    }
}
