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

//! Runtime interval model
//!
//! Timestamp predicates whose bounds depend on bind variables or `now()` are
//! compiled into a static base list plus a sequence of steps. Each execution
//! resolves the step bounds and replays them against the base list.
//!
//! A bound that cannot be resolved (NULL bind value, unparseable text) does
//! not fail the execution. Only that bound opens: `ts > $1` spans the whole
//! domain, `ts between $1 and '2015'` keeps its upper bound, and an
//! unresolved IN element matches NULL timestamps only, as a literal `null`
//! element does. A subtract step skips a template with an open bound. A
//! bound that resolves past the end of the domain (`ts > MAX`) gives an
//! empty range, as the same literal does at compile time.

use tracing::trace;

use crate::api::BindVariables;
use crate::core::timestamp::{MAX_TIMESTAMP, NULL_TIMESTAMP};
use crate::functions::{EvalContext, ScalarFn};

use super::interval::{Interval, IntervalList};

/// Where a bound comes from
#[derive(Debug, Clone, PartialEq)]
pub enum TimestampSource {
    /// Folded at compile time: first and last microsecond of the literal
    Static { floor: i64, ceil: i64 },
    /// Evaluated per execution
    Dynamic(ScalarFn),
}

impl TimestampSource {
    fn resolve(&self, ctx: &EvalContext<'_>) -> Option<(i64, i64)> {
        match self {
            TimestampSource::Static { floor, ceil } => Some((*floor, *ceil)),
            TimestampSource::Dynamic(f) => f
                .eval(ctx)
                .as_timestamp_range()
                .map(|range| (range.floor, range.ceil)),
        }
    }
}

/// Shape of the interval a predicate produces
#[derive(Debug, Clone, PartialEq)]
pub enum IntervalTemplate {
    /// `ts = x`
    Point(TimestampSource),
    /// `ts > x` or, when inclusive, `ts >= x`
    After {
        source: TimestampSource,
        inclusive: bool,
    },
    /// `ts < x` or, when inclusive, `ts <= x`
    Before {
        source: TimestampSource,
        inclusive: bool,
    },
    /// `ts between a and b`, bounds in either order
    Between(TimestampSource, TimestampSource),
}

/// A template resolved for one execution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolution {
    /// All bounds known; `None` when the range is empty
    Exact(Option<Interval>),
    /// At least one bound was unresolved and opened
    Open(Interval),
}

impl IntervalTemplate {
    fn resolve(&self, ctx: &EvalContext<'_>) -> Resolution {
        match self {
            IntervalTemplate::Point(source) => match source.resolve(ctx) {
                Some((floor, ceil)) => Resolution::Exact(Some(Interval::new(floor, ceil))),
                None => Resolution::Open(Interval::NULL),
            },
            IntervalTemplate::After { source, inclusive } => match source.resolve(ctx) {
                Some((floor, ceil)) => {
                    let lo = if *inclusive {
                        Some(floor)
                    } else {
                        ceil.checked_add(1)
                    };
                    Resolution::Exact(lo.map(|lo| Interval::new(lo, MAX_TIMESTAMP)))
                }
                None => Resolution::Open(Interval::FULL),
            },
            IntervalTemplate::Before { source, inclusive } => match source.resolve(ctx) {
                Some((floor, ceil)) => {
                    let hi = if *inclusive {
                        Some(ceil)
                    } else {
                        floor.checked_sub(1)
                    };
                    Resolution::Exact(hi.map(|hi| Interval::new(NULL_TIMESTAMP, hi)))
                }
                None => Resolution::Open(Interval::FULL),
            },
            IntervalTemplate::Between(a, b) => match (a.resolve(ctx), b.resolve(ctx)) {
                (Some((a_floor, a_ceil)), Some((b_floor, b_ceil))) => Resolution::Exact(Some(
                    Interval::new(a_floor.min(b_floor), a_ceil.max(b_ceil)),
                )),
                (Some((a_floor, _)), None) => {
                    Resolution::Open(Interval::new(a_floor, MAX_TIMESTAMP))
                }
                (None, Some((_, b_ceil))) => {
                    Resolution::Open(Interval::new(NULL_TIMESTAMP, b_ceil))
                }
                (None, None) => Resolution::Open(Interval::FULL),
            },
        }
    }
}

/// How a step combines with the running list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOp {
    Intersect,
    Subtract,
}

impl StepOp {
    /// The operation of the negated predicate
    pub fn negate(self) -> Self {
        match self {
            StepOp::Intersect => StepOp::Subtract,
            StepOp::Subtract => StepOp::Intersect,
        }
    }
}

/// One deferred predicate; its templates are unioned before `op` applies
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalStep {
    pub op: StepOp,
    pub templates: Vec<IntervalTemplate>,
}

impl IntervalStep {
    pub fn new(op: StepOp, templates: Vec<IntervalTemplate>) -> Self {
        Self { op, templates }
    }

    fn resolve(&self, ctx: &EvalContext<'_>) -> IntervalList {
        let mut resolved = Vec::with_capacity(self.templates.len());
        for template in &self.templates {
            match (template.resolve(ctx), self.op) {
                (Resolution::Exact(interval), _) => resolved.extend(interval),
                (Resolution::Open(interval), StepOp::Intersect) => {
                    trace!(?template, "unresolved bound opened");
                    resolved.push(interval);
                }
                (Resolution::Open(_), StepOp::Subtract) => {
                    trace!(?template, "unresolved bound, subtract template skipped");
                }
            }
        }
        IntervalList::from_unsorted(resolved)
    }
}

/// Compiled timestamp constraint, evaluated once per execution
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeIntervalModel {
    base: IntervalList,
    steps: Vec<IntervalStep>,
}

impl RuntimeIntervalModel {
    pub fn new(base: IntervalList, steps: Vec<IntervalStep>) -> Self {
        Self { base, steps }
    }

    /// Model with no deferred steps
    pub fn from_static(base: IntervalList) -> Self {
        Self::new(base, Vec::new())
    }

    /// True when the intervals are fully known at compile time
    pub fn is_static(&self) -> bool {
        self.steps.is_empty()
    }

    /// The compile-time list, if nothing is deferred
    pub fn static_intervals(&self) -> Option<&IntervalList> {
        self.is_static().then_some(&self.base)
    }

    pub fn base(&self) -> &IntervalList {
        &self.base
    }

    pub fn steps(&self) -> &[IntervalStep] {
        &self.steps
    }

    /// Resolve the intervals for one execution
    ///
    /// `now` is the execution timestamp in epoch microseconds; every `now()`
    /// in the model sees the same value.
    pub fn evaluate(&self, bind: &dyn BindVariables, now: i64) -> IntervalList {
        let ctx = EvalContext::runtime(bind, now);
        let mut result = self.base.clone();
        for step in &self.steps {
            if result.is_empty() {
                break;
            }
            let resolved = step.resolve(&ctx);
            result = match step.op {
                StepOp::Intersect => result.intersect(&resolved),
                StepOp::Subtract => result.subtract(&resolved),
            };
        }
        result
    }
}
