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

//! Timestamp intervals
//!
//! - [`interval`] - interval lists and their set algebra
//! - [`shorthand`] - `date;period;interval;count` literals
//! - [`runtime`] - intervals resolved per execution

pub mod interval;
pub mod runtime;
pub mod shorthand;

pub use interval::{Interval, IntervalList};
pub use runtime::{IntervalStep, IntervalTemplate, RuntimeIntervalModel, StepOp, TimestampSource};
pub use shorthand::{parse_interval_literal, Period};
