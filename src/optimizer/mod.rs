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

//! Intrinsic extraction for WHERE clauses
//!
//! Finds the parts of a predicate a time-partitioned scan can use directly:
//! timestamp intervals on the designated timestamp, key values for an
//! indexed symbol column, and the residual filter the scan still evaluates.
//!
//! ## Modules
//!
//! - `analyzer` - Tree walk and key column selection
//! - `classifier` - Rules for individual comparisons, BETWEEN and IN
//! - `fragment` - Partial models and the AND/OR/NOT merge rules
//! - `model` - The resulting [`IntrinsicModel`]

pub mod analyzer;
mod classifier;
mod fragment;
pub mod model;

pub use analyzer::WhereClauseAnalyzer;
pub use model::{IntrinsicModel, IntrinsicValue, KeyValue, KeyValueSet, ResidualFilter};
