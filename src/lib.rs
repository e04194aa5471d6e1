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

//! # where-intrinsics - WHERE-clause analysis for time-partitioned scans
//!
//! Given a predicate and the metadata of a table with a designated timestamp
//! column, the analyzer extracts what a scan can use before reading a row:
//!
//! - **Timestamp intervals** - a sorted, non-overlapping list of microsecond
//!   ranges, possibly depending on bind variables or `now()`
//! - **Key values** - inclusion or exclusion values for one indexed symbol
//!   column, or a sub-query producing them
//! - **Residual filter** - the conjuncts the scan must still evaluate
//! - **Verdict** - whether the clause is always true or can never match
//!
//! ## Quick Start
//!
//! ```rust
//! use where_intrinsics::{
//!     parse_predicate, DataType, IntrinsicValue, SchemaBuilder, WhereClauseAnalyzer,
//! };
//!
//! let schema = SchemaBuilder::new("quotes")
//!     .add_designated_timestamp("timestamp")
//!     .add_indexed_symbol("sym")
//!     .add("bid", DataType::Float)
//!     .build();
//!
//! let predicate =
//!     parse_predicate("sym in ('A', 'B') and timestamp in '2015-02-23' and bid > 100").unwrap();
//! let model = WhereClauseAnalyzer::for_table(&schema)
//!     .extract_predicate(&predicate, None)
//!     .unwrap();
//!
//! assert_eq!(model.intrinsic_value, IntrinsicValue::Undefined);
//! assert_eq!(model.key_column.as_deref(), Some("sym"));
//! assert_eq!(model.key_values.to_string(), "[A,B]");
//! assert_eq!(
//!     model.static_intervals().unwrap().to_string(),
//!     "[{lo=2015-02-23T00:00:00.000000Z, hi=2015-02-23T23:59:59.999999Z}]"
//! );
//! assert_eq!(model.filter_sql(&predicate.arena).as_deref(), Some("bid > 100"));
//! ```
//!
//! ## Modules
//!
//! - [`api`] - Bind variables and parameter conversion
//! - [`config`] - Analyzer configuration
//! - [`core`] - Core types ([`DataType`], [`Value`], [`Schema`], [`Error`])
//! - [`functions`] - Constant evaluation and the built-in functions
//! - [`intervals`] - Interval algebra, shorthand literals, runtime model
//! - [`optimizer`] - The WHERE-clause analyzer
//! - [`parser`] - Predicate parser

pub mod api;
pub mod config;
pub mod core;
pub mod functions;
pub mod intervals;
pub mod optimizer;
pub mod parser;

// Re-export main types for convenience
pub use core::{
    DataType, Error, ErrorCategory, Operator, Result, Schema, SchemaBuilder, SchemaColumn,
    TableMetadata, Value,
};

pub use api::{BindVariables, BoundParams, Params, ToParam};
pub use config::AnalyzerConfig;
pub use functions::{global_registry, ConstantEvaluator, FunctionRegistry, ScalarFn};
pub use intervals::{Interval, IntervalList, RuntimeIntervalModel};
pub use optimizer::{
    IntrinsicModel, IntrinsicValue, KeyValue, KeyValueSet, ResidualFilter, WhereClauseAnalyzer,
};
pub use parser::{parse_predicate, ExprArena, NodeId, Predicate};
