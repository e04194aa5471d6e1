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

//! Core types and definitions
//!
//! This module contains the fundamental types shared by the parser, the
//! constant evaluator and the analyzer:
//!
//! - [`DataType`] - column and value types (SYMBOL, TIMESTAMP, TEXT, etc.)
//! - [`Operator`] - comparison operators (=, !=, >, <, etc.)
//! - [`Value`] - constant values with type information
//! - [`Schema`] / [`TableMetadata`] - table metadata consumed by the analyzer
//! - [`timestamp`] - microsecond timestamps, partial literals, periods
//! - [`Error`] - compile-time predicate errors

pub mod error;
pub mod schema;
pub mod timestamp;
pub mod types;
pub mod value;

// Re-export main types for convenience
pub use error::{Error, ErrorCategory, Result};
pub use schema::{Schema, SchemaBuilder, SchemaColumn, TableMetadata};
pub use timestamp::{
    add_period, format_timestamp, parse_partial_timestamp, PartialTimestamp, PeriodUnit,
    Precision, MAX_TIMESTAMP, MIN_TIMESTAMP, NULL_TIMESTAMP,
};
pub use types::{ArithmeticOp, DataType, Operator};
pub use value::Value;
