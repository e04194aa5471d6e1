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

//! Constant folding
//!
//! The analyzer asks two questions of an operand: is it a compile-time
//! constant (and what is its value), or is it a runtime constant whose value
//! is only known per execution (`now()`, `$1`, functions of them). Both are
//! answered through the [`ConstantEvaluator`] trait; [`FunctionRegistry`] is
//! the built-in implementation.
//!
//! - [`ScalarFn`] - compiled scalar expression, evaluated against an [`EvalContext`]
//! - [`FunctionRegistry`] - name lookup and compilation of the built-in functions
//! - [`datetime`] - date helpers used by `to_date`

pub mod datetime;
pub mod registry;

use chrono::Utc;

use crate::api::BindVariables;
use crate::core::timestamp::add_period;
use crate::core::{ArithmeticOp, DataType, PeriodUnit, Result, Value};
use crate::parser::{ExprArena, NodeId};

pub use registry::{global_registry, FunctionInfo, FunctionKind, FunctionRegistry};

/// Inputs available while evaluating a [`ScalarFn`]
#[derive(Clone, Copy, Default)]
pub struct EvalContext<'a> {
    /// Bind variable values; `None` at compile time
    pub bind: Option<&'a dyn BindVariables>,
    /// Wall clock in epoch microseconds; `None` reads the system clock
    pub now: Option<i64>,
}

impl<'a> EvalContext<'a> {
    /// Context for folding compile-time constants
    pub fn compile_time() -> Self {
        Self::default()
    }

    /// Context for one execution
    pub fn runtime(bind: &'a dyn BindVariables, now: i64) -> Self {
        Self {
            bind: Some(bind),
            now: Some(now),
        }
    }

    fn now(&self) -> i64 {
        self.now.unwrap_or_else(|| Utc::now().timestamp_micros())
    }
}

/// Compiled scalar expression
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarFn {
    Const(Value),
    Now,
    /// Zero-based bind variable index
    BindVariable(usize),
    DateAdd {
        unit: PeriodUnit,
        amount: Box<ScalarFn>,
        ts: Box<ScalarFn>,
    },
    ToTimestamp(Box<ScalarFn>),
    ToDate {
        value: Box<ScalarFn>,
        pattern: String,
    },
    Arithmetic {
        op: ArithmeticOp,
        left: Box<ScalarFn>,
        right: Box<ScalarFn>,
    },
    Abs(Box<ScalarFn>),
    Neg(Box<ScalarFn>),
}

impl ScalarFn {
    /// True when the value does not depend on bind variables or the clock
    pub fn is_constant(&self) -> bool {
        match self {
            ScalarFn::Const(_) => true,
            ScalarFn::Now | ScalarFn::BindVariable(_) => false,
            ScalarFn::DateAdd { amount, ts, .. } => amount.is_constant() && ts.is_constant(),
            ScalarFn::ToTimestamp(inner)
            | ScalarFn::Abs(inner)
            | ScalarFn::Neg(inner)
            | ScalarFn::ToDate { value: inner, .. } => inner.is_constant(),
            ScalarFn::Arithmetic { left, right, .. } => left.is_constant() && right.is_constant(),
        }
    }

    /// Static result type; bind variables are untyped until bound
    pub fn data_type(&self) -> DataType {
        match self {
            ScalarFn::Const(v) => v.data_type(),
            ScalarFn::Now
            | ScalarFn::DateAdd { .. }
            | ScalarFn::ToTimestamp(_)
            | ScalarFn::ToDate { .. } => DataType::Timestamp,
            ScalarFn::BindVariable(_) => DataType::Null,
            ScalarFn::Abs(inner) | ScalarFn::Neg(inner) => inner.data_type(),
            ScalarFn::Arithmetic { op, left, right } => {
                let (l, r) = (left.data_type(), right.data_type());
                match op {
                    ArithmeticOp::Add | ArithmeticOp::Sub
                        if l == DataType::Timestamp || r == DataType::Timestamp =>
                    {
                        if *op == ArithmeticOp::Sub && l == r {
                            DataType::Integer
                        } else {
                            DataType::Timestamp
                        }
                    }
                    _ if l == DataType::Float || r == DataType::Float => DataType::Float,
                    _ if l == DataType::Null => r,
                    _ => l,
                }
            }
        }
    }

    /// Evaluate; any failure yields NULL
    pub fn eval(&self, ctx: &EvalContext<'_>) -> Value {
        match self {
            ScalarFn::Const(v) => v.clone(),
            ScalarFn::Now => Value::Timestamp(ctx.now()),
            ScalarFn::BindVariable(index) => ctx
                .bind
                .and_then(|b| b.bind_value(*index))
                .cloned()
                .unwrap_or_else(Value::null_unknown),
            ScalarFn::DateAdd { unit, amount, ts } => {
                let amount = amount.eval(ctx);
                let ts = ts.eval(ctx);
                match (amount_of(&amount), ts.as_timestamp_range()) {
                    (Some(n), Some(range)) => add_period(range.floor, *unit, n)
                        .map(Value::Timestamp)
                        .unwrap_or_else(|| Value::null(DataType::Timestamp)),
                    _ => Value::null(DataType::Timestamp),
                }
            }
            ScalarFn::ToTimestamp(inner) => match inner.eval(ctx).as_timestamp_range() {
                Some(range) => Value::Timestamp(range.floor),
                None => Value::null(DataType::Timestamp),
            },
            ScalarFn::ToDate { value, pattern } => match value.eval(ctx) {
                Value::Text(s) => datetime::parse_with_pattern(&s, pattern)
                    .map(Value::Timestamp)
                    .unwrap_or_else(|| Value::null(DataType::Timestamp)),
                _ => Value::null(DataType::Timestamp),
            },
            ScalarFn::Arithmetic { op, left, right } => {
                arithmetic(*op, &left.eval(ctx), &right.eval(ctx))
            }
            ScalarFn::Abs(inner) => match inner.eval(ctx) {
                Value::Integer(i) => i
                    .checked_abs()
                    .map(Value::Integer)
                    .unwrap_or_else(|| Value::null(DataType::Integer)),
                Value::Float(f) => Value::Float(f.abs()),
                other => Value::null(other.data_type()),
            },
            ScalarFn::Neg(inner) => match inner.eval(ctx) {
                Value::Integer(i) => i
                    .checked_neg()
                    .map(Value::Integer)
                    .unwrap_or_else(|| Value::null(DataType::Integer)),
                Value::Float(f) => Value::Float(-f),
                other => Value::null(other.data_type()),
            },
        }
    }
}

fn amount_of(v: &Value) -> Option<i64> {
    match v {
        Value::Integer(i) => Some(*i),
        Value::Float(f) if f.is_finite() => Some(*f as i64),
        Value::Text(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn arithmetic(op: ArithmeticOp, l: &Value, r: &Value) -> Value {
    use ArithmeticOp::*;

    match (l, r) {
        (Value::Integer(a), Value::Integer(b)) => {
            let result = match op {
                Add => a.checked_add(*b),
                Sub => a.checked_sub(*b),
                Mul => a.checked_mul(*b),
                Div => a.checked_div(*b),
            };
            result
                .map(Value::Integer)
                .unwrap_or_else(|| Value::null(DataType::Integer))
        }
        // timestamp +/- integer is microsecond arithmetic
        (Value::Timestamp(t), Value::Integer(n)) | (Value::Integer(n), Value::Timestamp(t))
            if op == Add =>
        {
            t.checked_add(*n)
                .map(Value::Timestamp)
                .unwrap_or_else(|| Value::null(DataType::Timestamp))
        }
        (Value::Timestamp(t), Value::Integer(n)) if op == Sub => t
            .checked_sub(*n)
            .map(Value::Timestamp)
            .unwrap_or_else(|| Value::null(DataType::Timestamp)),
        (Value::Timestamp(a), Value::Timestamp(b)) if op == Sub => a
            .checked_sub(*b)
            .map(Value::Integer)
            .unwrap_or_else(|| Value::null(DataType::Integer)),
        (Value::Float(_) | Value::Integer(_), Value::Float(_) | Value::Integer(_)) => {
            let (a, b) = (as_f64(l), as_f64(r));
            let result = match op {
                Add => a + b,
                Sub => a - b,
                Mul => a * b,
                Div => a / b,
            };
            if result.is_finite() {
                Value::Float(result)
            } else {
                Value::null(DataType::Float)
            }
        }
        _ => Value::null_unknown(),
    }
}

fn as_f64(v: &Value) -> f64 {
    match v {
        Value::Integer(i) => *i as f64,
        Value::Float(f) => *f,
        _ => f64::NAN,
    }
}

/// Source of constant values for the analyzer
pub trait ConstantEvaluator {
    /// Compile a node into a scalar function
    ///
    /// `Ok(None)` means the node is not constant at all: it references a
    /// column, a sub-query or a function the evaluator does not know.
    fn compile(&self, arena: &ExprArena, node: NodeId) -> Result<Option<ScalarFn>>;

    /// Value of a compile-time constant, or `None` if the node is not one
    fn try_evaluate_const(&self, arena: &ExprArena, node: NodeId) -> Result<Option<Value>> {
        Ok(self
            .compile(arena, node)?
            .filter(ScalarFn::is_constant)
            .map(|f| f.eval(&EvalContext::compile_time())))
    }

    /// True when the node is constant per execution but not at compile time
    fn is_runtime_constant(&self, arena: &ExprArena, node: NodeId) -> Result<bool> {
        Ok(self
            .compile(arena, node)?
            .is_some_and(|f| !f.is_constant()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> i64 {
        crate::core::parse_partial_timestamp(s).unwrap().floor
    }

    #[test]
    fn test_constness() {
        let c = ScalarFn::Const(Value::Integer(1));
        assert!(c.is_constant());
        assert!(!ScalarFn::Now.is_constant());

        let sum = ScalarFn::Arithmetic {
            op: ArithmeticOp::Add,
            left: Box::new(ScalarFn::BindVariable(0)),
            right: Box::new(c),
        };
        assert!(!sum.is_constant());
        assert_eq!(sum.data_type(), DataType::Integer);
    }

    #[test]
    fn test_timestamp_arithmetic() {
        let f = ScalarFn::Arithmetic {
            op: ArithmeticOp::Sub,
            left: Box::new(ScalarFn::Now),
            right: Box::new(ScalarFn::Const(Value::Integer(1_000_000))),
        };
        assert_eq!(f.data_type(), DataType::Timestamp);
        let binds: Vec<Value> = Vec::new();
        let ctx = EvalContext::runtime(&binds, 5_000_000);
        assert_eq!(f.eval(&ctx), Value::Timestamp(4_000_000));
    }

    #[test]
    fn test_dateadd_and_binds() {
        let f = ScalarFn::DateAdd {
            unit: PeriodUnit::Month,
            amount: Box::new(ScalarFn::BindVariable(1)),
            ts: Box::new(ScalarFn::BindVariable(0)),
        };
        let binds = vec![Value::text("2015-01-31"), Value::Integer(1)];
        let ctx = EvalContext::runtime(&binds, 0);
        assert_eq!(f.eval(&ctx), Value::Timestamp(ts("2015-02-28")));

        let missing: Vec<Value> = Vec::new();
        assert!(f.eval(&EvalContext::runtime(&missing, 0)).is_null());
    }

    #[test]
    fn test_failures_yield_null() {
        let div = ScalarFn::Arithmetic {
            op: ArithmeticOp::Div,
            left: Box::new(ScalarFn::Const(Value::Integer(1))),
            right: Box::new(ScalarFn::Const(Value::Integer(0))),
        };
        assert!(div.eval(&EvalContext::compile_time()).is_null());

        let bad = ScalarFn::ToDate {
            value: Box::new(ScalarFn::Const(Value::text("2015-99-01"))),
            pattern: "yyyy-MM-dd".to_string(),
        };
        assert!(bad.eval(&EvalContext::compile_time()).is_null());
        assert_eq!(bad.data_type(), DataType::Timestamp);
    }
}
